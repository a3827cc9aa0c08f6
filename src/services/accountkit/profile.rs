use serde::Serialize;
use serde_json::Value;

use crate::services::oauth2::OAuth2Error;

pub const PROVIDER: &str = "accountkit";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to fetch user profile")]
    Fetch(#[source] OAuth2Error),

    #[error("failed to parse user profile")]
    Parse(#[source] serde_json::Error),
}

/// Normalized Account Kit profile.
///
/// `raw` / `json` keep the upstream response for callers that need more than
/// the fixed fields.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub provider: &'static str,
    pub id: String,
    pub email: String,
    pub phone: String,
    #[serde(skip)]
    pub raw: String,
    #[serde(skip)]
    pub json: Value,
}

impl Profile {
    pub fn parse(raw: String) -> Result<Self, ProfileError> {
        let json: Value = serde_json::from_str(&raw).map_err(ProfileError::Parse)?;

        let id = match json.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        // Account Kit nests these: {"email":{"address":..}}, {"phone":{"number":..}}
        let email = text_or_nested(&json, "email", "address");
        let phone = text_or_nested(&json, "phone", "number");

        Ok(Self {
            provider: PROVIDER,
            id,
            email,
            phone,
            raw,
            json,
        })
    }
}

fn text_or_nested(json: &Value, key: &str, nested: &str) -> String {
    match json.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => obj
            .get(nested)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Map profile field names to Graph API field names and join them with `,`.
///
/// Unknown names pass through unchanged. Not used by the profile fetch
/// itself; exposed for callers building their own field-selection queries.
pub fn convert_profile_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| {
            let name = f.as_ref();
            match name {
                "id" => "id",
                "phone" => "phone",
                "email" => "email",
                other => other,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
