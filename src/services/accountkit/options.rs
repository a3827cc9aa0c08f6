//! Strategy construction options.
//!
//! `StrategyOptions` is what callers fill in (mostly `None`), and
//! `ResolvedOptions` is the immutable result after defaults are applied.

use url::Url;

pub const DEFAULT_GRAPH_VERSION: &str = "v1.3";
pub const DEFAULT_ACCESS_TOKEN_FIELD: &str = "access_token";
pub const DEFAULT_REFRESH_TOKEN_FIELD: &str = "refresh_token";

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("missing option: {0}")]
    Missing(&'static str),

    #[error("invalid url for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Clone, Default)]
pub struct StrategyOptions {
    pub client_id: String,
    pub client_secret: String,

    pub graph_version: Option<String>,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub profile_url: Option<String>,

    pub access_token_field: Option<String>,
    pub refresh_token_field: Option<String>,

    pub profile_fields: Option<Vec<String>>,
    // Stored only; the bearer flow never requests a picture.
    pub profile_image: Option<serde_json::Value>,

    pub enable_proof: Option<bool>,
    pub pass_req_to_callback: bool,
}

impl std::fmt::Debug for StrategyOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyOptions")
            .field("client_id", &self.client_id)
            .field("graph_version", &self.graph_version)
            .field("authorization_url", &self.authorization_url)
            .field("token_url", &self.token_url)
            .field("profile_url", &self.profile_url)
            .field("access_token_field", &self.access_token_field)
            .field("refresh_token_field", &self.refresh_token_field)
            .field("profile_fields", &self.profile_fields)
            .field("enable_proof", &self.enable_proof)
            .field("pass_req_to_callback", &self.pass_req_to_callback)
            .finish_non_exhaustive()
    }
}

impl StrategyOptions {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Apply defaults and validate URLs.
    pub fn resolve(self) -> Result<ResolvedOptions, OptionsError> {
        if self.client_id.trim().is_empty() {
            return Err(OptionsError::Missing("client_id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(OptionsError::Missing("client_secret"));
        }

        let version = self
            .graph_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GRAPH_VERSION.to_string());

        let authorization_url = parse_url(
            "authorization_url",
            self.authorization_url,
            || format!("https://www.accountkit.com/{version}/dialog/oauth"),
        )?;
        let token_url = parse_url("token_url", self.token_url, || {
            format!("https://graph.accountkit.com/{version}/access_token")
        })?;
        let profile_url = parse_url("profile_url", self.profile_url, || {
            format!("https://graph.accountkit.com/{version}/me")
        })?;

        let profile_fields = self
            .profile_fields
            .filter(|fields| !fields.is_empty())
            .unwrap_or_else(|| vec!["id".to_string()]);

        Ok(ResolvedOptions {
            client_id: self.client_id,
            client_secret: self.client_secret,
            graph_version: version,
            authorization_url,
            token_url,
            profile_url,
            access_token_field: non_empty_or(self.access_token_field, DEFAULT_ACCESS_TOKEN_FIELD),
            refresh_token_field: non_empty_or(
                self.refresh_token_field,
                DEFAULT_REFRESH_TOKEN_FIELD,
            ),
            profile_fields,
            profile_image: self.profile_image,
            enable_proof: self.enable_proof.unwrap_or(true),
            pass_req_to_callback: self.pass_req_to_callback,
        })
    }
}

/// Options after defaulting. Read-only for the lifetime of the strategy.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub client_id: String,
    pub client_secret: String,
    pub graph_version: String,
    pub authorization_url: Url,
    pub token_url: Url,
    pub profile_url: Url,
    pub access_token_field: String,
    pub refresh_token_field: String,
    pub profile_fields: Vec<String>,
    pub profile_image: Option<serde_json::Value>,
    pub enable_proof: bool,
    pub pass_req_to_callback: bool,
}

impl std::fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("client_id", &self.client_id)
            .field("graph_version", &self.graph_version)
            .field("profile_url", &self.profile_url.as_str())
            .field("access_token_field", &self.access_token_field)
            .field("refresh_token_field", &self.refresh_token_field)
            .field("profile_fields", &self.profile_fields)
            .field("enable_proof", &self.enable_proof)
            .field("pass_req_to_callback", &self.pass_req_to_callback)
            .finish_non_exhaustive()
    }
}

fn parse_url(
    name: &'static str,
    explicit: Option<String>,
    default: impl FnOnce() -> String,
) -> Result<Url, OptionsError> {
    let raw = explicit
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default);
    Url::parse(&raw).map_err(|source| OptionsError::InvalidUrl { name, source })
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
