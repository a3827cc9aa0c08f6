//! Minimal OAuth2 client used by the Account Kit strategy.
//!
//! Only the pieces the bearer-token flow needs are implemented: endpoint
//! bookkeeping, a GET that presents an access token, and `appsecret_proof`.
//! Code exchange / refresh are out of scope.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum OAuth2Error {
    // Built via `without_url()`: the request URL carries the access token.
    #[error("http transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid client secret for appsecret_proof")]
    InvalidKey,
}

/// OAuth2 client settings plus a shared `reqwest::Client`.
///
/// - `use_authorization_header_for_get = false` presents the token as the
///   `access_token` query parameter on GET (the Graph API convention).
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct OAuth2Client {
    client_id: String,
    client_secret: String,
    authorize_url: Url,
    access_token_url: Url,
    use_authorization_header_for_get: bool,
    enable_proof: bool,
    http: reqwest::Client,
}

impl std::fmt::Debug for OAuth2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print client_secret
        f.debug_struct("OAuth2Client")
            .field("client_id", &self.client_id)
            .field("authorize_url", &self.authorize_url.as_str())
            .field("access_token_url", &self.access_token_url.as_str())
            .field(
                "use_authorization_header_for_get",
                &self.use_authorization_header_for_get,
            )
            .field("enable_proof", &self.enable_proof)
            .finish()
    }
}

impl OAuth2Client {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: Url,
        access_token_url: Url,
        http: reqwest::Client,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url,
            access_token_url,
            use_authorization_header_for_get: false,
            enable_proof: false,
            http,
        }
    }

    pub fn use_authorization_header_for_get(mut self, enabled: bool) -> Self {
        self.use_authorization_header_for_get = enabled;
        self
    }

    pub fn enable_proof(mut self, enabled: bool) -> Self {
        self.enable_proof = enabled;
        self
    }

    /// Authorization dialog URL for the code flow.
    pub fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Url {
        let mut url = self.authorize_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("response_type", "code");
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
        }
        url
    }

    /// `hex(HMAC-SHA256(key = client_secret, msg = access_token))`
    pub fn appsecret_proof(&self, access_token: &str) -> Result<String, OAuth2Error> {
        let mut mac = HmacSha256::new_from_slice(self.client_secret.as_bytes())
            .map_err(|_| OAuth2Error::InvalidKey)?;
        mac.update(access_token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// GET `url` with the access token attached, returning the raw body.
    ///
    /// Non-2xx responses are errors; the body is kept for diagnostics.
    pub async fn get(&self, url: &Url, access_token: &str) -> Result<String, OAuth2Error> {
        let mut extra: Vec<(&str, String)> = Vec::new();
        if !self.use_authorization_header_for_get {
            extra.push(("access_token", access_token.to_string()));
        }
        if self.enable_proof {
            extra.push(("appsecret_proof", self.appsecret_proof(access_token)?));
        }

        let mut target = url.clone();
        if !extra.is_empty() {
            target.query_pairs_mut().extend_pairs(extra);
        }

        let mut request = self.http.get(target);
        if self.use_authorization_header_for_get {
            request = request.bearer_auth(access_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OAuth2Error::Transport(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(OAuth2Error::Status { status, body });
        }

        Ok(body)
    }
}
