//! Account Kit bearer-token strategy.
//!
//! Flow for one attempt:
//! 1. look up access / refresh token in the request
//! 2. GET the profile endpoint with the access token (single await point)
//! 3. hand the normalized profile to the application `Verifier`
//!
//! No retries, no caching. Every error ends the attempt.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::services::oauth2::OAuth2Client;

use super::lookup::{TokenRequest, lookup};
use super::options::{OptionsError, ResolvedOptions, StrategyOptions};
use super::profile::{Profile, ProfileError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Arguments handed to the verifier.
///
/// `request` is `Some` only when `pass_req_to_callback` is enabled.
#[derive(Debug)]
pub struct VerifyInput<'a> {
    pub request: Option<&'a TokenRequest>,
    pub access_token: &'a str,
    pub refresh_token: Option<&'a str>,
    pub profile: Profile,
}

/// What the verifier decided about a profile.
#[derive(Debug)]
pub enum Verdict<U> {
    Success { user: U, info: Option<Value> },
    Reject { info: Option<Value> },
}

impl<U> Verdict<U> {
    pub fn success(user: U) -> Self {
        Self::Success { user, info: None }
    }

    pub fn reject(info: Option<Value>) -> Self {
        Self::Reject { info }
    }
}

/// Application-supplied mapping from profile to user.
///
/// Returning `Err` is a hard error; `Verdict::Reject` is an authentication failure.
#[async_trait]
pub trait Verifier: Send + Sync {
    type User: Send;

    async fn verify(&self, input: VerifyInput<'_>) -> Result<Verdict<Self::User>, BoxError>;
}

#[derive(Debug)]
pub struct Authenticated<U> {
    pub user: U,
    pub info: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("You should provide {field}")]
    MissingCredential { field: String },

    #[error("authentication rejected")]
    Rejected { info: Option<Value> },

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("verification failed: {0}")]
    Verify(#[source] BoxError),
}

impl AuthError {
    /// `true` for "bad credentials" outcomes, `false` for upstream/application errors.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::MissingCredential { .. } | Self::Rejected { .. })
    }
}

pub struct AccountKitStrategy<V> {
    options: ResolvedOptions,
    oauth2: OAuth2Client,
    verifier: V,
}

impl<V> std::fmt::Debug for AccountKitStrategy<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKitStrategy")
            .field("options", &self.options)
            .field("oauth2", &self.oauth2)
            .finish_non_exhaustive()
    }
}

impl<V: Verifier> AccountKitStrategy<V> {
    pub const NAME: &'static str = "accountkit-token";

    pub fn new(options: StrategyOptions, verifier: V) -> Result<Self, OptionsError> {
        Self::with_http_client(options, verifier, reqwest::Client::new())
    }

    pub fn with_http_client(
        options: StrategyOptions,
        verifier: V,
        http: reqwest::Client,
    ) -> Result<Self, OptionsError> {
        let options = options.resolve()?;

        // Graph-style APIs take the token as a query parameter on GET.
        let oauth2 = OAuth2Client::new(
            options.client_id.clone(),
            options.client_secret.clone(),
            options.authorization_url.clone(),
            options.token_url.clone(),
            http,
        )
        .use_authorization_header_for_get(false)
        .enable_proof(options.enable_proof);

        Ok(Self {
            options,
            oauth2,
            verifier,
        })
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn oauth2(&self) -> &OAuth2Client {
        &self.oauth2
    }

    pub async fn authenticate(
        &self,
        req: &TokenRequest,
    ) -> Result<Authenticated<V::User>, AuthError> {
        let Some(access_token) = lookup(req, &self.options.access_token_field) else {
            debug!(
                field = %self.options.access_token_field,
                "no access token in request"
            );
            return Err(AuthError::MissingCredential {
                field: self.options.access_token_field.clone(),
            });
        };
        let refresh_token = lookup(req, &self.options.refresh_token_field);

        let profile = self.user_profile(&access_token).await.map_err(|err| {
            warn!(error = ?err, "account kit profile fetch failed");
            AuthError::Profile(err)
        })?;

        let input = VerifyInput {
            request: self.options.pass_req_to_callback.then_some(req),
            access_token: &access_token,
            refresh_token: refresh_token.as_deref(),
            profile,
        };

        match self.verifier.verify(input).await {
            Ok(Verdict::Success { user, info }) => Ok(Authenticated { user, info }),
            Ok(Verdict::Reject { info }) => {
                debug!(info = ?info, "verifier rejected profile");
                Err(AuthError::Rejected { info })
            }
            Err(err) => {
                warn!(error = %err, "verifier returned an error");
                Err(AuthError::Verify(err))
            }
        }
    }

    /// Fetch and normalize the profile for `access_token`.
    pub async fn user_profile(&self, access_token: &str) -> Result<Profile, ProfileError> {
        let body = self
            .oauth2
            .get(&self.options.profile_url, access_token)
            .await
            .map_err(ProfileError::Fetch)?;

        Profile::parse(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::http::{HeaderMap, HeaderValue, header};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        had_request: bool,
        access_token: String,
        refresh_token: Option<String>,
        profile_id: String,
    }

    enum Mode {
        Accept,
        Reject,
        Fail,
    }

    struct RecordingVerifier {
        mode: Mode,
        seen: Mutex<Vec<Seen>>,
    }

    impl RecordingVerifier {
        fn new(mode: Mode) -> Self {
            Self {
                mode,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Verifier for RecordingVerifier {
        type User = String;

        async fn verify(&self, input: VerifyInput<'_>) -> Result<Verdict<String>, BoxError> {
            self.seen.lock().unwrap().push(Seen {
                had_request: input.request.is_some(),
                access_token: input.access_token.to_string(),
                refresh_token: input.refresh_token.map(str::to_owned),
                profile_id: input.profile.id.clone(),
            });

            match self.mode {
                Mode::Accept => Ok(Verdict::Success {
                    user: input.profile.id,
                    info: Some(json!({"scope": "read"})),
                }),
                Mode::Reject => Ok(Verdict::reject(Some(json!({"message": "blocked"})))),
                Mode::Fail => Err("database down".into()),
            }
        }
    }

    fn options(server: &MockServer) -> StrategyOptions {
        StrategyOptions {
            profile_url: Some(format!("{}/v1.3/me", server.uri())),
            enable_proof: Some(false),
            ..StrategyOptions::new("app-id", "app-secret")
        }
    }

    fn bearer(token: &'static str) -> TokenRequest {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(token));
        TokenRequest::new(headers)
    }

    async fn mount_profile(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/v1.3/me"))
            .and(query_param("access_token", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn success_passes_profile_to_verifier() {
        let server = MockServer::start().await;
        mount_profile(&server, r#"{"id":"42","email":"a@b.com"}"#).await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Accept))
                .unwrap();
        let req = bearer("Bearer abc123").with_query("refresh_token=r1");

        let out = strategy.authenticate(&req).await.unwrap();

        assert_eq!(out.user, "42");
        assert_eq!(out.info, Some(json!({"scope": "read"})));
        assert_eq!(
            strategy.verifier.seen(),
            vec![Seen {
                had_request: false,
                access_token: "abc123".into(),
                refresh_token: Some("r1".into()),
                profile_id: "42".into(),
            }]
        );
    }

    #[tokio::test]
    async fn missing_token_fails_without_calling_upstream_or_verifier() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let strategy = AccountKitStrategy::new(
            StrategyOptions {
                access_token_field: Some("ak_token".into()),
                ..options(&server)
            },
            RecordingVerifier::new(Mode::Accept),
        )
        .unwrap();

        let err = strategy
            .authenticate(&TokenRequest::default())
            .await
            .unwrap_err();

        assert!(err.is_failure());
        assert!(err.to_string().contains("ak_token"));
        assert!(strategy.verifier.seen().is_empty());
    }

    #[tokio::test]
    async fn pass_req_to_callback_forwards_request() {
        let server = MockServer::start().await;
        mount_profile(&server, r#"{"id":"7"}"#).await;

        let strategy = AccountKitStrategy::new(
            StrategyOptions {
                pass_req_to_callback: true,
                ..options(&server)
            },
            RecordingVerifier::new(Mode::Accept),
        )
        .unwrap();

        strategy.authenticate(&bearer("Bearer abc123")).await.unwrap();

        let seen = strategy.verifier.seen();
        assert!(seen[0].had_request);
    }

    #[tokio::test]
    async fn bearer_only_request_fills_both_tokens() {
        let server = MockServer::start().await;
        mount_profile(&server, r#"{"id":"7"}"#).await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Accept))
                .unwrap();

        strategy.authenticate(&bearer("Bearer abc123")).await.unwrap();

        // The Authorization fallback applies to every field name, refresh included.
        let seen = strategy.verifier.seen();
        assert_eq!(seen[0].access_token, "abc123");
        assert_eq!(seen[0].refresh_token.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn verifier_rejection_is_a_failure_with_info() {
        let server = MockServer::start().await;
        mount_profile(&server, r#"{"id":"7"}"#).await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Reject))
                .unwrap();

        let err = strategy
            .authenticate(&bearer("Bearer abc123"))
            .await
            .unwrap_err();

        assert!(err.is_failure());
        match err {
            AuthError::Rejected { info } => assert_eq!(info, Some(json!({"message": "blocked"}))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn verifier_error_is_a_hard_error() {
        let server = MockServer::start().await;
        mount_profile(&server, r#"{"id":"7"}"#).await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Fail))
                .unwrap();

        let err = strategy
            .authenticate(&bearer("Bearer abc123"))
            .await
            .unwrap_err();

        assert!(!err.is_failure());
        assert!(matches!(err, AuthError::Verify(_)));
    }

    #[tokio::test]
    async fn upstream_error_is_a_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.3/me"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#,
            ))
            .mount(&server)
            .await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Accept))
                .unwrap();

        let err = strategy
            .authenticate(&bearer("Bearer abc123"))
            .await
            .unwrap_err();

        assert!(!err.is_failure());
        assert!(matches!(err, AuthError::Profile(ProfileError::Fetch(_))));
        assert_eq!(err.to_string(), "failed to fetch user profile");
        assert!(strategy.verifier.seen().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_profile_is_a_parse_error() {
        let server = MockServer::start().await;
        mount_profile(&server, "not json").await;

        let strategy =
            AccountKitStrategy::new(options(&server), RecordingVerifier::new(Mode::Accept))
                .unwrap();

        let err = strategy.user_profile("abc123").await.unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[tokio::test]
    async fn proof_is_sent_by_default() {
        let server = MockServer::start().await;
        let strategy = AccountKitStrategy::new(
            StrategyOptions {
                enable_proof: None,
                ..options(&server)
            },
            RecordingVerifier::new(Mode::Accept),
        )
        .unwrap();
        let proof = strategy.oauth2().appsecret_proof("abc123").unwrap();

        Mock::given(method("GET"))
            .and(path("/v1.3/me"))
            .and(query_param("access_token", "abc123"))
            .and(query_param("appsecret_proof", proof.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let profile = strategy.user_profile("abc123").await.unwrap();
        assert_eq!(profile.id, "1");
    }
}
