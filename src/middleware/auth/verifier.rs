//! Application verifier: Account Kit profile -> `AuthCtx`.
//!
//! There is no local user store; any profile carrying an account id is
//! accepted as-is.

use async_trait::async_trait;
use serde_json::json;

use crate::api::v1::extractors::AuthCtx;
use crate::services::accountkit::{BoxError, Verdict, Verifier, VerifyInput};

#[derive(Debug, Clone, Default)]
pub struct AccountVerifier;

#[async_trait]
impl Verifier for AccountVerifier {
    type User = AuthCtx;

    async fn verify(&self, input: VerifyInput<'_>) -> Result<Verdict<AuthCtx>, BoxError> {
        if input.profile.id.is_empty() {
            return Ok(Verdict::reject(Some(json!({"message": "empty account id"}))));
        }

        let mut ctx = AuthCtx::from_profile(&input.profile);
        ctx.has_refresh_token = input.refresh_token.is_some();

        Ok(Verdict::success(ctx))
    }
}
