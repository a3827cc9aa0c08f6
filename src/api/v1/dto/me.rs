/*
 * Responsibility
 * - GET/POST /me の response DTO
 */
use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub provider: &'static str,
    pub id: String,
    pub email: String,
    pub phone: String,
}

impl From<AuthCtx> for MeResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            provider: ctx.provider,
            id: ctx.account_id,
            email: ctx.email,
            phone: ctx.phone,
        }
    }
}
