/*
 * Responsibility
 * - 認証済みの呼び出し元プロフィールを返す
 * - token は body / query / header のどこからでも来るので GET と POST の両方を受ける
 */
use axum::Json;

use crate::api::v1::dto::me::MeResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    tracing::debug!(account_id = %ctx.account_id, "resolved caller profile");
    Json(MeResponse::from(ctx))
}
