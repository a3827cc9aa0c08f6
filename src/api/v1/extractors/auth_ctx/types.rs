/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - access middleware が Strategy の結果を request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token lookup / profile fetch は services::accountkit 側の責務
 * - access token そのものは保持しない (ログや response に漏らさないため)
 */
use serde_json::Value;

use crate::services::accountkit::Profile;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `account_id` は Account Kit の account id (upstream の `id` をそのまま)
/// - `email` / `phone` は未登録なら空文字
/// - `info` は Verifier が付けた任意の補足情報
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub provider: &'static str,
    pub account_id: String,
    pub email: String,
    pub phone: String,
    pub has_refresh_token: bool,
    pub info: Option<Value>,
}

impl AuthCtx {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            provider: profile.provider,
            account_id: profile.id.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            has_refresh_token: false,
            info: None,
        }
    }
}
