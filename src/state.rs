/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: Account Kit strategy (options は構築後 read-only)
 *   - body_limit: access middleware が body を読む上限
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::AccountVerifier;
use crate::services::accountkit::AccountKitStrategy;

pub type Strategy = AccountKitStrategy<AccountVerifier>;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Strategy>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(auth: Arc<Strategy>, body_limit: usize) -> Self {
        Self { auth, body_limit }
    }
}
