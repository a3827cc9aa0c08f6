//! Factory: build `AccountKitStrategy` from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::accountkit::{AccountKitStrategy, OptionsError, Verifier};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn build_strategy<V: Verifier>(
    config: &Config,
    verifier: V,
) -> Result<Arc<AccountKitStrategy<V>>, BuildError> {
    // The upstream timeout is the only one on the profile fetch.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_seconds))
        .build()?;

    let strategy =
        AccountKitStrategy::with_http_client(config.accountkit.clone(), verifier, http)?;

    Ok(Arc::new(strategy))
}
