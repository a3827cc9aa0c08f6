/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, Account Kit の client 設定, HTTP limits など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - Strategy の default 適用は services::accountkit::options 側の責務
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::accountkit::StrategyOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub http_body_limit_bytes: usize,
    pub http_timeout_seconds: u64,
    pub upstream_timeout_seconds: u64,

    pub accountkit: StrategyOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let http_body_limit_bytes =
            parse_or(&var, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_timeout_seconds = parse_or(&var, "HTTP_TIMEOUT_SECONDS", 30)?;
        let upstream_timeout_seconds = parse_or(&var, "UPSTREAM_TIMEOUT_SECONDS", 10)?;

        // upstream が先に切れないと、profile 取得の遅延が 502 ではなく 408 になる
        if upstream_timeout_seconds >= http_timeout_seconds {
            return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"));
        }

        let client_id = var("ACCOUNTKIT_CLIENT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("ACCOUNTKIT_CLIENT_ID"))?;

        let client_secret = var("ACCOUNTKIT_CLIENT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("ACCOUNTKIT_CLIENT_SECRET"))?;

        let profile_fields = var("ACCOUNTKIT_PROFILE_FIELDS").map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        let enable_proof = var("ACCOUNTKIT_ENABLE_PROOF")
            .map(|v| parse_bool(&v).ok_or(ConfigError::Invalid("ACCOUNTKIT_ENABLE_PROOF")))
            .transpose()?;

        let pass_req_to_callback = var("ACCOUNTKIT_PASS_REQ_TO_CALLBACK")
            .map(|v| {
                parse_bool(&v).ok_or(ConfigError::Invalid("ACCOUNTKIT_PASS_REQ_TO_CALLBACK"))
            })
            .transpose()?
            .unwrap_or(false);

        let accountkit = StrategyOptions {
            graph_version: var("ACCOUNTKIT_GRAPH_VERSION"),
            authorization_url: var("ACCOUNTKIT_AUTHORIZATION_URL"),
            token_url: var("ACCOUNTKIT_TOKEN_URL"),
            profile_url: var("ACCOUNTKIT_PROFILE_URL"),
            access_token_field: var("ACCOUNTKIT_ACCESS_TOKEN_FIELD"),
            refresh_token_field: var("ACCOUNTKIT_REFRESH_TOKEN_FIELD"),
            profile_fields,
            enable_proof,
            pass_req_to_callback,
            ..StrategyOptions::new(client_id, client_secret)
        };

        Ok(Self {
            addr,
            app_env,
            http_body_limit_bytes,
            http_timeout_seconds,
            upstream_timeout_seconds,
            accountkit,
        })
    }
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("ACCOUNTKIT_CLIENT_ID", "app-id"),
        ("ACCOUNTKIT_CLIENT_SECRET", "app-secret"),
    ];

    #[test]
    fn defaults_with_only_required_keys() {
        let config = from_map(&REQUIRED).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.http_body_limit_bytes, 1024 * 1024);
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.upstream_timeout_seconds, 10);
        assert_eq!(config.accountkit.client_id, "app-id");
        assert_eq!(config.accountkit.enable_proof, None);
        assert!(!config.accountkit.pass_req_to_callback);
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = from_map(&[("ACCOUNTKIT_CLIENT_ID", "app-id")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ACCOUNTKIT_CLIENT_SECRET")));
    }

    #[test]
    fn strategy_overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("APP_ENV", "prod"),
            ("ACCOUNTKIT_GRAPH_VERSION", "v1.1"),
            ("ACCOUNTKIT_PROFILE_FIELDS", "id, email ,phone"),
            ("ACCOUNTKIT_ENABLE_PROOF", "false"),
            ("ACCOUNTKIT_PASS_REQ_TO_CALLBACK", "yes"),
        ]);
        let config = from_map(&pairs).unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert!(config.app_env.is_production());
        assert_eq!(config.accountkit.graph_version.as_deref(), Some("v1.1"));
        assert_eq!(
            config.accountkit.profile_fields,
            Some(vec!["id".into(), "email".into(), "phone".into()])
        );
        assert_eq!(config.accountkit.enable_proof, Some(false));
        assert!(config.accountkit.pass_req_to_callback);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCOUNTKIT_ENABLE_PROOF", "maybe"));
        assert!(matches!(
            from_map(&pairs),
            Err(ConfigError::Invalid("ACCOUNTKIT_ENABLE_PROOF"))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("HTTP_TIMEOUT_SECONDS", "10"), ("UPSTREAM_TIMEOUT_SECONDS", "10")]);
        assert!(matches!(
            from_map(&pairs),
            Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("UPSTREAM_TIMEOUT_SECONDS", "45"));
        assert!(matches!(
            from_map(&pairs),
            Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "http"));
        assert!(matches!(from_map(&pairs), Err(ConfigError::Invalid("PORT"))));
    }
}
