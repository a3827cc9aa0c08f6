//! Account Kit token → AuthCtx を extensions に入れる
//!
//! - body (JSON / form) / query / headers を `TokenRequest` に詰め替えて Strategy に渡す
//! - body は読み切ってしまうので、handler 用に同じ bytes で request を組み直す
//! - 認証失敗は 401、profile 取得失敗は 502、verifier のエラーは 500

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::services::accountkit::TokenRequest;
use crate::state::AppState;

/// `/me` など保護したい Router に認証を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let body_limit = state.body_limit;
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router
        .layer(middleware::from_fn_with_state(state, access_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();

    // chunked body の上限超過も Content-Length 超過と同じ 413 にそろえる
    let mut limited = Request::new(body);
    *limited.extensions_mut() = parts.extensions.clone();
    let bytes = Bytes::from_request(limited, &()).await.map_err(|rejection| {
        tracing::warn!(error = %rejection, "failed to read request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::bad_request("INVALID_BODY", "request body could not be read")
        }
    })?;

    let token_request = TokenRequest::from_parts(&parts, parse_body(&parts.headers, &bytes));

    let authenticated = match state.auth.authenticate(&token_request).await {
        Ok(authenticated) => authenticated,
        Err(err) => {
            if err.is_failure() {
                tracing::info!(error = %err, path = %parts.uri.path(), "authentication failed");
            } else {
                tracing::error!(error = ?err, path = %parts.uri.path(), "authentication error");
            }
            return Err(AppError::from(err));
        }
    };

    let mut auth_ctx = authenticated.user;
    auth_ctx.info = authenticated.info;

    // middleware → extractor への受け渡し
    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// JSON object か form のみを body として扱う（それ以外は body なし扱い）
fn parse_body(headers: &HeaderMap, bytes: &Bytes) -> Option<Map<String, Value>> {
    if bytes.is_empty() {
        return None;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        Some(
            url::form_urlencoded::parse(bytes)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect(),
        )
    } else {
        None
    }
}
