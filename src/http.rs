//! HTTP 辅助工具：CORS 与安全头。

use axum::body::Body as AxumBody;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::{middleware, response::Response};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

/// 构建 CORS Layer（逗号分隔的来源列表，`*` 表示回显任意来源）。
pub fn build_cors_layer(cors_origins: Option<&str>) -> Option<CorsLayer> {
    let entries = cors_origins?
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect::<Vec<_>>();
    if entries.is_empty() {
        return None;
    }

    // 携带凭据时不能使用通配符，改为回显请求值。
    let allow_origin = if entries.contains(&"*") {
        AllowOrigin::mirror_request()
    } else {
        let origins = entries
            .into_iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "invalid cors origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        if origins.is_empty() {
            return None;
        }
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}

/// 添加基础安全响应头。
pub async fn add_security_headers(
    request: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, StatusCode> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    Ok(response)
}
