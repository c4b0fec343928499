//! 路由装配：转换接口、日志查询、版本信息与公共中间件。

use axum::extract::{DefaultBodyLimit, Extension, connect_info::ConnectInfo};
use axum::http::Request;
use axum::routing::{MethodRouter, get, post};
use axum::{Router, middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info_span};

use crate::converter::Converter;
use crate::docmodel::HtmlExporter;
use crate::http::{add_security_headers, build_cors_layer};
use crate::logstore::LogStore;
use crate::storage::Storage;
use crate::upload::UploadConfig;
use crate::{convert, logs, version};

/// multipart 分隔符与表头的余量。
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// 路由处理器共享的服务句柄。
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<Storage>,
    pub upload: Arc<UploadConfig>,
    pub converter: Arc<Converter>,
    pub exporter: Arc<dyn HtmlExporter>,
    pub logs: Arc<dyn LogStore>,
}

/// 构建完整路由。转换接口同时响应带与不带尾部斜杠的路径。
pub fn build_router(services: Services, cors_origins: Option<&str>) -> Router {
    let body_limit = match services.upload.max_size {
        0 => DefaultBodyLimit::disable(),
        max => DefaultBodyLimit::max(
            usize::try_from(max.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX),
        ),
    };

    let mut router = Router::new();
    router = both_slashes(router, "/api/v1/convert", get(convert::welcome_v1));
    router = both_slashes(
        router,
        "/api/v1/convert/docx2html",
        post(convert::docx_to_html_bundle),
    );
    router = both_slashes(router, "/api/v1/convert/docx2pdf", post(convert::docx_to_pdf));
    router = both_slashes(router, "/api/v1/convert/pdf2docx", post(convert::pdf_to_docx));
    router = both_slashes(router, "/api/v1/convert/pdf2html", post(convert::pdf_to_html));
    router = both_slashes(router, "/api/v2/convert", get(convert::welcome_v2));
    router = both_slashes(
        router,
        "/api/v2/convert/docx2html",
        post(convert::docx_to_html_inline),
    );

    let mut app = router
        .route("/logs", get(logs::get_logs))
        .route("/api/version", get(version::get_version_info))
        .layer(body_limit)
        .layer(middleware::from_fn(add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let forwarded_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.split(',').next().unwrap_or("").trim().to_string());
                    let connect_ip = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.ip().to_string());
                    let client_ip = forwarded_ip
                        .or(connect_ip)
                        .unwrap_or_else(|| "unknown".to_string());

                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        client_ip,
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(services.storage))
        .layer(Extension(services.upload))
        .layer(Extension(services.converter))
        .layer(Extension(services.exporter))
        .layer(Extension(services.logs));

    if let Some(cors_layer) = build_cors_layer(cors_origins) {
        app = app.layer(cors_layer);
    }
    app
}

fn both_slashes(router: Router, path: &str, method_router: MethodRouter) -> Router {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}/"), method_router)
}
