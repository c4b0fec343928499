//! 服务版本信息处理器。

use axum::response::Json as JsonResponse;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    version: &'static str,
    commit_hash: &'static str,
    build_time: &'static str,
    build_env: String,
}

/// 返回构建时记录的版本信息。
pub async fn get_version_info() -> JsonResponse<VersionInfo> {
    JsonResponse(VersionInfo {
        version: crate::build::PKG_VERSION,
        commit_hash: crate::build::SHORT_COMMIT,
        build_time: crate::build::BUILD_TIME,
        build_env: format!(
            "{},{}",
            crate::build::RUST_VERSION,
            crate::build::RUST_CHANNEL
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_package_version() {
        let JsonResponse(info) = get_version_info().await;
        let value = serde_json::to_value(&info).expect("serialize");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert!(value.get("buildTime").is_some());
        assert!(value.get("commitHash").is_some());
    }
}
