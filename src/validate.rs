//! 上传类型校验：只信任客户端声明的 MIME 类型，不读取文件内容。

use tracing::error;

use crate::error::ApiError;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME: &str = "application/msword";
pub const PDF_MIME: &str = "application/pdf";

/// 某条路由接受的上传类型集合。
#[derive(Clone, Copy, Debug)]
pub struct AcceptedTypes {
    pub mimes: &'static [&'static str],
    pub label: &'static str,
}

pub const DOCX_ONLY: AcceptedTypes = AcceptedTypes {
    mimes: &[DOCX_MIME],
    label: "DOCX",
};

pub const DOCX_OR_DOC: AcceptedTypes = AcceptedTypes {
    mimes: &[DOCX_MIME, DOC_MIME],
    label: "DOCX",
};

pub const PDF_ONLY: AcceptedTypes = AcceptedTypes {
    mimes: &[PDF_MIME],
    label: "PDF",
};

impl AcceptedTypes {
    pub fn accepts(&self, declared: &str) -> bool {
        let essence = mime_essence(declared);
        self.mimes
            .iter()
            .any(|mime| mime.eq_ignore_ascii_case(essence))
    }

    /// 声明类型不在集合内时返回 `InvalidFormat`。
    pub fn check(&self, declared: Option<&str>) -> Result<(), ApiError> {
        let declared = declared.unwrap_or_default();
        if self.accepts(declared) {
            return Ok(());
        }
        error!(content_type = declared, expected = self.label, "invalid file type received");
        Err(ApiError::InvalidFormat {
            mime: if declared.is_empty() {
                "missing content type".into()
            } else {
                declared.to_string()
            },
            expected: self.label,
        })
    }
}

fn mime_essence(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}
