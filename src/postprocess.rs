//! 导出 HTML 的后处理：移除文档库插入的评估版水印。

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::debug;

// 红色 span 包裹的评估声明；样式里的字体声明可有可无。
static RE_EVALUATION_WARNING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<span\s+style="[^"]*(?:font-family:'Times New Roman';\s*)?(?i:color:#ff0000)[^"]*">Evaluation Warning: The document was created with Spire\.Doc for [^<]*?\.</span>"#,
    )
    .unwrap()
});

/// 移除所有评估水印 span，其余内容原样保留。
pub fn strip_evaluation_warning(html: &str) -> Cow<'_, str> {
    RE_EVALUATION_WARNING.replace_all(html, "")
}

/// 就地清理 HTML 文件，返回移除的水印数量。
pub async fn strip_evaluation_warning_file(path: &Path) -> io::Result<usize> {
    let html = fs::read_to_string(path).await?;
    let removed = RE_EVALUATION_WARNING.find_iter(&html).count();
    if removed > 0 {
        let cleaned = strip_evaluation_warning(&html);
        fs::write(path, cleaned.as_bytes()).await?;
    }
    debug!(path = ?path, removed, "removed evaluation warning span from HTML");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PLAIN_WARNING: &str = r#"<span style="color:#ff0000">Evaluation Warning: The document was created with Spire.Doc for Python.</span>"#;
    const FONT_WARNING: &str = r#"<span style="font-family:'Times New Roman'; color:#FF0000; font-size:10pt">Evaluation Warning: The document was created with Spire.Doc for Python.</span>"#;

    #[test]
    fn removes_both_warning_variants() {
        let html = format!("<p>{PLAIN_WARNING}</p><p>{FONT_WARNING}Body text</p>");
        assert_eq!(strip_evaluation_warning(&html), "<p></p><p>Body text</p>");
    }

    #[test]
    fn other_bindings_are_matched() {
        let html = r#"<span style="color:#ff0000">Evaluation Warning: The document was created with Spire.Doc for .NET.</span>ok"#;
        assert_eq!(strip_evaluation_warning(html), "ok");
    }

    #[test]
    fn unrelated_red_spans_are_kept() {
        let html = r#"<span style="color:#ff0000">Important</span>"#;
        assert!(matches!(strip_evaluation_warning(html), Cow::Borrowed(_)));
    }

    #[tokio::test]
    async fn file_is_rewritten_in_place() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("report.html");
        std::fs::write(&path, format!("<body>{PLAIN_WARNING}<p>Hi</p></body>")).expect("write html");

        let removed = strip_evaluation_warning_file(&path).await.expect("strip");
        assert_eq!(removed, 1);
        assert_eq!(
            std::fs::read_to_string(&path).expect("read html"),
            "<body><p>Hi</p></body>"
        );
    }
}
