//! 进程内 DOCX 文档模型：读取 WordprocessingML 并导出带样式的单文件 HTML。
//!
//! 只覆盖导出路由需要的部分：段落与标题、对齐、常见字符格式、表格、
//! 超链接、图片与文本型表单域。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::storage::file_stem;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access document: {0}")]
    Io(#[from] io::Error),
    #[error("not a valid DOCX package: {0}")]
    Package(#[from] ZipError),
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document part {0} is missing")]
    MissingPart(&'static str),
}

/// 进程内 HTML 导出器。实现必须是同步的，调用方负责放到阻塞线程。
pub trait HtmlExporter: Send + Sync {
    fn export(&self, input: &Path, output: &Path) -> Result<(), ExportError>;
}

#[derive(Debug, Clone)]
pub struct HtmlExportOptions {
    /// 把文档默认样式写入 `<head>` 的内部样式表。
    pub export_document_styles: bool,
    /// 图片以 data URI 内嵌；关闭时写到输出文件旁边。
    pub embed_images: bool,
    /// 文本表单域导出为纯文本而非 `<input>`。
    pub form_fields_as_text: bool,
}

impl Default for HtmlExportOptions {
    fn default() -> Self {
        Self {
            export_document_styles: true,
            embed_images: true,
            form_fields_as_text: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct DocxHtmlExporter {
    options: HtmlExportOptions,
}

impl DocxHtmlExporter {
    pub fn new(options: HtmlExportOptions) -> Self {
        Self { options }
    }
}

impl HtmlExporter for DocxHtmlExporter {
    fn export(&self, input: &Path, output: &Path) -> Result<(), ExportError> {
        let mut package = ZipArchive::new(File::open(input)?)?;
        let document =
            read_part(&mut package, DOCUMENT_PART)?.ok_or(ExportError::MissingPart(DOCUMENT_PART))?;
        let relationships = match read_part(&mut package, RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };
        let defaults = match read_part(&mut package, STYLES_PART)? {
            Some(xml) if self.options.export_document_styles => parse_doc_defaults(&xml)?,
            _ => DocDefaults::default(),
        };

        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = file_stem(&name).to_string();
        let mut resources = Resources {
            package: &mut package,
            relationships: &relationships,
            embed_images: self.options.embed_images,
            output_dir: output.parent().map(Path::to_path_buf).unwrap_or_default(),
            stem: title.clone(),
            extracted: 0,
        };
        let body = render_body(&document, &mut resources, &self.options)?;

        let mut html = String::with_capacity(body.len() + 512);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
        html.push_str(&format!("<title>{}</title>\n", escape(title.as_str())));
        if self.options.export_document_styles {
            html.push_str(&defaults.style_sheet());
        }
        html.push_str("</head>\n<body>\n");
        html.push_str(&body);
        html.push_str("</body>\n</html>\n");
        std::fs::write(output, html)?;
        debug!(output = ?output, images = resources.extracted, "exported DOCX to HTML");
        Ok(())
    }
}

fn read_part(package: &mut ZipArchive<File>, name: &str) -> Result<Option<String>, ExportError> {
    match package.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, ExportError> {
    for attribute in e.attributes().flatten() {
        if attribute.key.local_name().as_ref() == local {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// `<w:b/>` 为开启，`w:val="0"` 等为关闭。
fn toggle(e: &BytesStart<'_>) -> Result<bool, ExportError> {
    Ok(!matches!(
        attr(e, b"val")?.as_deref(),
        Some("0" | "false" | "off" | "none")
    ))
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, ExportError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id")?, attr(&e, b"Target")?) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

#[derive(Debug, Default)]
struct DocDefaults {
    font: Option<String>,
    half_points: Option<u32>,
}

impl DocDefaults {
    fn style_sheet(&self) -> String {
        let mut body = String::new();
        if let Some(font) = &self.font {
            body.push_str(&format!("font-family:'{}', sans-serif; ", font.replace('\'', "")));
        }
        if let Some(size) = self.half_points {
            body.push_str(&format!("font-size:{}pt; ", size as f32 / 2.0));
        }
        format!(
            "<style type=\"text/css\">\nbody {{ {body}}}\np {{ margin:0 0 6pt 0; }}\ntable {{ border-collapse:collapse; }}\ntd {{ border:1px solid #999999; padding:2pt 4pt; vertical-align:top; }}\nimg {{ max-width:100%; }}\n</style>\n"
        )
    }
}

fn parse_doc_defaults(xml: &str) -> Result<DocDefaults, ExportError> {
    let mut reader = Reader::from_str(xml);
    let mut defaults = DocDefaults::default();
    let mut in_defaults = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"docDefaults" => in_defaults = true,
            Event::End(e) if e.local_name().as_ref() == b"docDefaults" => break,
            Event::Start(e) | Event::Empty(e) if in_defaults => match e.local_name().as_ref() {
                b"rFonts" => defaults.font = attr(&e, b"ascii")?,
                b"sz" => defaults.half_points = attr(&e, b"val")?.and_then(|v| v.parse().ok()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(defaults)
}

/// 文档包内的图片与关系解析。
struct Resources<'a> {
    package: &'a mut ZipArchive<File>,
    relationships: &'a HashMap<String, String>,
    embed_images: bool,
    output_dir: PathBuf,
    stem: String,
    extracted: usize,
}

impl Resources<'_> {
    fn image_tag(&mut self, id: &str) -> Result<Option<String>, ExportError> {
        let Some(target) = self.relationships.get(id) else {
            return Ok(None);
        };
        let part = part_name(target);
        let mut data = Vec::new();
        match self.package.by_name(&part) {
            Ok(mut file) => {
                file.read_to_end(&mut data)?;
            }
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
        self.extracted += 1;

        let src = if self.embed_images {
            let mime = mime_guess::from_path(&part).first_or_octet_stream();
            format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(&data))
        } else {
            let ext = Path::new(&part)
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bin".into());
            let name = format!("{}_img{}.{}", self.stem, self.extracted, ext);
            std::fs::write(self.output_dir.join(&name), &data)?;
            name
        };
        Ok(Some(format!("<img src=\"{}\" alt=\"\"/>", escape(src.as_str()))))
    }

    fn link_target(&self, id: &str) -> Option<&str> {
        self.relationships.get(id).map(String::as_str)
    }
}

/// 关系目标相对 `word/`，规范化 `..` 段。
fn part_name(target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{target}"),
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[derive(Debug, Default, Clone)]
struct RunFormat {
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    vert_align: Option<&'static str>,
    color: Option<String>,
}

impl RunFormat {
    fn wrap(&self, text: &str) -> String {
        let mut open = String::new();
        let mut close = Vec::new();
        if let Some(color) = &self.color {
            open.push_str(&format!("<span style=\"color:#{}\">", escape(color.as_str())));
            close.push("</span>");
        }
        let vert_align = match self.vert_align {
            Some("sup") => Some(("<sup>", "</sup>")),
            Some(_) => Some(("<sub>", "</sub>")),
            None => None,
        };
        let tags = [
            self.bold.then_some(("<strong>", "</strong>")),
            self.italic.then_some(("<em>", "</em>")),
            self.underline.then_some(("<u>", "</u>")),
            self.strike.then_some(("<s>", "</s>")),
            vert_align,
        ];
        for (start, end) in tags.into_iter().flatten() {
            open.push_str(start);
            close.push(end);
        }
        close.reverse();
        format!("{open}{}{}", escape(text), close.concat())
    }
}

#[derive(Debug, Default)]
struct Paragraph {
    tag: &'static str,
    align: Option<&'static str>,
    content: String,
}

#[derive(Debug, Default)]
struct FieldState {
    instruction: String,
    in_result: bool,
    form_text: bool,
    result: String,
}

struct Renderer<'r, 'a> {
    out: String,
    paragraph: Option<Paragraph>,
    run: RunFormat,
    field: Option<FieldState>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    in_instruction: bool,
    links: Vec<bool>,
    resources: &'r mut Resources<'a>,
    options: &'r HtmlExportOptions,
}

impl Renderer<'_, '_> {
    fn push(&mut self, html: &str) {
        match &mut self.paragraph {
            Some(paragraph) => paragraph.content.push_str(html),
            None => self.out.push_str(html),
        }
    }

    fn diverts_field_text(&self) -> bool {
        !self.options.form_fields_as_text
            && self
                .field
                .as_ref()
                .is_some_and(|field| field.in_result && field.form_text)
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), ExportError> {
        match e.local_name().as_ref() {
            b"p" => {
                self.paragraph = Some(Paragraph {
                    tag: "p",
                    ..Paragraph::default()
                });
            }
            b"pPr" => self.in_ppr = true,
            b"pStyle" if self.in_ppr => {
                if let (Some(style), Some(paragraph)) = (attr(e, b"val")?, self.paragraph.as_mut()) {
                    paragraph.tag = heading_tag(&style);
                }
            }
            b"jc" if self.in_ppr => {
                let align = match attr(e, b"val")?.as_deref() {
                    Some("center") => Some("center"),
                    Some("right" | "end") => Some("right"),
                    Some("both" | "distribute") => Some("justify"),
                    _ => None,
                };
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.align = align;
                }
            }
            b"r" => self.run = RunFormat::default(),
            b"rPr" => self.in_rpr = true,
            b"b" if self.in_rpr && !self.in_ppr => self.run.bold = toggle(e)?,
            b"i" if self.in_rpr && !self.in_ppr => self.run.italic = toggle(e)?,
            b"u" if self.in_rpr && !self.in_ppr => self.run.underline = toggle(e)?,
            b"strike" | b"dstrike" if self.in_rpr && !self.in_ppr => self.run.strike = toggle(e)?,
            b"vertAlign" if self.in_rpr && !self.in_ppr => {
                self.run.vert_align = match attr(e, b"val")?.as_deref() {
                    Some("superscript") => Some("sup"),
                    Some("subscript") => Some("sub"),
                    _ => None,
                };
            }
            b"color" if self.in_rpr && !self.in_ppr => {
                self.run.color = attr(e, b"val")?.filter(|value| {
                    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
                });
            }
            b"t" => self.in_text = true,
            b"instrText" => self.in_instruction = true,
            b"tab" if !self.in_ppr => self.push("&emsp;"),
            b"br" | b"cr" => self.push("<br/>"),
            b"fldChar" => match attr(e, b"fldCharType")?.as_deref() {
                Some("begin") => self.field = Some(FieldState::default()),
                Some("separate") => {
                    if let Some(field) = self.field.as_mut() {
                        field.in_result = true;
                        field.form_text = field.instruction.trim_start().starts_with("FORMTEXT");
                    }
                }
                Some("end") => {
                    if let Some(field) = self.field.take()
                        && field.form_text
                        && !self.options.form_fields_as_text
                    {
                        let input = format!(
                            "<input type=\"text\" readonly=\"readonly\" value=\"{}\"/>",
                            escape(field.result.as_str())
                        );
                        self.push(&input);
                    }
                }
                _ => {}
            },
            b"blip" => {
                if let Some(id) = attr(e, b"embed")?
                    && let Some(tag) = self.resources.image_tag(&id)?
                {
                    self.push(&tag);
                }
            }
            b"imagedata" => {
                if let Some(id) = attr(e, b"id")?
                    && let Some(tag) = self.resources.image_tag(&id)?
                {
                    self.push(&tag);
                }
            }
            b"hyperlink" => {
                let href = match (attr(e, b"id")?, attr(e, b"anchor")?) {
                    (Some(id), _) => self.resources.link_target(&id).map(str::to_string),
                    (None, Some(anchor)) => Some(format!("#{anchor}")),
                    (None, None) => None,
                };
                self.links.push(href.is_some());
                if let Some(href) = href {
                    let open = format!("<a href=\"{}\">", escape(href.as_str()));
                    self.push(&open);
                }
            }
            b"bookmarkStart" => {
                if let Some(name) = attr(e, b"name")?
                    && !name.starts_with('_')
                {
                    let anchor = format!("<a id=\"{}\"></a>", escape(name.as_str()));
                    self.push(&anchor);
                }
            }
            b"tbl" => self.out.push_str("<table>\n"),
            b"tr" => self.out.push_str("<tr>\n"),
            b"tc" => self.out.push_str("<td>"),
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    let style = paragraph
                        .align
                        .map(|align| format!(" style=\"text-align:{align}\""))
                        .unwrap_or_default();
                    let content = if paragraph.content.is_empty() {
                        "<br/>".to_string()
                    } else {
                        paragraph.content
                    };
                    self.out.push_str(&format!(
                        "<{tag}{style}>{content}</{tag}>\n",
                        tag = paragraph.tag
                    ));
                }
            }
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            b"instrText" => self.in_instruction = false,
            b"hyperlink" => {
                if self.links.pop().unwrap_or(false) {
                    self.push("</a>");
                }
            }
            b"tbl" => self.out.push_str("</table>\n"),
            b"tr" => self.out.push_str("</tr>\n"),
            b"tc" => self.out.push_str("</td>\n"),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_instruction {
            if let Some(field) = self.field.as_mut() {
                field.instruction.push_str(text);
            }
            return;
        }
        if !self.in_text {
            return;
        }
        if self.diverts_field_text() {
            if let Some(field) = self.field.as_mut() {
                field.result.push_str(text);
            }
            return;
        }
        let wrapped = self.run.wrap(text);
        self.push(&wrapped);
    }
}

fn heading_tag(style: &str) -> &'static str {
    match style {
        "Title" | "Heading1" | "heading1" => "h1",
        "Subtitle" | "Heading2" | "heading2" => "h2",
        "Heading3" | "heading3" => "h3",
        "Heading4" | "heading4" => "h4",
        "Heading5" | "heading5" => "h5",
        "Heading6" | "heading6" => "h6",
        _ => "p",
    }
}

fn render_body(
    xml: &str,
    resources: &mut Resources<'_>,
    options: &HtmlExportOptions,
) -> Result<String, ExportError> {
    let mut reader = Reader::from_str(xml);
    let mut renderer = Renderer {
        out: String::new(),
        paragraph: None,
        run: RunFormat::default(),
        field: None,
        in_ppr: false,
        in_rpr: false,
        in_text: false,
        in_instruction: false,
        links: Vec::new(),
        resources,
        options,
    };
    loop {
        match reader.read_event()? {
            Event::Start(e) => renderer.start(&e)?,
            Event::Empty(e) => {
                renderer.start(&e)?;
                renderer.end(e.local_name().as_ref());
            }
            Event::End(e) => renderer.end(e.local_name().as_ref()),
            Event::Text(e) => {
                let text = e.unescape()?;
                renderer.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(renderer.out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
<w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Quarterly Report</w:t></w:r></w:p>
<w:p><w:pPr><w:jc w:val="center"/><w:rPr><w:i/></w:rPr></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Bold </w:t></w:r><w:r><w:rPr><w:b w:val="0"/><w:i/></w:rPr><w:t>a &amp; b</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:drawing><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></w:drawing></w:r></w:p>
<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText xml:space="preserve"> FORMTEXT </w:instrText></w:r><w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>Jane Doe</w:t></w:r><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>
<w:p><w:hyperlink r:id="rId6"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>
<w:p/>
<w:sectPr/>
</w:body>
</w:document>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
<Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
</w:styles>"#;

    fn write_docx(path: &Path, parts: &[(&str, &[u8])]) {
        let file = File::create(path).expect("create docx");
        let mut zip = ZipWriter::new(file);
        for (name, data) in parts {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("start part");
            zip.write_all(data).expect("write part");
        }
        zip.finish().expect("finish docx");
    }

    fn sample_docx(dir: &Path) -> PathBuf {
        let path = dir.join("report.docx");
        write_docx(
            &path,
            &[
                (DOCUMENT_PART, DOCUMENT_XML.as_bytes()),
                (RELS_PART, RELS_XML.as_bytes()),
                (STYLES_PART, STYLES_XML.as_bytes()),
                ("word/media/image1.png", b"\x89PNG fake"),
            ],
        );
        path
    }

    #[test]
    fn exports_structure_and_formatting() {
        let temp = tempdir().expect("tempdir");
        let input = sample_docx(temp.path());
        let output = temp.path().join("report.html");

        DocxHtmlExporter::default()
            .export(&input, &output)
            .expect("export");
        let html = std::fs::read_to_string(&output).expect("read html");

        assert!(html.contains("<title>report</title>"));
        assert!(html.contains("font-family:'Calibri', sans-serif; font-size:11pt;"));
        assert!(html.contains("<h1>Quarterly Report</h1>"));
        assert!(html.contains(
            "<p style=\"text-align:center\"><strong>Bold </strong><em>a &amp; b</em></p>"
        ));
        assert!(html.contains("<td><p>cell</p>\n</td>"));
        assert!(html.contains("<img src=\"data:image/png;base64,"));
        assert!(html.contains("<p>Jane Doe</p>"));
        assert!(!html.contains("FORMTEXT"));
        assert!(html.contains("<a href=\"https://example.com/?a=1&amp;b=2\">site</a>"));
        assert!(html.contains("<p><br/></p>"));
    }

    #[test]
    fn options_switch_images_and_form_fields() {
        let temp = tempdir().expect("tempdir");
        let input = sample_docx(temp.path());
        let out_dir = temp.path().join("out");
        std::fs::create_dir_all(&out_dir).expect("create out dir");
        let output = out_dir.join("report.html");

        DocxHtmlExporter::new(HtmlExportOptions {
            export_document_styles: false,
            embed_images: false,
            form_fields_as_text: false,
        })
        .export(&input, &output)
        .expect("export");
        let html = std::fs::read_to_string(&output).expect("read html");

        assert!(!html.contains("<style"));
        assert!(html.contains("<img src=\"report_img1.png\" alt=\"\"/>"));
        assert!(out_dir.join("report_img1.png").exists());
        assert!(html.contains("<input type=\"text\" readonly=\"readonly\" value=\"Jane Doe\"/>"));
    }

    #[test]
    fn missing_document_part_is_reported() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("empty.docx");
        write_docx(&input, &[("docProps/core.xml", b"<x/>")]);

        let result = DocxHtmlExporter::default().export(&input, &temp.path().join("empty.html"));
        assert!(matches!(result, Err(ExportError::MissingPart(DOCUMENT_PART))));
    }

    #[test]
    fn non_zip_input_is_package_error() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("fake.docx");
        std::fs::write(&input, b"plain text, not a package").expect("write input");

        let result = DocxHtmlExporter::default().export(&input, &temp.path().join("fake.html"));
        assert!(matches!(result, Err(ExportError::Package(_))));
    }

    #[test]
    fn part_names_are_normalised() {
        assert_eq!(part_name("media/image1.png"), "word/media/image1.png");
        assert_eq!(part_name("../media/image2.gif"), "media/image2.gif");
        assert_eq!(part_name("/word/media/x.png"), "word/media/x.png");
    }
}
