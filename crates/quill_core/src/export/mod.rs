//! Document export to PDF, DOCX, Markdown and standalone HTML.
//!
//! Every format starts from the editor's HTML fragment. PDF goes through an
//! [`HtmlPrinter`]; DOCX and Markdown re-read the fragment with the document
//! HTML reader and write their own format.

mod docx;
mod pdf;

use crate::constants::DEFAULT_EXPORT_STEM;
use crate::document::{escape_text, from_html, to_markdown};
use crate::page::PageSetup;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub use docx::document_to_docx;
pub use pdf::{ChromePrinter, HtmlPrinter};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF printer failed: {0}")]
    Printer(String),

    #[error("DOCX writer failed: {0}")]
    Docx(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Markdown,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Markdown,
        ExportFormat::Html,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "Word (DOCX)",
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Html => "HTML",
        }
    }
}

/// Everything needed to produce one export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
    pub title: String,
    /// Document body as an HTML fragment.
    pub html: String,
    pub format: ExportFormat,
    pub page: PageSetup,
}

/// Bytes ready to be written plus the suggested file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, &self.bytes)?;
        info!("wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

/// Replace characters that are not allowed in file names on common
/// platforms. Blank results fall back to a fixed stem.
pub fn sanitize_filename(value: &str) -> String {
    let out: String = value
        .chars()
        .map(|ch| match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            ch if ch.is_control() => '_',
            _ => ch,
        })
        .collect();
    let out = out.trim().trim_end_matches('.').trim_end();
    if out.is_empty() {
        DEFAULT_EXPORT_STEM.to_string()
    } else {
        out.to_string()
    }
}

pub fn file_name_for(title: &str, format: ExportFormat) -> String {
    format!("{}.{}", sanitize_filename(title), format.extension())
}

/// Wrap an HTML fragment in a printable page carrying the page setup.
pub fn standalone_html(title: &str, body: &str, page: &PageSetup) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_text(title),
        page.css_page_rule(),
        PRINT_STYLES,
        body
    )
}

const PRINT_STYLES: &str = "body { font-family: Georgia, 'Times New Roman', serif; font-size: 12pt; line-height: 1.5; margin: 0; }\n\
table { border-collapse: collapse; }\n\
td, th { border: 1px solid #999; padding: 4px 8px; }\n\
pre { background: #f4f4f4; padding: 8px; white-space: pre-wrap; }\n\
blockquote { border-left: 3px solid #ccc; margin-left: 0; padding-left: 12px; color: #555; }";

/// Produce the artifact for `request`. `printer` is only used for PDF.
///
/// # Errors
/// Returns the printer's error for PDF and the writer's error for DOCX.
/// Markdown and HTML cannot fail.
pub fn export(
    request: &ExportRequest,
    printer: &dyn HtmlPrinter,
) -> Result<ExportArtifact, ExportError> {
    let file_name = file_name_for(&request.title, request.format);
    debug!("exporting {} as {}", file_name, request.format.label());
    let bytes = match request.format {
        ExportFormat::Pdf => {
            let page = request.page.normalized();
            let html = standalone_html(&request.title, &request.html, &page);
            printer.print_pdf(&html, &page)?
        }
        ExportFormat::Docx => document_to_docx(&from_html(&request.html))?,
        ExportFormat::Markdown => to_markdown(&from_html(&request.html)).into_bytes(),
        ExportFormat::Html => {
            standalone_html(&request.title, &request.html, &request.page.normalized())
                .into_bytes()
        }
    };
    Ok(ExportArtifact { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Orientation, PaperSize};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPrinter {
        seen: Mutex<Vec<(String, PageSetup)>>,
    }

    impl HtmlPrinter for RecordingPrinter {
        fn print_pdf(&self, html: &str, page: &PageSetup) -> Result<Vec<u8>, ExportError> {
            self.seen
                .lock()
                .expect("printer lock")
                .push((html.to_string(), *page));
            Ok(b"%PDF-1.7 fake".to_vec())
        }
    }

    struct BrokenPrinter;

    impl HtmlPrinter for BrokenPrinter {
        fn print_pdf(&self, _html: &str, _page: &PageSetup) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Printer("no browser".to_string()))
        }
    }

    fn request(format: ExportFormat) -> ExportRequest {
        ExportRequest {
            title: "Quarterly: plan?".to_string(),
            html: "<h1>Plan</h1><p>Ship <strong>it</strong></p><ul><li>one</li><li>two</li></ul>"
                .to_string(),
            format,
            page: PageSetup::default(),
        }
    }

    #[test]
    fn sanitize_filename_replaces_reserved_chars_and_falls_back() {
        assert_eq!(sanitize_filename("bad<>:\"/\\|?*name"), "bad_________name");
        assert_eq!(sanitize_filename("   "), DEFAULT_EXPORT_STEM);
        assert_eq!(sanitize_filename("notes..."), "notes");
        assert_eq!(file_name_for("", ExportFormat::Docx), "untitled-document.docx");
    }

    #[test]
    fn pdf_export_prints_standalone_html_with_page_rule() {
        let printer = RecordingPrinter::default();
        let mut req = request(ExportFormat::Pdf);
        req.page = PageSetup {
            paper: PaperSize::A4,
            orientation: Orientation::Landscape,
            ..PageSetup::default()
        };
        let artifact = export(&req, &printer).expect("export");
        assert_eq!(artifact.file_name, "Quarterly_ plan_.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));

        let seen = printer.seen.lock().expect("printer lock");
        assert_eq!(seen.len(), 1);
        let (html, page) = &seen[0];
        assert!(html.contains("@page { size: 11.69in 8.27in;"));
        assert!(html.contains("<title>Quarterly: plan?</title>"));
        assert!(html.contains("<strong>it</strong>"));
        assert_eq!(page.orientation, Orientation::Landscape);
    }

    #[test]
    fn printer_failure_surfaces_as_error() {
        let err = export(&request(ExportFormat::Pdf), &BrokenPrinter).unwrap_err();
        assert!(matches!(err, ExportError::Printer(_)));
        assert_eq!(err.to_string(), "PDF printer failed: no browser");
    }

    #[test]
    fn markdown_export_converts_the_html() {
        let artifact = export(&request(ExportFormat::Markdown), &BrokenPrinter).expect("export");
        assert_eq!(artifact.file_name, "Quarterly_ plan_.md");
        assert_eq!(
            String::from_utf8(artifact.bytes).expect("utf8"),
            "# Plan\n\nShip **it**\n\n- one\n- two\n"
        );
    }

    #[test]
    fn docx_export_is_a_zip_package() {
        let artifact = export(&request(ExportFormat::Docx), &BrokenPrinter).expect("export");
        assert!(artifact.file_name.ends_with(".docx"));
        assert_eq!(&artifact.bytes[..2], b"PK");
    }

    #[test]
    fn html_export_is_standalone_and_written_to_disk() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let artifact = export(&request(ExportFormat::Html), &BrokenPrinter).expect("export");
        let path = dir.path().join(&artifact.file_name);
        artifact.write_to(&path).expect("write");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("<h1>Plan</h1>"));
    }
}
