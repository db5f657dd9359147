//! PDF printing through a headless Chrome instance.

use super::ExportError;
use crate::page::PageSetup;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Renders a complete HTML page to PDF bytes.
pub trait HtmlPrinter {
    fn print_pdf(&self, html: &str, page: &PageSetup) -> Result<Vec<u8>, ExportError>;
}

/// Launches a headless browser per print job.
#[derive(Clone, Debug, Default)]
pub struct ChromePrinter {
    /// Explicit browser binary; `None` lets headless_chrome search the usual
    /// install locations.
    pub chrome_path: Option<PathBuf>,
}

impl ChromePrinter {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }

    fn launch(&self) -> Result<Browser, ExportError> {
        Browser::new(LaunchOptions {
            headless: true,
            path: self.chrome_path.clone(),
            ..Default::default()
        })
        .map_err(|e| ExportError::Printer(e.to_string()))
    }
}

fn pdf_options(page: &PageSetup) -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        paper_width: Some(page.page_width()),
        paper_height: Some(page.page_height()),
        margin_top: Some(page.margins.top),
        margin_bottom: Some(page.margins.bottom),
        margin_left: Some(page.margins.left),
        margin_right: Some(page.margins.right),
        prefer_css_page_size: Some(true),
        ..Default::default()
    }
}

impl HtmlPrinter for ChromePrinter {
    fn print_pdf(&self, html: &str, page: &PageSetup) -> Result<Vec<u8>, ExportError> {
        // The browser loads the page from disk; the file lives until printing ends.
        let mut file = tempfile::Builder::new()
            .prefix("quill-print-")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        let url = format!("file://{}", file.path().display());
        debug!("printing {}", url);

        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| ExportError::Printer(e.to_string()))?;
        tab.navigate_to(&url)
            .map_err(|e| ExportError::Printer(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| ExportError::Printer(e.to_string()))?;
        let bytes = tab
            .print_to_pdf(Some(pdf_options(page)))
            .map_err(|e| ExportError::Printer(e.to_string()))?;
        info!("printed {} byte PDF", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Margins, Orientation, PaperSize};

    #[test]
    fn pdf_options_follow_page_setup() {
        let page = PageSetup {
            paper: PaperSize::Legal,
            orientation: Orientation::Portrait,
            margins: Margins {
                top: 0.5,
                right: 0.75,
                bottom: 1.0,
                left: 1.25,
            },
        };
        let options = pdf_options(&page);
        assert_eq!(options.paper_width, Some(8.5));
        assert_eq!(options.paper_height, Some(14.0));
        assert_eq!(options.margin_top, Some(0.5));
        assert_eq!(options.margin_left, Some(1.25));
        assert_eq!(options.prefer_css_page_size, Some(true));
    }
}
