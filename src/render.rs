// ABOUTME: Document printing module for the darsy application
// ABOUTME: Prints HTML documents to PDF with a headless browser, falling back to printable HTML

use crate::errors::{LessonError, Result};
use crate::html;
use crate::utils;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for PDF printing
pub struct PrintConfig {
    pub landscape: bool,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            landscape: false,
            timeout_ms: 30000, // 30 seconds
            browser_path: None,
        }
    }
}

/// What an export actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Pdf(PathBuf),
    /// PDF tooling was unavailable; the HTML can be printed from a browser.
    PrintableHtml(PathBuf),
}

fn browser_error(message: String) -> LessonError {
    LessonError::BrowserError {
        message,
        source: None,
    }
}

/// Print an HTML file to PDF
pub fn print_to_pdf(html_path: &Path, output_file: &Path, config: &PrintConfig) -> Result<()> {
    info!("Printing {:?} to PDF", html_path);
    utils::require_file(html_path)?;
    utils::prepare_output(output_file)?;

    // Configure browser launch options
    let mut launch_options_builder = LaunchOptionsBuilder::default();
    launch_options_builder.headless(true);
    if let Some(browser_path) = &config.browser_path {
        launch_options_builder.path(Some(browser_path.into()));
    }

    let launch_options = launch_options_builder
        .build()
        .map_err(|e| browser_error(format!("Failed to build browser options: {:?}", e)))?;

    info!("Launching headless browser");
    let browser = Browser::new(launch_options).map_err(|e| {
        LessonError::ExportUnavailable(format!("Failed to launch browser: {}", e))
    })?;

    let url = utils::file_url(html_path)?;
    info!("Opening page at URL: {}", url);

    let tab = browser
        .new_tab()
        .map_err(|e| browser_error(format!("Failed to create new tab: {}", e)))?;

    tab.navigate_to(&url)
        .map_err(|e| browser_error(format!("Failed to navigate to HTML: {}", e)))?;
    tab.wait_until_navigated()
        .map_err(|e| browser_error(format!("Navigation failed: {}", e)))?;
    tab.wait_for_element_with_custom_timeout("body", Duration::from_millis(config.timeout_ms))
        .map_err(|e| browser_error(format!("Failed to wait for body element: {}", e)))?;

    let options = PrintToPdfOptions {
        landscape: Some(config.landscape),
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        ..Default::default()
    };
    let pdf = tab
        .print_to_pdf(Some(options))
        .map_err(|e| browser_error(format!("Failed to print PDF: {}", e)))?;

    fs::write(output_file, pdf).map_err(LessonError::FileReadError)?;
    info!("PDF written to {:?}", output_file);
    Ok(())
}

/// Export an HTML document as a PDF at `output_file`.
///
/// The HTML is always written next to the PDF. If printing fails because the
/// browser tooling is unavailable, the HTML is returned instead so the user
/// can print it themselves.
pub fn export_document(html_content: &str, output_file: &Path, config: &PrintConfig) -> Result<ExportOutcome> {
    let html_path = output_file.with_extension("html");
    html::write_html_to_file(html_content, &html_path)?;

    match print_to_pdf(&html_path, output_file, config) {
        Ok(()) => Ok(ExportOutcome::Pdf(output_file.to_path_buf())),
        Err(e @ (LessonError::ExportUnavailable(_) | LessonError::BrowserError { .. })) => {
            warn!("PDF export failed, falling back to printable HTML: {}", e);
            Ok(ExportOutcome::PrintableHtml(html_path))
        }
        Err(e) => Err(e),
    }
}
