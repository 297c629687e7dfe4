//! Text extraction from various file formats

use crate::error::{Result, RoleMatcherError};
use crate::input::file_detector::FileType;
use pulldown_cmark::{html, Parser};
use regex::Regex;

pub trait TextExtractor {
    fn extract_bytes(&self, bytes: Vec<u8>) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract_bytes(&self, bytes: Vec<u8>) -> Result<String> {
        // pdf-extract panics on some malformed inputs; a panic in the blocking
        // task surfaces as a JoinError instead of taking the process down.
        let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| RoleMatcherError::ComputeFailure(format!("PDF parser aborted: {}", e)))?;

        extracted.map_err(|e| RoleMatcherError::ComputeFailure(format!("Unreadable PDF: {}", e)))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract_bytes(&self, bytes: Vec<u8>) -> Result<String> {
        String::from_utf8(bytes)
            .map_err(|e| RoleMatcherError::ExtractionFailure(format!("Text file is not valid UTF-8: {}", e)))
    }
}

pub struct MarkdownExtractor {
    tag_regex: Regex,
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for MarkdownExtractor {
    async fn extract_bytes(&self, bytes: Vec<u8>) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract_bytes(bytes).await?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self {
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid tag regex"),
        }
    }

    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let clean_text = self.tag_regex.replace_all(&text, "");

        let lines: Vec<&str> = clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}

/// Routes document bytes to the extractor for their file type.
#[derive(Default)]
pub struct DocumentExtractor {
    markdown: MarkdownExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn extract(&self, file_type: FileType, bytes: Vec<u8>) -> Result<String> {
        match file_type {
            FileType::Pdf => PdfExtractor.extract_bytes(bytes).await,
            FileType::Text => PlainTextExtractor.extract_bytes(bytes).await,
            FileType::Markdown => self.markdown.extract_bytes(bytes).await,
            FileType::Unknown => Err(RoleMatcherError::UnsupportedFormat(
                "expected a .pdf, .txt or .md document".to_string(),
            )),
        }
    }
}
