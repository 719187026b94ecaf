//! PDF text extraction, page by page

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::types::Page;

/// MIME types accepted for uploads. Browsers send `application/octet-stream`
/// for files they cannot classify.
const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-pdf",
    "application/octet-stream",
];

/// Replace typographic characters that PDF fonts commonly emit with plain ASCII
fn cleanup_pdf_text(text: &str) -> String {
    let text = text
        .replace('\0', "")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-") // Hyphens, en dash
        .replace('\u{2014}', "--") // Em dash
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2022}', "* ") // Bullet
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts page-level text from PDF bytes
pub struct PdfExtractor;

impl PdfExtractor {
    /// Check whether an upload looks like a PDF by extension and, when given, MIME type
    pub fn is_pdf_upload(filename: &str, content_type: Option<&str>) -> bool {
        let by_extension = mime_guess::from_path(filename)
            .first()
            .map(|mime| mime.essence_str() == "application/pdf")
            .unwrap_or(false);

        let by_content_type = match content_type {
            Some(ct) => {
                let essence = ct.split(';').next().unwrap_or("").trim().to_lowercase();
                ACCEPTED_MIME_TYPES.contains(&essence.as_str())
            }
            None => true,
        };

        by_extension && by_content_type
    }

    /// Extract on a blocking thread; the input buffer is dropped when extraction ends
    pub async fn extract_async(data: Vec<u8>) -> Result<Vec<Page>> {
        tokio::task::spawn_blocking(move || Self::extract(&data))
            .await
            .map_err(|e| Error::unreadable(format!("PDF extraction aborted: {}", e)))?
    }

    /// Extract the ordered pages of a PDF
    ///
    /// Pages without text are kept (with empty text) so numbering stays aligned
    /// with the source. Fails when the bytes are not a PDF, the document has no
    /// pages, or no page yields any text.
    pub fn extract(data: &[u8]) -> Result<Vec<Page>> {
        if data.is_empty() {
            return Err(Error::unreadable("file is empty"));
        }

        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::unreadable(format!("not a valid PDF: {}", e)))?;

        let page_ids = doc.get_pages();
        if page_ids.is_empty() {
            return Err(Error::unreadable("document has no pages"));
        }

        let mut pages = Vec::with_capacity(page_ids.len());
        for (page_number, page_id) in page_ids {
            let raw = match doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) | Err(_) => match doc.get_page_content(page_id) {
                    Ok(content) => Self::extract_text_from_content(&content),
                    Err(e) => {
                        tracing::debug!("Could not get content for page {}: {}", page_number, e);
                        String::new()
                    }
                },
            };
            pages.push(Page::new(page_number, cleanup_pdf_text(&raw)));
        }

        if pages.iter().all(|p| p.text.is_empty()) {
            tracing::warn!("lopdf produced no text, trying pdf-extract");
            pages = Self::extract_with_pdf_extract(data)?;
        }

        tracing::debug!("Extracted {} pages", pages.len());
        Ok(pages)
    }

    /// Fallback extractor; pdf-extract returns one string per page in order
    fn extract_with_pdf_extract(data: &[u8]) -> Result<Vec<Page>> {
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }))
        .map_err(|_| Error::unreadable("PDF text extraction crashed"))?
        .map_err(|e| Error::unreadable(format!("PDF text extraction failed: {}", e)))?;

        let pages: Vec<Page> = extracted
            .iter()
            .enumerate()
            .map(|(i, text)| Page::new(i as u32 + 1, cleanup_pdf_text(text)))
            .collect();

        if pages.iter().all(|p| p.text.is_empty()) {
            return Err(Error::unreadable(
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(pages)
    }

    /// Extract text from a decoded PDF content stream
    ///
    /// Handles literal strings shown with `Tj`/`TJ` between `BT` and `ET`.
    fn extract_text_from_content(content: &[u8]) -> String {
        let content_str = String::from_utf8_lossy(content);
        let mut text = String::new();
        let mut in_text_block = false;
        let mut current_text = String::new();

        for line in content_str.lines() {
            let line = line.trim();

            if line == "BT" {
                in_text_block = true;
                continue;
            }

            if line == "ET" {
                in_text_block = false;
                if !current_text.is_empty() {
                    text.push_str(&current_text);
                    text.push('\n');
                    current_text.clear();
                }
                continue;
            }

            if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) {
                if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                    if start < end {
                        let decoded = line[start + 1..end]
                            .replace("\\n", "\n")
                            .replace("\\r", "\r")
                            .replace("\\t", "\t")
                            .replace("\\(", "(")
                            .replace("\\)", ")")
                            .replace("\\\\", "\\");
                        current_text.push_str(&decoded);
                    }
                }
            }
        }

        text
    }
}
