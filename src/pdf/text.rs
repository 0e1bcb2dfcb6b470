use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::PdfDocument;
use crate::page_set::{select, PageSet};

#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    /// 1-based page number
    pub page: u32,
    pub text: String,
}

/// Extract text from the pages `pages` selects (every page when `None`), in
/// ascending page order. The file is read and parsed once.
pub fn extract_page_texts<P: AsRef<Path>>(path: P, pages: Option<&str>) -> Result<Vec<PageText>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let total_pages = PdfDocument::load_mem(&bytes)
        .with_context(|| format!("Failed to parse PDF: {}", path.display()))?
        .page_count();
    let selected = match pages {
        Some(expr) => select(expr, total_pages),
        None => PageSet::all(total_pages),
    };
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let full_text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    Ok(split_pages(&full_text, &selected))
}

/// pdf-extract separates pages with form feeds
fn split_pages(full_text: &str, pages: &PageSet) -> Vec<PageText> {
    let chunks: Vec<&str> = full_text.split('\x0C').collect();
    pages
        .iter()
        .map(|index| PageText {
            page: index + 1,
            text: chunks
                .get(index as usize)
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Join page texts into one document, separated by a blank line
pub fn join_pages(texts: &[PageText]) -> String {
    let mut out = String::new();
    for page in texts {
        out.push_str(&page.text);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::pdf_with_pages;

    #[test]
    fn test_split_selected_pages() {
        let texts = split_pages("one\x0Ctwo\x0C three \x0C", &select("2-3", 3));
        let pages: Vec<_> = texts.iter().map(|t| (t.page, t.text.as_str())).collect();
        assert_eq!(pages, vec![(2, "two"), (3, "three")]);
    }

    #[test]
    fn test_missing_page_text_is_empty() {
        let texts = split_pages("only", &select("1,2", 2));
        assert_eq!(texts[1].text, "");
    }

    #[test]
    fn test_join_pages() {
        let texts = split_pages("a\x0Cb", &PageSet::all(2));
        assert_eq!(join_pages(&texts), "a\n\nb\n\n");
    }

    #[test]
    fn test_empty_selection_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, pdf_with_pages(3, None)).unwrap();

        assert!(extract_page_texts(&input, Some("99")).unwrap().is_empty());
        assert!(extract_page_texts(&input, Some("5-2")).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_page_texts(dir.path().join("missing.pdf"), None).is_err());
    }
}
