use crate::page_set::select;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Whether the selected pages are the ones to keep or the ones to drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Keep,
    Remove,
}

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: &str,
    output: Q,
    mode: Mode,
) -> Result<()> {
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selected = select(pages, total_pages);
    if selected.is_empty() {
        anyhow::bail!("No pages selected");
    }

    let kept = match mode {
        Mode::Keep => selected.len(),
        Mode::Remove => total_pages as usize - selected.len(),
    };
    if kept == 0 {
        anyhow::bail!("Result would be empty PDF");
    }

    let mut new_doc = match mode {
        Mode::Keep => doc.keep_pages(&selected)?,
        Mode::Remove => doc.remove_pages(&selected)?,
    };
    PdfDocument::save(&mut new_doc, &output)?;
    info!(?mode, selected = %selected, total_pages, "wrote {}", output.as_ref().display());

    match mode {
        Mode::Keep => println!(
            "Extracted {} page(s) to {}",
            kept,
            output.as_ref().display()
        ),
        Mode::Remove => println!(
            "Removed {} page(s); wrote {} page(s) to {}",
            selected.len(),
            kept,
            output.as_ref().display()
        ),
    }

    Ok(())
}
