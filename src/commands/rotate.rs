use crate::page_set::select;
use crate::pdf::{PdfDocument, Rotation};
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: &str,
    rotation: Rotation,
    output: Q,
) -> Result<()> {
    let mut doc = PdfDocument::open(&input)?;
    let selected = select(pages, doc.page_count());

    if selected.is_empty() {
        anyhow::bail!("No pages selected for rotation");
    }

    let rotated = doc.rotate_pages(&selected, rotation)?;
    PdfDocument::save(&mut doc.doc, &output)?;

    println!(
        "Rotated {} page(s) by {}° to {}",
        rotated,
        rotation.degrees(),
        output.as_ref().display()
    );

    Ok(())
}
