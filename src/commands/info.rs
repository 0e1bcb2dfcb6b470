use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let doc = PdfDocument::open(&path)?;
    let rotations = doc.rotations();

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", rotations.len());

    // Only list pages that are not upright
    for (index, angle) in rotations.iter().enumerate() {
        if *angle != 0 {
            println!("Page {}: rotated {}°", index + 1, angle);
        }
    }

    Ok(())
}
