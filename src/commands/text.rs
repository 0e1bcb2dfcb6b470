use crate::pdf::text::{extract_page_texts, join_pages};
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, pages: Option<&str>) -> Result<()> {
    let texts = extract_page_texts(&path, pages)?;

    if texts.is_empty() {
        anyhow::bail!("No pages selected");
    }

    print!("{}", join_pages(&texts));

    Ok(())
}
