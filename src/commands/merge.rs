use crate::pdf::merge::{expand_inputs, merge_files, MergeInput};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn run<Q: AsRef<Path>>(
    inputs: &[PathBuf],
    omit: &str,
    exclusions: &[(usize, String)],
    output: Q,
) -> Result<()> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let mut inputs: Vec<MergeInput> = files
        .into_iter()
        .map(|path| MergeInput {
            path,
            exclude: None,
        })
        .collect();

    let count = inputs.len();
    for (position, expr) in exclusions {
        let input = inputs.get_mut(position - 1).with_context(|| {
            format!(
                "Exclusion for file {} but only {} file(s) given",
                position, count
            )
        })?;
        input.exclude = Some(expr.clone());
    }

    let (mut merged, summary) = merge_files(&inputs, omit)?;
    PdfDocument::save(&mut merged, &output)?;

    println!(
        "Merged {} file(s) ({} pages) into {}",
        summary.files,
        summary.pages,
        output.as_ref().display()
    );

    Ok(())
}
