use crate::page_set::{select, PageSet};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub expression: String,
    pub total_pages: u32,
    /// Zero-based
    pub indices: PageSet,
    /// 1-based
    pub pages: Vec<u32>,
}

pub fn report(expr: &str, total_pages: u32) -> SelectionReport {
    let indices = select(expr, total_pages);
    SelectionReport {
        expression: expr.to_string(),
        total_pages,
        pages: indices.to_page_numbers(),
        indices,
    }
}

pub fn run(expr: &str, total_pages: u32, json: bool) -> Result<()> {
    let report = report(expr, total_pages);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.indices.is_empty() {
        println!("No pages selected.");
    } else {
        println!(
            "Selected {} of {} page(s): {}",
            report.indices.len(),
            total_pages,
            report.indices
        );
    }

    Ok(())
}
