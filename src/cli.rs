use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pdf::Rotation;

#[derive(Parser)]
#[command(name = "pdfpick")]
#[command(about = "Select, extract, remove, rotate and merge PDF pages with page-range expressions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Resolve a page selection and print the pages it covers
    Select {
        /// Selection expression (e.g., "1,3-5,10", "first 3", "last 2", "-2", "4-last")
        #[arg(allow_hyphen_values = true)]
        expr: String,

        /// Total number of pages to select from
        #[arg(short, long, required_unless_present = "file", conflicts_with = "file")]
        pages: Option<u32>,

        /// Take the page count from this PDF
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show page count and page rotations
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Keep only the selected pages
    #[command(alias = "keep")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages to keep (e.g., "1-5,10", "first 3")
        #[arg(allow_hyphen_values = true)]
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Drop the selected pages and keep the rest
    Remove {
        /// PDF file to remove pages from
        path: PathBuf,

        /// Pages to remove (e.g., "2,4", "last 1")
        #[arg(allow_hyphen_values = true)]
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate the selected pages
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        /// Pages to rotate (e.g., "1-last", "2,4")
        #[arg(allow_hyphen_values = true)]
        pages: String,

        /// Rotation direction
        #[arg(short, long, value_enum, default_value = "cw")]
        direction: Rotation,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine multiple PDFs into one, optionally omitting pages
    Merge {
        /// PDF files (or directories of PDFs) to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Pages to omit from every file (e.g., "1", "last 1")
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        omit: String,

        /// Pages to omit from one file, as FILE_NUMBER=EXPR (e.g., "2=1-3")
        #[arg(short = 'x', long, value_parser = parse_file_exclusion, allow_hyphen_values = true)]
        exclude: Vec<(usize, String)>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract text from selected pages
    Text {
        /// PDF file to read
        path: PathBuf,

        /// Pages to read (default: all)
        #[arg(allow_hyphen_values = true)]
        pages: Option<String>,
    },
}

/// Parse `N=EXPR`, where `N` is the 1-based position of an input file
fn parse_file_exclusion(s: &str) -> Result<(usize, String), String> {
    let (position, expr) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FILE_NUMBER=EXPR, got '{}'", s))?;
    let position: usize = position
        .trim()
        .parse()
        .map_err(|_| format!("invalid file number '{}'", position))?;
    if position == 0 {
        return Err("file numbers start at 1".to_string());
    }
    Ok((position, expr.to_string()))
}
