use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::page_set::{select, PageSet};
use crate::pdf::merge::{merge_files, MergeInput};
use crate::pdf::text::extract_page_texts;
use crate::pdf::{PdfDocument, Rotation};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectPagesRequest {
    #[schemars(description = "Page selection (e.g., '1,3-5,10', 'first 3', 'last 2', '-2', '4-last')")]
    pub pages: String,
    #[schemars(description = "Total number of pages; ignored when path is given")]
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[schemars(description = "PDF file to take the page count from")]
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PagesToFileRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page selection (e.g., '1-5,10', 'last 2')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RotateRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to rotate (e.g., '1-last', '2,4')")]
    pub pages: String,
    #[schemars(description = "Direction: 'cw', 'ccw' or 'half' (default: cw)")]
    #[serde(default = "default_rotation")]
    pub direction: Rotation,
    #[schemars(description = "Output file path")]
    pub output: String,
}

fn default_rotation() -> Rotation {
    Rotation::Clockwise
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeFileRequest {
    #[schemars(description = "Path to a PDF file")]
    pub path: String,
    #[schemars(description = "Pages to omit from this file only")]
    #[serde(default)]
    pub omit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeRequest {
    #[schemars(description = "Files to merge, in order")]
    pub files: Vec<MergeFileRequest>,
    #[schemars(description = "Pages to omit from every file (default: none)")]
    #[serde(default)]
    pub omit: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadPagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page selection (default: all pages)")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Resolve a page selection expression to page numbers without touching any file contents")]
    fn pdf_select_pages(&self, Parameters(req): Parameters<SelectPagesRequest>) -> String {
        let total_pages = match (&req.path, req.total_pages) {
            (Some(path), _) => match PdfDocument::open(path) {
                Ok(doc) => doc.page_count(),
                Err(e) => return format!("Error: {}", e),
            },
            (None, Some(total)) => total,
            (None, None) => return "Error: either path or total_pages is required".to_string(),
        };

        let indices = select(&req.pages, total_pages);
        to_json(&SelectionResult {
            total_pages,
            pages: indices.to_page_numbers(),
            indices,
        })
    }

    #[tool(description = "Get the page count and the rotation of each page")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let rotations = doc.rotations();
                to_json(&PdfInfoResult {
                    path,
                    page_count: rotations.len() as u32,
                    rotations,
                })
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Keep only the selected pages of a PDF and save them to a new file")]
    fn pdf_extract(&self, Parameters(req): Parameters<PagesToFileRequest>) -> String {
        write_selected(req, true)
    }

    #[tool(description = "Remove the selected pages from a PDF and save the remaining pages to a new file")]
    fn pdf_remove(&self, Parameters(req): Parameters<PagesToFileRequest>) -> String {
        write_selected(req, false)
    }

    #[tool(description = "Rotate the selected pages of a PDF by 90° (cw/ccw) or 180° (half) and save to a new file")]
    fn pdf_rotate(&self, Parameters(req): Parameters<RotateRequest>) -> String {
        let mut doc = match PdfDocument::open(&req.path) {
            Ok(d) => d,
            Err(e) => return format!("Error: {}", e),
        };

        let selected = select(&req.pages, doc.page_count());
        if selected.is_empty() {
            return "Error: No pages selected for rotation".to_string();
        }

        let rotated = match doc.rotate_pages(&selected, req.direction) {
            Ok(n) => n as u32,
            Err(e) => return format!("Error: {}", e),
        };
        if let Err(e) = PdfDocument::save(&mut doc.doc, &req.output) {
            return format!("Error: {}", e);
        }

        to_json(&WriteResult {
            output_path: req.output,
            page_count: rotated,
        })
    }

    #[tool(description = "Merge PDFs in order, omitting pages globally and per file")]
    fn pdf_merge(&self, Parameters(req): Parameters<MergeRequest>) -> String {
        let inputs: Vec<MergeInput> = req
            .files
            .into_iter()
            .map(|file| MergeInput {
                path: PathBuf::from(file.path),
                exclude: file.omit,
            })
            .collect();

        let (mut merged, summary) = match merge_files(&inputs, &req.omit) {
            Ok(result) => result,
            Err(e) => return format!("Error: {:#}", e),
        };
        if let Err(e) = PdfDocument::save(&mut merged, &req.output) {
            return format!("Error: {}", e);
        }

        to_json(&WriteResult {
            output_path: req.output,
            page_count: summary.pages,
        })
    }

    #[tool(description = "Extract text content from selected pages of a PDF. Use page selection syntax like '1-5,10,15-last'.")]
    fn pdf_read_pages(&self, Parameters(req): Parameters<ReadPagesRequest>) -> String {
        match extract_page_texts(&req.path, req.pages.as_deref()) {
            Ok(texts) if texts.is_empty() => "Error: No pages selected".to_string(),
            Ok(texts) => to_json(&texts),
            Err(e) => format!("Error: {}", e),
        }
    }
}

fn write_selected(req: PagesToFileRequest, keep: bool) -> String {
    let doc = match PdfDocument::open(&req.path) {
        Ok(d) => d,
        Err(e) => return format!("Error: {}", e),
    };
    let total = doc.page_count();

    let selected = select(&req.pages, total);
    if selected.is_empty() {
        return "Error: No pages selected".to_string();
    }

    let kept = if keep { selected.clone() } else { selected.complement(total) };
    if kept.is_empty() {
        return "Error: Result would be empty PDF".to_string();
    }

    let mut new_doc = match doc.keep_pages(&kept) {
        Ok(d) => d,
        Err(e) => return format!("Error: {}", e),
    };
    if let Err(e) = PdfDocument::save(&mut new_doc, &req.output) {
        return format!("Error: {}", e);
    }

    to_json(&WriteResult {
        output_path: req.output,
        page_count: kept.len() as u32,
    })
}

// Result types for MCP tools

#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct SelectionResult {
    pub total_pages: u32,
    /// Zero-based page indices
    #[schemars(with = "Vec<u32>")]
    pub indices: PageSet,
    /// 1-based page numbers
    pub pages: Vec<u32>,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: u32,
    pub rotations: Vec<i64>,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct WriteResult {
    pub output_path: String,
    pub page_count: u32,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page tools driven by page selection expressions such as '1,3-5,10', \
                 'first 3', 'last 2', '-2' or '4-last'. Use pdf_select_pages to preview a \
                 selection, pdf_extract or pdf_remove to keep or drop pages, pdf_rotate to \
                 rotate them, pdf_merge to combine files, and pdf_read_pages to read text."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    info!("starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
