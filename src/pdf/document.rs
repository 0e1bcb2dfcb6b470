use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use rmcp::schemars;
use serde::Deserialize;
use std::path::Path;

use crate::page_set::PageSet;

/// Page-tree nesting deeper than this is treated as a broken `Parent` chain.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// 90° clockwise
    #[value(name = "cw")]
    #[serde(rename = "cw")]
    Clockwise,
    /// 90° counter-clockwise
    #[value(name = "ccw")]
    #[serde(rename = "ccw")]
    CounterClockwise,
    /// 180°
    Half,
}

impl Rotation {
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::Clockwise => 90,
            Rotation::CounterClockwise => -90,
            Rotation::Half => 180,
        }
    }
}

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        Ok(PdfDocument { doc })
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("Failed to parse PDF from memory")?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages is keyed by 1-based page number, so values come out in order
        self.doc.get_pages().into_values().collect()
    }

    /// Copy of the document holding only the selected pages, in ascending order
    pub fn keep_pages(&self, pages: &PageSet) -> Result<Document> {
        let total = self.page_count();
        check_bounds(pages, total)?;

        let mut new_doc = self.doc.clone();
        let to_delete = pages.complement(total).to_page_numbers();
        if !to_delete.is_empty() {
            new_doc.delete_pages(&to_delete);
            new_doc.prune_objects();
        }

        Ok(new_doc)
    }

    /// Copy of the document without the selected pages
    pub fn remove_pages(&self, pages: &PageSet) -> Result<Document> {
        let total = self.page_count();
        check_bounds(pages, total)?;
        self.keep_pages(&pages.complement(total))
    }

    /// Rotate the selected pages relative to their current orientation.
    /// Returns the number of pages touched.
    pub fn rotate_pages(&mut self, pages: &PageSet, rotation: Rotation) -> Result<usize> {
        let ids = self.page_ids();
        check_bounds(pages, ids.len() as u32)?;

        for index in pages {
            let page_id = ids[index as usize];
            let angle = (self.effective_rotation(page_id) + rotation.degrees()).rem_euclid(360);
            self.doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Page {} is not a dictionary", index + 1))?
                .set("Rotate", Object::Integer(angle));
        }

        Ok(pages.len())
    }

    /// Effective rotation of every page, in document order
    pub fn rotations(&self) -> Vec<i64> {
        self.page_ids()
            .into_iter()
            .map(|id| self.effective_rotation(id))
            .collect()
    }

    fn effective_rotation(&self, page_id: ObjectId) -> i64 {
        inherited_attribute(&self.doc, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

fn check_bounds(pages: &PageSet, total: u32) -> Result<()> {
    if let Some(last) = pages.last() {
        if last >= total {
            anyhow::bail!("Page {} is out of range (1-{})", last + 1, total);
        }
    }
    Ok(())
}

/// Look up `key` on a page, walking up the page tree if the page itself lacks it.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}
