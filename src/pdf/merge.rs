use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::document::{inherited_attribute, PdfDocument, INHERITABLE_ATTRIBUTES};
use crate::page_set::{select, PageSet};

/// One document to merge, with its own exclusion expression.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub path: PathBuf,
    pub exclude: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub pages: u32,
}

/// Pages of one document that survive both the global and the per-document
/// exclusion expressions.
pub fn pages_to_keep(global_exclude: &str, local_exclude: &str, total_pages: u32) -> PageSet {
    let global = select(global_exclude, total_pages);
    let local = select(local_exclude, total_pages);
    global.union(&local).complement(total_pages)
}

/// Replace directories with the PDF files inside them, sorted by path.
pub fn expand_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry =
                entry.with_context(|| format!("Failed to read directory: {}", path.display()))?;
            let is_pdf = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if entry.file_type().is_file() && is_pdf {
                found.push(entry.into_path());
            }
        }
        found.sort();
        debug!(dir = %path.display(), count = found.len(), "expanded input directory");
        files.extend(found);
    }
    Ok(files)
}

/// Load every input, drop excluded pages and concatenate the rest.
pub fn merge_files(
    inputs: &[MergeInput],
    global_exclude: &str,
) -> Result<(Document, MergeSummary)> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let mut merger = Merger::new();
    let mut files = 0;
    for input in inputs {
        let pdf = PdfDocument::open(&input.path)?;
        let total = pdf.page_count();
        let keep = pages_to_keep(global_exclude, input.exclude.as_deref().unwrap_or(""), total);

        if keep.is_empty() {
            warn!(path = %input.path.display(), total, "every page excluded, skipping file");
            continue;
        }

        let added = merger
            .append(pdf.doc, &keep)
            .with_context(|| format!("Failed to merge {}", input.path.display()))?;
        debug!(path = %input.path.display(), added, total, "appended pages");
        files += 1;
    }

    let pages = merger.page_count();
    let doc = merger.finish()?;
    Ok((doc, MergeSummary { files, pages }))
}

/// Accumulates pages from several documents into one page tree.
pub struct Merger {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl Merger {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Merger {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.kids.len() as u32
    }

    /// Append the selected pages of `source` in ascending order.
    pub fn append(&mut self, mut source: Document, keep: &PageSet) -> Result<u32> {
        // Renumber first so the source's ids cannot collide with ours
        source.renumber_objects_with(self.doc.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        if let Some(last) = keep.last() {
            if last as usize >= page_ids.len() {
                anyhow::bail!("Page {} is out of range (1-{})", last + 1, page_ids.len());
            }
        }

        let kept: Vec<ObjectId> = keep.iter().map(|i| page_ids[i as usize]).collect();
        for &page_id in &kept {
            inline_inherited_attributes(&mut source, page_id);
        }

        let max_id = source.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
        for (id, object) in source.objects {
            if !is_document_root(&object) {
                self.doc.objects.insert(id, object);
            }
        }
        self.doc.max_id = self.doc.max_id.max(max_id);

        for page_id in kept {
            if let Ok(page) = self.doc.get_dictionary_mut(page_id) {
                page.set("Parent", Object::Reference(self.pages_id));
                self.kids.push(Object::Reference(page_id));
            }
        }

        Ok(keep.len() as u32)
    }

    /// Build the catalog and page tree, then drop objects only excluded pages used.
    pub fn finish(mut self) -> Result<Document> {
        if self.kids.is_empty() {
            anyhow::bail!("Merged document would have no pages");
        }

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.prune_objects();
        self.doc.renumber_objects();
        Ok(self.doc)
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy attributes the page inherits from its page-tree ancestors onto the
/// page itself, since those ancestors are not carried into the merged tree.
fn inline_inherited_attributes(doc: &mut Document, page_id: ObjectId) {
    for key in INHERITABLE_ATTRIBUTES {
        let has_own = doc.get_dictionary(page_id).is_ok_and(|page| page.has(key));
        if has_own {
            continue;
        }
        let Some(value) = inherited_attribute(doc, page_id, key).cloned() else {
            continue;
        };
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            page.set(key.to_vec(), value);
        }
    }
}

/// Catalog and page-tree nodes, which are rebuilt rather than copied.
fn is_document_root(object: &Object) -> bool {
    let Ok(name) = object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
    else {
        return false;
    };
    name == b"Catalog" || name == b"Pages"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_tags, pdf_with_pages};

    fn load(pages: u32, root_rotation: Option<i64>) -> Document {
        Document::load_mem(&pdf_with_pages(pages, root_rotation)).unwrap()
    }

    #[test]
    fn test_pages_to_keep_is_complement_of_union() {
        assert_eq!(pages_to_keep("1", "last 2", 6).to_page_numbers(), vec![2, 3, 4]);
        assert_eq!(pages_to_keep("", "", 3), PageSet::all(3));
        assert!(pages_to_keep("-", "", 3).is_empty());
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let mut merger = Merger::new();
        merger.append(load(3, None), &PageSet::all(3)).unwrap();
        merger.append(load(2, None), &select("2", 2)).unwrap();
        assert_eq!(merger.page_count(), 4);

        let mut merged = merger.finish().unwrap();
        assert_eq!(page_tags(&merged), vec![1, 2, 3, 2]);

        let mut buf = Vec::new();
        merged.save_to(&mut buf).unwrap();
        let reloaded = Document::load_mem(&buf).unwrap();
        assert_eq!(reloaded.get_pages().len(), 4);
    }

    #[test]
    fn test_merge_inlines_inherited_attributes() {
        let mut merger = Merger::new();
        merger.append(load(2, Some(180)), &PageSet::all(2)).unwrap();
        let merged = merger.finish().unwrap();

        for page_id in merged.get_pages().into_values() {
            let page = merged.get_dictionary(page_id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
            assert_eq!(page.get(b"Rotate").and_then(Object::as_i64).unwrap(), 180);
        }
    }

    #[test]
    fn test_merge_rejects_out_of_range_pages() {
        let mut merger = Merger::new();
        let pages: PageSet = [5].into_iter().collect();
        assert!(merger.append(load(2, None), &pages).is_err());
    }

    #[test]
    fn test_empty_merge_fails() {
        assert!(Merger::new().finish().is_err());
    }

    #[test]
    fn test_merge_files_applies_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.pdf");
        let third = dir.path().join("c.pdf");
        std::fs::write(&first, pdf_with_pages(4, None)).unwrap();
        std::fs::write(&second, pdf_with_pages(3, None)).unwrap();
        std::fs::write(&third, pdf_with_pages(1, None)).unwrap();

        let inputs = vec![
            MergeInput {
                path: first,
                exclude: Some("2-3".to_string()),
            },
            MergeInput {
                path: second,
                exclude: None,
            },
            MergeInput {
                path: third,
                exclude: None,
            },
        ];
        let (merged, summary) = merge_files(&inputs, "1").unwrap();
        // Third file loses its only page to the global exclusion.
        assert_eq!(summary, MergeSummary { files: 2, pages: 3 });
        assert_eq!(page_tags(&merged), vec![4, 2, 3]);
    }

    #[test]
    fn test_expand_inputs_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "nested/c.pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let loose = dir.path().join("loose.pdf");

        let files = expand_inputs(&[dir.path().to_path_buf(), loose.clone()]).unwrap();
        let expected = vec![
            dir.path().join("a.PDF"),
            dir.path().join("b.pdf"),
            dir.path().join("nested/c.pdf"),
            loose,
        ];
        assert_eq!(files, expected);
    }
}
