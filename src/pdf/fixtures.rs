//! In-memory PDFs for unit tests.

use lopdf::{dictionary, Document, Object, Stream};

/// Build a PDF with `pages` pages. Resources and MediaBox live on the page
/// tree root so pages inherit them; `root_rotation` sets an inherited
/// `/Rotate` as well. Each page carries a `/Tag` with its 1-based number.
pub fn pdf_with_pages(pages: u32, root_rotation: Option<i64>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Tag" => i64::from(n),
        });
        kids.push(Object::Reference(page_id));
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => i64::from(pages),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    };
    if let Some(angle) = root_rotation {
        pages_dict.set("Rotate", angle);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// The `/Tag` of every page, in document order.
pub fn page_tags(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .and_then(|page| page.get(b"Tag"))
                .and_then(Object::as_i64)
                .unwrap()
        })
        .collect()
}
