//! QR stamping of the first page of an arbitrary PDF.
//!
//! The overlay is a letter-size layer whose only content is the QR image at
//! a fixed spot near the bottom right. It is composited onto page 1: the
//! page's existing content is wrapped in `q ... Q` so its graphics state
//! cannot leak, and the overlay content stream is appended after it. All
//! other pages keep their objects untouched.

use crate::error::AppError;
use crate::services::qr::QrImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Lower-left corner of the QR image, in points on a 612x792 letter page.
pub const QR_POSITION: (i64, i64) = (450, 20);
pub const QR_SIZE: i64 = 100;

const XOBJECT_NAME: &str = "QrStamp";
/// Bound on the page-tree walk when looking for inherited resources.
const MAX_TREE_DEPTH: usize = 32;

/// The overlay layer: one image XObject and the operators drawing it.
struct Overlay {
    image: Stream,
}

impl Overlay {
    fn for_qr(qr: &QrImage) -> Overlay {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(qr.width),
            "Height" => i64::from(qr.height),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        };
        Overlay {
            image: Stream::new(dict, qr.pixels.clone()),
        }
    }

    /// Closes the wrapper around the original content, then draws the image.
    fn content(name: &str) -> Result<Vec<u8>, AppError> {
        let (x, y) = QR_POSITION;
        let content = Content {
            operations: vec![
                Operation::new("Q", vec![]),
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(QR_SIZE),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(QR_SIZE),
                        Object::Integer(x),
                        Object::Integer(y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        Ok(content.encode()?)
    }
}

/// Returns a copy of `pdf` with `qr` drawn on its first page.
///
/// Unreadable input and documents without pages are `BadInput`.
pub fn stamp_first_page(pdf: &[u8], qr: &QrImage) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::load_mem(pdf)
        .map_err(|e| AppError::BadInput(format!("not a readable PDF: {}", e)))?;

    let first_page = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| AppError::BadInput("PDF has no pages".to_string()))?;

    let mut resources = effective_resources(&doc, first_page)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => resolve_dict(&doc, obj)?.clone(),
        Err(_) => Dictionary::new(),
    };
    let name = unused_name(&xobjects);
    let existing_contents = content_refs(&doc, first_page)?;

    let image_id = doc.add_object(Overlay::for_qr(qr).image);
    xobjects.set(name.clone(), Object::Reference(image_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), Overlay::content(&name)?));

    let mut contents = Vec::with_capacity(existing_contents.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing_contents);
    contents.push(Object::Reference(overlay_id));

    let page = doc.get_object_mut(first_page)?.as_dict_mut()?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary, AppError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_dictionary(*id)?),
        other => Ok(other.as_dict()?),
    }
}

/// The page's own resources, or the nearest ancestor's, as an owned copy.
fn effective_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, AppError> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return Ok(resolve_dict(doc, resources)?.clone());
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_dictionary(parent)?,
            Err(_) => break,
        }
    }
    Ok(Dictionary::new())
}

/// The page's content streams as a list of references, in drawing order.
fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, AppError> {
    let page = doc.get_dictionary(page_id)?;
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        Ok(Object::Array(items)) => Ok(items.clone()),
        _ => Ok(Vec::new()),
    }
}

fn unused_name(xobjects: &Dictionary) -> String {
    let mut name = XOBJECT_NAME.to_string();
    let mut n = 1;
    while xobjects.has(name.as_bytes()) {
        name = format!("{}{}", XOBJECT_NAME, n);
        n += 1;
    }
    name
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::qr;

    /// A PDF with one text line per entry of `labels`, one page each.
    pub fn sample_pdf(labels: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for label in labels {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), Object::Integer(24)]),
                    Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
                    Operation::new("Tj", vec![Object::string_literal(*label)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn qr_image() -> QrImage {
        qr::render("http://portal.test/pdf/abcd1234_qr.pdf", 4).unwrap()
    }

    fn page_contents(pdf: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|&id| doc.get_page_content(id).unwrap())
            .collect()
    }

    #[test]
    fn only_first_page_changes() {
        let source = sample_pdf(&["Page one", "Page two", "Page three"]);
        let stamped = stamp_first_page(&source, &qr_image()).unwrap();

        let before = page_contents(&source);
        let after = page_contents(&stamped);
        assert_eq!(after.len(), 3);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[2], before[2]);

        let first = String::from_utf8_lossy(&after[0]);
        assert!(first.contains("(Page one) Tj"), "{}", first);
        assert!(first.contains("/QrStamp Do"), "{}", first);
        assert!(first.contains("100 0 0 100 450 20 cm"), "{}", first);
    }

    #[test]
    fn first_page_keeps_inherited_fonts_and_gains_image() {
        let stamped = stamp_first_page(&sample_pdf(&["Only page"]), &qr_image()).unwrap();
        let doc = Document::load_mem(&stamped).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = resolve_dict(&doc, page.get(b"Resources").unwrap()).unwrap();

        let fonts = resolve_dict(&doc, resources.get(b"Font").unwrap()).unwrap();
        assert!(fonts.has(b"F1"));

        let xobjects = resolve_dict(&doc, resources.get(b"XObject").unwrap()).unwrap();
        let image_id = xobjects.get(b"QrStamp").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
    }

    #[test]
    fn existing_stamp_name_is_not_overwritten() {
        let mut xobjects = Dictionary::new();
        xobjects.set("QrStamp", Object::Null);
        xobjects.set("QrStamp1", Object::Null);
        assert_eq!(unused_name(&xobjects), "QrStamp2");
    }

    #[test]
    fn zero_page_pdf_is_bad_input() {
        let empty = sample_pdf(&[]);
        match stamp_first_page(&empty, &qr_image()) {
            Err(AppError::BadInput(msg)) => assert!(msg.contains("no pages")),
            other => panic!("unexpected result {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn garbage_is_bad_input() {
        assert!(matches!(
            stamp_first_page(b"definitely not a pdf", &qr_image()),
            Err(AppError::BadInput(_))
        ));
    }
}
