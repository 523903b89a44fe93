//! One-page PDFs built with lopdf for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Width and height of every fixture page, in points.
pub const PAGE_SIZE: (i64, i64) = (200, 100);

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, resources: Dictionary, operations: Vec<Operation>) -> Vec<u8> {
    let resources_id = doc.add_object(resources);
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_SIZE.0.into(), PAGE_SIZE.1.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn show(x: i64, y: i64, string: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![string]),
        Operation::new("ET", vec![]),
    ]
}

fn helvetica(doc: &mut Document) -> Dictionary {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    dictionary! { "Font" => dictionary! { "F1" => font_id } }
}

/// A 4x2 gray scan drawn over the whole page.
fn add_scan(doc: &mut Document, resources: &mut Dictionary, operations: &mut Vec<Operation>) {
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 4,
            "Height" => 2,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0, 64, 128, 255, 255, 128, 64, 0],
    );
    resources.set("XObject", dictionary! { "Im1" => doc.add_object(image) });
    operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![PAGE_SIZE.0.into(), 0.into(), 0.into(), PAGE_SIZE.1.into(), 0.into(), 0.into()],
        ),
        Operation::new("Do", vec!["Im1".into()]),
        Operation::new("Q", vec![]),
    ]);
}

/// Helvetica lines drawn in the given order, optionally over a scan.
pub fn text_pdf(lines: &[(i64, i64, &str)], with_scan: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut resources = helvetica(&mut doc);

    let mut operations = Vec::new();
    if with_scan {
        add_scan(&mut doc, &mut resources, &mut operations);
    }
    for (x, y, text) in lines {
        operations.extend(show(*x, *y, Object::string_literal(*text)));
    }

    finish(doc, pages_id, resources, operations)
}

/// A text layer of control bytes, as left behind by broken font subsetting.
pub fn garbled_pdf(with_scan: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut resources = helvetica(&mut doc);

    let mut operations = Vec::new();
    if with_scan {
        add_scan(&mut doc, &mut resources, &mut operations);
    }
    let garbage: Vec<u8> = (1u8..=24).collect();
    operations.extend(show(10, 50, Object::string_literal(garbage)));

    finish(doc, pages_id, resources, operations)
}

/// Text in a Type0 font with Identity-H encoding, where character codes are
/// glyph ids and only the ToUnicode map says what they mean.
pub fn cid_font_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // Glyph id = code point - 29, as in a subset TrueType font.
    let glyph = |c: char| (c as u32 - 29) as u16;

    let mut chars: Vec<char> = text.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    cmap.push_str(&format!("{} beginbfchar\n", chars.len()));
    for c in &chars {
        cmap.push_str(&format!("<{:04X}> <{:04X}>\n", glyph(*c), *c as u32));
    }
    cmap.push_str("endbfchar\nendcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, cmap.into_bytes()));

    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "ABCDEF+Arial",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "ABCDEF+Arial",
            "Flags" => 32,
            "FontBBox" => vec![0.into(), (-200).into(), 1000.into(), 900.into()],
            "ItalicAngle" => 0,
            "Ascent" => 900,
            "Descent" => -200,
            "CapHeight" => 700,
            "StemV" => 80,
        },
        "DW" => 600,
    });
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ABCDEF+Arial",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![descendant_id.into()],
        "ToUnicode" => to_unicode_id,
    });
    let resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };

    let codes: Vec<u8> = text.chars().flat_map(|c| glyph(c).to_be_bytes()).collect();
    let operations = show(10, 50, Object::String(codes, lopdf::StringFormat::Hexadecimal));

    finish(doc, pages_id, resources, operations)
}
