use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object};

use hanzi_worksheet::models::{Page, PageBackground, Rect, TextBlock};
use hanzi_worksheet::pdf::font::{EmbeddedFont, TextFont};
use hanzi_worksheet::pdf::PdfBuilder;

/// 只含 s、h、u、ǐ 四个字形的 TrueType 字体（gid 1..=4，宽度 520/560/560/280）
fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pinyin-subset.ttf")
}

fn sheet_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

fn pinyin_page(pinyin: &str) -> Page {
    Page {
        character: '水',
        background: PageBackground::Image {
            bytes: sheet_png(),
            rect: Rect::new(20.0, 20.0, 575.0, 822.0),
        },
        size: (595.0, 842.0),
        stroke_order: None,
        pinyin: Some(TextBlock {
            lines: vec![pinyin.to_string()],
            x: 50.0,
            y: 50.0,
            font_size: 14.0,
            line_height: 18.2,
        }),
        meanings: None,
    }
}

fn render(font: TextFont, pinyin: &str) -> Document {
    let mut builder = PdfBuilder::new(font);
    builder.add_page(&pinyin_page(pinyin)).unwrap();
    let bytes = builder.finish().unwrap();
    let mut doc = Document::load_mem(&bytes).unwrap();
    doc.decompress();
    doc
}

fn find_font<'a>(doc: &'a Document, subtype: &[u8]) -> &'a Dictionary {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .find(|dict| {
            dict.get(b"Type").and_then(|t| t.as_name()).ok() == Some(&b"Font"[..])
                && dict.get(b"Subtype").and_then(|s| s.as_name()).ok() == Some(subtype)
        })
        .unwrap_or_else(|| panic!("no {} font", String::from_utf8_lossy(subtype)))
}

fn referenced<'a>(doc: &'a Document, obj: &Object) -> &'a Object {
    doc.get_object(obj.as_reference().unwrap()).unwrap()
}

#[test]
fn embedded_font_writes_cid_font_with_widths_and_unicode_map() {
    let font = EmbeddedFont::load(&fixture_font()).unwrap();
    let doc = render(TextFont::Embedded(font), "shuǐ");

    let type0 = find_font(&doc, b"Type0");
    assert_eq!(type0.get(b"Encoding").unwrap().as_name().unwrap(), b"Identity-H");

    let descendants = type0.get(b"DescendantFonts").unwrap().as_array().unwrap();
    assert_eq!(descendants.len(), 1);
    let cid_font = referenced(&doc, &descendants[0]).as_dict().unwrap();
    assert_eq!(cid_font.get(b"Subtype").unwrap().as_name().unwrap(), b"CIDFontType2");

    let widths = cid_font.get(b"W").unwrap().as_array().unwrap();
    assert!(!widths.is_empty());
    let flat: Vec<i64> = widths
        .iter()
        .map(|item| match item {
            Object::Integer(gid) => *gid,
            Object::Array(w) => w[0].as_i64().unwrap(),
            other => panic!("unexpected W entry: {:?}", other),
        })
        .collect();
    assert_eq!(flat, vec![1, 520, 2, 560, 3, 560, 4, 280]);

    let descriptor = referenced(&doc, cid_font.get(b"FontDescriptor").unwrap()).as_dict().unwrap();
    let font_file = referenced(&doc, descriptor.get(b"FontFile2").unwrap()).as_stream().unwrap();
    assert_eq!(font_file.content, std::fs::read(fixture_font()).unwrap());

    let to_unicode = referenced(&doc, type0.get(b"ToUnicode").unwrap()).as_stream().unwrap();
    let cmap = String::from_utf8_lossy(&to_unicode.content);
    assert!(cmap.contains("4 beginbfchar"));
    assert!(cmap.contains("<0001> <0073>"));
    assert!(cmap.contains("<0002> <0068>"));
    assert!(cmap.contains("<0003> <0075>"));
    assert!(cmap.contains("<0004> <01D0>"));
}

#[test]
fn tone_marked_pinyin_is_drawn_as_glyph_ids() {
    let doc = render(TextFont::resolve(Some(fixture_font().as_path())), "shuǐ");

    let page_id = *doc.get_pages().values().next().unwrap();
    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_ascii_lowercase();
    assert!(content.contains("<0001000200030004>"));
    assert!(!content.contains("shui3"));
}

#[test]
fn missing_glyphs_are_left_out_of_the_unicode_map() {
    let font = EmbeddedFont::load(&fixture_font()).unwrap();
    // x 不在字体中，编码为 gid 0
    let doc = render(TextFont::Embedded(font), "xu");

    let type0 = find_font(&doc, b"Type0");
    let to_unicode = referenced(&doc, type0.get(b"ToUnicode").unwrap()).as_stream().unwrap();
    let cmap = String::from_utf8_lossy(&to_unicode.content);
    assert!(cmap.contains("1 beginbfchar"));
    assert!(cmap.contains("<0003> <0075>"));
    assert!(!cmap.contains("<0000> <0078>"));
}
