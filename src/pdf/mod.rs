//! PDF 输出
//!
//! 基于 lopdf 的对象模型：每个 [`Page`] 变成一页，
//! 底图是导入的练习纸页面或位图，上面再叠加笔顺图和文字。

pub mod font;
pub mod import;
pub mod raster;

use crate::error::PdfError;
use crate::models::page::{ImagePlacement, Page, PageBackground, Rect, TextBlock};
use crate::models::pinyin::marked_to_numbered;
use font::{TextFont, FONT_RESOURCE_NAME};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

pub use import::first_page_size;

/// 资源字典中的图片名
const STROKE_IMAGE_NAME: &str = "HwStroke";
const SHEET_IMAGE_NAME: &str = "HwSheet";

/// 页面在 PDF 坐标系中的位置（MediaBox 左下角为原点）
#[derive(Debug, Clone, Copy)]
struct PageFrame {
    origin_x: f32,
    top_y: f32,
}

impl PageFrame {
    fn new(media_box: [f32; 4]) -> Self {
        Self {
            origin_x: media_box[0].min(media_box[2]),
            top_y: media_box[1].max(media_box[3]),
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.origin_x + x
    }

    /// 左上角坐标 → PDF 坐标
    fn y(&self, y: f32) -> f32 {
        self.top_y - y
    }
}

/// 逐页构建 PDF 文档
pub struct PdfBuilder {
    document: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    font: TextFont,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new(font: TextFont) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.new_object_id();
        Self {
            document,
            pages_id,
            font_id,
            font,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// 追加一页
    pub fn add_page(&mut self, page: &Page) -> Result<(), PdfError> {
        let mut content = Content { operations: Vec::new() };
        let mut xobjects = Dictionary::new();

        let (page_id, frame, mut page_dict, mut contents) = match &page.background {
            PageBackground::PdfPage(bytes) => {
                let imported = import::import_first_page(&mut self.document, bytes, self.pages_id)?;
                let page_dict = self.document.get_object(imported.page_id)?.as_dict()?.clone();
                let existing = self.existing_contents(&page_dict)?;
                (imported.page_id, PageFrame::new(imported.media_box), page_dict, existing)
            }
            PageBackground::Image { bytes, rect } => {
                let (w, h) = page.size;
                let page_dict = Dictionary::from_iter([
                    ("Type", Object::Name(b"Page".to_vec())),
                    ("Parent", Object::Reference(self.pages_id)),
                    (
                        "MediaBox",
                        Object::Array(vec![
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(w),
                            Object::Real(h),
                        ]),
                    ),
                ]);
                let frame = PageFrame::new([0.0, 0.0, w, h]);
                let placement = ImagePlacement {
                    bytes: bytes.clone(),
                    rect: *rect,
                };
                self.draw_image(&mut content, &mut xobjects, SHEET_IMAGE_NAME, &placement, frame)?;
                (self.document.new_object_id(), frame, page_dict, Vec::new())
            }
        };

        if let Some(stroke) = &page.stroke_order {
            self.draw_image(&mut content, &mut xobjects, STROKE_IMAGE_NAME, stroke, frame)?;
        }

        let convert_pinyin = !self.font.supports_tone_marks();
        if let Some(block) = &page.pinyin {
            if convert_pinyin {
                let numbered = TextBlock {
                    lines: block.lines.iter().map(|l| marked_to_numbered(l)).collect(),
                    ..block.clone()
                };
                self.draw_text(&mut content, &numbered, frame);
            } else {
                self.draw_text(&mut content, block, frame);
            }
        }
        if let Some(block) = &page.meanings {
            self.draw_text(&mut content, block, frame);
        }

        // 原有内容包在 q/Q 中，避免其图形状态影响叠加层
        if !contents.is_empty() {
            let open = self.document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let close = self.document.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            contents.insert(0, Object::Reference(open));
            contents.push(Object::Reference(close));
        }
        let overlay = self
            .document
            .add_object(Stream::new(Dictionary::new(), content.encode()?));
        contents.push(Object::Reference(overlay));

        let resources = self.merged_resources(&page_dict, xobjects)?;
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Array(contents));
        self.document
            .objects
            .insert(page_id, Object::Dictionary(page_dict));
        self.kids.push(Object::Reference(page_id));

        debug!("'{}' 页面已加入 PDF (第 {} 页)", page.character, self.kids.len());
        Ok(())
    }

    /// 完成文档并序列化
    pub fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        self.font.write(&mut self.document, self.font_id);

        let count = self.kids.len() as i64;
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(self.kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        let catalog_id = self.document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        let info_id = self.document.add_object(Dictionary::from_iter([
            ("Producer", Object::string_literal("hanzi-worksheet")),
            ("Title", Object::string_literal("Hanzi practice worksheets")),
        ]));
        self.document.trailer.set("Root", Object::Reference(catalog_id));
        self.document.trailer.set("Info", Object::Reference(info_id));

        self.document.compress();
        let mut out = Vec::new();
        self.document.save_to(&mut out)?;
        Ok(out)
    }

    /// 页面现有内容流的引用列表
    fn existing_contents(&self, page: &Dictionary) -> Result<Vec<Object>, PdfError> {
        let contents = match page.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()),
        };
        match contents {
            Object::Array(items) => Ok(items.clone()),
            Object::Reference(id) => match self.document.get_object(*id)? {
                Object::Array(items) => Ok(items.clone()),
                _ => Ok(vec![Object::Reference(*id)]),
            },
            _ => Err(PdfError::Malformed("Contents 既不是引用也不是数组")),
        }
    }

    /// 页面原有资源 + 本页新增的图片和字体，结果内联到页面字典
    fn merged_resources(&self, page: &Dictionary, xobjects: Dictionary) -> Result<Dictionary, PdfError> {
        let mut resources = match page.get(b"Resources") {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => Dictionary::new(),
        };

        let mut xobject_dict = match resources.get(b"XObject") {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => Dictionary::new(),
        };
        for (name, obj) in xobjects.iter() {
            xobject_dict.set(name.clone(), obj.clone());
        }
        if !xobject_dict.is_empty() {
            resources.set("XObject", Object::Dictionary(xobject_dict));
        }

        let mut font_dict = match resources.get(b"Font") {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => Dictionary::new(),
        };
        font_dict.set(FONT_RESOURCE_NAME, Object::Reference(self.font_id));
        resources.set("Font", Object::Dictionary(font_dict));

        Ok(resources)
    }

    fn resolve_dict(&self, obj: &Object) -> Result<Dictionary, PdfError> {
        match obj {
            Object::Reference(id) => Ok(self.document.get_object(*id)?.as_dict()?.clone()),
            other => Ok(other.as_dict()?.clone()),
        }
    }

    fn draw_image(
        &mut self,
        content: &mut Content,
        xobjects: &mut Dictionary,
        name: &str,
        placement: &ImagePlacement,
        frame: PageFrame,
    ) -> Result<(), PdfError> {
        let embedded = raster::embed_image(&mut self.document, &placement.bytes)?;
        let rect: Rect = placement
            .rect
            .fit(embedded.width as f32, embedded.height as f32);
        xobjects.set(name, Object::Reference(embedded.id));

        content.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(rect.width()),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(rect.height()),
                    Object::Real(frame.x(rect.x0)),
                    Object::Real(frame.y(rect.y1)),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn draw_text(&mut self, content: &mut Content, block: &TextBlock, frame: PageFrame) {
        content.operations.push(Operation::new("BT", vec![]));
        content.operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE_NAME.as_bytes().to_vec()),
                Object::Real(block.font_size),
            ],
        ));
        for (i, line) in block.lines.iter().enumerate() {
            let baseline = block.y + block.font_size + i as f32 * block.line_height;
            content.operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Real(frame.x(block.x)),
                    Object::Real(frame.y(baseline)),
                ],
            ));
            let encoded = self.font.encode(line);
            content.operations.push(Operation::new("Tj", vec![encoded]));
        }
        content.operations.push(Operation::new("ET", vec![]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::{A4_HEIGHT, A4_WIDTH};

    fn text(lines: &[&str], y: f32) -> TextBlock {
        TextBlock {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            x: 50.0,
            y,
            font_size: 12.0,
            line_height: 15.0,
        }
    }

    fn pdf_page(character: char) -> Page {
        Page {
            character,
            background: PageBackground::PdfPage(import::tests::worksheet_pdf(595, 842)),
            size: (595.0, 842.0),
            stroke_order: Some(ImagePlacement {
                bytes: raster::tests::png_bytes(8, 8, 255),
                rect: Rect::new(470.0, 10.0, 585.0, 125.0),
            }),
            pinyin: Some(text(&["shuǐ"], 50.0)),
            meanings: Some(text(&["water", "river", "liquid"], 495.0)),
        }
    }

    #[test]
    fn builds_a_multi_page_document_in_order() {
        let mut builder = PdfBuilder::new(TextFont::Helvetica);
        builder.add_page(&pdf_page('水')).unwrap();
        builder
            .add_page(&Page {
                character: '火',
                background: PageBackground::Image {
                    bytes: raster::tests::png_bytes(10, 20, 255),
                    rect: Rect::new(20.0, 20.0, A4_WIDTH - 20.0, A4_HEIGHT - 20.0),
                },
                size: (A4_WIDTH, A4_HEIGHT),
                stroke_order: None,
                pinyin: None,
                meanings: None,
            })
            .unwrap();
        assert_eq!(builder.page_count(), 2);

        let bytes = builder.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn overlay_text_uses_tone_numbers_with_builtin_font() {
        let mut builder = PdfBuilder::new(TextFont::Helvetica);
        builder.add_page(&pdf_page('水')).unwrap();
        let bytes = builder.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        assert!(content.contains("shui3"));
        assert!(content.contains("river"));
        assert!(content.contains("/HwStroke Do"));
    }

    #[test]
    fn broken_worksheet_is_an_error() {
        let mut builder = PdfBuilder::new(TextFont::Helvetica);
        let mut page = pdf_page('水');
        page.background = PageBackground::PdfPage(b"%PDF-1.4 truncated".to_vec());
        assert!(builder.add_page(&page).is_err());
    }
}
