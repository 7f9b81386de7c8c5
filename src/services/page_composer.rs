//! 页面排版服务 - 业务能力层
//!
//! 把一个汉字的素材排成一页，只决定位置和字号，不接触 PDF 对象

use tracing::debug;

use crate::error::AssetUnavailable;
use crate::models::assets::WorksheetFormat;
use crate::models::page::{A4_HEIGHT, A4_WIDTH};
use crate::models::{CharacterAssets, CharacterRequest, ImagePlacement, Page, PageBackground, Rect, TextBlock};
use crate::pdf::first_page_size;

/// 版面参数（单位：PDF 点，左上角原点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// 位图练习纸四周留白
    pub sheet_margin: f32,
    /// 笔顺图区域：距右边 `stroke_right` 到 `stroke_right + stroke_size`，距顶部 `stroke_top`
    pub stroke_right: f32,
    pub stroke_top: f32,
    pub stroke_size: f32,
    pub pinyin_origin: (f32, f32),
    pub pinyin_font_size: f32,
    pub meanings_origin: (f32, f32),
    pub meanings_font_size: f32,
    /// 行高 = 字号 × 该系数
    pub line_spacing: f32,
    /// 释义右侧留白，用于估算折行宽度
    pub text_right_margin: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            sheet_margin: 20.0,
            stroke_right: 10.0,
            stroke_top: 10.0,
            stroke_size: 115.0,
            pinyin_origin: (50.0, 50.0),
            pinyin_font_size: 14.0,
            meanings_origin: (50.0, 495.0),
            meanings_font_size: 11.0,
            line_spacing: 1.3,
            text_right_margin: 40.0,
        }
    }
}

/// 页面排版服务
#[derive(Debug, Clone, Default)]
pub struct PageComposer {
    layout: PageLayout,
}

impl PageComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一个汉字排出一页
    ///
    /// 缺失的素材直接不画；练习纸无法解析时该汉字不可用。
    pub fn compose(&self, request: &CharacterRequest, assets: CharacterAssets) -> Result<Page, AssetUnavailable> {
        let unavailable = |reason: String| AssetUnavailable {
            character: request.character,
            reason,
        };
        let worksheet = assets
            .worksheet
            .ok_or_else(|| unavailable("没有练习纸".to_string()))?;

        let (background, size) = match worksheet.format {
            WorksheetFormat::Pdf => {
                let size = first_page_size(&worksheet.bytes)
                    .map_err(|e| unavailable(format!("练习纸 PDF 无法解析: {}", e)))?;
                (PageBackground::PdfPage(worksheet.bytes), size)
            }
            WorksheetFormat::Raster => {
                let m = self.layout.sheet_margin;
                let rect = Rect::new(m, m, A4_WIDTH - m, A4_HEIGHT - m);
                (
                    PageBackground::Image {
                        bytes: worksheet.bytes,
                        rect,
                    },
                    (A4_WIDTH, A4_HEIGHT),
                )
            }
        };
        let (width, _) = size;

        let stroke_order = assets.stroke_order.map(|bytes| {
            let x1 = width - self.layout.stroke_right;
            let y0 = self.layout.stroke_top;
            ImagePlacement {
                bytes,
                rect: Rect::new(x1 - self.layout.stroke_size, y0, x1, y0 + self.layout.stroke_size),
            }
        });

        let pinyin = assets.pinyin.map(|p| {
            self.text_block(vec![p], self.layout.pinyin_origin, self.layout.pinyin_font_size)
        });

        let meanings = if assets.meanings.is_empty() {
            None
        } else {
            let (x, _) = self.layout.meanings_origin;
            let font_size = self.layout.meanings_font_size;
            let max_chars = max_line_chars(width - x - self.layout.text_right_margin, font_size);
            let lines = assets
                .meanings
                .iter()
                .flat_map(|m| wrap_line(m, max_chars))
                .collect();
            Some(self.text_block(lines, self.layout.meanings_origin, font_size))
        };

        debug!("{} 页面尺寸 {:.0}×{:.0}", request, size.0, size.1);

        Ok(Page {
            character: request.character,
            background,
            size,
            stroke_order,
            pinyin,
            meanings,
        })
    }

    fn text_block(&self, lines: Vec<String>, (x, y): (f32, f32), font_size: f32) -> TextBlock {
        TextBlock {
            lines,
            x,
            y,
            font_size,
            line_height: font_size * self.layout.line_spacing,
        }
    }
}

/// 按平均字宽（约半个字号）估算一行能放多少字符
fn max_line_chars(width: f32, font_size: f32) -> usize {
    ((width / (font_size * 0.5)).floor() as usize).max(10)
}

/// 按词折行；单个词超长时保持原样
fn wrap_line(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
