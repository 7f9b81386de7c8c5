//! 页面布局模型
//!
//! 坐标单位为 PDF 点，原点在页面左上角（写入 PDF 时再翻转 y 轴）。

/// A4 纸尺寸
pub const A4_WIDTH: f32 = 595.0;
pub const A4_HEIGHT: f32 = 842.0;

/// 矩形区域（左上角原点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// 在本矩形内按比例放置一个 `w`×`h` 的对象，水平居中、顶端对齐
    pub fn fit(&self, w: f32, h: f32) -> Rect {
        if w <= 0.0 || h <= 0.0 {
            return *self;
        }
        let scale = (self.width() / w).min(self.height() / h);
        let (fw, fh) = (w * scale, h * scale);
        let x0 = self.x0 + (self.width() - fw) / 2.0;
        Rect::new(x0, self.y0, x0 + fw, self.y0 + fh)
    }
}

/// 页面底图
#[derive(Debug, Clone, PartialEq)]
pub enum PageBackground {
    /// 导入 PDF 练习纸的第一页，页面尺寸沿用原页面
    PdfPage(Vec<u8>),
    /// 位图练习纸，放在 A4 页面的指定区域
    Image { bytes: Vec<u8>, rect: Rect },
}

/// 图片放置
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub bytes: Vec<u8>,
    /// 可用区域；实际绘制时保持比例放入其中
    pub rect: Rect,
}

/// 文本块，每行一个字符串
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// 第一行基线的左上角位置
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub line_height: f32,
}

/// 一个汉字对应的一页
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub character: char,
    pub background: PageBackground,
    /// 页面尺寸（宽, 高）
    pub size: (f32, f32),
    pub stroke_order: Option<ImagePlacement>,
    pub pinyin: Option<TextBlock>,
    pub meanings: Option<TextBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_preserves_aspect_ratio() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let placed = area.fit(200.0, 100.0);
        assert_eq!(placed, Rect::new(0.0, 0.0, 100.0, 50.0));

        let tall = area.fit(50.0, 100.0);
        assert_eq!(tall, Rect::new(25.0, 0.0, 75.0, 100.0));
    }
}
