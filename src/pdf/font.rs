//! 文本字体
//!
//! 拼音的声调符号（ǎ、ǐ、ǚ 等）不在 WinAnsi 编码中，
//! 所以优先嵌入一个 TrueType 字体（Type0 / Identity-H，CID 即字形编号）；
//! 找不到字体时退回 Helvetica。

use crate::error::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 常见系统字体路径（需要覆盖拉丁扩展字符）
const SYSTEM_FONT_CANDIDATES: [&str; 9] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 资源字典中使用的字体名
pub const FONT_RESOURCE_NAME: &str = "HwFont";

/// 嵌入的 TrueType 字体
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    base_font: String,
    data: Vec<u8>,
    units_per_em: f32,
    /// 已使用的字形：gid → (字符, 千分之一 em 的宽度)
    used: BTreeMap<u16, (char, i64)>,
}

impl EmbeddedFont {
    /// 读取并校验字体文件
    pub fn load(path: &Path) -> Result<Self, PdfError> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Font(format!("{}: {}", path.display(), e)))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        Self::from_bytes(&stem, data)
    }

    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self, PdfError> {
        if data.starts_with(b"ttcf") {
            return Err(PdfError::Font("不支持 TrueType Collection (.ttc)".to_string()));
        }
        let units_per_em = {
            let face = ttf_parser::Face::parse(&data, 0)
                .map_err(|e| PdfError::Font(e.to_string()))?;
            if face.tables().glyf.is_none() {
                return Err(PdfError::Font("字体没有 glyf 表（CFF 字体无法嵌入）".to_string()));
            }
            face.units_per_em() as f32
        };

        Ok(Self {
            base_font: sanitize_font_name(name),
            data,
            units_per_em,
            used: BTreeMap::new(),
        })
    }

    /// 把文本编码为字形编号串，同时记录用到的字形
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let gid = face.glyph_index(ch).map(|g| g.0).unwrap_or(0);
            if gid == 0 {
                debug!("字体中没有字符 {:?}", ch);
            }
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .unwrap_or(0) as f32;
            let width = (advance * 1000.0 / self.units_per_em).round() as i64;
            self.used.entry(gid).or_insert((ch, width));
            out.extend_from_slice(&gid.to_be_bytes());
        }
        out
    }

    /// 写入字体对象（Type0 + CIDFontType2 + FontFile2 + ToUnicode）
    fn write(&self, doc: &mut Document, font_id: ObjectId) {
        let mut file_dict = Dictionary::new();
        file_dict.set("Length1", Object::Integer(self.data.len() as i64));
        let file_id = doc.add_object(Stream::new(file_dict, self.data.clone()));

        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", Object::Name(self.base_font.clone().into_bytes()));
        descriptor.set("Flags", Object::Integer(32));
        descriptor.set(
            "FontBBox",
            Object::Array(vec![
                Object::Integer(-200),
                Object::Integer(-300),
                Object::Integer(1200),
                Object::Integer(1000),
            ]),
        );
        descriptor.set("ItalicAngle", Object::Integer(0));
        descriptor.set("Ascent", Object::Integer(900));
        descriptor.set("Descent", Object::Integer(-250));
        descriptor.set("CapHeight", Object::Integer(700));
        descriptor.set("StemV", Object::Integer(80));
        descriptor.set("FontFile2", Object::Reference(file_id));
        let descriptor_id = doc.add_object(descriptor);

        let widths: Vec<Object> = self
            .used
            .iter()
            .flat_map(|(&gid, &(_, w))| {
                [
                    Object::Integer(gid as i64),
                    Object::Array(vec![Object::Integer(w)]),
                ]
            })
            .collect();

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
        cid_font.set("BaseFont", Object::Name(self.base_font.clone().into_bytes()));
        cid_font.set(
            "CIDSystemInfo",
            Object::Dictionary(Dictionary::from_iter([
                ("Registry", Object::string_literal("Adobe")),
                ("Ordering", Object::string_literal("Identity")),
                ("Supplement", Object::Integer(0)),
            ])),
        );
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("DW", Object::Integer(1000));
        cid_font.set("W", Object::Array(widths));
        cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        let cid_font_id = doc.add_object(cid_font);

        let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), self.to_unicode_cmap()));

        let mut type0 = Dictionary::new();
        type0.set("Type", Object::Name(b"Font".to_vec()));
        type0.set("Subtype", Object::Name(b"Type0".to_vec()));
        type0.set("BaseFont", Object::Name(self.base_font.clone().into_bytes()));
        type0.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        type0.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
        type0.set("ToUnicode", Object::Reference(to_unicode_id));
        doc.objects.insert(font_id, Object::Dictionary(type0));
    }

    /// 只为用到的字形生成 ToUnicode 映射
    fn to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );

        let mapped: Vec<_> = self.used.iter().filter(|(&gid, _)| gid != 0).collect();
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, (ch, _)) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", gid, hex));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap.into_bytes()
    }
}

/// 页面文本使用的字体
#[derive(Debug, Clone)]
pub enum TextFont {
    Embedded(EmbeddedFont),
    /// 标准 14 字体 Helvetica，WinAnsi 编码
    Helvetica,
}

impl TextFont {
    /// 按配置路径加载字体；未配置时查找系统字体；都失败时使用 Helvetica
    pub fn resolve(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            match EmbeddedFont::load(path) {
                Ok(font) => {
                    info!("🔤 使用字体: {}", path.display());
                    return TextFont::Embedded(font);
                }
                Err(e) => warn!("⚠️ 无法使用字体 {}: {}，改为自动查找", path.display(), e),
            }
        }

        for candidate in SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from) {
            if !candidate.exists() {
                continue;
            }
            match EmbeddedFont::load(&candidate) {
                Ok(font) => {
                    info!("🔤 使用系统字体: {}", candidate.display());
                    return TextFont::Embedded(font);
                }
                Err(e) => debug!("跳过字体 {}: {}", candidate.display(), e),
            }
        }

        warn!("⚠️ 未找到可嵌入的 TrueType 字体，拼音将以数字标调显示");
        TextFont::Helvetica
    }

    /// 能否直接显示带声调符号的拼音
    pub fn supports_tone_marks(&self) -> bool {
        matches!(self, TextFont::Embedded(_))
    }

    /// 把一行文本编码为 `Tj` 操作数
    pub fn encode(&mut self, text: &str) -> Object {
        match self {
            TextFont::Embedded(font) => Object::String(font.encode(text), StringFormat::Hexadecimal),
            TextFont::Helvetica => Object::String(encode_win_ansi(text), StringFormat::Literal),
        }
    }

    /// 把字体对象写到预留的编号上
    pub fn write(&self, doc: &mut Document, font_id: ObjectId) {
        match self {
            TextFont::Embedded(font) => font.write(doc, font_id),
            TextFont::Helvetica => {
                let font = Dictionary::from_iter([
                    ("Type", Object::Name(b"Font".to_vec())),
                    ("Subtype", Object::Name(b"Type1".to_vec())),
                    ("BaseFont", Object::Name(b"Helvetica".to_vec())),
                    ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
                ]);
                doc.objects.insert(font_id, Object::Dictionary(font));
            }
        }
    }
}

/// ASCII 与 Latin-1 补充区直接映射，其余字符替换为 `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            0x20..=0x7E | 0xA0..=0xFF => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn sanitize_font_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter_map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                Some(ch)
            } else if ch.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect();
    if name.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(encode_win_ansi("water"), b"water".to_vec());
        assert_eq!(encode_win_ansi("lü4"), vec![b'l', 0xFC, b'4']);
        assert_eq!(encode_win_ansi("shuǐ"), b"shu?".to_vec());
    }

    #[test]
    fn font_names_are_pdf_safe() {
        assert_eq!(sanitize_font_name("Arial Unicode"), "Arial-Unicode");
        assert_eq!(sanitize_font_name("字体"), "EmbeddedFont");
    }

    #[test]
    fn rejects_non_font_data() {
        assert!(EmbeddedFont::from_bytes("bad", b"not a font".to_vec()).is_err());
        assert!(EmbeddedFont::from_bytes("ttc", b"ttcf\0\0\0\0".to_vec()).is_err());
    }

    #[test]
    fn helvetica_font_object_is_written() {
        let mut doc = Document::with_version("1.5");
        let id = doc.new_object_id();
        TextFont::Helvetica.write(&mut doc, id);
        let font = doc.get_object(id).unwrap().as_dict().unwrap();
        assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    }
}
