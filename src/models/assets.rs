//! 单个汉字的素材包

use crate::error::{AssetKind, PartialAssetMissing};

/// 英文释义最多保留的条数
pub const MAX_MEANINGS: usize = 3;

/// 练习纸的内容格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorksheetFormat {
    /// 单页（或多页，只取第一页）PDF
    Pdf,
    /// PNG / JPEG 等位图
    Raster,
}

/// 练习纸原始数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub bytes: Vec<u8>,
    pub format: WorksheetFormat,
}

impl Worksheet {
    /// 根据文件头判断格式
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let format = if bytes.starts_with(b"%PDF") {
            WorksheetFormat::Pdf
        } else {
            WorksheetFormat::Raster
        };
        Self { bytes, format }
    }
}

/// 一个汉字收集到的全部素材
///
/// 任何字段都可能缺失；缺失的原因记录在 `diagnostics` 中。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterAssets {
    pub worksheet: Option<Worksheet>,
    pub stroke_order: Option<Vec<u8>>,
    pub pinyin: Option<String>,
    /// 按词典相关度排序，最多 [`MAX_MEANINGS`] 条
    pub meanings: Vec<String>,
    pub diagnostics: Vec<PartialAssetMissing>,
}

impl CharacterAssets {
    /// 记录一条次要素材缺失
    pub fn record_missing(&mut self, kind: AssetKind, reason: impl Into<String>) {
        self.diagnostics.push(PartialAssetMissing::new(kind, reason));
    }

    /// 设置释义，超出部分截断
    pub fn set_meanings(&mut self, meanings: impl IntoIterator<Item = String>) {
        self.meanings = meanings.into_iter().take(MAX_MEANINGS).collect();
    }

    /// 是否所有次要素材都已获取
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 缺失的素材类别（去重，保持记录顺序）
    pub fn missing_kinds(&self) -> Vec<AssetKind> {
        let mut kinds = Vec::new();
        for d in &self.diagnostics {
            if !kinds.contains(&d.kind) {
                kinds.push(d.kind);
            }
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meanings_are_capped() {
        let mut assets = CharacterAssets::default();
        assets.set_meanings(["a", "b", "c", "d"].map(String::from));
        assert_eq!(assets.meanings, vec!["a", "b", "c"]);
    }

    #[test]
    fn detects_worksheet_format() {
        assert_eq!(Worksheet::from_bytes(b"%PDF-1.4 ...".to_vec()).format, WorksheetFormat::Pdf);
        assert_eq!(
            Worksheet::from_bytes(vec![0x89, b'P', b'N', b'G']).format,
            WorksheetFormat::Raster
        );
    }

    #[test]
    fn missing_kinds_are_deduplicated() {
        let mut assets = CharacterAssets::default();
        assets.record_missing(AssetKind::Pinyin, "词典中没有该字");
        assets.record_missing(AssetKind::Meanings, "词典中没有该字");
        assets.record_missing(AssetKind::Pinyin, "again");
        assert!(!assets.is_complete());
        assert_eq!(assets.missing_kinds(), vec![AssetKind::Pinyin, AssetKind::Meanings]);
    }
}
