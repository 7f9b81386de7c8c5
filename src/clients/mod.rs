//! 外部数据源
//!
//! 上层只依赖这里的两个 trait；具体网站的地址和格式都是实现细节，
//! 测试中可以换成假的数据源。

pub mod cedict;
pub mod strokeorder_client;

use crate::models::CharacterRequest;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

pub use cedict::{CedictDictionary, CedictEntry};
pub use strokeorder_client::StrokeOrderClient;

/// 练习纸与笔顺图的来源
#[async_trait]
pub trait WorksheetProvider: Send + Sync {
    /// 练习纸（PDF 或位图）；`Ok(None)` 表示该字没有练习纸
    async fn worksheet(&self, request: &CharacterRequest) -> Result<Option<Vec<u8>>>;

    /// 笔顺图（PNG/JPEG）；`Ok(None)` 表示该字没有笔顺图
    async fn stroke_order(&self, request: &CharacterRequest) -> Result<Option<Vec<u8>>>;
}

/// 词典查询结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// 带声调符号的拼音
    pub pinyin: Option<String>,
    /// 按相关度排序的英文释义（未截断）
    pub meanings: Vec<String>,
}

/// 拼音与英文释义的来源
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    /// `Ok(None)` 表示词典中没有该字
    async fn lookup(&self, character: char) -> Result<Option<DictionaryEntry>>;
}

/// 词典无法加载时的替代品：每次查询都失败，汉字照常出页，只是缺少拼音和释义
#[derive(Debug, Clone)]
pub struct UnavailableDictionary {
    reason: String,
}

impl UnavailableDictionary {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl DictionaryProvider for UnavailableDictionary {
    async fn lookup(&self, _character: char) -> Result<Option<DictionaryEntry>> {
        Err(anyhow!("词典不可用: {}", self.reason))
    }
}
