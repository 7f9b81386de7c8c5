//! CC-CEDICT 词典
//!
//! 每次运行加载一次（本地文件或 http(s) 地址），只为单字词条建立索引。
//! 行格式：`繁體 简体 [pin1 yin1] /释义1/释义2/`，`#` 开头为注释。

use crate::clients::{DictionaryEntry, DictionaryProvider};
use crate::error::DictionaryError;
use crate::infrastructure::HttpFetcher;
use crate::models::pinyin::numbered_to_marked;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info};

/// 释义中含有这些内容的条目不适合放到练习纸上
const MEANING_FILTERS: [&str; 3] = ["variant of", "CL:", "(slang)"];

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\S+)\s+(\S+)\s+\[([^\]]*)\]\s+/(.*)/\s*$").expect("valid CEDICT line regex")
    })
}

/// 一条词典条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CedictEntry {
    pub traditional: String,
    pub simplified: String,
    /// 数字标调拼音，如 `shui3`
    pub pinyin: String,
    pub meanings: Vec<String>,
}

impl CedictEntry {
    /// 解析一行；注释、空行和格式错误的行返回 `None`
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let caps = line_regex().captures(line)?;
        let meanings = caps[4]
            .split('/')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self {
            traditional: caps[1].to_string(),
            simplified: caps[2].to_string(),
            pinyin: caps[3].trim().to_string(),
            meanings,
        })
    }

    /// 专有名词条目的拼音以大写字母开头
    fn is_proper_noun(&self) -> bool {
        self.pinyin.chars().next().is_some_and(char::is_uppercase)
    }
}

/// 过滤掉姓氏、异体字、量词说明和俚语释义
pub fn filter_meanings<'a>(meanings: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    meanings
        .into_iter()
        .filter(|m| !m.starts_with("surname"))
        .filter(|m| !MEANING_FILTERS.iter().any(|f| m.contains(f)))
        .cloned()
        .collect()
}

/// 内存中的单字词典
#[derive(Debug, Default)]
pub struct CedictDictionary {
    entries: Vec<CedictEntry>,
    /// 单字 → 条目下标（文件顺序）
    index: HashMap<char, Vec<usize>>,
}

impl CedictDictionary {
    /// 解析完整的词典文本
    pub fn parse(content: &str) -> Self {
        let mut dict = Self::default();
        let mut skipped = 0usize;

        for line in content.lines() {
            match CedictEntry::parse_line(line) {
                Some(entry) => dict.insert(entry),
                None if !line.trim().is_empty() && !line.starts_with('#') => skipped += 1,
                None => {}
            }
        }

        if skipped > 0 {
            debug!("跳过 {} 行无法解析的词典内容", skipped);
        }
        dict
    }

    fn insert(&mut self, entry: CedictEntry) {
        let single = |s: &str| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        };
        let keys: Vec<char> = [single(&entry.traditional), single(&entry.simplified)]
            .into_iter()
            .flatten()
            .collect();
        if keys.is_empty() {
            return;
        }

        let idx = self.entries.len();
        self.entries.push(entry);
        for key in keys {
            let slots = self.index.entry(key).or_default();
            if !slots.contains(&idx) {
                slots.push(idx);
            }
        }
    }

    /// 从本地路径或 http(s) 地址加载
    pub async fn load(source: &str, fetcher: &HttpFetcher) -> Result<Self, DictionaryError> {
        let content = if source.starts_with("http://") || source.starts_with("https://") {
            info!("🌐 正在下载词典: {}", source);
            fetcher
                .fetch_text(source)
                .await
                .map_err(|e| DictionaryError::Download {
                    url: source.to_string(),
                    source: e,
                })?
                .ok_or_else(|| DictionaryError::NotFound(source.to_string()))?
        } else {
            info!("📖 正在读取词典: {}", source);
            tokio::fs::read_to_string(source)
                .await
                .map_err(|e| DictionaryError::Read {
                    path: PathBuf::from(source),
                    source: e,
                })?
        };

        let dict = Self::parse(&content);
        info!("✓ 词典加载完成: {} 个单字条目", dict.len());
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 某个字的全部条目（文件顺序）
    pub fn entries_for(&self, character: char) -> Vec<&CedictEntry> {
        self.index
            .get(&character)
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// 查询拼音与释义
    ///
    /// 拼音取第一个普通（非专有名词）条目，没有则取第一个条目；
    /// 释义按条目顺序合并后过滤。
    pub fn lookup_entry(&self, character: char) -> Option<DictionaryEntry> {
        let entries = self.entries_for(character);
        if entries.is_empty() {
            return None;
        }

        let reading = entries
            .iter()
            .find(|e| !e.is_proper_noun())
            .or_else(|| entries.first())
            .map(|e| numbered_to_marked(&e.pinyin))
            .filter(|p| !p.is_empty());

        let meanings = filter_meanings(entries.iter().flat_map(|e| e.meanings.iter()));

        Some(DictionaryEntry {
            pinyin: reading,
            meanings,
        })
    }
}

#[async_trait]
impl DictionaryProvider for CedictDictionary {
    async fn lookup(&self, character: char) -> Result<Option<DictionaryEntry>> {
        Ok(self.lookup_entry(character))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# CC-CEDICT
#! version=1
水 水 [Shui3] /surname Shui/
水 水 [shui3] /water/river/liquid/beverage/CL:杯[bei1]/
水平 水平 [shui3 ping2] /level (of achievement etc)/
綠 绿 [lu:4] /green/
乾 干 [gan1] /dry/variant of 干[gan1]/
broken line without brackets
";

    #[test]
    fn parses_a_line() {
        let entry = CedictEntry::parse_line("綠 绿 [lu:4] /green/").unwrap();
        assert_eq!(entry.traditional, "綠");
        assert_eq!(entry.simplified, "绿");
        assert_eq!(entry.pinyin, "lu:4");
        assert_eq!(entry.meanings, vec!["green"]);
    }

    #[test]
    fn skips_comments_and_malformed_lines() {
        assert!(CedictEntry::parse_line("# comment").is_none());
        assert!(CedictEntry::parse_line("broken line without brackets").is_none());
        let dict = CedictDictionary::parse(SAMPLE);
        // 只索引单字条目
        assert_eq!(dict.len(), 4);
    }

    #[test]
    fn looks_up_by_traditional_or_simplified() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert_eq!(dict.entries_for('绿').len(), 1);
        assert_eq!(dict.entries_for('綠').len(), 1);
        assert_eq!(dict.lookup_entry('绿').unwrap().pinyin.as_deref(), Some("lǜ"));
    }

    #[test]
    fn prefers_common_reading_and_filters_meanings() {
        let dict = CedictDictionary::parse(SAMPLE);
        let entry = dict.lookup_entry('水').unwrap();
        assert_eq!(entry.pinyin.as_deref(), Some("shuǐ"));
        assert_eq!(entry.meanings, vec!["water", "river", "liquid", "beverage"]);
    }

    #[test]
    fn proper_noun_reading_is_used_when_nothing_else_exists() {
        let dict = CedictDictionary::parse("冼 冼 [Xian3] /surname Xian/\n");
        let entry = dict.lookup_entry('冼').unwrap();
        assert_eq!(entry.pinyin.as_deref(), Some("Xiǎn"));
        assert!(entry.meanings.is_empty());
    }

    #[test]
    fn drops_variant_definitions() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert_eq!(dict.lookup_entry('干').unwrap().meanings, vec!["dry"]);
    }

    #[test]
    fn unknown_character_is_none() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert!(dict.lookup_entry('火').is_none());
    }

    #[tokio::test]
    async fn loads_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cedict.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let fetcher = HttpFetcher::new(&crate::config::Config::default()).unwrap();
        let dict = CedictDictionary::load(path.to_str().unwrap(), &fetcher)
            .await
            .unwrap();
        assert!(!dict.is_empty());
    }

    #[tokio::test]
    async fn missing_local_file_is_an_error() {
        let fetcher = HttpFetcher::new(&crate::config::Config::default()).unwrap();
        let err = CedictDictionary::load("/nonexistent/cedict.txt", &fetcher)
            .await
            .unwrap_err();
        assert!(matches!(err, DictionaryError::Read { .. }));
    }
}
