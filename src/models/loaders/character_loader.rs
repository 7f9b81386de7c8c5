//! 待处理汉字列表的解析
//!
//! 命令行直接给出的汉字在前，文件中的汉字在后（文件按参数顺序）。
//! 每个以空白分隔的词元都按字符拆开；非汉字字符会被拒绝并计入统计，
//! 重复的汉字只保留第一次出现。

use crate::error::InputError;
use crate::models::character::{is_chinese_char, CharacterRequest};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedInput {
    /// 去重后的处理序列
    pub requests: Vec<CharacterRequest>,
    /// 被拒绝的非汉字字符（按出现顺序）
    pub rejected: Vec<char>,
    /// 被去掉的重复汉字数量
    pub duplicates: usize,
}

impl ResolvedInput {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// 读取文件中以空白或换行分隔的词元
pub async fn read_characters_from_file(path: &Path) -> Result<Vec<String>, InputError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content.split_whitespace().map(str::to_string).collect())
}

/// 合并命令行汉字与文件汉字，得到有序的处理序列
pub async fn resolve_characters(
    explicit: &[String],
    files: &[PathBuf],
) -> Result<ResolvedInput, InputError> {
    let mut tokens: Vec<String> = explicit
        .iter()
        .flat_map(|arg| arg.split_whitespace().map(str::to_string))
        .collect();

    for file in files {
        info!("📄 正在读取: {}", file.display());
        let file_tokens = read_characters_from_file(file).await?;
        debug!("{} 中有 {} 个词元", file.display(), file_tokens.len());
        tokens.extend(file_tokens);
    }

    Ok(resolve_tokens(&tokens))
}

/// 把词元序列转换为处理序列
pub fn resolve_tokens<S: AsRef<str>>(tokens: &[S]) -> ResolvedInput {
    let mut resolved = ResolvedInput::default();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.as_ref();
        if token.chars().count() > 1 {
            debug!("词元 '{}' 包含多个字符，按字符拆分", token);
        }

        for ch in token.chars() {
            if !is_chinese_char(ch) {
                warn!("⚠️ '{}' 不是汉字，已忽略", ch);
                resolved.rejected.push(ch);
                continue;
            }
            if !seen.insert(ch) {
                debug!("'{}' 重复出现，只处理一次", ch);
                resolved.duplicates += 1;
                continue;
            }
            let index = resolved.requests.len() + 1;
            if let Some(request) = CharacterRequest::new(ch, index) {
                resolved.requests.push(request);
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn chars(resolved: &ResolvedInput) -> String {
        resolved.requests.iter().map(|r| r.character).collect()
    }

    #[test]
    fn splits_multi_character_tokens() {
        let resolved = resolve_tokens(&["水火", "山"]);
        assert_eq!(chars(&resolved), "水火山");
        assert_eq!(
            resolved.requests.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn keeps_first_occurrence_of_duplicates() {
        let resolved = resolve_tokens(&["水", "火", "水"]);
        assert_eq!(chars(&resolved), "水火");
        assert_eq!(resolved.duplicates, 1);
    }

    #[test]
    fn rejects_non_chinese_characters() {
        let resolved = resolve_tokens(&["a水", "1"]);
        assert_eq!(chars(&resolved), "水");
        assert_eq!(resolved.rejected, vec!['a', '1']);
    }

    #[tokio::test]
    async fn explicit_characters_come_before_file_characters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "山 火\n木").unwrap();

        let resolved = resolve_characters(&["水".to_string()], &[file.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(chars(&resolved), "水山火木");
    }

    #[tokio::test]
    async fn empty_file_is_not_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_characters(&[], &[file.path().to_path_buf()])
            .await
            .unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_input_error() {
        let err = resolve_characters(&[], &[PathBuf::from("/nonexistent/chars.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Unreadable { .. }));
    }
}
