//! 单个待处理汉字

use std::fmt::Display;

/// CJK 统一表意文字及兼容表意文字的码位范围
const CJK_RANGES: [(u32, u32); 12] = [
    (0x4E00, 0x9FFF),   // CJK Unified Ideographs
    (0x3400, 0x4DBF),   // Extension A
    (0x20000, 0x2A6DF), // Extension B
    (0x2A700, 0x2B73F), // Extension C
    (0x2B740, 0x2B81F), // Extension D
    (0x2B820, 0x2CEAF), // Extension E
    (0x2CEB0, 0x2EBEF), // Extension F
    (0x30000, 0x3134F), // Extension G
    (0x31350, 0x323AF), // Extension H
    (0x2EBF0, 0x2EE5F), // Extension I
    (0xF900, 0xFAFF),   // CJK Compatibility Ideographs
    (0x2F800, 0x2FA1F), // CJK Compatibility Ideographs Supplement
];

/// 判断字符是否为汉字
pub fn is_chinese_char(ch: char) -> bool {
    let code_point = ch as u32;
    CJK_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code_point))
}

/// 一个待处理的汉字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterRequest {
    /// 汉字本身
    pub character: char,
    /// 在处理序列中的位置（从1开始，仅用于日志显示）
    pub index: usize,
}

impl CharacterRequest {
    /// 创建请求；非汉字返回 `None`
    pub fn new(character: char, index: usize) -> Option<Self> {
        is_chinese_char(character).then_some(Self { character, index })
    }

    /// 十进制 Unicode 码位
    pub fn codepoint(&self) -> u32 {
        self.character as u32
    }
}

impl Display for CharacterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[汉字 {} '{}' U+{:04X}]", self.index, self.character, self.codepoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_and_extension_ideographs() {
        assert!(is_chinese_char('水'));
        assert!(is_chinese_char('㐀'));
        assert!(is_chinese_char('\u{20000}'));
        assert!(is_chinese_char('\u{F900}'));
    }

    #[test]
    fn rejects_non_ideographs() {
        for ch in ['a', '1', '。', 'あ', '한', ' '] {
            assert!(!is_chinese_char(ch), "{ch:?}");
        }
    }

    #[test]
    fn request_requires_ideograph() {
        assert!(CharacterRequest::new('x', 1).is_none());
        let req = CharacterRequest::new('水', 3).unwrap();
        assert_eq!(req.codepoint(), 27700);
        assert_eq!(req.to_string(), "[汉字 3 '水' U+6C34]");
    }
}
