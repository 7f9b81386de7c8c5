//! 拼音格式转换
//!
//! CC-CEDICT 使用数字标调（`shui3`、`lu:4`），页面上显示带声调符号的拼音（`shuǐ`、`lǜ`）。
//! 内置字体无法显示声调符号时再转回数字标调。

/// 元音及其四个声调形式
const TONE_TABLE: [(char, [char; 4]); 12] = [
    ('a', ['ā', 'á', 'ǎ', 'à']),
    ('e', ['ē', 'é', 'ě', 'è']),
    ('i', ['ī', 'í', 'ǐ', 'ì']),
    ('o', ['ō', 'ó', 'ǒ', 'ò']),
    ('u', ['ū', 'ú', 'ǔ', 'ù']),
    ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
    ('A', ['Ā', 'Á', 'Ǎ', 'À']),
    ('E', ['Ē', 'É', 'Ě', 'È']),
    ('I', ['Ī', 'Í', 'Ǐ', 'Ì']),
    ('O', ['Ō', 'Ó', 'Ǒ', 'Ò']),
    ('U', ['Ū', 'Ú', 'Ǔ', 'Ù']),
    ('Ü', ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ']),
];

fn is_vowel(ch: char) -> bool {
    TONE_TABLE.iter().any(|(base, _)| *base == ch)
}

fn with_tone(base: char, tone: u8) -> char {
    TONE_TABLE
        .iter()
        .find(|(b, _)| *b == base)
        .map(|(_, marks)| marks[(tone - 1) as usize])
        .unwrap_or(base)
}

/// 把 CEDICT 的数字标调拼音转换为声调符号形式
///
/// 多个音节以空格分隔；无法识别的音节（标点、`xx5` 之类）原样保留，只去掉轻声的 5。
pub fn numbered_to_marked(numbered: &str) -> String {
    numbered
        .split_whitespace()
        .map(convert_syllable)
        .collect::<Vec<_>>()
        .join(" ")
}

fn convert_syllable(syllable: &str) -> String {
    let normalized = syllable
        .replace("u:", "ü")
        .replace("U:", "Ü")
        .replace('v', "ü")
        .replace('V', "Ü");

    let Some(last) = normalized.chars().last() else {
        return String::new();
    };
    let Some(tone) = last.to_digit(10).filter(|d| (1..=5).contains(d)) else {
        return normalized;
    };
    let body: Vec<char> = normalized.chars().take(normalized.chars().count() - 1).collect();

    if tone == 5 {
        return body.into_iter().collect();
    }

    match mark_position(&body) {
        Some(pos) => body
            .iter()
            .enumerate()
            .map(|(i, &ch)| if i == pos { with_tone(ch, tone as u8) } else { ch })
            .collect(),
        None => body.into_iter().collect(),
    }
}

/// 声调标注位置：a/e 优先，ou 标在 o 上，其余标在最后一个元音上
fn mark_position(body: &[char]) -> Option<usize> {
    if let Some(pos) = body
        .iter()
        .position(|c| matches!(c, 'a' | 'e' | 'A' | 'E'))
    {
        return Some(pos);
    }
    if let Some(pos) = body
        .windows(2)
        .position(|w| matches!(w[0], 'o' | 'O') && w[1] == 'u')
    {
        return Some(pos);
    }
    body.iter().rposition(|&c| is_vowel(c))
}

/// 把声调符号形式转回数字标调（`shuǐ` → `shui3`）
///
/// 无声调符号的音节保持不变。
pub fn marked_to_numbered(marked: &str) -> String {
    marked
        .split_whitespace()
        .map(|syllable| {
            let mut tone = None;
            let mut out: String = syllable
                .chars()
                .map(|ch| match strip_tone(ch) {
                    Some((base, t)) => {
                        tone = Some(t);
                        base
                    }
                    None => ch,
                })
                .collect();
            if let Some(t) = tone {
                out.push(char::from(b'0' + t));
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_tone(ch: char) -> Option<(char, u8)> {
    TONE_TABLE.iter().find_map(|(base, marks)| {
        marks
            .iter()
            .position(|&m| m == ch)
            .map(|i| (*base, i as u8 + 1))
    })
}
