//! 错误类型
//!
//! 文件级错误（输入文件、输出文件）会中止整次运行；
//! 单个汉字的素材错误只影响该汉字。

use std::path::PathBuf;

/// 输入文件不可读
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("无法读取输入文件 {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 输出文件无法写入
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("无法创建输出目录 {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法写入输出文件 {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF 序列化失败: {0}")]
    Pdf(#[from] PdfError),
    #[error("文档中没有任何页面")]
    EmptyDocument,
}

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    #[error("配置项 {field} 无效: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 词典来源无法加载
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("无法读取词典文件 {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法下载词典 {url}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("词典 {0} 不存在")]
    NotFound(String),
}

/// HTTP 层错误
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 网络请求失败（DNS、TLS、超时等）
    #[error("请求失败 ({url})")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非 2xx 状态码
    #[error("服务器返回 HTTP {status} ({url})")]
    HttpStatus { url: String, status: u16 },
    #[error("HTTP 客户端初始化失败")]
    Client(#[source] reqwest::Error),
}

/// PDF 处理错误
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("lopdf: {0}")]
    Lopdf(#[from] lopdf::Error),
    #[error("图片解码失败: {0}")]
    Image(#[from] image::ImageError),
    #[error("字体解析失败: {0}")]
    Font(String),
    #[error("压缩失败: {0}")]
    Compress(#[from] std::io::Error),
    #[error("练习纸 PDF 中没有页面")]
    NoPages,
    #[error("PDF 结构错误: {0}")]
    Malformed(&'static str),
}

/// 某个汉字的主要素材（练习纸）无法获取，该汉字被跳过
#[derive(Debug, thiserror::Error)]
#[error("汉字 '{character}' 的练习纸无法获取: {reason}")]
pub struct AssetUnavailable {
    pub character: char,
    pub reason: String,
}

/// 素材类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Worksheet,
    StrokeOrder,
    Pinyin,
    Meanings,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Worksheet => "练习纸",
            AssetKind::StrokeOrder => "笔顺图",
            AssetKind::Pinyin => "拼音",
            AssetKind::Meanings => "英文释义",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 次要素材缺失（只记录诊断，不跳过汉字）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}缺失: {reason}")]
pub struct PartialAssetMissing {
    pub kind: AssetKind,
    pub reason: String,
}

impl PartialAssetMissing {
    pub fn new(kind: AssetKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}
