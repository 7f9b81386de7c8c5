use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件 → 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 练习纸下载地址模板，`{codepoint}` 会被替换为十进制码位
    pub worksheet_url_template: String,
    /// 笔顺图下载地址模板
    pub stroke_order_url_template: String,
    /// CC-CEDICT 词典来源（本地路径或 http(s) 地址）
    pub cedict_source: String,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 输出文件名（不含扩展名）
    pub output_name: String,
    /// 正文字体（TrueType），为空时自动查找系统字体
    pub font_path: Option<PathBuf>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每次请求前的间隔（毫秒）
    pub request_delay_ms: u64,
    /// 单个请求的最大尝试次数
    pub max_retries: usize,
    /// 同时抓取的汉字数量
    pub max_concurrent_fetches: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worksheet_url_template:
                "https://www.strokeorder.com/assets/bishun/worksheets/pdf/2/{codepoint}.pdf"
                    .to_string(),
            stroke_order_url_template:
                "https://www.strokeorder.com/assets/bishun/guide/{codepoint}.png".to_string(),
            cedict_source: "data/cedict_1_0_ts_utf-8_mdbg.txt".to_string(),
            output_dir: PathBuf::from("output"),
            output_name: "combined_worksheet".to_string(),
            font_path: None,
            request_timeout_secs: 30,
            request_delay_ms: 300,
            max_retries: 3,
            max_concurrent_fetches: 4,
            verbose_logging: false,
            user_agent: concat!("hanzi-worksheet/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// 读取 TOML 配置文件，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = var("WORKSHEET_URL_TEMPLATE") {
            self.worksheet_url_template = v;
        }
        if let Some(v) = var("STROKE_ORDER_URL_TEMPLATE") {
            self.stroke_order_url_template = v;
        }
        if let Some(v) = var("CEDICT_SOURCE") {
            self.cedict_source = v;
        }
        if let Some(v) = var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = var("FONT_PATH") {
            self.font_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("USER_AGENT") {
            self.user_agent = v;
        }
        self.request_timeout_secs =
            parse_var(&var, "REQUEST_TIMEOUT_SECS", "u64")?.unwrap_or(self.request_timeout_secs);
        self.request_delay_ms =
            parse_var(&var, "REQUEST_DELAY_MS", "u64")?.unwrap_or(self.request_delay_ms);
        self.max_retries = parse_var(&var, "MAX_RETRIES", "usize")?.unwrap_or(self.max_retries);
        self.max_concurrent_fetches = parse_var(&var, "MAX_CONCURRENT_FETCHES", "usize")?
            .unwrap_or(self.max_concurrent_fetches);
        self.verbose_logging =
            parse_var(&var, "VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging);
        Ok(self)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_name",
                reason: "输出文件名不能为空".to_string(),
            });
        }
        if self.output_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                field: "output_name",
                reason: format!("输出文件名不能包含路径分隔符: {}", self.output_name),
            });
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_fetches",
                reason: "至少为 1".to_string(),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_retries",
                reason: "至少为 1".to_string(),
            });
        }
        for (field, template) in [
            ("worksheet_url_template", &self.worksheet_url_template),
            ("stroke_order_url_template", &self.stroke_order_url_template),
        ] {
            if !template.contains("{codepoint}") {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("地址模板缺少 {{codepoint}}: {}", template),
                });
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 最终输出文件路径
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.output_name))
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type,
            }),
    }
}
