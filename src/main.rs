use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use hanzi_worksheet::utils::logging;
use hanzi_worksheet::{resolve_characters, App, Config};

/// 把汉字生成带田字格、笔顺、拼音和英文释义的 PDF 练习册
#[derive(Debug, Parser)]
#[command(name = "hanzi-worksheet", version, about)]
struct Cli {
    /// 要处理的汉字（可以多个，也可以直接写成一串）
    #[arg(short = 'c', long = "characters", num_args = 1..)]
    characters: Vec<String>,

    /// 包含汉字的文本文件（空白或换行分隔）
    #[arg(short = 'f', long = "files", num_args = 1..)]
    files: Vec<PathBuf>,

    /// 输出文件名（不含 .pdf）
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// 输出目录
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// 用于拼音和释义的 TrueType 字体
    #[arg(long = "font")]
    font: Option<PathBuf>,

    /// CC-CEDICT 词典（本地路径或 http(s) 地址）
    #[arg(long = "cedict")]
    cedict: Option<String>,

    /// 同时抓取的汉字数量
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// 显示详细日志
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    /// 默认值 → TOML → 环境变量 → 命令行
    fn load_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        let mut config = base.with_env()?;

        if let Some(name) = &self.name {
            config.output_name = name.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        if let Some(cedict) = &self.cedict {
            config.cedict_source = cedict.clone();
        }
        if let Some(jobs) = self.jobs {
            config.max_concurrent_fetches = jobs;
        }
        if self.verbose {
            config.verbose_logging = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.load_config().context("配置加载失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 输入文件有问题时在下载词典之前就退出
    let input = resolve_characters(&cli.characters, &cli.files).await?;
    if input.is_empty() {
        info!("没有需要处理的汉字");
        return Ok(ExitCode::SUCCESS);
    }

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    let summary = app.run(&input).await?;

    if summary.all_failed() {
        error!("❌ {} 个汉字全部失败", summary.total);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
