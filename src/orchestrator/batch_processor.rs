//! 批量汉字处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量汉字的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建 HTTP 客户端、加载词典（失败时降级为无词典）、选定字体
//! 2. **并发控制**：使用 Semaphore 限制同时抓取的汉字数量
//! 3. **顺序保证**：按请求顺序等待任务，页面顺序与输入一致
//! 4. **输出写入**：全部汉字处理完后一次性写出 PDF
//! 5. **全局统计**：汇总完整 / 部分 / 跳过 / 非汉字输入数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个汉字的细节，委托给 `CharacterFlow`
//! - **资源所有者**：唯一持有输出文档的模块

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::clients::{
    CedictDictionary, DictionaryProvider, StrokeOrderClient, UnavailableDictionary, WorksheetProvider,
};
use crate::config::Config;
use crate::error::AssetKind;
use crate::infrastructure::HttpFetcher;
use crate::models::{CharacterRequest, ResolvedInput};
use crate::pdf::font::TextFont;
use crate::services::{AssetFetcher, DocumentWriter, PageComposer};
use crate::utils::logging::{error_chain, log_characters_loaded, log_startup, print_final_stats};
use crate::workflow::{CharacterFlow, CharacterOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<CharacterFlow>,
    font: TextFont,
}

impl App {
    /// 初始化应用：创建 HTTP 客户端、加载词典、选定字体
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let fetcher = HttpFetcher::new(&config).context("HTTP 客户端初始化失败")?;

        let dictionary = load_dictionary(&config.cedict_source, &fetcher).await;

        let worksheets = StrokeOrderClient::new(&config, fetcher);
        let font = TextFont::resolve(config.font_path.as_deref());

        Ok(Self::with_providers(config, Arc::new(worksheets), dictionary, font))
    }

    /// 使用指定的数据源和字体创建应用
    pub fn with_providers(
        config: Config,
        worksheets: Arc<dyn WorksheetProvider>,
        dictionary: Arc<dyn DictionaryProvider>,
        font: TextFont,
    ) -> Self {
        let flow = CharacterFlow::new(
            AssetFetcher::new(worksheets, dictionary),
            PageComposer::new(),
            config.verbose_logging,
        );
        Self {
            config,
            flow: Arc::new(flow),
            font,
        }
    }

    /// 运行应用主逻辑
    ///
    /// 输出文件无法写入时返回错误；单个汉字的失败只记录在统计中。
    pub async fn run(&self, input: &ResolvedInput) -> Result<RunSummary> {
        let mut summary = RunSummary {
            total: input.requests.len(),
            rejected: input.rejected.clone(),
            duplicates: input.duplicates,
            ..Default::default()
        };

        if input.is_empty() {
            warn!("⚠️ 没有需要处理的汉字，程序结束");
            return Ok(summary);
        }

        log_characters_loaded(summary.total, input.rejected.len(), input.duplicates);

        let outcomes = self.process_all(&input.requests).await?;

        // 按请求顺序写入页面
        let mut writer = DocumentWriter::new(self.font.clone());
        for (request, outcome) in input.requests.iter().zip(outcomes) {
            match outcome {
                CharacterOutcome::Ready { page, missing } => match writer.append(&page) {
                    Ok(()) if missing.is_empty() => summary.complete.push(request.character),
                    Ok(()) => summary.partial.push((request.character, missing)),
                    Err(e) => {
                        error!("{} ❌ 页面写入失败: {}", request, e);
                        summary.skipped.push((request.character, format!("页面写入失败: {}", e)));
                    }
                },
                CharacterOutcome::Skipped(reason) => summary.skipped.push((request.character, reason)),
            }
        }

        if writer.page_count() == 0 {
            error!("❌ 所有汉字都被跳过，不生成输出文件");
            print_final_stats(&summary);
            return Ok(summary);
        }

        let output_path = self.config.output_path();
        let written = writer
            .finish(&output_path)
            .await
            .with_context(|| format!("无法写入 {}", output_path.display()))?;
        summary.output_path = Some(written);

        print_final_stats(&summary);
        Ok(summary)
    }

    /// 并发获取素材并排版，结果顺序与 `requests` 一致
    async fn process_all(&self, requests: &[CharacterRequest]) -> Result<Vec<CharacterOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut handles = Vec::with_capacity(requests.len());

        for request in requests.iter().copied() {
            let semaphore = semaphore.clone();
            let flow = self.flow.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                anyhow::Ok(flow.run(&request).await)
            });
            handles.push((request, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (request, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    error!("{} 任务执行失败: {}", request, e);
                    CharacterOutcome::Skipped(format!("任务执行失败: {}", e))
                }
                Err(e) => {
                    error!("{} 任务执行失败: {}", request, e);
                    CharacterOutcome::Skipped(format!("任务执行失败: {}", e))
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// 加载 CC-CEDICT 词典
///
/// 词典不可用不会中止运行：记录警告后改用 `UnavailableDictionary`，
/// 每个汉字仍然生成页面，只是缺少拼音和释义。
pub async fn load_dictionary(source: &str, fetcher: &HttpFetcher) -> Arc<dyn DictionaryProvider> {
    match CedictDictionary::load(source, fetcher).await {
        Ok(dictionary) => Arc::new(dictionary),
        Err(e) => {
            let reason = error_chain(&e);
            warn!("⚠️ 词典加载失败，拼音和释义将缺失: {}", reason);
            Arc::new(UnavailableDictionary::new(reason))
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// 去重后的汉字总数
    pub total: usize,
    /// 素材齐全的汉字
    pub complete: Vec<char>,
    /// 生成了页面但缺少部分素材的汉字
    pub partial: Vec<(char, Vec<AssetKind>)>,
    /// 没有生成页面的汉字及原因
    pub skipped: Vec<(char, String)>,
    /// 被拒绝的非汉字输入
    pub rejected: Vec<char>,
    pub duplicates: usize,
    /// 写出的 PDF；没有页面时为 `None`
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    /// 输出文档的页数
    pub fn pages(&self) -> usize {
        self.complete.len() + self.partial.len()
    }

    /// 没有任何待处理的汉字
    pub fn nothing_to_process(&self) -> bool {
        self.total == 0
    }

    /// 有待处理的汉字但一页都没有生成
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.pages() == 0
    }
}
