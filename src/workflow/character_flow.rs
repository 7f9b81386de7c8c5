//! 单字处理流程 - 流程层
//!
//! 核心职责：定义"一个汉字"的完整处理流程
//!
//! 流程顺序：
//! 1. 获取素材（练习纸 / 笔顺图 / 拼音 / 释义）
//! 2. 排版成一页
//! 3. 练习纸缺失或无法解析时跳过该字

use tracing::{info, warn};

use crate::error::{AssetKind, AssetUnavailable};
use crate::models::{CharacterRequest, Page};
use crate::services::{AssetFetcher, PageComposer};
use crate::utils::logging::truncate_text;

/// 单字处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterOutcome {
    /// 页面已生成；`missing` 为空表示素材齐全
    Ready { page: Page, missing: Vec<AssetKind> },
    /// 跳过（练习纸不可用）
    Skipped(String),
}

/// 单字处理流程
///
/// - 编排素材获取与排版
/// - 不持有输出文档，页面交给编排层按顺序写入
/// - 可以在多个任务间共享
#[derive(Clone)]
pub struct CharacterFlow {
    fetcher: AssetFetcher,
    composer: PageComposer,
    verbose_logging: bool,
}

impl CharacterFlow {
    pub fn new(fetcher: AssetFetcher, composer: PageComposer, verbose_logging: bool) -> Self {
        Self {
            fetcher,
            composer,
            verbose_logging,
        }
    }

    pub async fn run(&self, request: &CharacterRequest) -> CharacterOutcome {
        info!("{} 🔍 正在获取素材...", request);

        let assets = match self.fetcher.lookup_character_assets(request).await {
            Ok(assets) => assets,
            Err(e) => return skipped(request, e),
        };
        let missing = assets.missing_kinds();

        if self.verbose_logging {
            info!(
                "{} 拼音: {} | 释义: {}",
                request,
                assets.pinyin.as_deref().unwrap_or("-"),
                truncate_text(&assets.meanings.join("; "), 60)
            );
        }

        match self.composer.compose(request, assets) {
            Ok(page) => {
                if missing.is_empty() {
                    info!("{} ✓ 素材齐全，页面已排版", request);
                } else {
                    let names: Vec<&str> = missing.iter().map(|k| k.label()).collect();
                    info!("{} ✓ 页面已排版（缺少: {}）", request, names.join("、"));
                }
                CharacterOutcome::Ready { page, missing }
            }
            Err(e) => skipped(request, e),
        }
    }
}

fn skipped(request: &CharacterRequest, e: AssetUnavailable) -> CharacterOutcome {
    warn!("{} ⏭️ 跳过: {}", request, e.reason);
    CharacterOutcome::Skipped(e.reason)
}
