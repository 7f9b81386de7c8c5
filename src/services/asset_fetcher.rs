//! 素材获取服务 - 业务能力层
//!
//! 只负责"取回一个汉字的全部素材"，不关心排版和输出

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::{DictionaryEntry, DictionaryProvider, WorksheetProvider};
use crate::error::{AssetKind, AssetUnavailable};
use crate::models::assets::{Worksheet, WorksheetFormat};
use crate::models::{CharacterAssets, CharacterRequest};
use crate::pdf::raster::image_dimensions;

/// 素材获取服务
///
/// 职责：
/// - 并行执行练习纸、笔顺图、词典三项查询
/// - 练习纸拿不到时整个汉字不可用
/// - 其余素材缺失只记录诊断
#[derive(Clone)]
pub struct AssetFetcher {
    worksheets: Arc<dyn WorksheetProvider>,
    dictionary: Arc<dyn DictionaryProvider>,
}

impl AssetFetcher {
    pub fn new(worksheets: Arc<dyn WorksheetProvider>, dictionary: Arc<dyn DictionaryProvider>) -> Self {
        Self {
            worksheets,
            dictionary,
        }
    }

    /// 获取一个汉字的素材
    ///
    /// 三项查询互不影响；只有练习纸缺失会返回 [`AssetUnavailable`]。
    pub async fn lookup_character_assets(
        &self,
        request: &CharacterRequest,
    ) -> Result<CharacterAssets, AssetUnavailable> {
        let (worksheet, stroke_order, entry) = tokio::join!(
            self.worksheets.worksheet(request),
            self.worksheets.stroke_order(request),
            self.dictionary.lookup(request.character),
        );

        let worksheet = match worksheet {
            Ok(Some(bytes)) => validate_worksheet(bytes).map_err(|reason| AssetUnavailable {
                character: request.character,
                reason,
            })?,
            Ok(None) => {
                return Err(AssetUnavailable {
                    character: request.character,
                    reason: "数据源中没有该字的练习纸".to_string(),
                })
            }
            Err(e) => {
                return Err(AssetUnavailable {
                    character: request.character,
                    reason: format!("{:#}", e),
                })
            }
        };

        let mut assets = CharacterAssets {
            worksheet: Some(worksheet),
            ..Default::default()
        };

        match stroke_order {
            Ok(Some(bytes)) => match image_dimensions(&bytes) {
                Ok(_) => assets.stroke_order = Some(bytes),
                Err(e) => assets.record_missing(AssetKind::StrokeOrder, format!("无法识别的图片: {}", e)),
            },
            Ok(None) => assets.record_missing(AssetKind::StrokeOrder, "数据源中没有该字的笔顺图"),
            Err(e) => assets.record_missing(AssetKind::StrokeOrder, format!("{:#}", e)),
        }

        match entry {
            Ok(Some(entry)) => apply_dictionary_entry(&mut assets, entry),
            Ok(None) => {
                assets.record_missing(AssetKind::Pinyin, "词典中没有该字");
                assets.record_missing(AssetKind::Meanings, "词典中没有该字");
            }
            Err(e) => {
                let reason = format!("词典查询失败: {:#}", e);
                assets.record_missing(AssetKind::Pinyin, reason.clone());
                assets.record_missing(AssetKind::Meanings, reason);
            }
        }

        for missing in &assets.diagnostics {
            warn!("{} ⚠️ {}", request, missing);
        }
        debug!(
            "{} 素材: 拼音 {:?}, 释义 {} 条, 笔顺图 {}",
            request,
            assets.pinyin,
            assets.meanings.len(),
            if assets.stroke_order.is_some() { "有" } else { "无" }
        );

        Ok(assets)
    }
}

/// 空响应或者既不是 PDF 也不是可解码图片的内容（例如网站返回的 HTML 错误页）视为没有练习纸
fn validate_worksheet(bytes: Vec<u8>) -> Result<Worksheet, String> {
    if bytes.is_empty() {
        return Err("练习纸内容为空".to_string());
    }
    let worksheet = Worksheet::from_bytes(bytes);
    if worksheet.format == WorksheetFormat::Raster {
        image_dimensions(&worksheet.bytes).map_err(|e| format!("练习纸既不是 PDF 也不是图片: {}", e))?;
    }
    Ok(worksheet)
}

fn apply_dictionary_entry(assets: &mut CharacterAssets, entry: DictionaryEntry) {
    match entry.pinyin.filter(|p| !p.trim().is_empty()) {
        Some(pinyin) => assets.pinyin = Some(pinyin),
        None => assets.record_missing(AssetKind::Pinyin, "词典条目没有拼音"),
    }
    if entry.meanings.is_empty() {
        assets.record_missing(AssetKind::Meanings, "没有可用的英文释义");
    } else {
        assets.set_meanings(entry.meanings);
    }
}
