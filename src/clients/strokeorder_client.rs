/// strokeorder.com 客户端
///
/// 练习纸和笔顺图都按十进制码位寻址
use crate::clients::WorksheetProvider;
use crate::config::Config;
use crate::infrastructure::HttpFetcher;
use crate::models::CharacterRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;

pub struct StrokeOrderClient {
    fetcher: HttpFetcher,
    worksheet_url_template: String,
    stroke_order_url_template: String,
}

impl StrokeOrderClient {
    /// 创建新的客户端
    pub fn new(config: &Config, fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            worksheet_url_template: config.worksheet_url_template.clone(),
            stroke_order_url_template: config.stroke_order_url_template.clone(),
        }
    }

    pub fn worksheet_url(&self, request: &CharacterRequest) -> String {
        expand_template(&self.worksheet_url_template, request)
    }

    pub fn stroke_order_url(&self, request: &CharacterRequest) -> String {
        expand_template(&self.stroke_order_url_template, request)
    }
}

#[async_trait]
impl WorksheetProvider for StrokeOrderClient {
    async fn worksheet(&self, request: &CharacterRequest) -> Result<Option<Vec<u8>>> {
        let url = self.worksheet_url(request);
        self.fetcher
            .fetch_bytes(&url)
            .await
            .with_context(|| format!("下载练习纸失败: {}", url))
    }

    async fn stroke_order(&self, request: &CharacterRequest) -> Result<Option<Vec<u8>>> {
        let url = self.stroke_order_url(request);
        self.fetcher
            .fetch_bytes(&url)
            .await
            .with_context(|| format!("下载笔顺图失败: {}", url))
    }
}

/// 替换模板中的 `{codepoint}` 与 `{char}`
fn expand_template(template: &str, request: &CharacterRequest) -> String {
    template
        .replace("{codepoint}", &request.codepoint().to_string())
        .replace("{char}", &request.character.to_string())
}
