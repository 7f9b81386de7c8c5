//! HTTP 下载器
//!
//! 所有外部请求都经过这里：统一超时、请求间隔和重试。

use crate::config::Config;
use crate::error::FetchError;
use crate::utils::logging::error_chain;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 重试前的基础等待时间，每次翻倍
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// 单次重试等待的上限
const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// HTTP 下载器
///
/// 内部的 `reqwest::Client` 自带连接池，可以安全地 clone 后在多个任务中共用。
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    request_delay: Duration,
    max_attempts: usize,
}

impl HttpFetcher {
    /// 按配置创建下载器
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(client, config.request_delay(), config.max_retries))
    }

    /// 复用已有的 `reqwest::Client`
    pub fn with_client(client: reqwest::Client, request_delay: Duration, max_attempts: usize) -> Self {
        Self {
            client,
            request_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 下载地址内容
    ///
    /// 返回 `Ok(None)` 表示资源不存在（HTTP 404/410），不会重试。
    pub async fn fetch_bytes(&self, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            if !self.request_delay.is_zero() {
                sleep(self.request_delay).await; // 避免请求过快
            }

            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if is_retryable(&e) && attempt < self.max_attempts => {
                    let backoff = backoff_delay(attempt);
                    warn!(
                        "请求失败 (尝试 {}/{}), {:?} 后重试: {}",
                        attempt,
                        self.max_attempts,
                        backoff,
                        error_chain(&e)
                    );
                    last_err = Some(e);
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| FetchError::HttpStatus {
            url: url.to_string(),
            status: 0,
        }))
    }

    /// 下载文本内容（UTF-8）
    pub async fn fetch_text(&self, url: &str) -> Result<Option<String>, FetchError> {
        Ok(self
            .fetch_bytes(url)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn try_fetch(&self, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!("{} 不存在 (HTTP {})", url, status.as_u16());
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("{} 下载完成: {} 字节", url, bytes.len());
        Ok(Some(bytes.to_vec()))
    }
}

/// 第 `attempt` 次失败后的等待时间：500ms、1s、2s……最多 30s
fn backoff_delay(attempt: usize) -> Duration {
    let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    BACKOFF_BASE
        .saturating_mul(2u32.saturating_pow(exponent))
        .min(BACKOFF_MAX)
}

/// 网络错误、限流和服务端错误可以重试
fn is_retryable(err: &FetchError) -> bool {
    match err {
        FetchError::Request { .. } => true,
        FetchError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        FetchError::Client(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 本地 HTTP 服务：第 n 个请求返回 `statuses[n]`（超出后重复最后一个），返回地址和请求计数
    async fn serve_statuses(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses[n.min(statuses.len() - 1)];
                let body = format!("body {}", status);
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/sheet", addr), hits)
    }

    fn local_fetcher() -> HttpFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpFetcher::with_client(client, Duration::ZERO, 3)
    }

    #[tokio::test]
    async fn not_found_is_none_without_retry() {
        let (url, hits) = serve_statuses(vec![404]).await;

        let body = local_fetcher().fetch_bytes(&url).await.unwrap();

        assert!(body.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_is_retried_until_success() {
        let (url, hits) = serve_statuses(vec![503, 200]).await;

        let body = local_fetcher().fetch_bytes(&url).await.unwrap();

        assert_eq!(body.as_deref(), Some(&b"body 200"[..]));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn forbidden_fails_without_retry() {
        let (url, hits) = serve_statuses(vec![403, 200]).await;

        let err = local_fetcher().fetch_bytes(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 403, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_text_decodes_body() {
        let (url, _) = serve_statuses(vec![200]).await;
        let text = local_fetcher().fetch_text(&url).await.unwrap();
        assert_eq!(text.as_deref(), Some("body 200"));
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(2));
        assert_eq!(backoff_delay(40), BACKOFF_MAX);
        assert_eq!(backoff_delay(usize::MAX), BACKOFF_MAX);
    }

    #[test]
    fn retries_only_transient_statuses() {
        let status = |status| FetchError::HttpStatus {
            url: "https://example.com".to_string(),
            status,
        };
        assert!(is_retryable(&status(429)));
        assert!(is_retryable(&status(503)));
        assert!(!is_retryable(&status(403)));
        assert!(!is_retryable(&status(400)));
    }

    #[test]
    fn builds_from_default_config() {
        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        assert_eq!(fetcher.max_attempts, 3);
        assert_eq!(fetcher.request_delay, Duration::from_millis(300));
    }
}
