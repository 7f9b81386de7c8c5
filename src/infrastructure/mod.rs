//! 基础设施层
//!
//! 持有稀缺资源（HTTP 连接池），只向上层暴露"按地址取字节"的能力。

pub mod http_client;

pub use http_client::HttpFetcher;
