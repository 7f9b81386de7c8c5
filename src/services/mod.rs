//! 业务能力层（Services）
//!
//! 每个服务只处理单个汉字或单个文档，不关心批量和并发。

pub mod asset_fetcher;
pub mod document_writer;
pub mod page_composer;

pub use asset_fetcher::AssetFetcher;
pub use document_writer::DocumentWriter;
pub use page_composer::{PageComposer, PageLayout};
