//! # Hanzi Worksheet
//!
//! 把一组汉字生成一份可打印的 PDF 练习册：每个汉字一页，
//! 包含田字格练习纸、笔顺图、拼音和最多三条英文释义。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 共享的 HTTP 客户端，负责超时、重试和请求间隔
//! - `clients/` - 具体数据源（strokeorder.com、CC-CEDICT），藏在 trait 后面
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个汉字或单个文档
//! - `AssetFetcher` - 获取一个汉字的全部素材
//! - `PageComposer` - 把素材排成一页
//! - `DocumentWriter` - 按顺序收集页面并原子写入 PDF
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个汉字"的完整处理流程（取素材 → 排版 → 跳过兜底）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 并发调度、页面顺序、输出文件和统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod pdf;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use models::{resolve_characters, CharacterRequest, ResolvedInput};
pub use orchestrator::{App, RunSummary};
pub use workflow::{CharacterFlow, CharacterOutcome};
