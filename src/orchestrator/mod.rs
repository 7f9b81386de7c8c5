//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<CharacterRequest>，持有输出文档)
//!     ↓
//! workflow::CharacterFlow (处理单个汉字)
//!     ↓
//! services (能力层：素材获取 / 排版 / 文档写入)
//!     ↓
//! clients + infrastructure (数据源、HTTP)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有输出文档
//! 2. **向下依赖**：编排层 → workflow → services → clients → infrastructure
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;

pub use batch_processor::{load_dictionary, App, RunSummary};
