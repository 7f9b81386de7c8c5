//! 流程层（Workflow）
//!
//! 定义"一个汉字"从取素材到排版的完整流程。

pub mod character_flow;

pub use character_flow::{CharacterFlow, CharacterOutcome};
