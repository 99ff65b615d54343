//! # 分析模块
//!
//! 基于解析结果的派生计算：能带占据数与价电子数。
//! 两个引擎都是纯函数，不读文件。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`
//! - 子模块: occupancy, valence

pub mod occupancy;
pub mod valence;
