//! # 自洽迭代结果数据模型
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 构造
//! - 被 `commands/` 输出

use serde::{Deserialize, Serialize};

/// OUTCAR 中最后一条 `number of electron ... magnetization ...` 记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetizationRecord {
    /// 电子数
    pub electrons: f64,

    /// 磁矩 (µB)
    pub magnetization: f64,
}
