//! # 赝势数据模型
//!
//! 单个元素的 POTCAR 数据块及其价电子数 ZVAL。
//!
//! ## 依赖关系
//! - 被 `parsers/potcar.rs` 构造
//! - 被 `analysis/valence.rs` 使用

use serde::{Deserialize, Serialize};

/// 单元素 POTCAR 条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotcarEntry {
    /// 元素符号，如 `Fe`
    pub symbol: String,

    /// 赝势标签，如 `Fe_pv`
    pub label: String,

    /// 数据块首行，如 `PAW_PBE Fe_pv 02Aug2007`
    pub header: String,

    /// 价电子数
    pub zval: f64,

    /// 原始数据块
    #[serde(skip)]
    pub content: String,
}
