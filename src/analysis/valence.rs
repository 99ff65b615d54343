//! # 价电子数统计
//!
//! 按位置（而非元素符号）将 POSCAR 成分与 POTCAR 条目配对：
//! 第 i 个 POTCAR 条目提供第 i 种元素的 ZVAL。
//!
//! 前提条件：POTCAR 的元素顺序与 POSCAR 一致。`total_valence` 不校验符号，
//! 顺序错位会得到错误但不报错的结果；需要校验时先调用 `check_alignment`。
//!
//! ## 依赖关系
//! - 使用 `models/structure.rs`, `models/potential.rs`

use crate::error::{OccubandError, Result};
use crate::models::{Composition, PotcarEntry};
use serde::Serialize;
use tabled::Tabled;

/// 单个元素的价电子贡献
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ValenceContribution {
    #[tabled(rename = "Element")]
    pub symbol: String,
    #[tabled(rename = "ZVAL")]
    pub zval: f64,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Contribution")]
    pub contribution: f64,
}

/// 价电子统计结果
#[derive(Debug, Clone, PartialEq)]
pub struct ValenceSummary {
    pub contributions: Vec<ValenceContribution>,
    pub total: f64,
    pub half: f64,
}

/// 计算总价电子数及其一半
///
/// 两侧元素数不同时报错，而不是截断。
pub fn total_valence(composition: &Composition, entries: &[PotcarEntry]) -> Result<ValenceSummary> {
    if composition.len() != entries.len() {
        return Err(OccubandError::ElementCountMismatch {
            structure: composition.len(),
            potential: entries.len(),
        });
    }

    let contributions: Vec<ValenceContribution> = composition
        .iter()
        .zip(entries)
        .map(|((symbol, count), entry)| ValenceContribution {
            symbol: symbol.to_string(),
            zval: entry.zval,
            count,
            contribution: entry.zval * count as f64,
        })
        .collect();

    let total: f64 = contributions.iter().map(|c| c.contribution).sum();

    Ok(ValenceSummary {
        contributions,
        total,
        half: total / 2.0,
    })
}

/// 严格模式：逐位置比较元素符号，返回第一处不一致
pub fn check_alignment(composition: &Composition, entries: &[PotcarEntry]) -> Result<()> {
    if composition.len() != entries.len() {
        return Err(OccubandError::ElementCountMismatch {
            structure: composition.len(),
            potential: entries.len(),
        });
    }

    match composition
        .iter()
        .zip(entries)
        .position(|((symbol, _), entry)| symbol != entry.symbol)
    {
        Some(i) => Err(OccubandError::SymbolMismatch {
            position: i + 1,
            structure: composition.elements()[i].to_string(),
            potential: entries[i].symbol.clone(),
        }),
        None => Ok(()),
    }
}
