//! # 数据模型模块
//!
//! 定义能带、晶体结构、赝势条目与自洽结果的数据模型。
//! 所有模型构造后只读。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/` 和 `commands/` 使用
//! - 子模块: bands, potential, scf, structure

pub mod bands;
pub mod potential;
pub mod scf;
pub mod structure;

pub use bands::{BandStructure, Spin};
pub use potential::PotcarEntry;
pub use scf::MagnetizationRecord;
pub use structure::{Atom, Composition, Crystal, Lattice};
