//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `parsers/`, `analysis/`, `utils/`
//! - 子模块: common, report, occupancy, valence, magnetization

pub mod common;
pub mod magnetization;
pub mod occupancy;
pub mod report;
pub mod valence;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Report(args) => report::execute(args),
        Commands::Occupancy(args) => occupancy::execute(args),
        Commands::Valence(args) => valence::execute(args),
        Commands::Magnetization(args) => magnetization::execute(args),
    }
}
