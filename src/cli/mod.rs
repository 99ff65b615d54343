//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `report`: 完整报告（费米能、占据能带、价电子、磁矩）
//! - `occupancy`: 任意 k 点的占据能带数
//! - `valence`: 价电子统计表
//! - `magnetization`: 自洽收敛时的磁矩
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: args

pub mod args;

use clap::{Parser, Subcommand};

/// occuband - VASP 能带占据与价电子诊断工具
#[derive(Parser)]
#[command(name = "occuband")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Band occupancy and valence electron diagnostics for VASP calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Print Fermi energy, occupied bands, valence electrons and magnetization
    Report(args::ReportArgs),

    /// Count occupied bands at selected k-points
    Occupancy(args::OccupancyArgs),

    /// Total and half valence electron count from POTCAR and POSCAR
    Valence(args::ValenceArgs),

    /// Final electron count and magnetization from the OUTCAR SCF log
    Magnetization(args::MagnetizationArgs),
}
