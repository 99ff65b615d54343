//! # occuband - VASP 能带占据与价电子诊断工具
//!
//! 读取一次 VASP 计算的 OUTCAR、vasprun.xml、POTCAR、POSCAR，
//! 报告费米能、首末 k 点的占据能带数、总价电子数及最终磁矩。
//!
//! ## 子命令
//! - `report` - 完整诊断报告
//! - `occupancy` - 指定 k 点的占据能带数
//! - `valence` - 价电子统计
//! - `magnetization` - 最终电子数与磁矩
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (OUTCAR / vasprun.xml / POTCAR / POSCAR)
//!   │     ├── analysis/  (占据数与价电子统计)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (输入文件位置)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod analysis;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // 日志级别由 OCCUBAND_LOG 控制，默认只输出警告
    env_logger::init_from_env(env_logger::Env::new().filter_or("OCCUBAND_LOG", "warn"));

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
