//! # 子命令参数定义
//!
//! 所有子命令共享 `InputArgs`（输入文件位置），各自再加上专属参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/` 相应模块

use crate::config::InputPaths;
use crate::models::Spin;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// 输入文件
// ─────────────────────────────────────────────────────────────

/// 输入文件位置，默认取目录下的约定文件名
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Directory containing OUTCAR, vasprun.xml, POTCAR and POSCAR
    #[arg(short, long, env = "OCCUBAND_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// OUTCAR path (overrides <DIR>/OUTCAR)
    #[arg(long, env = "OCCUBAND_OUTCAR")]
    pub outcar: Option<PathBuf>,

    /// vasprun.xml path (overrides <DIR>/vasprun.xml)
    #[arg(long, env = "OCCUBAND_VASPRUN")]
    pub vasprun: Option<PathBuf>,

    /// POTCAR path (overrides <DIR>/POTCAR)
    #[arg(long, env = "OCCUBAND_POTCAR")]
    pub potcar: Option<PathBuf>,

    /// POSCAR path (overrides <DIR>/POSCAR)
    #[arg(long, env = "OCCUBAND_POSCAR")]
    pub poscar: Option<PathBuf>,
}

impl InputArgs {
    /// 构造显式的输入路径配置
    pub fn paths(&self) -> InputPaths {
        let mut paths = InputPaths::from_dir(&self.dir);
        if let Some(p) = &self.outcar {
            paths = paths.with_outcar(p);
        }
        if let Some(p) = &self.vasprun {
            paths = paths.with_vasprun(p);
        }
        if let Some(p) = &self.potcar {
            paths = paths.with_potcar(p);
        }
        if let Some(p) = &self.poscar {
            paths = paths.with_poscar(p);
        }
        paths
    }
}

// ─────────────────────────────────────────────────────────────
// 自旋通道选择
// ─────────────────────────────────────────────────────────────

/// 自旋通道选择
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SpinChoice {
    /// Spin-up channel (the only channel of non-polarized runs)
    #[default]
    Up,
    /// Spin-down channel
    Down,
    /// Every channel present in vasprun.xml
    Both,
}

impl SpinChoice {
    /// 按选择返回要统计的通道，`Both` 取文件中实际存在的通道
    pub fn channels(self, nspin: usize) -> Vec<Spin> {
        match self {
            SpinChoice::Up => vec![Spin::Up],
            SpinChoice::Down => vec![Spin::Down],
            SpinChoice::Both => [Spin::Up, Spin::Down].into_iter().take(nspin).collect(),
        }
    }
}

impl std::fmt::Display for SpinChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinChoice::Up => write!(f, "up"),
            SpinChoice::Down => write!(f, "down"),
            SpinChoice::Both => write!(f, "both"),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// report
// ─────────────────────────────────────────────────────────────

/// report 子命令参数
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Spin channel used for the occupied-band counts
    #[arg(long, value_enum, default_value_t = SpinChoice::Up)]
    pub spin: SpinChoice,

    /// Fail when POSCAR and POTCAR element symbols differ position by position
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

// ─────────────────────────────────────────────────────────────
// occupancy
// ─────────────────────────────────────────────────────────────

/// occupancy 子命令参数
#[derive(Args, Debug)]
pub struct OccupancyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// K-point indices, 0-based; negative values count from the end (e.g. "0,-1")
    #[arg(
        short,
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = vec![0isize, -1]
    )]
    pub kpoints: Vec<isize>,

    /// Spin channel(s) to count
    #[arg(long, value_enum, default_value_t = SpinChoice::Both)]
    pub spin: SpinChoice,

    /// Fermi energy in eV (default: read from OUTCAR)
    #[arg(long, allow_negative_numbers = true)]
    pub efermi: Option<f64>,
}

// ─────────────────────────────────────────────────────────────
// valence
// ─────────────────────────────────────────────────────────────

/// valence 子命令参数
#[derive(Args, Debug)]
pub struct ValenceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Fail when POSCAR and POTCAR element symbols differ position by position
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Also write the per-element table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// magnetization
// ─────────────────────────────────────────────────────────────

/// magnetization 子命令参数
#[derive(Args, Debug)]
pub struct MagnetizationArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_occupancy_negative_kpoints() {
        let cli = Cli::parse_from(["occuband", "occupancy", "-k", "0,-1,3", "--efermi", "-0.5"]);
        match cli.command {
            Commands::Occupancy(args) => {
                assert_eq!(args.kpoints, vec![0, -1, 3]);
                assert_eq!(args.efermi, Some(-0.5));
                assert_eq!(args.spin, SpinChoice::Both);
            }
            _ => panic!("expected occupancy"),
        }
    }

    #[test]
    fn test_occupancy_default_kpoints() {
        let cli = Cli::parse_from(["occuband", "occupancy"]);
        match cli.command {
            Commands::Occupancy(args) => assert_eq!(args.kpoints, vec![0, -1]),
            _ => panic!("expected occupancy"),
        }
    }

    #[test]
    fn test_input_overrides() {
        let cli = Cli::parse_from(["occuband", "report", "-d", "/calc", "--poscar", "/calc/CONTCAR"]);
        match cli.command {
            Commands::Report(args) => {
                let paths = args.input.paths();
                assert_eq!(paths.outcar, PathBuf::from("/calc/OUTCAR"));
                assert_eq!(paths.poscar, PathBuf::from("/calc/CONTCAR"));
                assert_eq!(args.spin, SpinChoice::Up);
                assert!(!args.strict);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_spin_choice_channels() {
        assert_eq!(SpinChoice::Both.channels(1), vec![Spin::Up]);
        assert_eq!(SpinChoice::Both.channels(2), vec![Spin::Up, Spin::Down]);
        assert_eq!(SpinChoice::Down.channels(1), vec![Spin::Down]);
    }
}
