//! # report 子命令实现
//!
//! 完整流程：OUTCAR 费米能 → vasprun.xml 首末 k 点占据能带数 →
//! POTCAR/POSCAR 价电子统计 → OUTCAR 最终磁矩。
//!
//! 全部读取完成后才输出，任何致命错误都不会留下半份报告。
//!
//! ## 依赖关系
//! - 使用 `cli/args.rs` 定义的参数
//! - 使用 `parsers/`, `analysis/`, `commands/common.rs`

use super::common;
use crate::analysis::occupancy::{count_occupied, count_occupied_in};
use crate::analysis::valence::{self, ValenceSummary};
use crate::cli::args::{ReportArgs, SpinChoice};
use crate::config::{self, InputPaths};
use crate::error::Result;
use crate::models::{MagnetizationRecord, Spin};
use crate::parsers::outcar;
use crate::utils::output::{format_float, magnetization_line};
use std::fmt::Write;

/// 某个自旋通道首末 k 点的占据能带数
#[derive(Debug, Clone, PartialEq)]
struct OccupiedCounts {
    spin: Spin,
    first: usize,
    last: usize,
}

/// 执行 report
pub fn execute(args: ReportArgs) -> Result<()> {
    let paths = args.input.paths();
    let report = build_report(&paths, args.spin, args.strict)?;
    print!("{}", report);
    Ok(())
}

/// 读取全部输入并生成报告文本
pub fn build_report(paths: &InputPaths, spin: SpinChoice, strict: bool) -> Result<String> {
    config::ensure_exists(paths.all())?;

    let fermi = outcar::extract_fermi(&paths.outcar)?;

    let bands = common::load_bands(&paths.vasprun, fermi)?;
    let occupied = spin
        .channels(bands.nspin())
        .into_iter()
        .map(|s| {
            let count = |k: isize| match s {
                Spin::Up => count_occupied(&bands, fermi, k),
                Spin::Down => count_occupied_in(&bands, s, fermi, k),
            };
            Ok(OccupiedCounts {
                spin: s,
                first: count(0)?,
                last: count(-1)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let inputs = common::load_valence_inputs(paths)?;
    common::verify_alignment(&inputs.composition, &inputs.entries, strict)?;
    let summary = valence::total_valence(&inputs.composition, &inputs.entries)?;

    let magnetization = outcar::scan_magnetization(&paths.outcar)?;

    Ok(render_report(fermi, &occupied, &summary, magnetization.as_ref()))
}

fn render_report(
    fermi: f64,
    occupied: &[OccupiedCounts],
    summary: &ValenceSummary,
    magnetization: Option<&MagnetizationRecord>,
) -> String {
    let mut out = String::new();

    // String 写入不会失败
    let _ = writeln!(out, "Fermi energy from OUTCAR: {}", format_float(fermi));

    for c in occupied {
        let _ = writeln!(
            out,
            "Number of occupied bands at the first k-point ({}): {}",
            c.spin, c.first
        );
        let _ = writeln!(
            out,
            "Number of occupied bands at the last k-point ({}): {}",
            c.spin, c.last
        );
    }

    for c in &summary.contributions {
        let _ = writeln!(
            out,
            "Element: {}, ZVAL: {}, Count: {}, Valence Contribution: {}",
            c.symbol,
            format_float(c.zval),
            c.count,
            format_float(c.contribution)
        );
    }

    let _ = writeln!(
        out,
        "Total valence electrons in the structure: {}",
        format_float(summary.total)
    );
    let _ = writeln!(
        out,
        "1/2 of the total valence electrons in the structure: {}",
        format_float(summary.half)
    );
    let _ = writeln!(out, "{}", magnetization_line(magnetization));

    out
}
