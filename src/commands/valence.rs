//! # valence 子命令实现
//!
//! 读取 POTCAR/POSCAR，输出逐元素价电子贡献表、总价电子数及其一半，
//! 可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/args.rs` 定义的参数
//! - 使用 `analysis/valence.rs`, `commands/common.rs`
//! - 使用 `csv`, `tabled` crate

use super::common;
use crate::analysis::valence::{self, ValenceContribution};
use crate::cli::args::ValenceArgs;
use crate::config;
use crate::error::{OccubandError, Result};
use crate::utils::output;
use std::path::Path;
use tabled::Table;

/// 执行 valence
pub fn execute(args: ValenceArgs) -> Result<()> {
    let paths = args.input.paths();
    config::ensure_exists([paths.potcar.as_path(), paths.poscar.as_path()])?;

    let inputs = common::load_valence_inputs(&paths)?;
    common::verify_alignment(&inputs.composition, &inputs.entries, args.strict)?;
    let summary = valence::total_valence(&inputs.composition, &inputs.entries)?;

    output::print_header("Valence Electrons");
    output::print_info(&format!(
        "Structure '{}': {} atoms, {}",
        inputs.crystal.name,
        inputs.composition.num_atoms(),
        inputs.composition.formula()
    ));

    println!("{}", Table::new(&summary.contributions));
    println!(
        "Total valence electrons in the structure: {}",
        output::format_float(summary.total)
    );
    println!(
        "1/2 of the total valence electrons in the structure: {}",
        output::format_float(summary.half)
    );

    if let Some(csv_path) = &args.csv {
        save_contributions_csv(&summary.contributions, csv_path)?;
        output::print_success(&format!(
            "Valence table saved to '{}'",
            csv_path.display()
        ));
    }

    Ok(())
}

/// 保存逐元素贡献到 CSV
pub fn save_contributions_csv(rows: &[ValenceContribution], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush().map_err(|e| OccubandError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
