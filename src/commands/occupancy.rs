//! # occupancy 子命令实现
//!
//! 在任意 k 点（支持负下标）和自旋通道上统计占据能带数，
//! 以表格形式输出。费米能默认取 OUTCAR 中最后一次出现的值。
//!
//! ## 依赖关系
//! - 使用 `cli/args.rs` 定义的参数
//! - 使用 `analysis/occupancy.rs`, `commands/common.rs`

use super::common;
use crate::analysis::occupancy::{count_occupied_in, resolve_kpoint_index};
use crate::cli::args::{OccupancyArgs, SpinChoice};
use crate::config;
use crate::error::{OccubandError, Result};
use crate::models::BandStructure;
use crate::parsers::outcar;
use crate::utils::output;
use tabled::{Table, Tabled};

/// 表格行
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct OccupancyRow {
    #[tabled(rename = "K-point")]
    pub requested: isize,
    #[tabled(rename = "Index")]
    pub index: usize,
    #[tabled(rename = "Coordinates")]
    pub coordinates: String,
    #[tabled(rename = "Spin")]
    pub spin: String,
    #[tabled(rename = "Occupied bands")]
    pub occupied: usize,
}

/// 执行 occupancy
pub fn execute(args: OccupancyArgs) -> Result<()> {
    let paths = args.input.paths();

    if args.kpoints.is_empty() {
        return Err(OccubandError::InvalidArgument(
            "at least one k-point index is required".to_string(),
        ));
    }
    if let Some(e) = args.efermi.filter(|e| !e.is_finite()) {
        return Err(OccubandError::InvalidArgument(format!(
            "E-fermi must be a finite number, got {}",
            e
        )));
    }

    let fermi = match args.efermi {
        Some(e) => e,
        None => {
            config::ensure_exists([paths.outcar.as_path()])?;
            outcar::extract_fermi(&paths.outcar)?
        }
    };

    config::ensure_exists([paths.vasprun.as_path()])?;
    let bands = common::load_bands(&paths.vasprun, fermi)?;

    let rows = occupancy_rows(&bands, fermi, &args.kpoints, args.spin)?;

    output::print_header("Occupied Bands");
    output::print_info(&format!(
        "E-fermi = {} eV ({})",
        output::format_float(fermi),
        if args.efermi.is_some() {
            "command line"
        } else {
            "OUTCAR"
        }
    ));
    output::print_info(&format!(
        "{}, {} bands, {} k-points",
        if bands.is_spin_polarized() {
            "spin-polarized"
        } else {
            "non-spin-polarized"
        },
        bands.nbands(),
        bands.nkpts()
    ));

    println!("{}", Table::new(&rows));
    Ok(())
}

/// 先校验全部 k 点下标，再逐个统计
pub fn occupancy_rows(
    bands: &BandStructure,
    fermi: f64,
    kpoints: &[isize],
    spin: SpinChoice,
) -> Result<Vec<OccupancyRow>> {
    let resolved = kpoints
        .iter()
        .map(|&k| Ok((k, resolve_kpoint_index(k, bands.nkpts())?)))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();

    for (k, index) in resolved {
        let coordinates = bands
            .kpoints
            .get(index)
            .map(|v| format!("{:>8.4} {:>8.4} {:>8.4}", v[0], v[1], v[2]))
            .unwrap_or_else(|| "-".to_string());

        for s in spin.channels(bands.nspin()) {
            rows.push(OccupancyRow {
                requested: k,
                index,
                coordinates: coordinates.clone(),
                spin: s.to_string(),
                occupied: count_occupied_in(bands, s, fermi, k)?,
            });
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn polarized() -> BandStructure {
        BandStructure::try_new(vec![
            array![[-2.0, -1.0, -0.5], [0.5, 1.5, -0.2]],
            array![[-2.0, -1.0, -0.5], [-0.5, 1.5, 0.2]],
        ])
        .unwrap()
        .with_kpoints(vec![[0.0, 0.0, 0.0], [0.25, 0.0, 0.0], [0.5, 0.0, 0.0]])
    }

    #[test]
    fn test_rows_for_both_spins() {
        let rows = occupancy_rows(&polarized(), 0.0, &[0, -1], SpinChoice::Both).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].spin, "Spin.up");
        assert_eq!(rows[0].occupied, 1);
        assert_eq!(rows[1].spin, "Spin.down");
        assert_eq!(rows[1].occupied, 2);

        assert_eq!(rows[2].requested, -1);
        assert_eq!(rows[2].index, 2);
        assert_eq!(rows[2].occupied, 2);
        assert_eq!(rows[3].occupied, 1);
        assert!(rows[2].coordinates.contains("0.5000"));
    }

    #[test]
    fn test_rows_without_kpoint_list() {
        let bands = BandStructure::try_new(vec![array![[-1.0], [1.0]]]).unwrap();
        let rows = occupancy_rows(&bands, 0.0, &[0], SpinChoice::Both).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].coordinates, "-");
        assert_eq!(rows[0].occupied, 1);
    }

    #[test]
    fn test_rows_out_of_range() {
        let err = occupancy_rows(&polarized(), 0.0, &[0, 3], SpinChoice::Up).unwrap_err();
        assert!(matches!(err, OccubandError::KpointOutOfRange { index: 3, nkpts: 3 }));
    }

    #[test]
    fn test_rows_reject_bad_index_before_counting() {
        // 第一个下标需要缺失的自旋向下通道，第二个越界：先报越界
        let bands = BandStructure::try_new(vec![array![[-1.0], [1.0]]]).unwrap();
        let err = occupancy_rows(&bands, 0.0, &[0, 5], SpinChoice::Down).unwrap_err();
        assert!(matches!(err, OccubandError::KpointOutOfRange { index: 5, nkpts: 1 }));
    }

    #[test]
    fn test_rows_missing_spin_channel() {
        let bands = BandStructure::try_new(vec![array![[-1.0], [1.0]]]).unwrap();
        let err = occupancy_rows(&bands, 0.0, &[0], SpinChoice::Down).unwrap_err();
        assert!(matches!(err, OccubandError::SpinChannelMissing { nspin: 1, .. }));
    }
}
