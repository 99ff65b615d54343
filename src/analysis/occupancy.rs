//! # 能带占据数
//!
//! 统计指定 k 点上能量严格低于费米能的能带数。
//! 恰好位于费米能的态不计为占据。
//!
//! ## 依赖关系
//! - 使用 `models/bands.rs`

use crate::error::{OccubandError, Result};
use crate::models::{BandStructure, Spin};

/// 将可为负的 k 点下标转换为实际下标，`-1` 表示最后一个 k 点
pub fn resolve_kpoint_index(index: isize, nkpts: usize) -> Result<usize> {
    let resolved = if index < 0 {
        nkpts as isize + index
    } else {
        index
    };

    if resolved < 0 || resolved as usize >= nkpts {
        return Err(OccubandError::KpointOutOfRange { index, nkpts });
    }
    Ok(resolved as usize)
}

/// 自旋向上通道在第 `kpoint_index` 个 k 点的占据能带数
pub fn count_occupied(bands: &BandStructure, fermi: f64, kpoint_index: isize) -> Result<usize> {
    count_occupied_in(bands, Spin::Up, fermi, kpoint_index)
}

/// 指定自旋通道在第 `kpoint_index` 个 k 点的占据能带数
pub fn count_occupied_in(
    bands: &BandStructure,
    spin: Spin,
    fermi: f64,
    kpoint_index: isize,
) -> Result<usize> {
    let channel = bands
        .channel(spin)
        .ok_or_else(|| OccubandError::SpinChannelMissing {
            spin: spin.to_string(),
            nspin: bands.nspin(),
        })?;

    let ik = resolve_kpoint_index(kpoint_index, channel.ncols())?;

    Ok(channel.column(ik).iter().filter(|&&e| e < fermi).count())
}
