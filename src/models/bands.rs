//! # 能带数据模型
//!
//! 按自旋通道存储本征值矩阵，形状为 (能带数 × k 点数)，单位 eV。
//! 费米能不取自 vasprun.xml，而由调用方从 OUTCAR 读取后设置。
//!
//! ## 依赖关系
//! - 被 `parsers/vasprun.rs` 构造
//! - 被 `analysis/occupancy.rs` 使用

use ndarray::Array2;
use std::fmt;

/// 自旋通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    /// 通道在 `BandStructure` 中的下标
    pub fn index(self) -> usize {
        match self {
            Spin::Up => 0,
            Spin::Down => 1,
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Up => write!(f, "Spin.up"),
            Spin::Down => write!(f, "Spin.down"),
        }
    }
}

/// 能带结构
#[derive(Debug, Clone)]
pub struct BandStructure {
    /// 每个自旋通道一个矩阵，下标 [band, kpoint]
    channels: Vec<Array2<f64>>,

    /// k 点约化坐标（可能为空）
    pub kpoints: Vec<[f64; 3]>,

    /// 费米能 (eV)，通常来自 OUTCAR
    pub efermi: Option<f64>,

    /// vasprun.xml 自带的费米能，仅用于对比
    pub xml_efermi: Option<f64>,
}

impl BandStructure {
    /// 创建能带结构，要求 1 或 2 个通道且形状一致
    pub fn try_new(channels: Vec<Array2<f64>>) -> Result<Self, String> {
        if channels.is_empty() || channels.len() > 2 {
            return Err(format!(
                "expected 1 or 2 spin channels, found {}",
                channels.len()
            ));
        }

        let shape = channels[0].dim();
        if let Some(bad) = channels.iter().find(|c| c.dim() != shape) {
            return Err(format!(
                "spin channels disagree in shape: {:?} vs {:?}",
                shape,
                bad.dim()
            ));
        }

        Ok(BandStructure {
            channels,
            kpoints: Vec::new(),
            efermi: None,
            xml_efermi: None,
        })
    }

    pub fn with_efermi(mut self, efermi: f64) -> Self {
        self.efermi = Some(efermi);
        self
    }

    pub fn with_kpoints(mut self, kpoints: Vec<[f64; 3]>) -> Self {
        self.kpoints = kpoints;
        self
    }

    pub fn nspin(&self) -> usize {
        self.channels.len()
    }

    pub fn nbands(&self) -> usize {
        self.channels[0].nrows()
    }

    pub fn nkpts(&self) -> usize {
        self.channels[0].ncols()
    }

    /// 获取指定自旋通道，不存在时返回 None
    pub fn channel(&self, spin: Spin) -> Option<&Array2<f64>> {
        self.channels.get(spin.index())
    }

    pub fn is_spin_polarized(&self) -> bool {
        self.channels.len() == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_band_structure_dimensions() {
        let up = array![[-2.0, -1.0], [0.5, 1.5], [3.0, 4.0]];
        let bs = BandStructure::try_new(vec![up]).unwrap();

        assert_eq!(bs.nspin(), 1);
        assert_eq!(bs.nbands(), 3);
        assert_eq!(bs.nkpts(), 2);
        assert!(bs.channel(Spin::Down).is_none());
        assert!(!bs.is_spin_polarized());
    }

    #[test]
    fn test_band_structure_rejects_mismatched_channels() {
        let up = array![[-2.0, -1.0], [0.5, 1.5]];
        let down = array![[-2.0, -1.0, 0.0], [0.5, 1.5, 2.0]];
        assert!(BandStructure::try_new(vec![up, down]).is_err());
    }

    #[test]
    fn test_band_structure_rejects_empty() {
        assert!(BandStructure::try_new(vec![]).is_err());
    }

    #[test]
    fn test_efermi_is_settable() {
        let up = array![[-1.0], [1.0]];
        let bs = BandStructure::try_new(vec![up]).unwrap().with_efermi(0.25);
        assert_eq!(bs.efermi, Some(0.25));
        assert_eq!(bs.xml_efermi, None);
    }
}
