//! # VASP vasprun.xml 解析器
//!
//! 以流式事件方式 (`xml-rs`) 读取 `<eigenvalues>` 段，
//! 按自旋通道生成 (能带数 × k 点数) 的本征值矩阵，占据数丢弃。
//!
//! ## eigenvalues 段格式
//! ```text
//! <eigenvalues>
//!  <array>
//!   <dimension dim="1">band</dimension>
//!   ...
//!   <set>
//!    <set comment="spin 1">
//!     <set comment="kpoint 1">
//!      <r>   -6.1418    1.0000 </r>
//!      ...
//! ```
//!
//! `<projected>` 和 `*_kpoints_opt` 内嵌的同名段被忽略；
//! 顶层出现多个 eigenvalues 段时以最后一个为准。
//! 另外读取 `kpointlist` 与文件自带的 `efermi`，仅作参考。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/bands.rs`

use super::{open_reader, source_name};
use crate::error::{OccubandError, Result};
use crate::models::BandStructure;
use log::{info, warn};
use ndarray::Array2;
use std::io::Read;
use std::path::Path;
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};

/// 正在收集文本的元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    Eigenvalue,
    Kpoint,
    Efermi,
}

/// 本征值: spin -> kpoint -> band
type RawEigen = Vec<Vec<Vec<f64>>>;

fn attr<'a>(attributes: &'a [OwnedAttribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.local_name == key)
        .map(|a| a.value.trim())
}

fn vasprun_error(source: &str, reason: impl Into<String>) -> OccubandError {
    OccubandError::ParseError {
        format: "vasprun.xml".to_string(),
        path: source.to_string(),
        reason: reason.into(),
    }
}

/// 解析 vasprun.xml 中的能带数据
pub fn parse_bands(path: &Path) -> Result<BandStructure> {
    let reader = open_reader(path)?;
    let bands = parse_bands_from_reader(reader, &source_name(path))?;

    info!(
        "Parsed '{}': {} spin channel(s), {} bands, {} k-points",
        path.display(),
        bands.nspin(),
        bands.nbands(),
        bands.nkpts()
    );

    Ok(bands)
}

/// 从任意 XML 源解析能带数据
pub fn parse_bands_from_reader<R: Read>(reader: R, source: &str) -> Result<BandStructure> {
    let parser = EventReader::new(reader);

    let mut stack: Vec<String> = Vec::new();
    // 当前 eigenvalues 段的深度（在 stack 中的位置）
    let mut eigen_depth: Option<usize> = None;
    let mut current: RawEigen = Vec::new();
    let mut eigen: Option<RawEigen> = None;

    let mut kpoints: Vec<[f64; 3]> = Vec::new();
    let mut kpointlist_depth: Option<usize> = None;
    let mut efermi: Option<f64> = None;

    let mut target: Option<TextTarget> = None;
    let mut text = String::new();

    for event in parser {
        let event = event.map_err(|e| OccubandError::XmlError {
            path: source.to_string(),
            source: e,
        })?;

        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let tag = name.local_name;
                let nested = stack
                    .iter()
                    .any(|t| t == "projected" || t.ends_with("kpoints_opt"));

                match tag.as_str() {
                    "eigenvalues" if !nested && eigen_depth.is_none() => {
                        eigen_depth = Some(stack.len());
                        current = Vec::new();
                    }
                    "set" if eigen_depth.is_some() => {
                        let comment = attr(&attributes, "comment").unwrap_or_default();
                        if comment.starts_with("spin") {
                            current.push(Vec::new());
                        } else if comment.starts_with("kpoint") {
                            current
                                .last_mut()
                                .ok_or_else(|| {
                                    vasprun_error(source, "k-point set outside of a spin set")
                                })?
                                .push(Vec::new());
                        }
                    }
                    "r" if eigen_depth.is_some() => {
                        target = Some(TextTarget::Eigenvalue);
                        text.clear();
                    }
                    "varray"
                        if !nested
                            && stack.last().map(String::as_str) == Some("kpoints")
                            && attr(&attributes, "name") == Some("kpointlist") =>
                    {
                        kpointlist_depth = Some(stack.len());
                        kpoints.clear();
                    }
                    "v" if kpointlist_depth.is_some() => {
                        target = Some(TextTarget::Kpoint);
                        text.clear();
                    }
                    "i" if !nested && attr(&attributes, "name") == Some("efermi") => {
                        target = Some(TextTarget::Efermi);
                        text.clear();
                    }
                    _ => {}
                }

                stack.push(tag);
            }

            XmlEvent::Characters(s) | XmlEvent::CData(s) => {
                if target.is_some() {
                    text.push_str(&s);
                }
            }

            XmlEvent::EndElement { .. } => {
                stack.pop();

                match target.take() {
                    Some(TextTarget::Eigenvalue) => {
                        let value = parse_eigenvalue_row(&text, source)?;
                        current
                            .last_mut()
                            .and_then(|spin| spin.last_mut())
                            .ok_or_else(|| {
                                vasprun_error(source, "eigenvalue row outside of a k-point set")
                            })?
                            .push(value);
                    }
                    Some(TextTarget::Kpoint) => kpoints.push(parse_vector(&text, source)?),
                    Some(TextTarget::Efermi) => {
                        let t = text.trim();
                        efermi = Some(
                            t.parse::<f64>()
                                .map_err(|_| OccubandError::malformed("efermi", t, source))?,
                        );
                    }
                    None => {}
                }

                if eigen_depth == Some(stack.len()) {
                    eigen_depth = None;
                    eigen = Some(std::mem::take(&mut current));
                }
                if kpointlist_depth == Some(stack.len()) {
                    kpointlist_depth = None;
                }
            }

            _ => {}
        }
    }

    let raw = eigen.ok_or_else(|| vasprun_error(source, "No <eigenvalues> block found"))?;
    let channels = build_channels(raw, source)?;

    let mut bands = BandStructure::try_new(channels).map_err(|r| vasprun_error(source, r))?;

    if !kpoints.is_empty() && kpoints.len() != bands.nkpts() {
        warn!(
            "'{}': kpointlist has {} entries but eigenvalues cover {} k-points; ignoring kpointlist",
            source,
            kpoints.len(),
            bands.nkpts()
        );
        kpoints.clear();
    }
    bands = bands.with_kpoints(kpoints);
    bands.xml_efermi = efermi;

    Ok(bands)
}

/// `<r>   -6.1418    1.0000 </r>`，只保留能量
fn parse_eigenvalue_row(text: &str, source: &str) -> Result<f64> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| vasprun_error(source, "Empty eigenvalue row"))?;
    token
        .parse::<f64>()
        .map_err(|_| OccubandError::malformed("eigenvalue", token, source))
}

fn parse_vector(text: &str, source: &str) -> Result<[f64; 3]> {
    let v: Vec<f64> = text
        .split_whitespace()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| OccubandError::malformed("k-point", s, source))
        })
        .collect::<Result<_>>()?;

    if v.len() != 3 {
        return Err(vasprun_error(
            source,
            format!("k-point vector has {} components", v.len()),
        ));
    }
    Ok([v[0], v[1], v[2]])
}

/// spin -> kpoint -> band 转为每通道一个 [band, kpoint] 矩阵
fn build_channels(raw: RawEigen, source: &str) -> Result<Vec<Array2<f64>>> {
    raw.into_iter()
        .enumerate()
        .map(|(ispin, kpts)| {
            let nkpts = kpts.len();
            let nbands = kpts.first().map(Vec::len).unwrap_or(0);

            if nkpts == 0 || nbands == 0 {
                return Err(vasprun_error(
                    source,
                    format!("spin channel {} has no eigenvalues", ispin + 1),
                ));
            }
            if let Some(k) = kpts.iter().position(|b| b.len() != nbands) {
                return Err(vasprun_error(
                    source,
                    format!(
                        "spin channel {}: k-point {} has {} bands, expected {}",
                        ispin + 1,
                        k + 1,
                        kpts[k].len(),
                        nbands
                    ),
                ));
            }

            Ok(Array2::from_shape_fn((nbands, nkpts), |(b, k)| kpts[k][b]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Spin;
    use ndarray::array;
    use std::fs;
    use tempfile::TempDir;

    const VASPRUN_ISPIN1: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<modeling>
 <kpoints>
  <varray name="kpointlist" >
   <v>       0.00000000       0.00000000       0.00000000 </v>
   <v>       0.50000000       0.00000000       0.00000000 </v>
  </varray>
  <varray name="weights" >
   <v>       0.50000000 </v>
   <v>       0.50000000 </v>
  </varray>
 </kpoints>
 <calculation>
  <eigenvalues>
   <array>
    <dimension dim="1">band</dimension>
    <dimension dim="2">kpoint</dimension>
    <dimension dim="3">spin</dimension>
    <field>eigene</field>
    <field>occ</field>
    <set>
     <set comment="spin 1">
      <set comment="kpoint 1">
       <r>   -2.0000    1.0000 </r>
       <r>    0.5000    0.0000 </r>
      </set>
      <set comment="kpoint 2">
       <r>   -1.0000    1.0000 </r>
       <r>    1.5000    0.0000 </r>
      </set>
     </set>
    </set>
   </array>
  </eigenvalues>
  <dos>
   <i name="efermi">     -0.10000000 </i>
  </dos>
 </calculation>
</modeling>
"#;

    #[test]
    fn test_parse_eigenvalues_single_spin() {
        let bands = parse_bands_from_reader(VASPRUN_ISPIN1.as_bytes(), "vasprun.xml").unwrap();

        assert_eq!(bands.nspin(), 1);
        assert_eq!(bands.nbands(), 2);
        assert_eq!(bands.nkpts(), 2);
        assert_eq!(
            bands.channel(Spin::Up).unwrap(),
            &array![[-2.0, -1.0], [0.5, 1.5]]
        );
        assert_eq!(bands.kpoints, vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
        assert_eq!(bands.xml_efermi, Some(-0.1));
        assert_eq!(bands.efermi, None);
    }

    #[test]
    fn test_parse_eigenvalues_two_spins_ignores_projected() {
        let input = r#"<modeling>
 <calculation>
  <eigenvalues>
   <array>
    <set>
     <set comment="spin 1">
      <set comment="kpoint 1">
       <r> -3.0 1.0 </r>
       <r>  2.0 0.0 </r>
      </set>
     </set>
     <set comment="spin 2">
      <set comment="kpoint 1">
       <r> -2.5 1.0 </r>
       <r>  2.5 0.0 </r>
      </set>
     </set>
    </set>
   </array>
  </eigenvalues>
  <projected>
   <eigenvalues>
    <array>
     <set>
      <set comment="spin 1">
       <set comment="kpoint 1">
        <r> 99.0 1.0 </r>
       </set>
      </set>
     </set>
    </array>
   </eigenvalues>
  </projected>
 </calculation>
</modeling>"#;
        let bands = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap();

        assert!(bands.is_spin_polarized());
        assert_eq!(bands.channel(Spin::Up).unwrap(), &array![[-3.0], [2.0]]);
        assert_eq!(bands.channel(Spin::Down).unwrap(), &array![[-2.5], [2.5]]);
        assert!(bands.kpoints.is_empty());
    }

    #[test]
    fn test_last_eigenvalue_block_wins() {
        let block = |e: f64| {
            format!(
                r#"<calculation><eigenvalues><array><set><set comment="spin 1"><set comment="kpoint 1"><r> {} 1.0 </r></set></set></set></array></eigenvalues></calculation>"#,
                e
            )
        };
        let input = format!("<modeling>{}{}</modeling>", block(-1.0), block(-4.0));
        let bands = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap();
        assert_eq!(bands.channel(Spin::Up).unwrap()[[0, 0]], -4.0);
    }

    #[test]
    fn test_inconsistent_band_count() {
        let input = r#"<modeling><eigenvalues><array><set><set comment="spin 1">
<set comment="kpoint 1"><r> -1.0 1.0 </r><r> 1.0 0.0 </r></set>
<set comment="kpoint 2"><r> -1.0 1.0 </r></set>
</set></set></array></eigenvalues></modeling>"#;
        let err = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap_err();
        assert!(matches!(err, OccubandError::ParseError { .. }));
    }

    #[test]
    fn test_no_eigenvalues() {
        let input = "<modeling><calculation></calculation></modeling>";
        let err = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap_err();
        assert!(matches!(err, OccubandError::ParseError { .. }));
    }

    #[test]
    fn test_malformed_eigenvalue() {
        let input = VASPRUN_ISPIN1.replace("-2.0000    1.0000", "abc    1.0000");
        let err = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap_err();
        assert!(matches!(err, OccubandError::MalformedNumber { .. }));
    }

    #[test]
    fn test_broken_xml() {
        let input = "<modeling><eigenvalues></modeling>";
        let err = parse_bands_from_reader(input.as_bytes(), "vasprun.xml").unwrap_err();
        assert!(matches!(err, OccubandError::XmlError { .. }));
    }

    #[test]
    fn test_parse_bands_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vasprun.xml");
        fs::write(&path, VASPRUN_ISPIN1).unwrap();

        let bands = parse_bands(&path).unwrap();
        assert_eq!(bands.nkpts(), 2);
    }
}
