//! # VASP OUTCAR 解析器
//!
//! 从 OUTCAR 中提取费米能，以及自洽迭代日志中最后一条
//! `number of electron ... magnetization ...` 记录。
//!
//! 两者都按行顺序扫描，后出现的匹配覆盖先出现的：
//! 只有收敛时（最后一次迭代）的数值才有意义。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/scf.rs`

use super::{open_reader, source_name};
use crate::error::{OccubandError, Result};
use crate::models::MagnetizationRecord;
use log::{debug, info};
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;

fn efermi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"E-fermi\s*:\s*(\S+)").unwrap())
}

fn magnetization_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)number\s+of\s+electron\s+([\d.\-Ee]+)\s+magnetization\s+([\d.\-Ee]+)")
            .unwrap()
    })
}

/// 提取 OUTCAR 中的费米能 (eV)
///
/// 多次出现时取最后一次。
pub fn extract_fermi(path: &Path) -> Result<f64> {
    info!("Reading Fermi energy from '{}'", path.display());
    let reader = open_reader(path)?;
    parse_fermi_lines(reader, &source_name(path))
}

/// 从任意行源中提取费米能
pub fn parse_fermi_lines<R: BufRead>(reader: R, source: &str) -> Result<f64> {
    let mut efermi: Option<f64> = None;

    for line in reader.lines() {
        let line = line.map_err(|e| OccubandError::FileReadError {
            path: source.to_string(),
            source: e,
        })?;

        // " E-fermi :   5.6142     XC(G=0): -11.7044     alpha+bet :-12.8913"
        if let Some(caps) = efermi_regex().captures(&line) {
            let text = &caps[1];
            let value = text
                .parse::<f64>()
                .map_err(|_| OccubandError::malformed("E-fermi", text, source))?;
            efermi = Some(value);
        }
    }

    efermi.ok_or_else(|| OccubandError::MissingField {
        field: "E-fermi".to_string(),
        path: source.to_string(),
    })
}

/// 扫描 OUTCAR，返回最后一条磁矩记录
///
/// 文件中没有匹配行时返回 `Ok(None)`（非自旋极化计算可能没有这一行）。
pub fn scan_magnetization(path: &Path) -> Result<Option<MagnetizationRecord>> {
    info!("Scanning '{}' for magnetization", path.display());
    let reader = open_reader(path)?;
    scan_magnetization_lines(reader, &source_name(path))
}

/// 对行序列做折叠，每次匹配替换累积值
pub fn scan_magnetization_lines<R: BufRead>(
    reader: R,
    source: &str,
) -> Result<Option<MagnetizationRecord>> {
    let (last, matches) = reader.lines().try_fold(
        (None, 0usize),
        |(last, matches), line| -> Result<(Option<MagnetizationRecord>, usize)> {
            let line = line.map_err(|e| OccubandError::FileReadError {
                path: source.to_string(),
                source: e,
            })?;

            Ok(match parse_magnetization_line(&line, source)? {
                Some(record) => (Some(record), matches + 1),
                None => (last, matches),
            })
        },
    )?;

    debug!("Found {} magnetization line(s) in '{}'", matches, source);
    Ok(last)
}

/// 解析单行，格式:
/// ` number of electron      16.0000000 magnetization       2.0000001`
fn parse_magnetization_line(line: &str, source: &str) -> Result<Option<MagnetizationRecord>> {
    let caps = match magnetization_regex().captures(line) {
        Some(c) => c,
        None => return Ok(None),
    };

    let electrons = caps[1]
        .parse::<f64>()
        .map_err(|_| OccubandError::malformed("number of electron", &caps[1], source))?;
    let magnetization = caps[2]
        .parse::<f64>()
        .map_err(|_| OccubandError::malformed("magnetization", &caps[2], source))?;

    Ok(Some(MagnetizationRecord {
        electrons,
        magnetization,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_efermi() {
        let input = " E-fermi :  -0.7865     XC(G=0):  -2.0223     alpha+bet : -0.5051";
        assert_eq!(parse_fermi_lines(input.as_bytes(), "OUTCAR").unwrap(), -0.7865);
    }

    #[test]
    fn test_parse_efermi_takes_last_occurrence() {
        let input = r#"
 E-fermi :   5.1000     XC(G=0): -11.7044     alpha+bet :-12.8913
 ......
 E-fermi :   5.6142     XC(G=0): -11.7044     alpha+bet :-12.8913
"#;
        assert_eq!(parse_fermi_lines(input.as_bytes(), "OUTCAR").unwrap(), 5.6142);
    }

    #[test]
    fn test_parse_efermi_missing() {
        let input = "   ISPIN  =      2    spin polarized calculation?\n";
        let err = parse_fermi_lines(input.as_bytes(), "OUTCAR").unwrap_err();
        assert!(matches!(err, OccubandError::MissingField { ref field, .. } if field == "E-fermi"));
    }

    #[test]
    fn test_parse_efermi_malformed() {
        let input = " E-fermi : ********     XC(G=0):  -2.0223";
        let err = parse_fermi_lines(input.as_bytes(), "OUTCAR").unwrap_err();
        assert!(matches!(err, OccubandError::MalformedNumber { .. }));
    }

    #[test]
    fn test_scan_magnetization_last_wins() {
        let input = r#"
 number of electron      16.0000000 magnetization       3.9000000
 augmentation part        8.1234567 magnetization       1.2000000
 number of electron      16.0000000 magnetization       2.5000000
 ......
 number of electron      15.9999999 magnetization       2.0000001
   free  energy   TOTEN  =       -19.26550806 eV
"#;
        let record = scan_magnetization_lines(input.as_bytes(), "OUTCAR")
            .unwrap()
            .unwrap();
        assert_eq!(record.electrons, 15.9999999);
        assert_eq!(record.magnetization, 2.0000001);
    }

    #[test]
    fn test_scan_magnetization_case_and_whitespace() {
        let input = "  Number  Of   Electron   8.0   MAGNETIZATION   -0.5E-01\n";
        let record = scan_magnetization_lines(input.as_bytes(), "OUTCAR")
            .unwrap()
            .unwrap();
        assert_eq!(record.electrons, 8.0);
        assert_eq!(record.magnetization, -0.05);
    }

    #[test]
    fn test_scan_magnetization_absent() {
        let input = " E-fermi :  -0.7865     XC(G=0):  -2.0223\n";
        let record = scan_magnetization_lines(input.as_bytes(), "OUTCAR").unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_scan_magnetization_malformed() {
        let input = " number of electron      16.0000000 magnetization       --\n";
        let err = scan_magnetization_lines(input.as_bytes(), "OUTCAR").unwrap_err();
        assert!(matches!(err, OccubandError::MalformedNumber { ref field, .. } if field == "magnetization"));
    }

    #[test]
    fn test_outcar_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("OUTCAR");
        fs::write(
            &path,
            " number of electron       8.0000000 magnetization       0.0000000\n\
             \x20E-fermi :   1.2500     XC(G=0):  -2.0223\n",
        )
        .unwrap();

        assert_eq!(extract_fermi(&path).unwrap(), 1.25);
        let record = scan_magnetization(&path).unwrap().unwrap();
        assert_eq!(record.electrons, 8.0);
    }

    #[test]
    fn test_outcar_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = extract_fermi(&dir.path().join("OUTCAR")).unwrap_err();
        assert!(matches!(err, OccubandError::FileNotFound { .. }));
    }
}
