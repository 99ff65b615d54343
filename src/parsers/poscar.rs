//! # VASP POSCAR 格式解析器
//!
//! 解析 VASP POSCAR/CONTCAR 文件，得到晶体结构及按首次出现顺序排列的元素成分。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (负值表示目标体积)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! VASP 4 格式没有元素行，此时需要外部提供元素符号（通常来自 POTCAR）。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/structure.rs`

use super::{read_file, source_name};
use crate::error::{OccubandError, Result};
use crate::models::{Atom, Composition, Crystal, Lattice};
use log::info;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件，返回结构和成分
///
/// VASP 4 格式（无元素行）返回 `MissingField`，调用方可改用
/// [`parse_poscar_with_symbols`]。
pub fn parse_poscar_file(path: &Path) -> Result<(Crystal, Composition)> {
    parse_poscar_path(path, None)
}

/// 解析 POSCAR，VASP 4 格式时使用 `symbols` 作为元素符号
pub fn parse_poscar_with_symbols(
    path: &Path,
    symbols: &[String],
) -> Result<(Crystal, Composition)> {
    parse_poscar_path(path, Some(symbols))
}

fn parse_poscar_path(path: &Path, symbols: Option<&[String]>) -> Result<(Crystal, Composition)> {
    let source = source_name(path);
    let content = read_file(path)?;
    let crystal = parse_poscar_content(&content, &source, symbols)?;
    let composition = crystal.composition();

    if composition.is_empty() {
        return Err(poscar_error(&source, "Structure contains no atoms"));
    }

    info!(
        "Parsed POSCAR '{}': {} atoms, composition {}",
        path.display(),
        crystal.atoms.len(),
        composition.formula()
    );

    Ok((crystal, composition))
}

fn poscar_error(source: &str, reason: impl Into<String>) -> OccubandError {
    OccubandError::ParseError {
        format: "POSCAR".to_string(),
        path: source.to_string(),
        reason: reason.into(),
    }
}

fn parse_floats(line: &str, field: &str, source: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| OccubandError::malformed(field, s, source))
        })
        .collect()
}

/// `Fe_pv` 或 `Fe/3a1b2c` (VASP 5.4 带哈希后缀) -> `Fe`
fn clean_symbol(token: &str) -> String {
    token
        .split(|c: char| c == '/' || c == '_')
        .next()
        .unwrap_or(token)
        .to_string()
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(
    content: &str,
    source: &str,
    symbols: Option<&[String]>,
) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(poscar_error(source, "File too short"));
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();

    // Line 1: Scaling factor, 1 个值或 3 个值 (逐轴缩放)
    let scale = parse_floats(lines[1], "scaling factor", source)?;
    if scale.len() != 1 && scale.len() != 3 {
        return Err(poscar_error(source, "Invalid scaling factor line"));
    }

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for i in 0..3 {
        let parts = parse_floats(lines[2 + i], "lattice vector", source)?;
        if parts.len() < 3 {
            return Err(poscar_error(
                source,
                format!("Invalid lattice vector at line {}", 3 + i),
            ));
        }
        matrix[i] = [parts[0], parts[1], parts[2]];
    }
    let factors = scale_factors(matrix, &scale);
    let lattice = scale_lattice(matrix, factors);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() {
        return Err(poscar_error(source, "Missing element/count line"));
    }

    let (elements, counts_line, atom_line_start) = if line5_parts[0].parse::<i64>().is_ok() {
        let elements: Vec<String> = match symbols {
            Some(s) => s.iter().map(|e| clean_symbol(e)).collect(),
            None => {
                return Err(OccubandError::MissingField {
                    field: "element symbols (VASP 4 format)".to_string(),
                    path: source.to_string(),
                })
            }
        };
        (elements, lines[5], 6)
    } else {
        let elements: Vec<String> = line5_parts.iter().map(|s| clean_symbol(s)).collect();
        (elements, lines[6], 7)
    };

    let counts: Vec<usize> = counts_line
        .split_whitespace()
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| OccubandError::malformed("atom count", s, source))
        })
        .collect::<Result<_>>()?;

    if counts.len() != elements.len() {
        return Err(poscar_error(
            source,
            format!(
                "{} element symbol(s) but {} atom count(s)",
                elements.len(),
                counts.len()
            ),
        ));
    }

    // Check for "Selective dynamics" line
    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }

    // Coordinate type line
    if lines.len() <= coord_line {
        return Err(poscar_error(source, "Missing coordinate type line"));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let total = counts
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .ok_or_else(|| poscar_error(source, "Total atom count overflows"))?;
    let first = coord_line + 1;
    if lines.len().saturating_sub(first) < total {
        return Err(poscar_error(
            source,
            format!(
                "Expected {} coordinate line(s), found {}",
                total,
                lines.len().saturating_sub(first)
            ),
        ));
    }

    let mut atoms: Vec<Atom> = Vec::with_capacity(total);
    let species = elements
        .iter()
        .zip(counts.iter())
        .flat_map(|(elem, &count)| std::iter::repeat(elem).take(count));

    for (elem, line) in species.zip(&lines[first..first + total]) {
        let parts: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| OccubandError::malformed("atomic position", s, source))
            })
            .collect::<Result<_>>()?;

        if parts.len() < 3 {
            return Err(poscar_error(source, format!("Invalid coordinate line '{}'", line.trim())));
        }

        let position = if is_cartesian {
            lattice.cart_to_frac([
                parts[0] * factors[0],
                parts[1] * factors[1],
                parts[2] * factors[2],
            ])
        } else {
            [parts[0], parts[1], parts[2]]
        };
        atoms.push(Atom::new(elem.clone(), position));
    }

    Ok(Crystal::new(name, lattice, atoms))
}

/// 缩放因子：正值为统一缩放，负值为目标体积，三个值为逐轴缩放
fn scale_factors(matrix: [[f64; 3]; 3], scale: &[f64]) -> [f64; 3] {
    if scale.len() == 3 {
        [scale[0], scale[1], scale[2]]
    } else if scale[0] < 0.0 {
        let volume = Lattice::from_vectors(matrix).volume().abs();
        [(scale[0].abs() / volume).cbrt(); 3]
    } else {
        [scale[0]; 3]
    }
}

fn scale_lattice(matrix: [[f64; 3]; 3], factors: [f64; 3]) -> Lattice {
    let mut scaled = matrix;
    for row in scaled.iter_mut() {
        for (x, f) in row.iter_mut().zip(factors.iter()) {
            *x *= f;
        }
    }
    Lattice::from_vectors(scaled)
}
