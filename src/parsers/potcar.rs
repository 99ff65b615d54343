//! # VASP POTCAR 解析器
//!
//! 将拼接的 POTCAR 按元素拆分为数据块（保持文件顺序），
//! 并从每个数据块中读取价电子数 ZVAL。
//!
//! ## POTCAR 数据块格式
//! ```text
//!   PAW_PBE Fe_pv 02Aug2007          # 块首行
//!  14.0000000000000000
//!  parameters from PSCTR are:
//!    TITEL  = PAW_PBE Fe_pv 02Aug2007
//!    POMASS =   55.847; ZVAL   =   14.000    mass and valenz
//!  ...
//!  End of Dataset                    # 块结束
//! ```
//!
//! 每块取第一条 ZVAL 匹配；找不到 ZVAL 时报错并指明元素，绝不默认为 0。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/potential.rs`

use super::{read_file, source_name};
use crate::error::{OccubandError, Result};
use crate::models::PotcarEntry;
use log::{debug, info};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const END_OF_DATASET: &str = "End of Dataset";

fn zval_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ZVAL\s*=\s*([\d.]+)").unwrap())
}

/// 解析 POTCAR 文件
pub fn parse_potcar_file(path: &Path) -> Result<Vec<PotcarEntry>> {
    let content = read_file(path)?;
    let entries = parse_potcar_content(&content, &source_name(path))?;

    info!(
        "Parsed {} POTCAR entr(ies) from '{}': {}",
        entries.len(),
        path.display(),
        entries
            .iter()
            .map(|e| e.label.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(entries)
}

/// 从字符串内容解析 POTCAR
pub fn parse_potcar_content(content: &str, source: &str) -> Result<Vec<PotcarEntry>> {
    let entries = split_blocks(content)
        .into_iter()
        .map(|block| parse_block(block, source))
        .collect::<Result<Vec<_>>>()?;

    if entries.is_empty() {
        return Err(OccubandError::ParseError {
            format: "POTCAR".to_string(),
            path: source.to_string(),
            reason: "No element data blocks found".to_string(),
        });
    }

    Ok(entries)
}

/// 按 `End of Dataset` 拆分，丢弃空白块
fn split_blocks(content: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;

    for (offset, line) in line_offsets(content) {
        if line.trim_start().starts_with(END_OF_DATASET) {
            blocks.push(&content[start..offset + line.len()]);
            start = offset + line.len();
        }
    }
    // 最后一块可能缺少结束标记
    blocks.push(&content[start..]);

    blocks
        .into_iter()
        .filter(|b| b.lines().any(|l| !l.trim().is_empty() && !l.contains(END_OF_DATASET)))
        .collect()
}

/// 每行在原文中的起始偏移（行内容包含换行符）
fn line_offsets(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.split_inclusive('\n').scan(0usize, |pos, line| {
        let start = *pos;
        *pos += line.len();
        Some((start, line))
    })
}

fn parse_block(block: &str, source: &str) -> Result<PotcarEntry> {
    let header = block
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string();

    let label = potential_label(block, &header).ok_or_else(|| OccubandError::ParseError {
        format: "POTCAR".to_string(),
        path: source.to_string(),
        reason: format!("Cannot determine element of block starting with '{}'", header),
    })?;
    let symbol = element_symbol(&label);

    // 只取第一条匹配，后续数值行不影响结果
    let zval = match block.lines().find_map(|l| zval_regex().captures(l)) {
        Some(caps) => caps[1].parse::<f64>().map_err(|_| {
            OccubandError::malformed(&format!("ZVAL of {}", symbol), &caps[1], source)
        })?,
        None => {
            return Err(OccubandError::MissingZval {
                element: symbol,
                path: source.to_string(),
            })
        }
    };

    debug!("POTCAR block '{}': element {}, ZVAL = {}", header, symbol, zval);

    Ok(PotcarEntry {
        symbol,
        label,
        header,
        zval,
        content: block.to_string(),
    })
}

/// 赝势标签: 首行第二个词，首行不足时退回到 `TITEL =` 行
fn potential_label(block: &str, header: &str) -> Option<String> {
    header
        .split_whitespace()
        .nth(1)
        .or_else(|| {
            block
                .lines()
                .find(|l| l.trim_start().starts_with("TITEL"))
                .and_then(|l| l.split_once('='))
                .and_then(|(_, rhs)| rhs.split_whitespace().nth(1))
        })
        .map(str::to_string)
}

/// `Fe_pv` -> `Fe`, `H.75` -> `H`
fn element_symbol(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c == '.')
        .next()
        .unwrap_or(label)
        .to_string()
}
