//! # 统一错误处理模块
//!
//! 定义 occuband 的所有错误类型，使用 `thiserror` 派生。
//! 所有致命错误都会指明出错的文件或元素。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// occuband 统一错误类型
#[derive(Error, Debug)]
pub enum OccubandError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Could not find {field} in {path}")]
    MissingField { field: String, path: String },

    #[error("Could not parse ZVAL from the POTCAR entry for element {element} ({path})")]
    MissingZval { element: String, path: String },

    #[error("Malformed number for {field} in {path}: '{text}'")]
    MalformedNumber {
        field: String,
        text: String,
        path: String,
    },

    #[error("Malformed XML in {path}")]
    XmlError {
        path: String,
        #[source]
        source: xml::reader::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 索引错误
    // ─────────────────────────────────────────────────────────────
    #[error("K-point index {index} out of range for {nkpts} k-points")]
    KpointOutOfRange { index: isize, nkpts: usize },

    #[error("Spin channel '{spin}' not present in band structure ({nspin} channel(s))")]
    SpinChannelMissing { spin: String, nspin: usize },

    // ─────────────────────────────────────────────────────────────
    // 对齐错误 (POSCAR <-> POTCAR)
    // ─────────────────────────────────────────────────────────────
    #[error("POSCAR lists {structure} element(s) but POTCAR holds {potential} entr(ies)")]
    ElementCountMismatch { structure: usize, potential: usize },

    #[error("Element #{position} is '{structure}' in POSCAR but '{potential}' in POTCAR")]
    SymbolMismatch {
        position: usize,
        structure: String,
        potential: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl OccubandError {
    /// 构造数值解析失败的错误
    pub fn malformed(field: &str, text: &str, path: &str) -> Self {
        OccubandError::MalformedNumber {
            field: field.to_string(),
            text: text.to_string(),
            path: path.to_string(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, OccubandError>;
