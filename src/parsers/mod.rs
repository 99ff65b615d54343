//! # 解析器模块
//!
//! 提供 VASP 输入/输出文件的解析器。每个解析器自行打开并关闭文件，
//! 互不共享状态。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: outcar, vasprun, potcar, poscar

pub mod outcar;
pub mod poscar;
pub mod potcar;
pub mod vasprun;

use crate::error::{OccubandError, Result};
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// 用于错误信息的文件名
pub(crate) fn source_name(path: &Path) -> String {
    path.display().to_string()
}

fn io_error(path: &Path, e: std::io::Error) -> OccubandError {
    if e.kind() == ErrorKind::NotFound {
        OccubandError::FileNotFound {
            path: source_name(path),
        }
    } else {
        OccubandError::FileReadError {
            path: source_name(path),
            source: e,
        }
    }
}

/// 打开文件并包装为带缓冲的读取器
pub(crate) fn open_reader(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| io_error(path, e))
}

/// 读取整个文件内容
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_error(path, e))
}
