//! # 输入文件配置
//!
//! 显式的输入文件路径记录，由命令行参数（或环境变量）构造后传给各解析器，
//! 不依赖进程当前目录下的固定文件名。
//!
//! ## 依赖关系
//! - 被 `cli/` 构造
//! - 被 `commands/` 使用

use crate::error::{OccubandError, Result};
use std::path::{Path, PathBuf};

pub const OUTCAR: &str = "OUTCAR";
pub const VASPRUN: &str = "vasprun.xml";
pub const POTCAR: &str = "POTCAR";
pub const POSCAR: &str = "POSCAR";

/// 一次运行所需的全部输入文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub outcar: PathBuf,
    pub vasprun: PathBuf,
    pub potcar: PathBuf,
    pub poscar: PathBuf,
}

impl InputPaths {
    /// 使用目录下的约定文件名
    pub fn from_dir(dir: &Path) -> Self {
        InputPaths {
            outcar: dir.join(OUTCAR),
            vasprun: dir.join(VASPRUN),
            potcar: dir.join(POTCAR),
            poscar: dir.join(POSCAR),
        }
    }

    pub fn with_outcar(mut self, path: impl Into<PathBuf>) -> Self {
        self.outcar = path.into();
        self
    }

    pub fn with_vasprun(mut self, path: impl Into<PathBuf>) -> Self {
        self.vasprun = path.into();
        self
    }

    pub fn with_potcar(mut self, path: impl Into<PathBuf>) -> Self {
        self.potcar = path.into();
        self
    }

    pub fn with_poscar(mut self, path: impl Into<PathBuf>) -> Self {
        self.poscar = path.into();
        self
    }

    /// 所有路径，按读取顺序
    pub fn all(&self) -> [&Path; 4] {
        [
            self.outcar.as_path(),
            self.vasprun.as_path(),
            self.potcar.as_path(),
            self.poscar.as_path(),
        ]
    }
}

/// 检查文件存在，缺失时返回 `FileNotFound`
pub fn ensure_exists<'a, I>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        if !path.is_file() {
            return Err(OccubandError::FileNotFound {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
