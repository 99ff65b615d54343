//! # magnetization 子命令实现
//!
//! 只读取 OUTCAR，输出自洽日志中最后一条电子数与磁矩记录。
//! 找不到记录不算错误。
//!
//! ## 依赖关系
//! - 使用 `cli/args.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`

use crate::cli::args::MagnetizationArgs;
use crate::config;
use crate::error::Result;
use crate::parsers::outcar;
use crate::utils::output;

/// 执行 magnetization
pub fn execute(args: MagnetizationArgs) -> Result<()> {
    let paths = args.input.paths();
    config::ensure_exists([paths.outcar.as_path()])?;

    let record = outcar::scan_magnetization(&paths.outcar)?;
    let line = output::magnetization_line(record.as_ref());

    match record {
        Some(_) => println!("{}", line),
        None => output::print_warning(&line),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::InputArgs;
    use crate::error::OccubandError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args_with_outcar(outcar: PathBuf) -> MagnetizationArgs {
        MagnetizationArgs {
            input: InputArgs {
                dir: PathBuf::from("."),
                outcar: Some(outcar),
                vasprun: None,
                potcar: None,
                poscar: None,
            },
        }
    }

    #[test]
    fn test_execute_with_and_without_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("OUTCAR");

        fs::write(&path, " number of electron      16.0000000 magnetization       2.0000001\n").unwrap();
        assert!(execute(args_with_outcar(path.clone())).is_ok());

        fs::write(&path, " E-fermi :   1.0000\n").unwrap();
        assert!(execute(args_with_outcar(path)).is_ok());
    }

    #[test]
    fn test_execute_missing_outcar() {
        let dir = TempDir::new().unwrap();
        let err = execute(args_with_outcar(dir.path().join("OUTCAR"))).unwrap_err();
        assert!(matches!(err, OccubandError::FileNotFound { .. }));
    }

    #[test]
    fn test_execute_malformed_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("OUTCAR");
        fs::write(&path, " number of electron      16.0.0 magnetization       2.0\n").unwrap();

        let err = execute(args_with_outcar(path)).unwrap_err();
        assert!(matches!(err, OccubandError::MalformedNumber { .. }));
    }
}
