//! # 美化输出工具
//!
//! 提供统一的终端输出样式，以及报告中数值的固定格式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use crate::models::MagnetizationRecord;
use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 最短往返表示，整数值保留一位小数: 8 -> `8.0`, 0.75 -> `0.75`
///
/// 绝对值小于 1e-4 或不小于 1e16 时为科学计数法，指数带符号且至少两位:
/// 1e-5 -> `1e-05`, 1.5e16 -> `1.5e+16`
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }

    let s = format!("{:?}", x);
    match s.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => format!(
                "{}e{}{:02}",
                mantissa,
                if e < 0 { '-' } else { '+' },
                e.abs()
            ),
            Err(_) => s,
        },
        None => s,
    }
}

/// 磁矩报告行，固定 6 位小数
pub fn magnetization_line(record: Option<&MagnetizationRecord>) -> String {
    match record {
        Some(r) => format!(
            "Found final number of electrons = {:.6}, magnetization = {:.6} µB",
            r.electrons, r.magnetization
        ),
        None => "Could not find magnetization line in OUTCAR.".to_string(),
    }
}
