//! 通用辅助函数：
//! - 环境变量读取与解析
//! - 安全的子路径处理

use std::{env, path::PathBuf};

/// 将字符串转为安全子路径（过滤 `.` / `..` 等危险片段）。
pub(crate) fn safe_subpath(s: &str) -> Option<PathBuf> {
    let mut p = PathBuf::new();
    for seg in s.split(['/', '\\']) {
        let t = seg.trim();
        if t.is_empty() || t == "." || t == ".." { continue; }
        p.push(t);
    }
    if p.components().next().is_none() { None } else { Some(p) }
}

/// 可选读取 PATH 环境变量为 PathBuf。
pub(crate) fn env_opt_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// 可选读取 String 环境变量。
pub(crate) fn env_opt_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// 可选读取端口号环境变量（非法值忽略）。
pub(crate) fn env_opt_port(key: &str) -> Option<u16> {
    env_opt_string(key).and_then(|s| s.parse::<u16>().ok())
}

/// 读取布尔环境变量的真值（1/true/on/yes/y）。
pub(crate) fn env_bool_truthy(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" | "y" => true,
            _ => false,
        }
    })
}
