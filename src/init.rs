//! 初始化模块
//! - `hugofy init` 写出带注释的默认设置文件

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::config::SETTINGS_FILE;

// 内置默认设置（用于 init）
const DEFAULT_SETTINGS: &str = include_str!("assets/default.hugofy.yaml");

/// 在目标目录写出默认设置文件
pub(crate) fn init_settings(dir: &Path, force: bool) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("创建目录失败: {}", dir.display()))?;
    }

    let cfg_path = dir.join(SETTINGS_FILE);
    if cfg_path.exists() && !force {
        eprintln!("跳过: {} 已存在，使用 --force 可覆盖", cfg_path.display());
        return Ok(());
    }
    fs::write(&cfg_path, DEFAULT_SETTINGS.as_bytes())
        .with_context(|| format!("写入默认设置失败: {}", cfg_path.display()))?;
    println!("写入: {}", cfg_path.display());
    println!("✅ 初始化完成，运行 hugofy server 启动预览");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_settings, Settings};
    use tempfile::TempDir;

    #[test]
    fn default_document_parses_to_defaults() {
        let tmp = TempDir::new().unwrap();
        init_settings(tmp.path(), false).unwrap();
        let s = load_settings(&tmp.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn existing_file_kept_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        fs::write(&path, "PORT: 8080\n").unwrap();

        init_settings(tmp.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "PORT: 8080\n");

        init_settings(tmp.path(), true).unwrap();
        assert_eq!(load_settings(&path).unwrap().port, 1313);
    }
}
