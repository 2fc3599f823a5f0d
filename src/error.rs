//! 错误类型：
//! - `HugofyError` 为各命令在动作边界上统一上报的错误
//! - `LaunchError` 为外部进程启动失败的细分类型

use std::path::PathBuf;
use thiserror::Error;

/// 外部进程启动错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaunchError {
    /// 可执行文件不存在或不在 PATH 中
    #[error("未找到可执行文件 `{binary}`：请确认已安装并加入 PATH")]
    BinaryNotFound { binary: String },

    /// 操作系统层面无法创建进程（含切换工作目录失败）
    #[error("启动 `{binary}` 失败: {reason}")]
    LaunchFailed { binary: String, reason: String },
}

/// 命令执行过程中的错误
#[derive(Error, Debug)]
pub(crate) enum HugofyError {
    /// 既没有 DIR_PATH，也没有项目目录
    #[error("无法确定工作目录：未设置 DIR_PATH，且没有打开的项目目录")]
    NoProjectFolder,

    /// 外部工具缺失或无法启动
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// 用户取消输入或提交了空白内容
    #[error("{0}")]
    NoInputProvided(String),

    /// 写回设置失败
    #[error("保存设置失败: {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },

    /// 设置文件无法读取或解析
    #[error("读取设置失败: {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    /// 设置值不合法
    #[error("设置项 {key} 不合法: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

pub(crate) type Result<T> = std::result::Result<T, HugofyError>;
