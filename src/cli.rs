//! CLI 定义模块：仅负责命令行参数结构体与解析
//! 将 clap 的声明与业务逻辑解耦，便于在其它模块中复用参数。

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 顶层 CLI 入口
#[derive(Parser, Debug)]
#[command(name = "hugofy", about = "Hugo 站点辅助工具", version)]
pub(crate) struct Cli {
    /// 项目目录，可重复；第一个作为默认工作目录（默认当前目录）
    #[arg(long = "folder", value_name = "DIR", global = true)]
    pub(crate) folders: Vec<PathBuf>,
    /// 设置文件路径，默认：<项目目录>/hugofy.yaml
    #[arg(long, value_name = "FILE", global = true)]
    pub(crate) settings: Option<PathBuf>,
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// 子命令定义
///
/// 需要输入的命令可以直接在命令行给出答案，缺省时交互式询问。
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// 新建站点（询问目录与站点名）
    NewSite {
        #[arg(value_name = "DIR")]
        dir: Option<String>,
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },
    /// 新建内容页面并打开
    NewContent {
        /// 相对 content/ 的文件名，例如 posts/hello.md
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },
    /// 显示 Hugo 版本
    Version,
    /// 启动本地预览服务
    Server {
        /// 启动后自动在浏览器打开
        #[arg(long)]
        open: bool,
    },
    /// 构建站点（包含草稿）
    Build,
    /// 克隆主题仓库到 <工作目录>/themes
    GetThemes,
    /// 设置预览使用的主题
    SetTheme {
        #[arg(value_name = "THEME")]
        name: Option<String>,
    },
    /// 写出默认设置文件
    Init {
        /// 强制覆盖已存在文件
        #[arg(long)]
        force: bool,
        /// 目标目录（默认第一个项目目录或当前目录）
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}
