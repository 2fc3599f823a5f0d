//! 命令调度模块：
//! - 将 CLI 子命令转换为动作，并提取预置答案
//! - 每个动作重新解析设置，组装参数，驱动输入收集并调用外部程序
//! - 所有错误在动作边界转换为错误对话框

use anyhow::Result;
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    cli::{Cli, Command},
    config::{self, Project, Resolved, Settings},
    error::{self, HugofyError},
    init::init_settings,
    input::{Finished, InputSession, OnCancel, Step},
    runner::{launch, Invocation, LaunchMode},
    surface::{Surface, TerminalSurface},
    utils::safe_subpath,
};

/// 可在编辑器命令面板中调用的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    NewSite,
    NewContent,
    Version,
    Server { open: bool },
    Build,
    GetThemes,
    SetTheme,
}

/// 运行指定的子命令
pub(crate) fn run(cli: Cli) -> Result<()> {
    let folders = if cli.folders.is_empty() { vec![env::current_dir()?] } else { cli.folders };
    let project = Project { folders, settings: cli.settings };

    let (action, answers) = match cli.command {
        Command::Init { force, dir } => {
            let dir = dir
                .or_else(|| project.first_folder().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            return init_settings(&dir, force);
        }
        Command::NewSite { dir, name } => (Action::NewSite, dir.into_iter().chain(name).collect()),
        Command::NewContent { name } => (Action::NewContent, name.into_iter().collect()),
        Command::Version => (Action::Version, Vec::new()),
        Command::Server { open } => (Action::Server { open }, Vec::new()),
        Command::Build => (Action::Build, Vec::new()),
        Command::GetThemes => (Action::GetThemes, Vec::new()),
        Command::SetTheme { name } => (Action::SetTheme, name.into_iter().collect()),
    };

    let mut surface = TerminalSurface::stdin(answers);
    dispatch(action, &project, &mut surface);
    Ok(())
}

/// 执行动作；错误只会以错误对话框的形式报告
pub(crate) fn dispatch(action: Action, project: &Project, surface: &mut dyn Surface) {
    let result = match action {
        Action::NewSite => new_site(project, surface),
        Action::NewContent => new_content(project, surface),
        Action::Version => version(project, surface),
        Action::Server { open } => server(project, surface, open),
        Action::Build => build(project, surface),
        Action::GetThemes => get_themes(project, surface),
        Action::SetTheme => set_theme(project, surface),
    };
    if let Err(e) = result {
        warn!(action = ?action, error = %e, "命令失败");
        surface.error_message(&e.to_string());
    }
}

/// 驱动输入收集；静默取消返回 `None`
fn collect(session: InputSession, surface: &mut dyn Surface) -> error::Result<Option<Vec<String>>> {
    match session.drive(surface) {
        Finished::Completed(values) => Ok(Some(values)),
        Finished::Cancelled { reason, report } => {
            debug!(?reason, reported = report.is_some(), "输入已取消");
            match report {
                Some(msg) => Err(HugofyError::NoInputProvided(msg)),
                None => Ok(None),
            }
        }
    }
}

fn hugo(settings: &Settings, args: &[&str]) -> Vec<String> {
    std::iter::once(settings.hugo_binary())
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

/// `server` 子命令参数（不含程序名），顺序固定
pub(crate) fn server_args(settings: &Settings) -> Vec<String> {
    let mut args = vec!["server".to_string()];
    if settings.drafts {
        args.push("--buildDrafts".into());
    }
    if let Some(theme) = settings.theme() {
        args.push(format!("--theme={}", theme));
    }
    args.push("--watch".into());
    args.push(format!("--port={}", settings.port));
    args
}

pub(crate) fn server_invocation(resolved: &Resolved) -> Invocation {
    let mut argv = vec![resolved.settings.hugo_binary().to_string()];
    argv.extend(server_args(&resolved.settings));
    Invocation::new(argv, LaunchMode::Detached).in_dir(&resolved.working_dir)
}

pub(crate) fn themes_invocation(resolved: &Resolved) -> error::Result<Invocation> {
    let repo = resolved.settings.themes_repo_url()?;
    let target = resolved.working_dir.join("themes");
    Ok(Invocation::new(
        [
            resolved.settings.git_binary().to_string(),
            "clone".into(),
            "--recursive".into(),
            repo.to_string(),
            target.display().to_string(),
        ],
        LaunchMode::Detached,
    ))
}

pub(crate) fn new_site_invocation(resolved: &Resolved, dir: &str, name: &str) -> Invocation {
    let site = Path::new(dir).join(name);
    let mut argv = hugo(&resolved.settings, &["new", "site"]);
    argv.push(site.display().to_string());
    Invocation::new(argv, LaunchMode::Detached).in_dir(&resolved.working_dir)
}

/// `hugo new <rel>`，`rel` 为已清理的 content 相对路径
pub(crate) fn new_content_invocation(resolved: &Resolved, rel: &Path) -> Invocation {
    let mut argv = hugo(&resolved.settings, &["new"]);
    argv.push(rel.display().to_string());
    Invocation::new(argv, LaunchMode::Detached).in_dir(&resolved.working_dir)
}

fn new_site(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let session = InputSession::new(
        vec![Step::new("站点目录").accept_blank(), Step::new("站点名称")],
        OnCancel::Report,
        "未提供站点名称",
    );
    let Some(values) = collect(session, surface)? else { return Ok(()) };
    let [dir, name] = values.as_slice() else { return Ok(()) };

    // 只展示将要执行的命令，不实际创建站点
    let inv = new_site_invocation(&resolved, dir, name);
    info!(command = %inv.display(), "新建站点（未执行）");
    surface.status_message(&format!("新建站点: {}", inv.display()));
    Ok(())
}

fn new_content(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let session = InputSession::new(vec![Step::new("文件名")], OnCancel::Report, "未提供文件名");
    let Some(values) = collect(session, surface)? else { return Ok(()) };
    let Some(name) = values.into_iter().next() else { return Ok(()) };
    let rel = safe_subpath(&name)
        .ok_or_else(|| HugofyError::NoInputProvided(format!("文件名不合法: {}", name)))?;

    // 传给 hugo 的路径与打开的文件保持一致
    let inv = new_content_invocation(&resolved, &rel);
    launch(&inv).into_result()?;
    surface.open_file(&resolved.working_dir.join("content").join(rel));
    Ok(())
}

fn version(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let (settings, _) = config::load_effective(project)?;
    let inv = Invocation::new(hugo(&settings, &["version"]), LaunchMode::CapturedBlocking);
    let out = launch(&inv).into_result()?;
    surface.message_dialog(out.as_deref().unwrap_or_default());
    Ok(())
}

fn server(project: &Project, surface: &mut dyn Surface, open: bool) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let inv = server_invocation(&resolved);
    launch(&inv).into_result()?;
    surface.status_message(&format!("服务已启动: {}", inv.display()));

    if open {
        let url = format!("http://localhost:{}/", resolved.settings.port);
        if let Err(e) = webbrowser::open(&url) {
            warn!(url = %url, error = %e, "打开浏览器失败");
        }
    }
    Ok(())
}

fn build(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let inv = Invocation::new(hugo(&resolved.settings, &["--buildDrafts"]), LaunchMode::CapturedBlocking)
        .in_dir(&resolved.working_dir);
    let outcome = launch(&inv);
    if let Some(code) = outcome.exit_code.filter(|c| *c != 0) {
        warn!(code, "构建以非零状态退出");
    }
    let out = outcome.into_result()?;
    surface.message_dialog(out.as_deref().unwrap_or_default());
    Ok(())
}

fn get_themes(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let inv = themes_invocation(&resolved)?;
    launch(&inv).into_result()?;
    surface.status_message(&format!(
        "正在克隆主题到 {}",
        resolved.working_dir.join("themes").display()
    ));
    Ok(())
}

fn set_theme(project: &Project, surface: &mut dyn Surface) -> error::Result<()> {
    let resolved = config::resolve(project)?;
    let current = resolved.settings.theme().unwrap_or_default().to_string();
    let session = InputSession::new(
        vec![Step::new("主题名称").initial(current)],
        OnCancel::Silent,
        "未提供主题名称",
    );
    let Some(values) = collect(session, surface)? else { return Ok(()) };
    let Some(theme) = values.first().map(|s| s.trim()) else { return Ok(()) };

    config::persist_theme(resolved.source.path(), theme)?;
    info!(theme, path = %resolved.source.path().display(), "主题已保存");
    surface.status_message(&format!("主题已设置为 {}", theme));
    Ok(())
}
