//! 设置与工作目录解析模块：
//! - 定义 `Settings`（PORT / DRAFTS_FLAG / THEME_NAME / DIR_PATH 等）
//! - 提供 `resolve` 每次命令调用时重新加载设置并计算工作目录
//! - 提供 `persist_theme` 将主题名写回设置文件（只改动 THEME_NAME 一行）

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use tracing::debug;
use url::Url;

use crate::{
    error::{HugofyError, Result},
    utils::{env_bool_truthy, env_opt_path, env_opt_port, env_opt_string},
};

/// 设置文件名（固定）
pub(crate) const SETTINGS_FILE: &str = "hugofy.yaml";

pub(crate) const DEFAULT_PORT: u16 = 1313;
pub(crate) const DEFAULT_HUGO: &str = "hugo";
pub(crate) const DEFAULT_GIT: &str = "git";
pub(crate) const DEFAULT_THEMES_REPO: &str = "https://github.com/spf13/hugoThemes.git";

/// 持久化的设置文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Settings {
    /// 预览服务端口
    #[serde(rename = "PORT", default = "default_port")]
    pub(crate) port: u16,
    /// 预览时是否构建草稿
    #[serde(rename = "DRAFTS_FLAG", default)]
    pub(crate) drafts: bool,
    #[serde(rename = "THEME_NAME", default, skip_serializing_if = "Option::is_none")]
    pub(crate) theme_name: Option<String>,
    /// 覆盖工作目录
    #[serde(rename = "DIR_PATH", default, skip_serializing_if = "Option::is_none")]
    pub(crate) dir_path: Option<String>,
    #[serde(rename = "HUGO_PATH", default, skip_serializing_if = "Option::is_none")]
    pub(crate) hugo_path: Option<String>,
    #[serde(rename = "GIT_PATH", default, skip_serializing_if = "Option::is_none")]
    pub(crate) git_path: Option<String>,
    #[serde(rename = "THEMES_REPO", default, skip_serializing_if = "Option::is_none")]
    pub(crate) themes_repo: Option<String>,
    /// 未识别的字段，写回时原样保留
    #[serde(flatten)]
    pub(crate) extra: Mapping,
}

fn default_port() -> u16 { DEFAULT_PORT }

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            drafts: false,
            theme_name: None,
            dir_path: None,
            hugo_path: None,
            git_path: None,
            themes_repo: None,
            extra: Mapping::new(),
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl Settings {
    /// 有效主题名（空白视为未设置）
    pub(crate) fn theme(&self) -> Option<&str> {
        non_blank(self.theme_name.as_deref())
    }

    pub(crate) fn hugo_binary(&self) -> &str {
        non_blank(self.hugo_path.as_deref()).unwrap_or(DEFAULT_HUGO)
    }

    pub(crate) fn git_binary(&self) -> &str {
        non_blank(self.git_path.as_deref()).unwrap_or(DEFAULT_GIT)
    }

    /// 主题仓库地址，必须是合法 URL
    pub(crate) fn themes_repo_url(&self) -> Result<Url> {
        let raw = non_blank(self.themes_repo.as_deref()).unwrap_or(DEFAULT_THEMES_REPO);
        Url::parse(raw).map_err(|e| HugofyError::InvalidSetting {
            key: "THEMES_REPO",
            reason: format!("{}: {}", raw, e),
        })
    }

    /// 环境变量覆盖（仅本次调用生效，不写回）
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some(port) = env_opt_port("HUGOFY_PORT") { self.port = port; }
        if let Some(drafts) = env_bool_truthy("HUGOFY_DRAFTS") { self.drafts = drafts; }
        if let Some(theme) = env_opt_string("HUGOFY_THEME") { self.theme_name = Some(theme); }
        if let Some(dir) = env_opt_string("HUGOFY_DIR") { self.dir_path = Some(dir); }
    }
}

/// 当前编辑会话：项目目录列表与显式设置文件
#[derive(Debug, Clone, Default)]
pub(crate) struct Project {
    pub(crate) folders: Vec<PathBuf>,
    pub(crate) settings: Option<PathBuf>,
}

impl Project {
    pub(crate) fn first_folder(&self) -> Option<&Path> {
        self.folders.first().map(PathBuf::as_path)
    }
}

/// 设置文件来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingsSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
    CurrentDir(PathBuf),
}

impl SettingsSource {
    pub(crate) fn path(&self) -> &Path {
        match self {
            SettingsSource::Explicit(p)
            | SettingsSource::Env(p)
            | SettingsSource::Project(p)
            | SettingsSource::CurrentDir(p) => p,
        }
    }
}

/// 人类可读的来源描述
pub(crate) fn describe_source(src: &SettingsSource) -> String {
    match src {
        SettingsSource::Explicit(p) => format!("命令行指定: {}", p.display()),
        SettingsSource::Env(p) => format!("HUGOFY_SETTINGS: {}", p.display()),
        SettingsSource::Project(p) => format!("项目目录: {}", p.display()),
        SettingsSource::CurrentDir(p) => format!("当前目录: {}", p.display()),
    }
}

/// 定位设置文件：命令行 > HUGOFY_SETTINGS > 项目目录 > 当前目录
pub(crate) fn locate_settings(project: &Project) -> Result<SettingsSource> {
    if let Some(p) = project.settings.as_ref() {
        return Ok(SettingsSource::Explicit(p.clone()));
    }
    if let Some(p) = env_opt_path("HUGOFY_SETTINGS") {
        return Ok(SettingsSource::Env(p));
    }
    if let Some(folder) = project.first_folder() {
        return Ok(SettingsSource::Project(folder.join(SETTINGS_FILE)));
    }
    let cwd = env::current_dir().map_err(|e| HugofyError::Settings {
        path: PathBuf::from(SETTINGS_FILE),
        reason: format!("无法获取当前目录: {}", e),
    })?;
    Ok(SettingsSource::CurrentDir(cwd.join(SETTINGS_FILE)))
}

/// 读取设置文件；文件不存在时返回默认设置
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "设置文件不存在，使用默认值");
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| HugofyError::Settings {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_settings(&raw).map_err(|e| HugofyError::Settings {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_settings(raw: &str) -> std::result::Result<Settings, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }
    // 只有注释的文件解析为 null
    match serde_yaml::from_str::<Option<Settings>>(raw)? {
        Some(s) => Ok(s),
        None => Ok(Settings::default()),
    }
}

/// 一次命令调用解析出的配置
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) settings: Settings,
    pub(crate) working_dir: PathBuf,
    pub(crate) source: SettingsSource,
}

/// 计算工作目录：DIR_PATH（非空）优先，否则为第一个项目目录
pub(crate) fn working_dir(settings: &Settings, project: &Project) -> Result<PathBuf> {
    if let Some(dir) = non_blank(settings.dir_path.as_deref()) {
        return Ok(PathBuf::from(dir));
    }
    project
        .first_folder()
        .map(Path::to_path_buf)
        .ok_or(HugofyError::NoProjectFolder)
}

/// 定位并读取设置，叠加环境变量覆盖；不需要工作目录的命令（version）直接使用
pub(crate) fn load_effective(project: &Project) -> Result<(Settings, SettingsSource)> {
    let source = locate_settings(project)?;
    let mut settings = load_settings(source.path())?;
    settings.apply_env_overrides();
    Ok((settings, source))
}

/// 重新加载设置并解析工作目录，每次命令调用都应调用一次
pub(crate) fn resolve(project: &Project) -> Result<Resolved> {
    let (settings, source) = load_effective(project)?;
    let working_dir = working_dir(&settings, project)?;
    debug!(
        source = %describe_source(&source),
        working_dir = %working_dir.display(),
        port = settings.port,
        drafts = settings.drafts,
        theme = settings.theme().unwrap_or("-"),
        "已解析设置"
    );
    Ok(Resolved { settings, working_dir, source })
}

const THEME_KEY: &str = "THEME_NAME";

/// 将主题名写回设置文件，只改动 THEME_NAME，注释与其它字段保持原样
pub(crate) fn persist_theme(path: &Path, theme: &str) -> Result<()> {
    let persist_err = |reason: String| HugofyError::PersistFailed { path: path.to_path_buf(), reason };
    let raw = if path.exists() {
        fs::read_to_string(path).map_err(|e| HugofyError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        String::new()
    };

    let text = match replace_theme_line(&raw, theme) {
        Some(text) => text,
        None => rewrite_mapping(&raw, theme).map_err(|e| persist_err(e.to_string()))?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
    }
    fs::write(path, text).map_err(|e| persist_err(e.to_string()))
}

/// 按行替换（或追加）顶层 `THEME_NAME:`；结果解析不出同一主题时返回 `None`
fn replace_theme_line(raw: &str, theme: &str) -> Option<String> {
    let value = serde_yaml::to_string(theme).ok()?;
    let line = format!("{}: {}", THEME_KEY, value.trim_end());

    let mut replaced = false;
    let mut lines: Vec<&str> = Vec::new();
    for l in raw.lines() {
        if !replaced && l.starts_with(THEME_KEY) && l[THEME_KEY.len()..].trim_start().starts_with(':') {
            lines.push(&line);
            replaced = true;
        } else {
            lines.push(l);
        }
    }
    if !replaced {
        lines.push(&line);
    }
    let mut text = lines.join("\n");
    text.push('\n');

    // 多行值、流式映射等情况交给 Mapping 重写
    let parsed = parse_settings(&text).ok()?;
    (parsed.theme_name.as_deref() == Some(theme)).then_some(text)
}

/// 以 Mapping 形式改写，仅设置 THEME_NAME（会丢失注释）
fn rewrite_mapping(raw: &str, theme: &str) -> std::result::Result<String, serde_yaml::Error> {
    let mut doc = if raw.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str::<Option<Mapping>>(raw)?.unwrap_or_default()
    };
    doc.insert(THEME_KEY.into(), theme.into());
    serde_yaml::to_string(&doc)
}
