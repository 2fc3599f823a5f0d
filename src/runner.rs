//! 外部进程启动模块：
//! - `Detached`：启动后立即返回，不收集输出（预览服务、git clone 等）
//! - `CapturedBlocking`：等待结束并收集 stdout + stderr（version、build）
//! 启动期间切换进程工作目录，任何退出路径上都会恢复。

use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::{Mutex, MutexGuard},
};

use tracing::{debug, info};

use crate::error::LaunchError;

/// 进程工作目录是全局状态，切换期间持有此锁
static CWD_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaunchMode {
    Detached,
    CapturedBlocking,
}

/// 一次外部命令调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) argv: Vec<String>,
    pub(crate) cwd: Option<PathBuf>,
    pub(crate) mode: LaunchMode,
}

impl Invocation {
    pub(crate) fn new<I, S>(argv: I, mode: LaunchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { argv: argv.into_iter().map(Into::into).collect(), cwd: None, mode }
    }

    pub(crate) fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// 便于日志与状态栏展示的命令行
    pub(crate) fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// 启动结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) started: bool,
    pub(crate) output: Option<String>,
    pub(crate) exit_code: Option<i32>,
    pub(crate) error: Option<LaunchError>,
}

impl Outcome {
    fn failed(error: LaunchError) -> Self {
        Self { error: Some(error), ..Self::default() }
    }

    /// 成功时返回捕获的输出（Detached 模式为 `None`）；未启动一律视为失败
    pub(crate) fn into_result(self) -> Result<Option<String>, LaunchError> {
        match self.error {
            Some(e) => Err(e),
            None if self.started => Ok(self.output),
            None => Err(LaunchError::LaunchFailed { binary: String::new(), reason: "进程未启动".into() }),
        }
    }
}

/// 作用域内切换工作目录，Drop 时恢复
struct ScopedCwd {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedCwd {
    fn enter(dir: Option<&Path>) -> std::io::Result<Self> {
        // 持锁期间 panic 不影响工作目录的正确性，忽略中毒
        let lock = CWD_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let previous = env::current_dir()?;
        if let Some(dir) = dir {
            env::set_current_dir(dir)?;
        }
        Ok(Self { previous, _lock: lock })
    }
}

impl Drop for ScopedCwd {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::error!(error = %e, dir = %self.previous.display(), "恢复工作目录失败");
        }
    }
}

/// 启动外部命令
pub(crate) fn launch(inv: &Invocation) -> Outcome {
    let Some(binary) = inv.argv.first() else {
        return Outcome::failed(LaunchError::LaunchFailed {
            binary: String::new(),
            reason: "命令为空".into(),
        });
    };
    let fail = |reason: String| LaunchError::LaunchFailed { binary: binary.clone(), reason };

    let _cwd = match ScopedCwd::enter(inv.cwd.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            let dir = inv.cwd.as_deref().unwrap_or(Path::new(".")).display().to_string();
            return Outcome::failed(fail(format!("无法进入目录 {}: {}", dir, e)));
        }
    };

    let program = match which::which(binary) {
        Ok(p) => p,
        Err(_) => return Outcome::failed(LaunchError::BinaryNotFound { binary: binary.clone() }),
    };
    debug!(program = %program.display(), cwd = ?inv.cwd, mode = ?inv.mode, "启动外部命令");

    let mut cmd = Command::new(&program);
    cmd.args(&inv.argv[1..]);

    match inv.mode {
        LaunchMode::Detached => match cmd.stdin(Stdio::null()).spawn() {
            Ok(child) => {
                info!(pid = child.id(), command = %inv.display(), "已启动");
                Outcome { started: true, ..Outcome::default() }
            }
            Err(e) => Outcome::failed(fail(e.to_string())),
        },
        LaunchMode::CapturedBlocking => match cmd.stdin(Stdio::null()).output() {
            Ok(out) => {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&out.stderr));
                info!(status = ?out.status.code(), command = %inv.display(), "已结束");
                Outcome {
                    started: true,
                    output: Some(text),
                    exit_code: out.status.code(),
                    error: None,
                }
            }
            Err(e) => Outcome::failed(fail(e.to_string())),
        },
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn captured_output_combines_stdout_and_stderr() {
        let inv = Invocation::new(["sh", "-c", "echo out; echo err 1>&2; exit 3"], LaunchMode::CapturedBlocking);
        let outcome = launch(&inv);
        assert!(outcome.started);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.output.as_deref(), Some("out\nerr\n"));
        assert!(outcome.error.is_none());
    }

    #[test]
    #[serial]
    fn runs_inside_working_dir_and_restores_it() {
        let tmp = TempDir::new().unwrap();
        let before = env::current_dir().unwrap();
        let inv = Invocation::new(["pwd"], LaunchMode::CapturedBlocking).in_dir(tmp.path());
        let out = launch(&inv).into_result().unwrap().unwrap();
        let reported = PathBuf::from(out.trim()).canonicalize().unwrap();
        assert_eq!(reported, tmp.path().canonicalize().unwrap());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn missing_binary_restores_working_dir() {
        let tmp = TempDir::new().unwrap();
        let before = env::current_dir().unwrap();
        let inv = Invocation::new(["hugofy-definitely-missing-binary"], LaunchMode::Detached).in_dir(tmp.path());
        let outcome = launch(&inv);
        assert!(!outcome.started);
        assert_eq!(
            outcome.error,
            Some(LaunchError::BinaryNotFound { binary: "hugofy-definitely-missing-binary".into() })
        );
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn missing_working_dir_is_launch_failure() {
        let before = env::current_dir().unwrap();
        let inv = Invocation::new(["true"], LaunchMode::Detached).in_dir("/nonexistent/hugofy/site");
        let outcome = launch(&inv);
        assert!(matches!(outcome.error, Some(LaunchError::LaunchFailed { .. })));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn detached_returns_without_output() {
        let outcome = launch(&Invocation::new(["true"], LaunchMode::Detached));
        assert!(outcome.started);
        assert_eq!(outcome.output, None);
        assert_eq!(outcome.into_result(), Ok(None));
    }

    #[test]
    fn outcome_without_start_is_not_success() {
        let outcome = Outcome { output: Some("stale".into()), ..Outcome::default() };
        assert!(matches!(outcome.into_result(), Err(LaunchError::LaunchFailed { .. })));
    }

    #[test]
    fn empty_argv_is_rejected() {
        let inv = Invocation::new(Vec::<String>::new(), LaunchMode::Detached);
        assert!(matches!(launch(&inv).error, Some(LaunchError::LaunchFailed { .. })));
    }
}
