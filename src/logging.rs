//! 日志初始化：tracing + EnvFilter，输出到 stderr

use tracing_subscriber::{fmt, EnvFilter};

/// 日志级别环境变量
pub(crate) const LOG_ENV: &str = "HUGOFY_LOG";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "hugofy=debug" } else { "warn" }))
}

/// 初始化全局日志；重复调用时忽略
pub(crate) fn init(verbose: bool) {
    let _ = fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
