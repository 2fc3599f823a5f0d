//! 用户交互界面抽象：
//! - `Surface` 描述编辑器侧提供的能力（输入框、对话框、状态栏、打开文件）
//! - `TerminalSurface` 在终端中实现这些能力，支持预先提供的答案

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::warn;

/// 编辑器侧交互能力
pub(crate) trait Surface {
    /// 显示输入框；返回 `None` 表示用户取消
    fn prompt(&mut self, caption: &str, initial: &str) -> Option<String>;
    /// 阻塞式消息对话框
    fn message_dialog(&mut self, text: &str);
    /// 错误对话框
    fn error_message(&mut self, text: &str);
    /// 短暂的状态提示
    fn status_message(&mut self, text: &str);
    /// 在编辑器中打开文件
    fn open_file(&mut self, path: &Path);
}

/// 终端实现：优先消费预置答案，其余从标准输入读取
pub(crate) struct TerminalSurface<R> {
    answers: VecDeque<String>,
    input: R,
}

impl TerminalSurface<io::StdinLock<'static>> {
    pub(crate) fn stdin(answers: Vec<String>) -> Self {
        Self::new(answers, io::stdin().lock())
    }
}

impl<R: BufRead> TerminalSurface<R> {
    pub(crate) fn new(answers: Vec<String>, input: R) -> Self {
        Self { answers: answers.into(), input }
    }
}

impl<R: BufRead> Surface for TerminalSurface<R> {
    fn prompt(&mut self, caption: &str, initial: &str) -> Option<String> {
        if let Some(answer) = self.answers.pop_front() {
            return Some(answer);
        }
        if initial.is_empty() {
            print!("✏️ {}: ", caption);
        } else {
            // 仅作提示，空行仍按空白提交
            print!("✏️ {}（当前: {}）: ", caption, initial);
        }
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            // EOF（Ctrl-D）视为取消
            Ok(0) => {
                println!();
                None
            }
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!(error = %e, "读取输入失败，按取消处理");
                None
            }
        }
    }

    fn message_dialog(&mut self, text: &str) {
        println!("{}", text.trim_end());
    }

    fn error_message(&mut self, text: &str) {
        eprintln!("❌ {}", text);
    }

    fn status_message(&mut self, text: &str) {
        println!("ℹ️ {}", text);
    }

    fn open_file(&mut self, path: &Path) {
        println!("📄 打开: {}", path.display());
    }
}

/// 测试用：记录所有交互，按脚本回答输入框
#[cfg(test)]
pub(crate) mod testing {
    use super::Surface;
    use std::{collections::VecDeque, path::{Path, PathBuf}};

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        /// `None` 表示在该步取消
        pub(crate) script: VecDeque<Option<String>>,
        pub(crate) prompts: Vec<String>,
        pub(crate) dialogs: Vec<String>,
        pub(crate) errors: Vec<String>,
        pub(crate) statuses: Vec<String>,
        pub(crate) opened: Vec<PathBuf>,
    }

    impl RecordingSurface {
        pub(crate) fn answering<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = Option<S>>,
            S: Into<String>,
        {
            Self {
                script: answers.into_iter().map(|a| a.map(Into::into)).collect(),
                ..Self::default()
            }
        }
    }

    impl Surface for RecordingSurface {
        fn prompt(&mut self, caption: &str, _initial: &str) -> Option<String> {
            self.prompts.push(caption.to_string());
            self.script.pop_front().flatten()
        }

        fn message_dialog(&mut self, text: &str) {
            self.dialogs.push(text.to_string());
        }

        fn error_message(&mut self, text: &str) {
            self.errors.push(text.to_string());
        }

        fn status_message(&mut self, text: &str) {
            self.statuses.push(text.to_string());
        }

        fn open_file(&mut self, path: &Path) {
            self.opened.push(path.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn preset_answers_come_first() {
        let mut s = TerminalSurface::new(vec!["first".into()], Cursor::new("typed\n"));
        assert_eq!(s.prompt("名称", ""), Some("first".into()));
        assert_eq!(s.prompt("名称", ""), Some("typed".into()));
    }

    #[test]
    fn eof_is_cancel() {
        let mut s = TerminalSurface::new(Vec::new(), Cursor::new(""));
        assert_eq!(s.prompt("名称", ""), None);
    }

    #[test]
    fn empty_line_stays_empty_even_with_initial_text() {
        let mut s = TerminalSurface::new(Vec::new(), Cursor::new("\r\n\n"));
        assert_eq!(s.prompt("主题名称", "old"), Some(String::new()));
        assert_eq!(s.prompt("名称", ""), Some(String::new()));
    }
}
