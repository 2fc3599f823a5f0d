//! 多步输入收集：
//! 以显式状态机代替编辑器的 on_done / on_cancel 回调。
//! 每次命令调用创建新的 `InputSession`，完成或取消后即丢弃。

use tracing::debug;

use crate::surface::Surface;

/// 空白提交的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Blank {
    /// 视同取消，并提示错误
    Reject,
    /// 作为普通值接受
    Accept,
}

/// 用户取消时是否提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnCancel {
    Report,
    Silent,
}

/// 单个输入步骤
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub(crate) caption: String,
    pub(crate) initial: String,
    pub(crate) blank: Blank,
}

impl Step {
    pub(crate) fn new(caption: impl Into<String>) -> Self {
        Self { caption: caption.into(), initial: String::new(), blank: Blank::Reject }
    }

    pub(crate) fn initial(mut self, text: impl Into<String>) -> Self {
        self.initial = text.into();
        self
    }

    pub(crate) fn accept_blank(mut self) -> Self {
        self.blank = Blank::Accept;
        self
    }
}

/// 取消原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cancellation {
    Dismissed,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum State {
    AwaitingStep(usize),
    Completed(Vec<String>),
    Cancelled(Cancellation),
}

/// 收集结束后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Finished {
    Completed(Vec<String>),
    /// `report` 为需要展示给用户的错误信息；静默取消时为 `None`
    Cancelled { reason: Cancellation, report: Option<String> },
}

#[derive(Debug)]
pub(crate) struct InputSession {
    steps: Vec<Step>,
    collected: Vec<String>,
    state: State,
    on_cancel: OnCancel,
    missing: String,
}

impl InputSession {
    /// `missing` 为未提供输入时展示的错误文本
    pub(crate) fn new(steps: Vec<Step>, on_cancel: OnCancel, missing: impl Into<String>) -> Self {
        let state = if steps.is_empty() { State::Completed(Vec::new()) } else { State::AwaitingStep(0) };
        Self { steps, collected: Vec::new(), state, on_cancel, missing: missing.into() }
    }

    pub(crate) fn state(&self) -> &State {
        &self.state
    }

    /// 当前等待的步骤
    pub(crate) fn current_step(&self) -> Option<&Step> {
        match self.state {
            State::AwaitingStep(i) => self.steps.get(i),
            _ => None,
        }
    }

    /// 提交文本；终态下忽略
    pub(crate) fn submit(&mut self, text: &str) -> &State {
        let State::AwaitingStep(i) = self.state else { return &self.state };
        let step = &self.steps[i];
        if text.trim().is_empty() && step.blank == Blank::Reject {
            debug!(step = i, "空白输入，取消");
            self.state = State::Cancelled(Cancellation::Blank);
            return &self.state;
        }
        self.collected.push(text.to_string());
        self.state = if i + 1 == self.steps.len() {
            State::Completed(std::mem::take(&mut self.collected))
        } else {
            State::AwaitingStep(i + 1)
        };
        &self.state
    }

    /// 用户取消；终态下忽略
    pub(crate) fn cancel(&mut self) -> &State {
        if let State::AwaitingStep(i) = self.state {
            debug!(step = i, "用户取消输入");
            self.collected.clear();
            self.state = State::Cancelled(Cancellation::Dismissed);
        }
        &self.state
    }

    /// 终态对应的结果；未结束时返回 `None`
    pub(crate) fn finished(&self) -> Option<Finished> {
        match &self.state {
            State::AwaitingStep(_) => None,
            State::Completed(values) => Some(Finished::Completed(values.clone())),
            State::Cancelled(reason) => {
                let silent = *reason == Cancellation::Dismissed && self.on_cancel == OnCancel::Silent;
                Some(Finished::Cancelled {
                    reason: *reason,
                    report: if silent { None } else { Some(self.missing.clone()) },
                })
            }
        }
    }

    /// 通过界面逐步提问直到结束
    pub(crate) fn drive(mut self, surface: &mut dyn Surface) -> Finished {
        while let Some(step) = self.current_step() {
            let (caption, initial) = (step.caption.clone(), step.initial.clone());
            match surface.prompt(&caption, &initial) {
                Some(text) => self.submit(&text),
                None => self.cancel(),
            };
        }
        // 循环结束即为终态
        self.finished().unwrap_or(Finished::Cancelled { reason: Cancellation::Dismissed, report: None })
    }
}
