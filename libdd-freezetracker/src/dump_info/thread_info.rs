// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::stacktrace::StackFrame;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name prefix of the event dispatch thread in the captured process.
pub const EVENT_DISPATCH_THREAD_PREFIX: &str = "AWT-EventQueue";

/// Packages whose frames are ignored when deciding whether a thread is
/// doing application work rather than idling in runtime plumbing.
pub const DEFAULT_SKIP_PACKAGES: &[&str] = &["java", "sun", "com.sun"];

/// Lifecycle state of a thread at capture time, as reported on the
/// `java.lang.Thread.State:` line of the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadState {
    New,
    Runnable,
    Blocked,
    Waiting,
    TimedWaiting,
    Terminated,
}

impl ThreadState {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NEW" => Some(Self::New),
            "RUNNABLE" => Some(Self::Runnable),
            "BLOCKED" => Some(Self::Blocked),
            "WAITING" => Some(Self::Waiting),
            "TIMED_WAITING" => Some(Self::TimedWaiting),
            "TERMINATED" => Some(Self::Terminated),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Runnable => "RUNNABLE",
            Self::Blocked => "BLOCKED",
            Self::Waiting => "WAITING",
            Self::TimedWaiting => "TIMED_WAITING",
            Self::Terminated => "TERMINATED",
        }
    }

    /// True for the states in which a thread makes no forward progress
    /// until some other thread acts.
    pub fn is_stalled(self) -> bool {
        matches!(self, Self::Blocked | Self::Waiting | Self::TimedWaiting)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Triage ranking of a thread with respect to a freeze: a stalled
/// thread outranks a yielding one, which outranks a running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FreezeSeverity {
    Running,
    Yielding,
    Stalled,
}

impl FreezeSeverity {
    pub fn weight(self) -> u32 {
        match self {
            Self::Stalled => 3,
            Self::Yielding => 2,
            Self::Running => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stalled => "stalled",
            Self::Yielding => "yielding",
            Self::Running => "running",
        }
    }
}

/// One physical thread's parsed state at dump time. Constructed once by
/// the field extractor and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThreadInfo {
    pub name: String,
    /// Monitor or lock the thread is blocked on, when stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_name: Option<String>,
    /// Thread currently holding that lock, when stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_owner_name: Option<String>,
    pub in_native: bool,
    pub suspended: bool,
    pub state: ThreadState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<StackFrame>,
}

impl ThreadInfo {
    pub fn is_event_dispatch(&self) -> bool {
        self.name.starts_with(EVENT_DISPATCH_THREAD_PREFIX)
    }

    /// The top-of-stack frame is a yield, so the thread is runnable but
    /// voluntarily ceding the processor.
    pub fn is_yielding(&self) -> bool {
        self.frames
            .first()
            .is_some_and(|frame| frame.method_name.contains("yield"))
    }

    pub fn is_running(&self) -> bool {
        self.state == ThreadState::Runnable && !self.is_yielding()
    }

    /// Any frame of the thread carries the protected-action marker.
    pub fn is_performing_read_action(&self) -> bool {
        self.frames
            .iter()
            .any(StackFrame::is_performing_read_action)
    }

    /// The thread has at least one frame outside `packages_to_skip`.
    pub fn is_significant(&self, packages_to_skip: &[&str]) -> bool {
        self.frames.iter().any(|frame| {
            packages_to_skip
                .iter()
                .all(|package| !frame.class_name.starts_with(package))
        })
    }

    pub fn severity(&self) -> FreezeSeverity {
        if self.state.is_stalled() {
            FreezeSeverity::Stalled
        } else if self.state == ThreadState::Runnable && self.is_yielding() {
            FreezeSeverity::Yielding
        } else {
            FreezeSeverity::Running
        }
    }

    pub fn weight(&self) -> u32 {
        self.severity().weight()
    }
}

#[cfg(test)]
impl super::test_utils::TestInstance for ThreadInfo {
    fn test_instance(seed: u64) -> Self {
        use super::test_utils::TestInstance;

        Self {
            name: format!("worker-{seed}"),
            lock_name: None,
            lock_owner_name: None,
            in_native: false,
            suspended: false,
            state: ThreadState::Runnable,
            frames: (0..3).map(|i| StackFrame::test_instance(seed + i)).collect(),
        }
    }
}
