// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Re-renders a parsed dump to annotated plain text. Along with the
//! text it emits exact byte-offset spans for every thread-state
//! keyword, every protected-action frame, and every resolvable source
//! reference, so presentation collaborators can place highlights and
//! hyperlinks without re-scanning the text.

use crate::dump_info::{DumpInfo, StackFrame, ThreadInfo, ThreadState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Semantic tag of a highlighted text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MarkupKind {
    /// The thread's state keyword on its `java.lang.Thread.State` line.
    ThreadState,
    /// A stack-frame line performing the protected read action.
    ReadAction,
    /// The `File.java:42` reference of a resolvable frame.
    SourceLink,
}

/// One highlighted byte range of the rendered text, attributed to the
/// thread whose block contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MarkupSpan {
    pub thread_name: String,
    pub start: usize,
    pub end: usize,
    pub kind: MarkupKind,
}

/// Source-navigation target for one resolvable frame: the outermost
/// class plus the one-based source line, with the span covering the
/// file/line reference in the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceLink {
    pub class_name: String,
    pub line_number: i32,
    pub span: MarkupSpan,
}

/// The rendered dump: annotated text plus highlight spans and source
/// links with exact byte offsets into `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DumpText {
    pub text: String,
    pub spans: Vec<MarkupSpan>,
    pub links: Vec<SourceLink>,
}

impl DumpText {
    pub fn thread_state_offset(&self, thread_name: &str) -> Option<usize> {
        self.offset_of(thread_name, MarkupKind::ThreadState)
    }

    pub fn read_action_offset(&self, thread_name: &str) -> Option<usize> {
        self.offset_of(thread_name, MarkupKind::ReadAction)
    }

    fn offset_of(&self, thread_name: &str, kind: MarkupKind) -> Option<usize> {
        self.spans
            .iter()
            .filter(|span| span.thread_name == thread_name)
            .find(|span| span.kind == kind)
            .map(|span| span.start)
    }
}

/// Human-readable summary word for the thread header line.
pub fn readable_state(state: ThreadState) -> &'static str {
    match state {
        ThreadState::Blocked => "blocked",
        ThreadState::TimedWaiting | ThreadState::Waiting => "waiting on condition",
        ThreadState::Runnable => "runnable",
        ThreadState::New => "new",
        ThreadState::Terminated => "terminated",
    }
}

/// Renders every thread of the dump, in dump order.
pub fn render_dump(dump: &DumpInfo) -> DumpText {
    let mut out = DumpText {
        text: String::new(),
        spans: Vec::new(),
        links: Vec::new(),
    };

    for thread in &dump.threads {
        render_thread(thread, &mut out);
    }

    out
}

fn render_thread(thread: &ThreadInfo, out: &mut DumpText) {
    let text = &mut out.text;

    let _ = writeln!(text, "\"{}\" {}", thread.name, readable_state(thread.state));

    text.push_str("    java.lang.Thread.State: ");
    let state_start = text.len();
    text.push_str(thread.state.name());
    out.spans.push(MarkupSpan {
        thread_name: thread.name.clone(),
        start: state_start,
        end: text.len(),
        kind: MarkupKind::ThreadState,
    });

    if let Some(lock_name) = &thread.lock_name {
        let _ = write!(text, " on {lock_name}");
    }
    if let Some(owner) = &thread.lock_owner_name {
        let _ = write!(text, " owned by \"{owner}\" Id=0x0");
    }
    if thread.suspended {
        text.push_str(" (suspended)");
    }
    if thread.in_native {
        text.push_str(" (in native)");
    }
    text.push('\n');

    for frame in &thread.frames {
        render_frame(thread, frame, out);
    }

    out.text.push('\n');
}

fn render_frame(thread: &ThreadInfo, frame: &StackFrame, out: &mut DumpText) {
    let text = &mut out.text;

    text.push_str("    at ");
    let frame_start = text.len();
    let _ = write!(text, "{}.{}(", frame.class_name, frame.method_name);

    let file_start = text.len();
    if frame.is_native_method() {
        text.push_str("Native Method");
    } else {
        match (&frame.file_name, frame.line_number) {
            (Some(file), line) if line >= 0 => {
                let _ = write!(text, "{file}:{line}");
            }
            (Some(file), _) => text.push_str(file),
            (None, _) => text.push_str("Unknown Source"),
        }
    }
    let file_end = text.len();

    text.push(')');
    let frame_end = text.len();
    text.push('\n');

    if frame.is_performing_read_action() {
        out.spans.push(MarkupSpan {
            thread_name: thread.name.clone(),
            start: frame_start,
            end: frame_end,
            kind: MarkupKind::ReadAction,
        });
    }

    if frame.is_resolvable() {
        out.links.push(SourceLink {
            class_name: frame.outer_class_name().to_string(),
            line_number: frame.line_number,
            span: MarkupSpan {
                thread_name: thread.name.clone(),
                start: file_start,
                end: file_end,
                kind: MarkupKind::SourceLink,
            },
        });
    }
}
