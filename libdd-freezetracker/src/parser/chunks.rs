// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::slice;

/// Structural classification of a single dump line. Pure and total:
/// the three prefixes cannot overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    ThreadHeaderStart,
    StackFrameStart,
    PlainText,
}

impl ChunkKind {
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.starts_with('"') {
            Self::ThreadHeaderStart
        } else if trimmed.starts_with("at") {
            Self::StackFrameStart
        } else {
            Self::PlainText
        }
    }
}

/// A maximal run of consecutive lines belonging to one structural unit
/// of the dump. Each variant carries its own continuation rule; chunks
/// never overlap and concatenating their lines in order reproduces the
/// non-blank input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpChunk {
    /// Quoted thread-name line, optionally followed by a
    /// `java.lang.Thread.State` line and one lock/native line.
    ThreadHeader(Vec<String>),
    /// An `at` call-site line, optionally followed by one `-` lock
    /// annotation line.
    StackFrame(Vec<String>),
    /// Any other line. Single-line, terminal.
    Text(String),
}

impl DumpChunk {
    /// Opens a new chunk seeded with `line`, classified per
    /// [`ChunkKind::classify`].
    pub fn open(line: &str) -> Self {
        match ChunkKind::classify(line) {
            ChunkKind::ThreadHeaderStart => Self::ThreadHeader(vec![line.to_string()]),
            ChunkKind::StackFrameStart => Self::StackFrame(vec![line.to_string()]),
            ChunkKind::PlainText => Self::Text(line.to_string()),
        }
    }

    pub fn accepts_next_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        match self {
            Self::ThreadHeader(lines) => match lines.len() {
                1 => trimmed.starts_with("java.lang.Thread.State"),
                2 => trimmed.starts_with("on") || trimmed.starts_with("(in native)"),
                _ => false,
            },
            Self::StackFrame(lines) => lines.len() == 1 && trimmed.starts_with('-'),
            Self::Text(_) => false,
        }
    }

    /// Appends a continuation line. Callers must have checked
    /// [`Self::accepts_next_line`]; a `Text` chunk never accumulates.
    pub fn feed_line(&mut self, line: &str) {
        match self {
            Self::ThreadHeader(lines) | Self::StackFrame(lines) => lines.push(line.to_string()),
            Self::Text(_) => {}
        }
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Self::ThreadHeader(lines) | Self::StackFrame(lines) => lines,
            Self::Text(line) => slice::from_ref(line),
        }
    }

    pub fn is_thread_header(&self) -> bool {
        matches!(self, Self::ThreadHeader(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Folds the dump text into the ordered chunk list. Blank lines carry
/// no structure and are skipped. This stage never fails: unexpected
/// input just yields `Text` chunks for the validator to judge.
pub fn chunk_lines(text: &str) -> Vec<DumpChunk> {
    let mut chunks: Vec<DumpChunk> = Vec::new();

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        match chunks.last_mut() {
            Some(open) if open.accepts_next_line(line) => open.feed_line(line),
            _ => chunks.push(DumpChunk::open(line)),
        }
    }

    chunks
}
