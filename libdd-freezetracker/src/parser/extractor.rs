// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::chunks::DumpChunk;
use super::DumpParseError;
use crate::dump_info::{
    StackFrame, ThreadInfo, ThreadInfoBuilder, ThreadState, LINE_NATIVE_METHOD,
    LINE_UNKNOWN_SOURCE,
};
use regex::Regex;
use std::sync::LazyLock;

static THREAD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?P<name>.*)""#).unwrap());

static LOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^on (?P<lock>[\p{L}0-9._$]+)(@(?P<hash>[0-9a-fA-F]+))?( owned by "(?P<owner>.*?)".*)?"#)
        .unwrap()
});

static THREAD_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^java\.lang\.Thread\.State: (?P<state>.*)").unwrap());

static STACK_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^at (?P<entry>.*?)\((?P<file_info>.*?)\)").unwrap());

const IN_NATIVE_MARKER: &str = "(in native)";
const SUSPENDED_MARKER: &str = "(suspended)";

/// Parses one validated thread chunk group into a [`ThreadInfo`].
/// Header lines go through the ordered rule table; stack-frame chunks
/// parse their `at` line and skip the structural `-` lock annotation.
/// Any line no rule recognizes fails the whole parse.
pub(crate) fn extract_thread(group: &[DumpChunk]) -> Result<ThreadInfo, DumpParseError> {
    let mut builder = ThreadInfoBuilder::new();

    for chunk in group {
        match chunk {
            DumpChunk::ThreadHeader(lines) => {
                for line in lines {
                    apply_header_rules(line.trim(), &mut builder)?;
                }
            }
            DumpChunk::StackFrame(lines) => {
                // lines[1], when present, is the `-` lock annotation the
                // chunker already recognized; it carries no thread fields.
                builder.with_frame(parse_frame(lines[0].trim())?);
            }
            DumpChunk::Text(line) => {
                return Err(DumpParseError::UnrecognizedLine(line.trim().to_string()));
            }
        }
    }

    builder.build()
}

/// Ordered rule table over one header line; first match wins, no match
/// is fatal. Order follows the dump grammar: thread name, lock, thread
/// state, then the flag markers.
fn apply_header_rules(line: &str, builder: &mut ThreadInfoBuilder) -> Result<(), DumpParseError> {
    if let Some(captures) = THREAD_NAME_RE.captures(line) {
        builder.with_name(captures["name"].to_string());
        return Ok(());
    }

    if let Some(captures) = LOCK_RE.captures(line) {
        builder.with_lock_name(captures["lock"].to_string());
        if let Some(owner) = captures.name("owner") {
            builder.with_lock_owner_name(owner.as_str().to_string());
        }
        return Ok(());
    }

    if let Some(captures) = THREAD_STATE_RE.captures(line) {
        let value = &captures["state"];
        let token = value.split_whitespace().next().unwrap_or(value);
        let state = ThreadState::from_name(token)
            .ok_or_else(|| DumpParseError::UnknownThreadState(token.to_string()))?;
        builder.with_state(state);
        return Ok(());
    }

    if line.contains(IN_NATIVE_MARKER) {
        builder.with_in_native();
        return Ok(());
    }

    if line.contains(SUSPENDED_MARKER) {
        builder.with_suspended();
        return Ok(());
    }

    Err(DumpParseError::UnrecognizedLine(line.to_string()))
}

/// Parses an `at <class>.<method>(<file info>)` line. The entry point
/// splits on its last `.`; file info is `file:line`, `Native Method`,
/// `Unknown Source`, or a bare file name.
fn parse_frame(line: &str) -> Result<StackFrame, DumpParseError> {
    let captures = STACK_FRAME_RE
        .captures(line)
        .ok_or_else(|| DumpParseError::UnrecognizedLine(line.to_string()))?;

    let entry = &captures["entry"];
    let file_info = &captures["file_info"];

    let dot = entry
        .rfind('.')
        .ok_or_else(|| DumpParseError::UnrecognizedLine(line.to_string()))?;
    let class_name = entry[..dot].to_string();
    let method_name = entry[dot + 1..].to_string();

    let (file_name, line_number) = match file_info.split_once(':') {
        Some((file, number)) => {
            let number = number
                .parse::<i32>()
                .map_err(|_| DumpParseError::InvalidLineNumber(line.to_string()))?;
            (Some(file.to_string()), number)
        }
        None => match file_info {
            "Native Method" => (None, LINE_NATIVE_METHOD),
            "Unknown Source" => (None, LINE_UNKNOWN_SOURCE),
            other => (Some(other.to_string()), LINE_UNKNOWN_SOURCE),
        },
    };

    Ok(StackFrame::new(class_name, method_name, file_name, line_number))
}

#[cfg(test)]
mod tests {
    use super::super::chunks::chunk_lines;
    use super::*;

    fn extract(text: &str) -> Result<ThreadInfo, DumpParseError> {
        let chunks = chunk_lines(text);
        extract_thread(&chunks)
    }

    #[test]
    fn test_minimal_thread() {
        let thread = extract("\"T1\" prio=5 tid=0x1 nid=0x2\n   java.lang.Thread.State: RUNNABLE\n")
            .unwrap();
        assert_eq!(thread.name, "T1");
        assert_eq!(thread.state, ThreadState::Runnable);
        assert_eq!(thread.lock_name, None);
        assert_eq!(thread.lock_owner_name, None);
        assert!(thread.frames.is_empty());
    }

    #[test]
    fn test_lock_with_owner() {
        let thread = extract(
            "\"AWT-EventQueue-0\" prio=6\n   java.lang.Thread.State: WAITING\n on sun.java2d.opengl.OGLRenderQueue$QueueFlusher@17c39f8d owned by \"Java2D Queue Flusher\" Id=19\n",
        )
        .unwrap();
        assert_eq!(
            thread.lock_name.as_deref(),
            Some("sun.java2d.opengl.OGLRenderQueue$QueueFlusher")
        );
        assert_eq!(thread.lock_owner_name.as_deref(), Some("Java2D Queue Flusher"));
    }

    #[test]
    fn test_lock_without_owner() {
        let thread = extract(
            "\"T\" x\n   java.lang.Thread.State: BLOCKED\n on com.example.Cache$Segment@ab12\n",
        )
        .unwrap();
        assert_eq!(thread.lock_name.as_deref(), Some("com.example.Cache$Segment"));
        assert_eq!(thread.lock_owner_name, None);
    }

    #[test]
    fn test_in_native_flag() {
        let thread = extract(
            "\"Java2D Queue Flusher\" prio=10\n   java.lang.Thread.State: RUNNABLE\n (in native)\n",
        )
        .unwrap();
        assert!(thread.in_native);
        assert!(!thread.suspended);
    }

    #[test]
    fn test_state_with_qualifier_token() {
        let thread =
            extract("\"main\" x\n   java.lang.Thread.State: TIMED_WAITING (sleeping)\n").unwrap();
        assert_eq!(thread.state, ThreadState::TimedWaiting);
    }

    #[test]
    fn test_unknown_state_is_fatal() {
        let err = extract("\"main\" x\n   java.lang.Thread.State: SLUMBERING\n").unwrap_err();
        assert_eq!(
            err,
            DumpParseError::UnknownThreadState("SLUMBERING".to_string())
        );
    }

    #[test]
    fn test_frame_variants() {
        let thread = extract(
            "\"main\" x\n   java.lang.Thread.State: RUNNABLE\n\tat Foo.bar(Native Method)\n\tat Foo.bar(Unknown Source)\n\tat Foo.bar(Foo.java:42)\n\tat Foo.bar(Foo.java)\n",
        )
        .unwrap();

        assert_eq!(thread.frames.len(), 4);
        assert_eq!(thread.frames[0].line_number, LINE_NATIVE_METHOD);
        assert_eq!(thread.frames[0].file_name, None);
        assert_eq!(thread.frames[1].line_number, LINE_UNKNOWN_SOURCE);
        assert_eq!(thread.frames[1].file_name, None);
        assert_eq!(thread.frames[2].line_number, 42);
        assert_eq!(thread.frames[2].file_name.as_deref(), Some("Foo.java"));
        assert_eq!(thread.frames[3].line_number, LINE_UNKNOWN_SOURCE);
        assert_eq!(thread.frames[3].file_name.as_deref(), Some("Foo.java"));
    }

    #[test]
    fn test_frame_entry_splits_on_last_dot() {
        let thread = extract(
            "\"main\" x\n   java.lang.Thread.State: RUNNABLE\n\tat sun.misc.Unsafe.$$YJP$$wait(Native Method)\n",
        )
        .unwrap();
        let frame = &thread.frames[0];
        assert_eq!(frame.class_name, "sun.misc.Unsafe");
        assert_eq!(frame.method_name, "$$YJP$$wait");
        assert!(frame.is_native_method());
    }

    #[test]
    fn test_lock_annotation_line_is_skipped() {
        let thread = extract(
            "\"main\" x\n   java.lang.Thread.State: RUNNABLE\n\tat java.net.SocketInputStream.socketRead(SocketInputStream.java:116)\n\t- locked <0x76c38a2a8> (a java.io.BufferedInputStream)\n",
        )
        .unwrap();
        assert_eq!(thread.frames.len(), 1);
        assert_eq!(thread.frames[0].line_number, 116);
    }

    #[test]
    fn test_non_numeric_line_number_is_fatal() {
        let err = extract(
            "\"main\" x\n   java.lang.Thread.State: RUNNABLE\n\tat Foo.bar(Foo.java:fortytwo)\n",
        )
        .unwrap_err();
        assert!(matches!(err, DumpParseError::InvalidLineNumber(_)));
    }

    #[test]
    fn test_frame_without_dot_is_fatal() {
        let err =
            extract("\"main\" x\n   java.lang.Thread.State: RUNNABLE\n\tat frobnicate(Foo.java:1)\n")
                .unwrap_err();
        assert!(matches!(err, DumpParseError::UnrecognizedLine(_)));
    }

    #[test]
    fn test_unrecognized_header_line_is_fatal_and_identified() {
        let chunks = chunk_lines("\"main\" x\n   java.lang.Thread.State: RUNNABLE\n");
        // Hand-build a group with a stray text chunk to exercise the
        // extractor-level rejection path.
        let mut group = chunks;
        group.push(DumpChunk::Text("free floating".to_string()));
        let err = extract_thread(&group).unwrap_err();
        assert_eq!(
            err,
            DumpParseError::UnrecognizedLine("free floating".to_string())
        );
    }

    #[test]
    fn test_missing_state_line_is_fatal() {
        let err = extract("\"main\" prio=5 tid=0x1\n").unwrap_err();
        assert_eq!(err, DumpParseError::MissingThreadState("main".to_string()));
    }
}
