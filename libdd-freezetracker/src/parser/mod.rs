// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod chunks;
mod extractor;
mod validator;

pub use chunks::{chunk_lines, ChunkKind, DumpChunk};
pub use validator::{validate, ValidatedChunks};

use anyhow::Context;
use crate::dump_info::{DumpInfo, DumpInfoBuilder};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Why a dump capture was rejected. Chain-following termination (no
/// owner, owner missing from the dump, cycle) is normal control flow in
/// the analysis layer and deliberately has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DumpParseError {
    /// A plain text line appeared inside a thread block.
    #[error("Text Chunks Inside Stack Trace")]
    TextInsideStackTrace,
    /// A line inside a thread block matched none of the known rules.
    #[error("unrecognized line in thread block: {0}")]
    UnrecognizedLine(String),
    #[error("unknown thread state: {0}")]
    UnknownThreadState(String),
    #[error("invalid line number in stack frame: {0}")]
    InvalidLineNumber(String),
    #[error("thread header has no thread name")]
    MissingThreadName,
    #[error("thread {0:?} has no thread state line")]
    MissingThreadState(String),
    /// Structurally valid text that produced zero thread records.
    #[error("thread dump contains no threads")]
    EmptyDump,
}

/// Parses a raw thread-dump capture into a [`DumpInfo`].
///
/// The pipeline is a synchronous fold over the text: lines are grouped
/// into chunks, the chunk sequence is validated, each thread group is
/// extracted into a record, and the records are assembled into the
/// final dump. Every failure is typed; no partial dump is ever
/// returned.
pub fn parse_dump(text: &str) -> Result<DumpInfo, DumpParseError> {
    let chunks = chunk_lines(text);
    let validated = validate(chunks)?;

    let mut builder = DumpInfoBuilder::new();
    for group in &validated.thread_groups {
        builder.with_thread(extractor::extract_thread(group)?);
    }

    let dump = builder.build()?;
    debug!(
        threads = dump.threads.len(),
        product = dump.metadata.product.as_deref().unwrap_or(""),
        "parsed thread dump"
    );
    Ok(dump)
}

/// Reads a dump capture from disk and parses it.
pub fn parse_dump_file(path: &Path) -> anyhow::Result<DumpInfo> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let dump = parse_dump(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(dump)
}
