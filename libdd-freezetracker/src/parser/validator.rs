// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::chunks::DumpChunk;
use super::DumpParseError;

/// Structural partition of a chunk sequence: permitted preamble and
/// postamble text, and one chunk group per thread block. Invariant:
/// `leading ++ concat(thread_groups) ++ trailing` is the original
/// sequence, nothing lost or duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChunks {
    pub leading: Vec<DumpChunk>,
    pub thread_groups: Vec<Vec<DumpChunk>>,
    pub trailing: Vec<DumpChunk>,
}

/// Checks structural well-formedness of a chunk sequence. A dump is
/// optional banner text, then consecutive thread blocks (one header
/// chunk plus stack-frame chunks each), then optional trailing text.
/// A plain text line *inside* a block is a format mismatch and rejects
/// the whole dump.
pub fn validate(chunks: Vec<DumpChunk>) -> Result<ValidatedChunks, DumpParseError> {
    let mut chunks = chunks;

    let body_start = chunks
        .iter()
        .position(|chunk| !chunk.is_text())
        .unwrap_or(chunks.len());
    let mut body: Vec<DumpChunk> = chunks.split_off(body_start);
    let leading = chunks;

    let body_end = body
        .iter()
        .rposition(|chunk| !chunk.is_text())
        .map_or(0, |idx| idx + 1);
    let trailing = body.split_off(body_end);

    let thread_groups = split_before_headers(body);

    if thread_groups
        .iter()
        .any(|group| group.iter().any(DumpChunk::is_text))
    {
        return Err(DumpParseError::TextInsideStackTrace);
    }

    Ok(ValidatedChunks {
        leading,
        thread_groups,
        trailing,
    })
}

/// Splits immediately before every thread-header chunk; the splitter
/// chunk starts its own group.
fn split_before_headers(chunks: Vec<DumpChunk>) -> Vec<Vec<DumpChunk>> {
    let mut groups: Vec<Vec<DumpChunk>> = Vec::new();
    let mut current: Vec<DumpChunk> = Vec::new();

    for chunk in chunks {
        if chunk.is_thread_header() && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(chunk);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}
