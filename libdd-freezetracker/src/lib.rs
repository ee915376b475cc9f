// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic engine behind the UI freeze analyzer.
//!
//! Given a raw thread-dump capture from a JVM-style process, this crate
//! reconstructs a structured model of every thread (state, held and
//! awaited locks, stack frames), then derives the blocking dependency
//! graph that explains why the event dispatch thread is stalled and
//! which thread is ultimately responsible, through a possibly multi-hop
//! chain of lock ownership.
//!
//! The pipeline is strictly layered and synchronous:
//! 1. lines are grouped into structural chunks (header / frame / text),
//! 2. the chunk sequence is validated and partitioned per thread,
//! 3. each thread group is extracted into an immutable record,
//! 4. records are assembled into a [`DumpInfo`],
//! 5. lock-ownership edges are walked into the dependency graph.
//!
//! Rendering the model back to annotated text with byte-exact markup
//! offsets for external presentation layers lives in [`markup`].

mod analysis;
mod dump_info;
pub mod markup;
mod parser;

pub use analysis::{
    dependency_chain, dependency_graph, dependency_graph_for, direct_blockers,
    ThreadDumpDependency, CONTENDED_RW_LOCK_MARKER,
};
pub use dump_info::*;
pub use parser::{
    chunk_lines, parse_dump, parse_dump_file, validate, ChunkKind, DumpChunk, DumpParseError,
    ValidatedChunks,
};
