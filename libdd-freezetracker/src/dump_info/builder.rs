// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::metadata::DumpMetadata;
use super::stacktrace::StackFrame;
use super::thread_info::{ThreadInfo, ThreadState};
use super::DumpInfo;
use crate::parser::DumpParseError;

/// Mutable accumulator for one thread's fields while its chunk group is
/// being parsed. Finalized into an immutable [`ThreadInfo`].
#[derive(Debug, Default, PartialEq)]
pub struct ThreadInfoBuilder {
    pub name: Option<String>,
    pub lock_name: Option<String>,
    pub lock_owner_name: Option<String>,
    pub in_native: bool,
    pub suspended: bool,
    pub state: Option<ThreadState>,
    pub frames: Vec<StackFrame>,
}

impl ThreadInfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(&mut self, name: String) {
        self.name = Some(name);
    }

    pub fn with_lock_name(&mut self, lock_name: String) {
        self.lock_name = Some(lock_name);
    }

    pub fn with_lock_owner_name(&mut self, lock_owner_name: String) {
        self.lock_owner_name = Some(lock_owner_name);
    }

    pub fn with_state(&mut self, state: ThreadState) {
        self.state = Some(state);
    }

    pub fn with_in_native(&mut self) {
        self.in_native = true;
    }

    pub fn with_suspended(&mut self) {
        self.suspended = true;
    }

    pub fn with_frame(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    pub fn build(self) -> Result<ThreadInfo, DumpParseError> {
        let name = self.name.ok_or(DumpParseError::MissingThreadName)?;
        let state = self
            .state
            .ok_or_else(|| DumpParseError::MissingThreadState(name.clone()))?;
        Ok(ThreadInfo {
            name,
            lock_name: self.lock_name,
            lock_owner_name: self.lock_owner_name,
            in_native: self.in_native,
            suspended: self.suspended,
            state,
            frames: self.frames,
        })
    }
}

/// Folds finalized thread records into the final [`DumpInfo`]. Product
/// identity is recovered from the thread list as a post-processing
/// step, never during per-line extraction.
#[derive(Debug, Default)]
pub struct DumpInfoBuilder {
    threads: Vec<ThreadInfo>,
}

impl DumpInfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread(&mut self, thread: ThreadInfo) {
        self.threads.push(thread);
    }

    pub fn build(self) -> Result<DumpInfo, DumpParseError> {
        if self.threads.is_empty() {
            return Err(DumpParseError::EmptyDump);
        }
        let metadata = DumpMetadata::from_threads(&self.threads);
        Ok(DumpInfo {
            metadata,
            threads: self.threads,
        })
    }
}
