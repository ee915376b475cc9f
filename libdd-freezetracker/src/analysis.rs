// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Derives the blocking/waiting dependency graph from a parsed dump:
//! which thread is ultimately responsible for stalling the thread of
//! interest, through a possibly multi-hop chain of lock ownership.

use crate::dump_info::{DumpInfo, ThreadInfo};
use std::collections::HashSet;
use tracing::warn;

/// Lock-name substring identifying the application read/write lock
/// whose contention stalls the event dispatch thread.
pub const CONTENDED_RW_LOCK_MARKER: &str = "ReadMostlyRWLock";

/// One directed edge of the dependency graph: `waiting` is blocked on a
/// lock that `working` currently owns. Edges borrow from the dump; the
/// graph is a derived, recomputable view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadDumpDependency<'dump> {
    pub waiting: &'dump ThreadInfo,
    pub working: &'dump ThreadInfo,
}

/// Threads most proximately responsible for stalling `thread`.
///
/// When `thread` waits on the contended read/write lock, every other
/// thread performing the protected read action while running (or while
/// itself parked on some lock) is a candidate blocker, in dump order.
/// A lock owner `thread` names explicitly is always a blocker; an owner
/// name that resolves to no thread in the dump truncates quietly.
pub fn direct_blockers<'dump>(
    dump: &'dump DumpInfo,
    thread: &ThreadInfo,
) -> Vec<&'dump ThreadInfo> {
    let mut blockers = Vec::new();

    let waits_on_rw_lock = thread
        .lock_name
        .as_deref()
        .is_some_and(|lock| lock.contains(CONTENDED_RW_LOCK_MARKER));

    if waits_on_rw_lock {
        for other in &dump.threads {
            if std::ptr::eq(other, thread) {
                continue;
            }
            if other.is_performing_read_action() && (other.is_running() || other.lock_name.is_some())
            {
                blockers.push(other);
            }
        }
    }

    if let Some(owner_name) = thread.lock_owner_name.as_deref() {
        match dump.find_thread_by_name(owner_name) {
            Some(owner) => blockers.push(owner),
            None => warn!(owner = owner_name, "lock owner is not present in the dump"),
        }
    }

    blockers
}

/// Transitive chain of `(waiting, working)` edges starting at `start`,
/// following `lock_owner_name` lookups until a thread names no owner or
/// the owner is absent from the dump. A visited set stops the walk once
/// it returns to an already-walked thread, so a genuine deadlock cycle
/// yields its closing edge exactly once.
pub fn dependency_chain<'dump>(
    dump: &'dump DumpInfo,
    start: &'dump ThreadInfo,
) -> Vec<ThreadDumpDependency<'dump>> {
    let mut chain = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut waiting = start;
    visited.insert(waiting.name.as_str());

    loop {
        let Some(owner_name) = waiting.lock_owner_name.as_deref() else {
            break;
        };
        let Some(working) = dump.find_thread_by_name(owner_name) else {
            warn!(
                waiting = waiting.name.as_str(),
                owner = owner_name,
                "dependency chain truncated: lock owner is not present in the dump"
            );
            break;
        };

        chain.push(ThreadDumpDependency { waiting, working });
        if !visited.insert(working.name.as_str()) {
            break;
        }
        waiting = working;
    }

    chain
}

/// The full blocking forest rooted at the event dispatch thread: one
/// edge to each direct blocker, then each blocker's transitive chain.
/// Empty when the dump has no event dispatch thread.
pub fn dependency_graph(dump: &DumpInfo) -> Vec<ThreadDumpDependency<'_>> {
    match dump.event_dispatch_thread() {
        Some(event_thread) => dependency_graph_for(dump, event_thread),
        None => Vec::new(),
    }
}

/// Same as [`dependency_graph`], rooted at an arbitrary thread of
/// interest.
pub fn dependency_graph_for<'dump>(
    dump: &'dump DumpInfo,
    thread: &'dump ThreadInfo,
) -> Vec<ThreadDumpDependency<'dump>> {
    let blockers = direct_blockers(dump, thread);

    let mut graph: Vec<ThreadDumpDependency<'dump>> = blockers
        .iter()
        .map(|&blocker| ThreadDumpDependency {
            waiting: thread,
            working: blocker,
        })
        .collect();

    for blocker in blockers {
        graph.extend(dependency_chain(dump, blocker));
    }

    graph
}
