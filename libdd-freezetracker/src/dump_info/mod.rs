// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod builder;
mod metadata;
mod stacktrace;
pub(crate) mod test_utils;
mod thread_info;

pub use builder::*;
pub use metadata::DumpMetadata;
pub use stacktrace::*;
pub use thread_info::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The whole parsed capture: product identity plus every thread record,
/// in order of appearance in the dump text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DumpInfo {
    pub metadata: DumpMetadata,
    pub threads: Vec<ThreadInfo>,
}

impl DumpInfo {
    /// Thread-name lookup. Dump grammar does not guarantee unique
    /// names; the first occurrence in dump order wins.
    pub fn find_thread_by_name(&self, name: &str) -> Option<&ThreadInfo> {
        self.threads.iter().find(|thread| thread.name == name)
    }

    pub fn event_dispatch_thread(&self) -> Option<&ThreadInfo> {
        self.threads.iter().find(|thread| thread.is_event_dispatch())
    }

    /// The event dispatch thread exists and is stalled, i.e. the
    /// capture actually shows a freeze.
    pub fn is_event_thread_stalled(&self) -> bool {
        self.event_dispatch_thread()
            .is_some_and(|thread| thread.state.is_stalled())
    }
}
