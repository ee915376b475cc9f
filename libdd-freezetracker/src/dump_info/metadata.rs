// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::thread_info::ThreadInfo;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// The event dispatch thread of the captured product embeds the product
// identity in its own name, e.g.
// "AWT-EventQueue-0 2016.3#IU-163.SNAPSHOT IDEA, eap:true".
static EVENT_THREAD_IDENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^AWT-EventQueue-\d+ (?P<version>[^#\s]+)#(?P<build>\S+) (?P<product>[^,]+)")
        .unwrap()
});

/// Product identity of the process the dump was captured from. All
/// fields are optional: they are only known when some event dispatch
/// thread's name embeds them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DumpMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
}

impl DumpMetadata {
    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.version.is_none() && self.build_number.is_none()
    }

    /// Scans the finalized thread list for an event dispatch thread
    /// whose name embeds the product identity. Runs after extraction so
    /// the per-line parser stays free of dump-level side effects.
    pub fn from_threads(threads: &[ThreadInfo]) -> Self {
        threads
            .iter()
            .filter(|thread| thread.is_event_dispatch())
            .find_map(|thread| Self::from_thread_name(&thread.name))
            .unwrap_or_default()
    }

    fn from_thread_name(name: &str) -> Option<Self> {
        let captures = EVENT_THREAD_IDENTITY_RE.captures(name)?;
        Some(Self {
            product: Some(captures["product"].to_string()),
            version: Some(captures["version"].to_string()),
            build_number: Some(captures["build"].to_string()),
        })
    }
}
