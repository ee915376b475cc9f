// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel line number for frames whose source line is not recorded.
pub const LINE_UNKNOWN_SOURCE: i32 = -1;
/// Sentinel line number for native-method frames.
pub const LINE_NATIVE_METHOD: i32 = -2;

/// Method-name substring marking a frame that performs the contended
/// read action guarded by the application read/write lock.
pub const READ_ACTION_MARKER: &str = "runreadaction";

/// One call-site entry of a thread's stack capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub line_number: i32,
}

impl StackFrame {
    pub fn new(
        class_name: String,
        method_name: String,
        file_name: Option<String>,
        line_number: i32,
    ) -> Self {
        Self {
            class_name,
            method_name,
            file_name,
            line_number,
        }
    }

    pub fn is_native_method(&self) -> bool {
        self.line_number == LINE_NATIVE_METHOD
    }

    /// A frame is resolvable when an external collaborator can navigate
    /// to its source: file known, not native, line number recorded.
    pub fn is_resolvable(&self) -> bool {
        self.file_name.is_some() && !self.is_native_method() && self.line_number >= 0
    }

    pub fn is_performing_read_action(&self) -> bool {
        self.method_name
            .to_ascii_lowercase()
            .contains(READ_ACTION_MARKER)
    }

    /// The outermost class name, with any nested-class suffix removed.
    pub fn outer_class_name(&self) -> &str {
        match self.class_name.split_once('$') {
            Some((outer, _)) => outer,
            None => &self.class_name,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.class_name, self.method_name)?;
        if self.is_native_method() {
            write!(f, "Native Method")?;
        } else {
            match (&self.file_name, self.line_number) {
                (Some(file), line) if line >= 0 => write!(f, "{file}:{line}")?,
                (Some(file), _) => write!(f, "{file}")?,
                (None, _) => write!(f, "Unknown Source")?,
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
impl super::test_utils::TestInstance for StackFrame {
    fn test_instance(seed: u64) -> Self {
        Self::new(
            format!("com.example.Worker{seed}"),
            format!("process{seed}"),
            Some(format!("Worker{seed}.java")),
            seed as i32,
        )
    }
}
