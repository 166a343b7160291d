//! What happens to the source message's read flag after processing

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-state handling for processed newsletters
///
/// Discovery never filters on the `\Seen` flag; this policy only decides
/// whether processing writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStatePolicy {
    /// Never touch flags; re-running reprocesses the same newsletter
    #[default]
    LeaveUnchanged,
    /// Set `\Seen` on the source message once delivery succeeded
    MarkSeen,
}

impl ReadStatePolicy {
    /// Whether the source message should be flagged after delivery
    pub const fn marks_seen(self) -> bool {
        matches!(self, Self::MarkSeen)
    }
}

impl fmt::Display for ReadStatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeaveUnchanged => write!(f, "leave_unchanged"),
            Self::MarkSeen => write!(f, "mark_seen"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_leaves_flags_alone() {
        assert_eq!(ReadStatePolicy::default(), ReadStatePolicy::LeaveUnchanged);
        assert!(!ReadStatePolicy::default().marks_seen());
    }

    #[test]
    fn deserializes_snake_case() {
        let policy: ReadStatePolicy = serde_json::from_str(r#""mark_seen""#).unwrap();
        assert!(policy.marks_seen());
        assert_eq!(policy.to_string(), "mark_seen");
    }
}
