//! Server-assigned message identifier

use std::fmt;

use serde::{Deserialize, Serialize};

/// IMAP UID of a message in the selected folder
///
/// Servers assign UIDs in ascending arrival order, so the highest UID among
/// search results is the most recently delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageUid(u32);

impl MessageUid {
    /// Wrap a raw UID
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw UID value
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for MessageUid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        let uids = [MessageUid::new(9), MessageUid::new(120), MessageUid::new(11)];
        assert_eq!(uids.iter().max(), Some(&MessageUid::new(120)));
    }

    #[test]
    fn display_is_raw_number() {
        assert_eq!(MessageUid::from(42).to_string(), "42");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&MessageUid::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
