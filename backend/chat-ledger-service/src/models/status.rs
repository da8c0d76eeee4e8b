//! Delivery status state machine.
//!
//! ```text
//! SENT -> DELIVERED -> READ
//! ```
//!
//! Status only moves forward. A request for an equal or lower rank is ignored,
//! which makes retried and out-of-order receipts harmless.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

/// Result of asking the state machine to move from one status to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied {
        from: MessageStatus,
        to: MessageStatus,
    },
    Ignored,
}

impl MessageStatus {
    /// Explicit position in the lifecycle; ordering never depends on variant layout.
    pub const fn rank(self) -> u8 {
        match self {
            MessageStatus::Sent => 0,
            MessageStatus::Delivered => 1,
            MessageStatus::Read => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == MessageStatus::Read
    }

    pub fn transition(self, requested: MessageStatus) -> Transition {
        if requested.rank() > self.rank() {
            Transition::Applied {
                from: self,
                to: requested,
            }
        } else {
            Transition::Ignored
        }
    }

    /// Same spelling as the wire format, so logs and metric labels line up with payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Sent => "SENT",
            MessageStatus::Delivered => "DELIVERED",
            MessageStatus::Read => "READ",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}
