#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// One candidate delivery target for a domain. Ordering is by ascending
/// `priority` (lower is preferred), then host name.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MailExchanger {
    pub priority: u16,
    pub host: String,
}

impl MailExchanger {
    pub fn new(priority: u16, host: impl Into<String>) -> Self {
        Self {
            priority,
            host: host.into(),
        }
    }
}
