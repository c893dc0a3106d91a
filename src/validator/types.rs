#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// An address split on its last `@`.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParts {
    pub local_part: String,
    pub domain: String,
}
