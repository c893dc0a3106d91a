//! Address syntax check.
//!
//! The grammar is deliberately small: an ASCII `atext`-like local part, then
//! dot-separated LDH labels of 1 to 63 characters. It is compiled once and
//! matched against the whole input, so surrounding whitespace is an error.

mod types;

pub use types::AddressParts;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CheckError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email grammar is a valid regex"));

/// Checks `address` against the email grammar. Pure, touches no network.
pub fn validate_format(address: &str) -> Result<(), CheckError> {
    if is_valid_format(address) {
        Ok(())
    } else {
        Err(CheckError::bad_format(address))
    }
}

pub fn is_valid_format(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Splits on the last `@`, so a stray `@` in the local part never leaks into
/// the domain.
pub fn split_address(address: &str) -> Option<AddressParts> {
    address
        .rsplit_once('@')
        .map(|(local_part, domain)| AddressParts {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
}
