//! DNS MX resolution.
//!
//! The public entry point is [`resolve_mail_exchangers`], which performs a
//! synchronous lookup using the system resolver and returns the exchangers
//! sorted by preference.

mod resolver;
mod types;

pub use resolver::resolve_mail_exchangers;
pub use types::MailExchanger;

#[cfg(test)]
pub(crate) use resolver::{LookupMx, resolve_with};
