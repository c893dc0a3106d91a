//! Partial SMTP transaction used to probe a mailbox.
//!
//! [`probe`] connects to the preferred mail exchanger, walks the dialogue up
//! to `RCPT TO` under a single session deadline, and classifies any negative
//! reply into a [`ProtocolError`].

mod deadline;
mod error;
mod probe;
mod reply;
mod session;

pub use error::{ProtocolError, SmtpStage, StatusCode};
pub use probe::{probe, probe_exchanger};
