use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use super::reply::SmtpReply;

/// Step of the SMTP dialogue a reply (or failure) belongs to.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmtpStage {
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
}

impl SmtpStage {
    /// Stage that follows a successful reply, `None` once `RCPT TO` is answered.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Greeting => Some(Self::Helo),
            Self::Helo => Some(Self::MailFrom),
            Self::MailFrom => Some(Self::RcptTo),
            Self::RcptTo => None,
        }
    }

    /// Whether `code` is the positive reply expected at this stage.
    pub fn accepts(self, code: u16) -> bool {
        match self {
            Self::Greeting => code == 220,
            Self::Helo | Self::MailFrom => code == 250,
            // 251 "user not local; will forward" counts as accepted
            Self::RcptTo => (250..260).contains(&code),
        }
    }
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting => f.write_str("greeting"),
            Self::Helo => f.write_str("HELO"),
            Self::MailFrom => f.write_str("MAIL FROM"),
            Self::RcptTo => f.write_str("RCPT TO"),
        }
    }
}

/// The three ASCII digits leading an SMTP reply line.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Reads the status code from the start of `text`. Returns `None` unless
    /// the first three bytes are ASCII digits.
    pub fn from_prefix(text: &str) -> Option<Self> {
        match text.as_bytes() {
            [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
                let value = u16::from(a - b'0') * 100 + u16::from(b - b'0') * 10 + u16::from(c - b'0');
                Some(Self(value))
            }
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn is_positive_completion(self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_transient_failure(self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_permanent_failure(self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl PartialEq<&str> for StatusCode {
    fn eq(&self, other: &&str) -> bool {
        Self::from_prefix(other).is_some_and(|code| code == *self && other.len() == 3)
    }
}

/// A negative or broken exchange with the remote SMTP server.
///
/// `raw_message` is the server reply as text (`"550 No such user"`) or, when
/// the connection broke mid-transaction, the transport failure message. In the
/// latter case no status code is available.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{raw_message}")]
pub struct ProtocolError {
    stage: SmtpStage,
    status_code: Option<StatusCode>,
    raw_message: String,
}

impl ProtocolError {
    /// Classifies a raw reply line: the status code is its leading three
    /// characters when those are digits.
    pub fn classify(stage: SmtpStage, raw_message: impl Into<String>) -> Self {
        let raw_message = raw_message.into();
        Self {
            stage,
            status_code: StatusCode::from_prefix(&raw_message),
            raw_message,
        }
    }

    pub(crate) fn from_reply(stage: SmtpStage, reply: &SmtpReply) -> Self {
        Self::classify(stage, reply.to_string())
    }

    pub(crate) fn transport(stage: SmtpStage, err: &io::Error) -> Self {
        Self {
            stage,
            status_code: None,
            raw_message: err.to_string(),
        }
    }

    pub(crate) fn deadline_exceeded(stage: SmtpStage, timeout: Duration) -> Self {
        Self {
            stage,
            status_code: None,
            raw_message: format!("connection closed: session deadline of {timeout:?} exceeded"),
        }
    }

    pub fn stage(&self) -> SmtpStage {
        self.stage
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status_code
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    /// 4xx reply: greylisting, rate limits, mailbox temporarily unavailable.
    pub fn is_transient(&self) -> bool {
        self.status_code.is_some_and(StatusCode::is_transient_failure)
    }

    /// 5xx reply: unknown user, policy rejection.
    pub fn is_permanent(&self) -> bool {
        self.status_code.is_some_and(StatusCode::is_permanent_failure)
    }
}
