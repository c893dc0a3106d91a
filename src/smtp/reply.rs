use std::fmt;

/// A raw SMTP reply: numeric status code and message text. Continuation lines
/// of a multi-line reply are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    /// Parses one reply line into its code, continuation flag and text.
    pub(crate) fn parse_line(raw: &str) -> Result<(u16, bool, &str), String> {
        if raw.len() < 3 || !raw.is_char_boundary(3) {
            return Err(format!("invalid SMTP reply: '{raw}'"));
        }
        let code_part = &raw[..3];
        if !code_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid SMTP status code: '{code_part}'"));
        }
        let code = code_part
            .parse::<u16>()
            .map_err(|_| format!("invalid SMTP status code: '{code_part}'"))?;
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        let text = raw.get(4..).unwrap_or("");
        Ok((code, continuation, text))
    }
}

/// Rendered the way servers send it, `"<code> <text>"`, so the reply can be
/// classified by its textual prefix.
impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{:03}", self.code)
        } else {
            write!(f, "{:03} {}", self.code, self.message)
        }
    }
}
