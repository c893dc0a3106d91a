use std::time::Duration;

use crate::error::ConfigError;

/// Used when no timeout (or a zero one) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Sender identity and limits for the SMTP probe. Immutable once built and
/// safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    sender_domain: String,
    sender_email: String,
    timeout: Duration,
    smtp_port: u16,
}

impl CheckerConfig {
    pub fn builder() -> CheckerConfigBuilder {
        CheckerConfigBuilder::default()
    }

    /// Shortcut for a config with the default timeout and port.
    pub fn new(
        sender_domain: impl Into<String>,
        sender_email: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .sender_domain(sender_domain)
            .sender_email(sender_email)
            .build()
    }

    /// Name announced with `HELO`.
    pub fn sender_domain(&self) -> &str {
        &self.sender_domain
    }

    /// Envelope sender used in `MAIL FROM`.
    pub fn sender_email(&self) -> &str {
        &self.sender_email
    }

    /// Deadline for a whole SMTP session, also bounding the TCP connect.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckerConfigBuilder {
    sender_domain: Option<String>,
    sender_email: Option<String>,
    timeout: Option<Duration>,
    smtp_port: Option<u16>,
}

impl CheckerConfigBuilder {
    pub fn sender_domain(mut self, sender_domain: impl Into<String>) -> Self {
        self.sender_domain = Some(sender_domain.into());
        self
    }

    pub fn sender_email(mut self, sender_email: impl Into<String>) -> Self {
        self.sender_email = Some(sender_email.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn smtp_port(mut self, smtp_port: u16) -> Self {
        self.smtp_port = Some(smtp_port);
        self
    }

    pub fn build(self) -> Result<CheckerConfig, ConfigError> {
        let sender_domain = required("sender_domain", self.sender_domain)?;
        let sender_email = required("sender_email", self.sender_email)?;
        let timeout = self
            .timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);
        let smtp_port = self
            .smtp_port
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_SMTP_PORT);

        Ok(CheckerConfig {
            sender_domain,
            sender_email,
            timeout,
            smtp_port,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField(field))?;
    // these values end up verbatim on an SMTP command line
    if value.contains(['\r', '\n']) {
        return Err(ConfigError::LineBreak(field));
    }
    Ok(value)
}
