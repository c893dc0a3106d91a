use std::time::Duration;

use tracing::debug;

use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::mx::{self, MailExchanger};
use crate::smtp;
use crate::validator::{self, split_address};

/// Runs the three verification steps with one shared configuration.
///
/// The steps are independent so callers can cache exchangers per domain or
/// stop after the syntax check. A `Checker` is cheap to clone and can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Checker {
    config: CheckerConfig,
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn sender_domain(&self) -> &str {
        self.config.sender_domain()
    }

    pub fn sender_email(&self) -> &str {
        self.config.sender_email()
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    pub fn validate_format(&self, email: &str) -> Result<(), CheckError> {
        validator::validate_format(email)
    }

    /// Resolves the mail exchangers of the domain of `email`.
    pub fn validate_dns(&self, email: &str) -> Result<Vec<MailExchanger>, CheckError> {
        let domain = domain_of(email)?;
        mx::resolve_mail_exchangers(&domain)
    }

    #[cfg(test)]
    pub(crate) fn validate_dns_with<R: mx::LookupMx>(
        &self,
        email: &str,
        resolver: &R,
    ) -> Result<Vec<MailExchanger>, CheckError> {
        let domain = domain_of(email)?;
        mx::resolve_with(resolver, &domain)
    }

    /// Asks the preferred exchanger whether it would accept `email`.
    pub fn validate_smtp(
        &self,
        email: &str,
        exchangers: &[MailExchanger],
    ) -> Result<(), CheckError> {
        smtp::probe(&self.config, exchangers, email)
    }

    /// Format, then DNS, then SMTP. Returns the exchangers that were used.
    pub fn verify(&self, email: &str) -> Result<Vec<MailExchanger>, CheckError> {
        self.validate_format(email)?;
        let exchangers = self.validate_dns(email)?;
        self.validate_smtp(email, &exchangers)?;
        debug!(email, "address verified");
        Ok(exchangers)
    }
}

fn domain_of(email: &str) -> Result<String, CheckError> {
    split_address(email)
        .map(|parts| parts.domain)
        .ok_or_else(|| CheckError::bad_format(email))
}
