use tracing::debug;
use trust_dns_resolver::{Resolver, error::ResolveError};

use super::MailExchanger;
use crate::error::CheckError;

/// Lookup MX records for `domain` using the system resolver.
///
/// Every failure (resolver setup, NXDOMAIN, timeout, empty answer) is reported
/// as [`CheckError::UnresolvableHost`]; the cause is only logged.
pub fn resolve_mail_exchangers(domain: &str) -> Result<Vec<MailExchanger>, CheckError> {
    let resolver = Resolver::from_system_conf().map_err(|err| {
        debug!(domain, error = %err, "resolver initialization failed");
        CheckError::unresolvable(domain)
    })?;
    resolve_with(&resolver, domain)
}

pub(crate) fn resolve_with<R>(resolver: &R, domain: &str) -> Result<Vec<MailExchanger>, CheckError>
where
    R: LookupMx,
{
    let Some(name) = normalize_domain(domain) else {
        debug!(domain, "empty domain, skipping MX lookup");
        return Err(CheckError::unresolvable(domain));
    };

    let mut records = resolver.lookup_mx(&name).map_err(|err| {
        debug!(domain = %name, error = %err, "MX lookup failed");
        CheckError::unresolvable(domain)
    })?;

    records.retain(|record| !record.host.is_empty());
    records.sort();
    records.dedup();

    if records.is_empty() {
        debug!(domain = %name, "no MX records");
        return Err(CheckError::unresolvable(domain));
    }
    debug!(domain = %name, count = records.len(), preferred = %records[0].host, "MX records resolved");
    Ok(records)
}

pub(crate) fn normalize_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MailExchanger::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}
