use anyhow::{Result, bail};

use checkmail::{CheckError, MailExchanger};

use crate::args::OutputFormat;

/// Step at which the verification stopped.
pub enum Verdict {
    Deliverable(Vec<MailExchanger>),
    BadFormat(CheckError),
    Dns(CheckError),
    Smtp(CheckError),
}

impl Verdict {
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Deliverable(_))
    }

    pub fn exchangers(&self) -> Option<&[MailExchanger]> {
        match self {
            Self::Deliverable(exchangers) => Some(exchangers),
            _ => None,
        }
    }

    pub fn human_line(&self) -> String {
        match self {
            Self::Deliverable(_) => "OK!".to_string(),
            Self::BadFormat(err) => format!("error validating email format - {err}"),
            Self::Dns(err) => format!("error validating dns {err}"),
            Self::Smtp(err) => format!("error validating host {err}"),
        }
    }
}

/// Fails before any network work when `format` cannot be rendered by this build.
pub fn ensure_supported(format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json && !cfg!(feature = "with-serde") {
        bail!("format=json nécessite la feature 'with-serde'");
    }
    Ok(())
}

pub fn write_verdict(email: &str, verdict: &Verdict, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("{}", verdict.human_line());
            Ok(())
        }
        OutputFormat::Json => write_json(email, verdict),
    }
}

#[cfg(feature = "with-serde")]
fn write_json(email: &str, verdict: &Verdict) -> Result<()> {
    let payload = Payload::new(email, verdict);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_email: &str, _verdict: &Verdict) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
#[derive(serde::Serialize)]
struct Payload<'a> {
    email: &'a str,
    deliverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_step: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<checkmail::StatusCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smtp_stage: Option<checkmail::SmtpStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exchangers: Option<&'a [MailExchanger]>,
}

#[cfg(feature = "with-serde")]
impl<'a> Payload<'a> {
    fn new(email: &'a str, verdict: &'a Verdict) -> Self {
        let (failed_step, err) = match verdict {
            Verdict::Deliverable(_) => (None, None),
            Verdict::BadFormat(err) => (Some("format"), Some(err)),
            Verdict::Dns(err) => (Some("dns"), Some(err)),
            Verdict::Smtp(err) => (Some("smtp"), Some(err)),
        };
        Self {
            email,
            deliverable: verdict.is_deliverable(),
            failed_step,
            error: err.map(ToString::to_string),
            status_code: err.and_then(CheckError::status_code),
            smtp_stage: err
                .and_then(CheckError::as_protocol)
                .map(checkmail::ProtocolError::stage),
            exchangers: verdict.exchangers(),
        }
    }
}
