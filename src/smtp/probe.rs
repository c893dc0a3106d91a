use tracing::debug;

use super::error::{ProtocolError, SmtpStage};
use super::session::SmtpSession;
use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::mx::MailExchanger;
use crate::validator::split_address;

/// Probes `recipient` against the most preferred exchanger of `exchangers`.
///
/// Runs greeting, `HELO`, `MAIL FROM` and `RCPT TO` and disconnects as soon
/// as the `RCPT TO` reply is read. `DATA` is never sent.
pub fn probe(
    config: &CheckerConfig,
    exchangers: &[MailExchanger],
    recipient: &str,
) -> Result<(), CheckError> {
    let Some(exchanger) = exchangers.first() else {
        let domain = split_address(recipient)
            .map(|parts| parts.domain)
            .unwrap_or_default();
        return Err(CheckError::unresolvable(domain));
    };
    probe_exchanger(config, exchanger, recipient)
}

/// Same as [`probe`] against one given exchanger.
pub fn probe_exchanger(
    config: &CheckerConfig,
    exchanger: &MailExchanger,
    recipient: &str,
) -> Result<(), CheckError> {
    // the recipient is written verbatim on the RCPT line
    if recipient.contains(['\r', '\n']) {
        return Err(CheckError::bad_format(recipient));
    }

    let (mut session, peer) =
        SmtpSession::connect(&exchanger.host, config.smtp_port(), config.timeout())
            .map_err(|source| CheckError::connect_failed(&exchanger.host, source))?;
    debug!(host = %exchanger.host, %peer, "connected to mail exchanger");

    session
        .arm_deadline(config.timeout())
        .map_err(|source| CheckError::connect_failed(&exchanger.host, source))?;

    let mut stage = SmtpStage::Greeting;
    loop {
        let command = command_for(stage, config, recipient);
        let reply = session.exchange(stage, command.as_deref())?;
        if !stage.accepts(reply.code) {
            debug!(host = %exchanger.host, %stage, code = reply.code, "negative reply");
            return Err(ProtocolError::from_reply(stage, &reply).into());
        }
        match stage.next() {
            Some(next) => stage = next,
            None => break,
        }
    }

    debug!(host = %exchanger.host, recipient, "recipient accepted");
    Ok(())
}

fn command_for(stage: SmtpStage, config: &CheckerConfig, recipient: &str) -> Option<String> {
    match stage {
        SmtpStage::Greeting => None,
        SmtpStage::Helo => Some(format!("HELO {}", config.sender_domain())),
        SmtpStage::MailFrom => Some(format!("MAIL FROM:<{}>", config.sender_email())),
        SmtpStage::RcptTo => Some(format!("RCPT TO:<{recipient}>")),
    }
}
