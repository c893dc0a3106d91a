use std::time::Duration;

use checkmail::{CheckerConfig, ConfigError};
use clap::{Parser, ValueEnum};

/// Rendu du verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// une ligne lisible
    Human,
    /// objet JSON (feature with-serde)
    Json,
}

#[derive(Parser)]
#[command(name = "checkmail-cli", version)]
#[command(about = "Vérifie une adresse e-mail: format, MX, puis sonde SMTP (sans envoi)")]
pub struct Cli {
    /// adresse e-mail à vérifier
    #[arg(long)]
    pub to: String,

    /// enveloppe MAIL FROM
    #[arg(long = "from", env = "CHECKMAIL_FROM")]
    pub from: Option<String>,

    /// nom annoncé avec HELO
    #[arg(long = "host", env = "CHECKMAIL_HOST")]
    pub host: Option<String>,

    /// délai global de la session SMTP (ms, 0 = 10 s)
    #[arg(long = "timeout", env = "CHECKMAIL_TIMEOUT_MS", default_value_t = 0)]
    pub timeout_ms: u64,

    /// port SMTP du serveur MX
    #[arg(long, env = "CHECKMAIL_PORT")]
    pub port: Option<u16>,

    /// format de sortie
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// logs de debug (transcript SMTP) sur stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn checker_config(&self) -> Result<CheckerConfig, ConfigError> {
        let mut builder = CheckerConfig::builder()
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(host) = &self.host {
            builder = builder.sender_domain(host);
        }
        if let Some(from) = &self.from {
            builder = builder.sender_email(from);
        }
        if let Some(port) = self.port {
            builder = builder.smtp_port(port);
        }
        builder.build()
    }
}
