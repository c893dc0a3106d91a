#![forbid(unsafe_code)]
//! checkmail — email format check, MX lookup and SMTP probe without sending mail.
//!
//! ```no_run
//! use checkmail::{Checker, CheckerConfig};
//!
//! let config = CheckerConfig::builder()
//!     .sender_domain("checkmail.me")
//!     .sender_email("probe@checkmail.me")
//!     .build()?;
//! let checker = Checker::new(config);
//!
//! checker.validate_format("florian@carrere.cc")?;
//! let exchangers = checker.validate_dns("florian@carrere.cc")?;
//! checker.validate_smtp("florian@carrere.cc", &exchangers)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod checker;
mod config;
mod error;
pub mod mx;
pub mod smtp;
pub mod validator;

pub use checker::Checker;
pub use config::{CheckerConfig, CheckerConfigBuilder, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT};
pub use error::{CheckError, ConfigError};
pub use mx::{MailExchanger, resolve_mail_exchangers};
pub use smtp::{ProtocolError, SmtpStage, StatusCode, probe, probe_exchanger};
pub use validator::{AddressParts, is_valid_format, split_address, validate_format};
