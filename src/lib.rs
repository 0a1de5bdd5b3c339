//! Argument-driven email composition and SMTP dispatch.
//!
//! This crate turns a flat string-keyed argument map — task arguments
//! (`from`, `to`, `subject`, ...) merged with `mail.smtp.*` connection
//! properties — into a validated, immutable [`EmailConfig`], then hands it
//! to an SMTP transport built on [lettre](https://lettre.rs).
//!
//! # Quick Start
//!
//! ```ignore
//! // 1. Collect arguments (typically task args merged with credentials)
//! let mut args = BTreeMap::new();
//! args.insert("from".into(), "alice@example.com".into());
//! args.insert("to".into(), "bob@example.com".into());
//! args.insert("subject".into(), "Hello".into());
//! args.insert("body".into(), "Hi Bob".into());
//! args.insert("mail.smtp.host".into(), "smtp.example.com".into());
//!
//! // 2. Build the configuration (all validation happens here)
//! let config = EmailConfigBuilder::from_args(args)?.build()?;
//!
//! // 3. Send
//! let mailer = SmtpMailer::from_settings(&config.smtp)?;
//! mailer.send(&config)?;
//! ```
//!
//! # Argument keys
//!
//! | Key | Required | Description |
//! |-----|----------|-------------|
//! | `from` | Yes | Sender address |
//! | `to` | Yes | Recipients, comma-separated |
//! | `cc`, `bcc` | No | Copy recipients, comma-separated |
//! | `subject` | Yes | Subject line, at most 78 characters |
//! | `body` | No | Plain-text body (default empty) |
//! | `file_path`, `file_name` | No | Single attachment |
//! | `mail.smtp.host` | Yes | SMTP server hostname |
//! | `mail.smtp.port` | No | Port (default: 587) |
//! | `mail.smtp.username`, `mail.smtp.password` | No | Credentials |
//! | `mail.smtp.auth` | No | Authenticate (default: true) |
//! | `mail.smtp.starttls.enable` | No | Use STARTTLS (default: false) |
//! | `mail.smtp.ssl.trust` | No | Hosts to trust (default: `*`) |
//! | `mail.debug` | No | Transport debug logging (default: false) |
//!
//! Any other key is carried through verbatim as a passthrough connection
//! property (see [`SmtpSettings`]).

pub mod config;
pub mod convert;
mod error;
pub mod sender;
pub mod task;

pub use config::{AttachmentSpec, EmailConfig, EmailConfigBuilder, SmtpSettings};
pub use error::MailError;
pub use sender::{send_email, Mailer, SmtpMailer};
pub use task::EmailTask;
