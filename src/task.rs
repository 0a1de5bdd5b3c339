//! Task-style wrapper: merge argument maps, build once, send once.

use std::collections::BTreeMap;

use tracing::error;

use crate::config::{EmailConfig, EmailConfigBuilder};
use crate::sender::{Mailer, SmtpMailer};
use crate::MailError;

/// One email send expressed as a task: initialized from argument maps,
/// executed once, reporting a plain success flag to its host.
///
/// Typed errors stop at this boundary; anything below it propagates
/// [`MailError`] untouched.
#[derive(Debug)]
pub struct EmailTask {
    config: EmailConfig,
}

impl EmailTask {
    /// Merge third-party credentials with task arguments and build the
    /// configuration. Task arguments override credential entries under the
    /// same key. Building happens eagerly, so malformed input fails here
    /// with the full typed error rather than inside [`execute`](Self::execute).
    pub fn init(
        credentials: BTreeMap<String, String>,
        args: BTreeMap<String, String>,
    ) -> Result<Self, MailError> {
        let mut merged = credentials;
        merged.extend(args);

        let config = EmailConfigBuilder::from_args(merged)?.build()?;
        Ok(EmailTask { config })
    }

    /// The configuration this task will send.
    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Send through an SMTP transport built from the configuration.
    pub fn execute(&self) -> bool {
        let mailer = match SmtpMailer::from_settings(&self.config.smtp) {
            Ok(mailer) => mailer,
            Err(e) => {
                error!(error = %e, "failed to configure SMTP transport");
                return false;
            }
        };

        self.execute_with(&mailer)
    }

    /// Send through any [`Mailer`], converting the typed failure to a
    /// boolean status signal.
    pub fn execute_with(&self, mailer: &impl Mailer) -> bool {
        match mailer.send(&self.config) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "email task failed");
                false
            }
        }
    }
}
