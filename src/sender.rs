//! Mailer trait and SMTP implementation.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::{EmailConfig, SmtpSettings};
use crate::convert;
use crate::MailError;

/// The one passthrough property the transport layer honors itself:
/// connection timeout, in milliseconds.
pub const PROPERTY_MAIL_SMTP_CONNECTION_TIMEOUT: &str = "mail.smtp.connectiontimeout";

/// Email sending trait.
///
/// Implement this to provide alternative backends (or a recording stub in
/// tests).
pub trait Mailer {
    /// Send one email described by `config`.
    fn send(&self, config: &EmailConfig) -> Result<(), MailError>;
}

/// SMTP-based mailer using lettre's blocking transport.
///
/// One send is one linear unit of work: connect, authenticate per the
/// settings, transmit, close. The transport owns the socket on every exit
/// path and teardown failures surface as [`MailError::Smtp`].
#[derive(Debug)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    debug: bool,
}

impl SmtpMailer {
    /// Create a mailer from connection settings.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = if settings.starttls {
            let mut tls = TlsParameters::builder(settings.host.clone());
            if settings.ssl_trust == "*" {
                tls = tls
                    .dangerous_accept_invalid_certs(true)
                    .dangerous_accept_invalid_hostnames(true);
            }
            let tls = tls.build().map_err(|e| MailError::Smtp(e.to_string()))?;

            SmtpTransport::starttls_relay(&settings.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?
                .tls(Tls::Required(tls))
        } else {
            SmtpTransport::builder_dangerous(&settings.host)
        };

        builder = builder.port(settings.port);

        if settings.auth {
            if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
                builder = builder.credentials(Credentials::new(
                    username.to_string(),
                    password.to_string(),
                ));
            }
        }

        if let Some(raw) = settings.extra.get(PROPERTY_MAIL_SMTP_CONNECTION_TIMEOUT) {
            let millis = convert::parse_int(PROPERTY_MAIL_SMTP_CONNECTION_TIMEOUT, raw)?;
            let millis = u64::try_from(millis).map_err(|_| {
                MailError::InvalidArgument(format!(
                    "connection timeout must not be negative: {millis}"
                ))
            })?;
            builder = builder.timeout(Some(Duration::from_millis(millis)));
        }

        for key in settings.extra.keys() {
            if key != PROPERTY_MAIL_SMTP_CONNECTION_TIMEOUT {
                debug!(%key, "passthrough property not consumed by transport");
            }
        }

        Ok(SmtpMailer {
            transport: builder.build(),
            debug: settings.debug,
        })
    }

    /// Build a wire-ready message from a configuration.
    ///
    /// Recipient registration order is Bcc, Cc, From, To.
    fn build_message(config: &EmailConfig) -> Result<Message, MailError> {
        let mut builder = Message::builder();

        for address in &config.bcc {
            builder = builder.bcc(parse_mailbox(address)?);
        }

        for address in &config.cc {
            builder = builder.cc(parse_mailbox(address)?);
        }

        builder = builder.from(parse_mailbox(&config.from)?);

        for address in &config.recipients {
            builder = builder.to(parse_mailbox(address)?);
        }

        builder = builder.subject(&config.subject);

        let message = match &config.attachment {
            Some(spec) => {
                let content = std::fs::read(&spec.path).map_err(|source| {
                    MailError::Attachment {
                        path: spec.path.clone(),
                        source,
                    }
                })?;
                let content_type = ContentType::parse("application/octet-stream")
                    .map_err(|e| MailError::Build(e.to_string()))?;
                let file_part = Attachment::new(spec.name.clone())
                    .body(Body::new(content), content_type);

                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(SinglePart::plain(config.body.clone()))
                            .singlepart(file_part),
                    )
                    .map_err(|e| MailError::Build(e.to_string()))?
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(config.body.clone())
                .map_err(|e| MailError::Build(e.to_string()))?,
        };

        Ok(message)
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, config: &EmailConfig) -> Result<(), MailError> {
        let message = Self::build_message(config)?;

        if self.debug {
            debug!(
                subject = %config.subject,
                from = %config.from,
                to = %config.recipients.join(","),
                "sending email"
            );
        }

        self.transport
            .send(&message)
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        info!(subject = %config.subject, "email sent");
        Ok(())
    }
}

/// Build a transport from the configuration's settings and send in one call.
pub fn send_email(config: &EmailConfig) -> Result<(), MailError> {
    SmtpMailer::from_settings(&config.smtp)?.send(config)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}
