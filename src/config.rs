//! Argument parsing, the configuration builder and its immutable output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::convert;
use crate::MailError;

/// Argument keys recognized in the task-argument half of the map.
pub const ARG_FROM: &str = "from";
pub const ARG_RECIPIENTS: &str = "to";
pub const ARG_CC: &str = "cc";
pub const ARG_BCC: &str = "bcc";
pub const ARG_SUBJECT: &str = "subject";
pub const ARG_BODY: &str = "body";
pub const ARG_FILE_PATH: &str = "file_path";
pub const ARG_FILE_NAME: &str = "file_name";

/// Connection property keys, named after the javamail-style properties the
/// credential store supplies them under.
pub const PROPERTY_MAIL_DEBUG: &str = "mail.debug";
pub const PROPERTY_MAIL_SMTP_HOST: &str = "mail.smtp.host";
pub const PROPERTY_MAIL_SMTP_PORT: &str = "mail.smtp.port";
pub const PROPERTY_MAIL_SMTP_USERNAME: &str = "mail.smtp.username";
pub const PROPERTY_MAIL_SMTP_PASSWORD: &str = "mail.smtp.password";
pub const PROPERTY_MAIL_SMTP_AUTH: &str = "mail.smtp.auth";
pub const PROPERTY_MAIL_SMTP_STARTTLS_ENABLE: &str = "mail.smtp.starttls.enable";
pub const PROPERTY_MAIL_SMTP_SSL_TRUST: &str = "mail.smtp.ssl.trust";

/// cf. RFC 2822: subject lines should stay within 78 characters.
const MAX_SUBJECT_LENGTH: usize = 78;

const DEFAULT_ATTACHMENT_NAME: &str = "attachment.txt";

/// Split a comma-delimited address list.
///
/// The delimiter is a comma followed by at most one whitespace character;
/// that whitespace belongs to the delimiter, so only segments preceded by a
/// comma have it stripped. Segments are not otherwise trimmed and empty
/// segments are preserved.
fn split_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .enumerate()
        .map(|(index, segment)| {
            if index == 0 {
                return segment.to_string();
            }
            segment
                .strip_prefix(|c: char| c.is_whitespace())
                .unwrap_or(segment)
                .to_string()
        })
        .collect()
}

/// SMTP connection settings.
///
/// Recognized settings are typed fields; everything else the argument map
/// carried under an unrecognized key lands in [`extra`](Self::extra) and is
/// handed to the transport layer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// SMTP server hostname.
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Password for authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Whether to authenticate (default: true).
    #[serde(default = "default_true")]
    pub auth: bool,

    /// Transport debug logging (default: false).
    #[serde(default)]
    pub debug: bool,

    /// Whether to issue STARTTLS before login (default: false).
    #[serde(default)]
    pub starttls: bool,

    /// Hosts whose certificates are trusted; `*` trusts everything
    /// (default: `*`).
    #[serde(default = "default_ssl_trust")]
    pub ssl_trust: String,

    /// Passthrough connection properties, carried through unchanged.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

fn default_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_ssl_trust() -> String {
    "*".to_string()
}

impl SmtpSettings {
    /// Load settings from `SMTP_*` environment variables.
    ///
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    /// `SMTP_AUTH`, `SMTP_STARTTLS`, `SMTP_SSL_TRUST`, `SMTP_DEBUG`.
    pub fn from_env() -> Result<Self, MailError> {
        dotenvy::dotenv().ok();

        let c = config::Config::builder()
            .add_source(config::Environment::with_prefix("SMTP"))
            .build()
            .map_err(|e| MailError::MissingConfig(e.to_string()))?;

        c.try_deserialize()
            .map_err(|e| MailError::MissingConfig(e.to_string()))
    }
}

/// A single file attachment: where to read it and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSpec {
    /// Path of the file to read.
    pub path: String,
    /// Display name the recipient sees.
    pub name: String,
}

/// A complete, validated email configuration ready for dispatch.
///
/// Produced exactly once per send by [`EmailConfigBuilder::build`]; there is
/// no mutation API, and it is discarded after the send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Sender address.
    pub from: String,
    /// Primary recipients, in insertion order. Never empty.
    pub recipients: Vec<String>,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Blind carbon copy recipients.
    #[serde(default)]
    pub bcc: Vec<String>,
    /// Subject line, at most 78 characters.
    pub subject: String,
    /// Plain-text body.
    #[serde(default)]
    pub body: String,
    /// Optional single attachment.
    #[serde(default)]
    pub attachment: Option<AttachmentSpec>,
    /// Connection settings.
    pub smtp: SmtpSettings,
}

impl EmailConfig {
    /// Create a new configuration builder with default settings.
    pub fn builder() -> EmailConfigBuilder {
        EmailConfigBuilder::new()
    }
}

/// Accumulator that turns raw arguments into an [`EmailConfig`].
///
/// Setters never validate; all structural checks run once, in
/// [`build`](Self::build), which consumes the builder.
#[derive(Debug, Clone)]
pub struct EmailConfigBuilder {
    auth: bool,
    debug: bool,
    starttls: bool,
    port: u16,
    cc: Vec<String>,
    bcc: Vec<String>,
    recipients: Vec<String>,
    body: String,
    from: Option<String>,
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    subject: Option<String>,
    ssl_trust: String,
    file_path: Option<String>,
    file_name: String,
    extra: BTreeMap<String, String>,
}

impl Default for EmailConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailConfigBuilder {
    /// Create a builder with every field at its default.
    pub fn new() -> Self {
        EmailConfigBuilder {
            auth: true,
            debug: false,
            starttls: false,
            port: default_port(),
            cc: Vec::new(),
            bcc: Vec::new(),
            recipients: Vec::new(),
            body: String::new(),
            from: None,
            host: None,
            username: None,
            password: None,
            subject: None,
            ssl_trust: default_ssl_trust(),
            file_path: None,
            file_name: DEFAULT_ATTACHMENT_NAME.to_string(),
            extra: BTreeMap::new(),
        }
    }

    /// Populate a builder from a combined argument map.
    ///
    /// Recognized connection properties are extracted (and removed) first,
    /// then recognized message arguments; whatever remains is merged into
    /// the passthrough properties untouched. `mail.smtp.host` is the one
    /// property whose absence fails here rather than at build time.
    pub fn from_args(mut args: BTreeMap<String, String>) -> Result<Self, MailError> {
        let mut builder = Self::new();

        builder.load_connection_properties(&mut args)?;
        builder.load_arguments(&mut args);

        // Everything still in the map is a passthrough property.
        builder.extra.extend(args);

        Ok(builder)
    }

    fn load_connection_properties(
        &mut self,
        args: &mut BTreeMap<String, String>,
    ) -> Result<(), MailError> {
        if let Some(value) = args.remove(PROPERTY_MAIL_DEBUG) {
            self.debug = convert::parse_bool(PROPERTY_MAIL_DEBUG, &value)?;
        }

        match args.remove(PROPERTY_MAIL_SMTP_HOST) {
            Some(value) => self.host = Some(value),
            None => {
                return Err(MailError::MissingArgument(
                    PROPERTY_MAIL_SMTP_HOST.to_string(),
                ))
            }
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_PORT) {
            let port = convert::parse_int(PROPERTY_MAIL_SMTP_PORT, &value)?;
            self.port = u16::try_from(port).map_err(|_| {
                MailError::InvalidArgument(format!("port out of range: {port}"))
            })?;
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_USERNAME) {
            self.username = Some(value);
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_PASSWORD) {
            self.password = Some(value);
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_AUTH) {
            self.auth = convert::parse_bool(PROPERTY_MAIL_SMTP_AUTH, &value)?;
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_STARTTLS_ENABLE) {
            self.starttls = convert::parse_bool(PROPERTY_MAIL_SMTP_STARTTLS_ENABLE, &value)?;
        }

        if let Some(value) = args.remove(PROPERTY_MAIL_SMTP_SSL_TRUST) {
            self.ssl_trust = value;
        }

        Ok(())
    }

    fn load_arguments(&mut self, args: &mut BTreeMap<String, String>) {
        if let Some(value) = args.remove(ARG_FROM) {
            self.from = Some(value);
        }

        if let Some(value) = args.remove(ARG_RECIPIENTS) {
            self.recipients.extend(split_address_list(&value));
        }

        if let Some(value) = args.remove(ARG_CC) {
            self.cc.extend(split_address_list(&value));
        }

        if let Some(value) = args.remove(ARG_BCC) {
            self.bcc.extend(split_address_list(&value));
        }

        if let Some(value) = args.remove(ARG_SUBJECT) {
            self.subject = Some(value);
        }

        if let Some(value) = args.remove(ARG_BODY) {
            self.body = value;
        }

        if let Some(value) = args.remove(ARG_FILE_PATH) {
            self.file_path = Some(value);
        }

        if let Some(value) = args.remove(ARG_FILE_NAME) {
            self.file_name = value;
        }
    }

    /// Set the author of the message.
    pub fn set_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Add one primary recipient.
    pub fn add_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    /// Replace the primary recipient list.
    pub fn set_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }

    /// Add one carbon copy recipient.
    pub fn add_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Replace the carbon copy list.
    pub fn set_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Add one blind carbon copy recipient.
    pub fn add_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Replace the blind carbon copy list.
    pub fn set_bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    /// Set the subject line. Length is checked at build time, not here.
    pub fn set_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body.
    pub fn set_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the username used to connect to the SMTP server.
    pub fn set_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password used to connect to the SMTP server.
    pub fn set_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the SMTP server to connect to.
    pub fn set_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the SMTP server port.
    pub fn set_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable SMTP authentication.
    pub fn set_auth(mut self, auth: bool) -> Self {
        self.auth = auth;
        self
    }

    /// Enable or disable transport debug logging.
    pub fn set_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable the STARTTLS handshake before login.
    pub fn set_starttls(mut self, starttls: bool) -> Self {
        self.starttls = starttls;
        self
    }

    /// Define which hosts to trust when verifying certificates. `*` trusts
    /// all hosts.
    pub fn set_ssl_trust(mut self, ssl_trust: impl Into<String>) -> Self {
        self.ssl_trust = ssl_trust.into();
        self
    }

    /// Set the path of a file to attach.
    pub fn set_attachment_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the display name of the attachment.
    pub fn set_attachment_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Add one passthrough connection property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Merge passthrough connection properties. Previously set fields and
    /// previously merged entries are left alone except for the keys this
    /// call supplies, which are added or overwritten.
    pub fn merge_properties(
        mut self,
        properties: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.extra.extend(properties);
        self
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_auth_enabled(&self) -> bool {
        self.auth
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn is_starttls_enabled(&self) -> bool {
        self.starttls
    }

    pub fn ssl_trust(&self) -> &str {
        &self.ssl_trust
    }

    pub fn attachment_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn attachment_name(&self) -> &str {
        &self.file_name
    }

    pub fn extra_properties(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Build the configuration, validating required fields.
    pub fn build(self) -> Result<EmailConfig, MailError> {
        let host = self
            .host
            .ok_or_else(|| MailError::MissingArgument(PROPERTY_MAIL_SMTP_HOST.to_string()))?;

        let from = self
            .from
            .ok_or_else(|| MailError::MissingArgument(ARG_FROM.to_string()))?;

        if self.recipients.is_empty() {
            return Err(MailError::MissingArgument("recipient".to_string()));
        }

        let subject = self
            .subject
            .ok_or_else(|| MailError::MissingArgument(ARG_SUBJECT.to_string()))?;

        let length = subject.chars().count();
        if length > MAX_SUBJECT_LENGTH {
            return Err(MailError::InvalidArgument(format!(
                "subject is too long: {length} characters specified but {MAX_SUBJECT_LENGTH} allowed"
            )));
        }

        let attachment = self.file_path.map(|path| AttachmentSpec {
            path,
            name: self.file_name,
        });

        Ok(EmailConfig {
            from,
            recipients: self.recipients,
            cc: self.cc,
            bcc: self.bcc,
            subject,
            body: self.body,
            attachment,
            smtp: SmtpSettings {
                host,
                port: self.port,
                username: self.username,
                password: self.password,
                auth: self.auth,
                debug: self.debug,
                starttls: self.starttls,
                ssl_trust: self.ssl_trust,
                extra: self.extra,
            },
        })
    }
}
