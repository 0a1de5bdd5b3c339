//! Crate-wide error type.

use thiserror::Error;

/// Everything that can go wrong between raw arguments and an accepted send.
///
/// The variants deliberately keep "your input was malformed"
/// ([`MissingArgument`](MailError::MissingArgument),
/// [`InvalidArgument`](MailError::InvalidArgument),
/// [`Conversion`](MailError::Conversion)) distinct from "the mail server
/// rejected this" ([`Smtp`](MailError::Smtp)); callers must be able to tell
/// them apart without parsing messages.
#[derive(Debug, Error)]
pub enum MailError {
    /// A mandatory argument or connection property was absent.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// A value was present but structurally unacceptable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A string value could not be coerced to the type a recognized
    /// property requires. The message doubles as the remediation hint.
    #[error("invalid value for '{property}': {expected} value expected but received '{value}'")]
    Conversion {
        property: String,
        value: String,
        expected: &'static str,
    },

    /// An address string was not parseable as a mailbox.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The wire message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// The attachment file could not be read.
    #[error("failed to read attachment '{path}': {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Environment-based settings could not be loaded.
    #[error("missing required config: {0}")]
    MissingConfig(String),

    /// Any failure reported by the SMTP transport, connection teardown
    /// included.
    #[error("SMTP error: {0}")]
    Smtp(String),
}
