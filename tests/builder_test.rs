use std::collections::BTreeMap;

use mailtask::config::{
    ARG_BCC, ARG_BODY, ARG_CC, ARG_FILE_NAME, ARG_FILE_PATH, ARG_FROM, ARG_RECIPIENTS,
    ARG_SUBJECT, PROPERTY_MAIL_DEBUG, PROPERTY_MAIL_SMTP_AUTH, PROPERTY_MAIL_SMTP_HOST,
    PROPERTY_MAIL_SMTP_PASSWORD, PROPERTY_MAIL_SMTP_PORT, PROPERTY_MAIL_SMTP_SSL_TRUST,
    PROPERTY_MAIL_SMTP_STARTTLS_ENABLE, PROPERTY_MAIL_SMTP_USERNAME,
};
use mailtask::{EmailConfigBuilder, MailError};

fn full_args() -> BTreeMap<String, String> {
    let mut args = BTreeMap::new();
    args.insert(ARG_FROM.to_string(), "from".to_string());
    args.insert(ARG_RECIPIENTS.to_string(), "a,b,c".to_string());
    args.insert(ARG_CC.to_string(), "d, e".to_string());
    args.insert(ARG_BCC.to_string(), "f, g,h, i".to_string());
    args.insert(ARG_SUBJECT.to_string(), "subject".to_string());
    args.insert(ARG_BODY.to_string(), "body".to_string());
    args.insert(ARG_FILE_PATH.to_string(), "file_path".to_string());
    args.insert(ARG_FILE_NAME.to_string(), "file_name".to_string());

    args.insert(PROPERTY_MAIL_DEBUG.to_string(), "true".to_string());
    args.insert(PROPERTY_MAIL_SMTP_HOST.to_string(), "smtp.host.com".to_string());
    args.insert(PROPERTY_MAIL_SMTP_PORT.to_string(), "25".to_string());
    args.insert(PROPERTY_MAIL_SMTP_USERNAME.to_string(), "username".to_string());
    args.insert(PROPERTY_MAIL_SMTP_PASSWORD.to_string(), "password".to_string());
    args.insert(PROPERTY_MAIL_SMTP_AUTH.to_string(), "true".to_string());
    args.insert(PROPERTY_MAIL_SMTP_STARTTLS_ENABLE.to_string(), "true".to_string());
    args.insert(PROPERTY_MAIL_SMTP_SSL_TRUST.to_string(), "all".to_string());

    args
}

#[test]
fn default_values() {
    let builder = EmailConfigBuilder::new();

    assert!(builder.is_auth_enabled());
    assert!(!builder.is_debug_enabled());
    assert!(!builder.is_starttls_enabled());

    assert_eq!(builder.port(), 587);

    assert!(builder.cc().is_empty());
    assert!(builder.bcc().is_empty());
    assert!(builder.recipients().is_empty());

    assert!(builder.body().is_empty());
    assert!(builder.from().is_none());
    assert!(builder.host().is_none());
    assert!(builder.username().is_none());
    assert!(builder.password().is_none());
    assert!(builder.subject().is_none());
    assert_eq!(builder.ssl_trust(), "*");
    assert!(builder.attachment_path().is_none());
    assert_eq!(builder.attachment_name(), "attachment.txt");
    assert!(builder.extra_properties().is_empty());
}

#[test]
fn from_args_extracts_every_recognized_key() {
    let builder = EmailConfigBuilder::from_args(full_args()).unwrap();

    assert_eq!(builder.from(), Some("from"));
    assert_eq!(builder.recipients(), ["a", "b", "c"]);
    assert_eq!(builder.cc(), ["d", "e"]);
    assert_eq!(builder.bcc(), ["f", "g", "h", "i"]);
    assert_eq!(builder.subject(), Some("subject"));
    assert_eq!(builder.body(), "body");

    assert!(builder.is_debug_enabled());
    assert_eq!(builder.host(), Some("smtp.host.com"));
    assert_eq!(builder.port(), 25);
    assert_eq!(builder.username(), Some("username"));
    assert_eq!(builder.password(), Some("password"));
    assert!(builder.is_auth_enabled());
    assert!(builder.is_starttls_enabled());
    assert_eq!(builder.ssl_trust(), "all");
    assert_eq!(builder.attachment_path(), Some("file_path"));
    assert_eq!(builder.attachment_name(), "file_name");

    // recognized keys never leak into passthrough
    assert!(builder.extra_properties().is_empty());
}

#[test]
fn leading_whitespace_on_first_recipient_is_preserved() {
    let mut args = full_args();
    args.insert(ARG_RECIPIENTS.to_string(), " b@x.com,c@x.com".to_string());

    let builder = EmailConfigBuilder::from_args(args).unwrap();
    assert_eq!(builder.recipients(), [" b@x.com", "c@x.com"]);
}

#[test]
fn unrecognized_keys_become_passthrough_properties() {
    let mut args = full_args();
    args.insert("mail.smtp.ssl.enable".to_string(), "true".to_string());
    args.insert("mail.smtp.connectiontimeout".to_string(), "120000".to_string());

    let builder = EmailConfigBuilder::from_args(args).unwrap();

    assert_eq!(builder.extra_properties().len(), 2);
    assert_eq!(
        builder.extra_properties().get("mail.smtp.ssl.enable"),
        Some(&"true".to_string())
    );
    assert_eq!(
        builder.extra_properties().get("mail.smtp.connectiontimeout"),
        Some(&"120000".to_string())
    );
}

#[test]
fn merging_properties_is_additive() {
    let builder = EmailConfigBuilder::from_args(full_args())
        .unwrap()
        .property("mail.smtp.connectiontimeout", "120000");

    // previously extracted keys are untouched, the new key appears
    assert_eq!(builder.host(), Some("smtp.host.com"));
    assert_eq!(builder.extra_properties().len(), 1);

    // re-merging the same key updates the value without duplicating it
    let builder = builder.merge_properties([(
        "mail.smtp.connectiontimeout".to_string(),
        "60000".to_string(),
    )]);
    assert_eq!(builder.extra_properties().len(), 1);
    assert_eq!(
        builder.extra_properties().get("mail.smtp.connectiontimeout"),
        Some(&"60000".to_string())
    );
}

#[test]
fn missing_host_fails_at_load() {
    let mut args = full_args();
    args.remove(PROPERTY_MAIL_SMTP_HOST);

    let err = EmailConfigBuilder::from_args(args).unwrap_err();
    assert!(matches!(err, MailError::MissingArgument(name) if name == "mail.smtp.host"));
}

#[test]
fn missing_from_fails_at_build() {
    let mut args = full_args();
    args.remove(ARG_FROM);

    let err = EmailConfigBuilder::from_args(args).unwrap().build().unwrap_err();
    assert!(matches!(err, MailError::MissingArgument(name) if name == "from"));
}

#[test]
fn missing_recipients_fails_at_build() {
    let mut args = full_args();
    args.remove(ARG_RECIPIENTS);

    let err = EmailConfigBuilder::from_args(args).unwrap().build().unwrap_err();
    assert!(matches!(err, MailError::MissingArgument(name) if name == "recipient"));
}

#[test]
fn missing_subject_fails_at_build() {
    let mut args = full_args();
    args.remove(ARG_SUBJECT);

    let err = EmailConfigBuilder::from_args(args).unwrap().build().unwrap_err();
    assert!(matches!(err, MailError::MissingArgument(name) if name == "subject"));
}

#[test]
fn missing_host_fails_at_build_when_set_manually() {
    let err = EmailConfigBuilder::new()
        .set_from("a@x.com")
        .add_recipient("b@x.com")
        .set_subject("Hi")
        .build()
        .unwrap_err();
    assert!(matches!(err, MailError::MissingArgument(name) if name == "mail.smtp.host"));
}

#[test]
fn subject_of_78_characters_is_accepted() {
    let config = EmailConfigBuilder::from_args(full_args())
        .unwrap()
        .set_subject("s".repeat(78))
        .build()
        .unwrap();
    assert_eq!(config.subject.len(), 78);
}

#[test]
fn subject_of_79_characters_is_rejected() {
    let err = EmailConfigBuilder::from_args(full_args())
        .unwrap()
        .set_subject("s".repeat(79))
        .build()
        .unwrap_err();

    match err {
        MailError::InvalidArgument(message) => {
            assert!(message.contains("79"));
            assert!(message.contains("78"));
        }
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn subject_is_only_validated_at_build() {
    // an over-long subject can be set and replaced before build
    let config = EmailConfigBuilder::from_args(full_args())
        .unwrap()
        .set_subject("s".repeat(200))
        .set_subject("short again")
        .build()
        .unwrap();
    assert_eq!(config.subject, "short again");
}

#[test]
fn bad_boolean_property_is_a_conversion_error() {
    let mut args = full_args();
    args.insert(PROPERTY_MAIL_SMTP_AUTH.to_string(), "yes".to_string());

    let err = EmailConfigBuilder::from_args(args).unwrap_err();
    assert!(matches!(
        err,
        MailError::Conversion { property, .. } if property == "mail.smtp.auth"
    ));
}

#[test]
fn bad_port_is_a_conversion_error() {
    let mut args = full_args();
    args.insert(PROPERTY_MAIL_SMTP_PORT.to_string(), "25a".to_string());

    let err = EmailConfigBuilder::from_args(args).unwrap_err();
    assert!(matches!(
        err,
        MailError::Conversion { property, .. } if property == "mail.smtp.port"
    ));
}

#[test]
fn out_of_range_port_is_invalid() {
    let mut args = full_args();
    args.insert(PROPERTY_MAIL_SMTP_PORT.to_string(), "70000".to_string());

    let err = EmailConfigBuilder::from_args(args).unwrap_err();
    assert!(matches!(err, MailError::InvalidArgument(_)));
}

#[test]
fn attachment_defaults_to_path_with_standard_name() {
    let config = EmailConfigBuilder::new()
        .set_from("a@x.com")
        .add_recipient("b@x.com")
        .set_subject("Hi")
        .set_host("smtp.x.com")
        .set_attachment_path("/tmp/report.csv")
        .build()
        .unwrap();

    let attachment = config.attachment.unwrap();
    assert_eq!(attachment.path, "/tmp/report.csv");
    assert_eq!(attachment.name, "attachment.txt");
}

#[test]
fn no_attachment_without_a_path() {
    let config = EmailConfigBuilder::new()
        .set_from("a@x.com")
        .add_recipient("b@x.com")
        .set_subject("Hi")
        .set_host("smtp.x.com")
        .set_attachment_name("report.csv")
        .build()
        .unwrap();

    assert!(config.attachment.is_none());
}

#[test]
fn end_to_end_minimal_map() {
    let mut args = BTreeMap::new();
    args.insert(ARG_FROM.to_string(), "a@x.com".to_string());
    args.insert(ARG_RECIPIENTS.to_string(), "b@x.com,c@x.com".to_string());
    args.insert(ARG_SUBJECT.to_string(), "Hi".to_string());
    args.insert(ARG_BODY.to_string(), "Hello".to_string());
    args.insert(PROPERTY_MAIL_SMTP_HOST.to_string(), "smtp.x.com".to_string());

    let config = EmailConfigBuilder::from_args(args).unwrap().build().unwrap();

    assert_eq!(config.from, "a@x.com");
    assert_eq!(config.recipients, ["b@x.com", "c@x.com"]);
    assert_eq!(config.subject, "Hi");
    assert_eq!(config.body, "Hello");
    assert_eq!(config.smtp.host, "smtp.x.com");
    assert_eq!(config.smtp.port, 587);
    assert!(config.smtp.auth);
    assert!(!config.smtp.starttls);
    assert_eq!(config.smtp.ssl_trust, "*");
}

#[test]
fn body_defaults_to_empty_string() {
    let mut args = BTreeMap::new();
    args.insert(ARG_FROM.to_string(), "a@x.com".to_string());
    args.insert(ARG_RECIPIENTS.to_string(), "b@x.com".to_string());
    args.insert(ARG_SUBJECT.to_string(), "Hi".to_string());
    args.insert(PROPERTY_MAIL_SMTP_HOST.to_string(), "smtp.x.com".to_string());

    let config = EmailConfigBuilder::from_args(args).unwrap().build().unwrap();
    assert_eq!(config.body, "");
}

#[test]
fn duplicate_recipients_are_preserved_in_order() {
    let config = EmailConfigBuilder::new()
        .set_from("a@x.com")
        .add_recipient("b@x.com")
        .add_recipient("b@x.com")
        .add_recipient("c@x.com")
        .set_subject("Hi")
        .set_host("smtp.x.com")
        .build()
        .unwrap();

    assert_eq!(config.recipients, ["b@x.com", "b@x.com", "c@x.com"]);
}
