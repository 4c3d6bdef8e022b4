use aws_sdk_ses::Client;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use serde::{Deserialize, Serialize};

use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::NotificationFormat;

use crate::error::NotifyError;
use crate::notifier::Notifier;

const UTF8: &str = "UTF-8";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SesConfig {
    /// Region override; the process-wide AWS region is used when absent.
    #[serde(default)]
    pub region: Option<String>,
    pub from: String,
    #[serde(default)]
    pub cc: Vec<String>,
}

impl SesConfig {
    /// `from` and every `cc` entry must be well-formed addresses.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if parse_address(&self.from).is_none() {
            return Err(NotifyError::InvalidConfig(format!(
                "invalid from address: {:?}",
                self.from
            )));
        }
        if let Some(bad) = self.cc.iter().find(|cc| parse_address(cc).is_none()) {
            return Err(NotifyError::InvalidConfig(format!("invalid cc address: {bad:?}")));
        }
        Ok(())
    }
}

pub struct SesNotifier {
    config: SesConfig,
    client: Client,
}

impl SesNotifier {
    pub fn new(config: SesConfig, client: Client) -> Result<Self, NotifyError> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// Build an SES client honouring the configured region override.
    pub fn client_for(config: &SesConfig, sdk_config: &aws_config::SdkConfig) -> Client {
        let mut builder = aws_sdk_ses::config::Builder::from(sdk_config);
        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_ses::config::Region::new(region.clone()));
        }
        Client::from_conf(builder.build())
    }

    async fn send(
        &self,
        subject: &str,
        body: &str,
        format: NotificationFormat,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .subject(utf8_content(subject)?)
            .body(email_body(body, format)?)
            .build();

        let destination = Destination::builder()
            .set_to_addresses(Some(recipients.to_vec()))
            .set_cc_addresses(Some(self.config.cc.clone()))
            .build();

        self.client
            .send_email()
            .source(&self.config.from)
            .destination(destination)
            .message(message)
            .send()
            .await
            .map_err(|e| NotifyError::Send(e.into_service_error().to_string()))?;

        tracing::debug!(recipients = recipients.len(), "notification sent");
        Ok(())
    }
}

impl Notifier for SesNotifier {
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
        format: NotificationFormat,
        recipients: &'a [String],
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        Box::pin(self.send(subject, body, format, recipients))
    }
}

/// Place the message in the HTML or the text part of an SES body.
pub fn email_body(body: &str, format: NotificationFormat) -> Result<Body, NotifyError> {
    let content = utf8_content(body)?;
    Ok(match format {
        NotificationFormat::Html => Body::builder().html(content).build(),
        NotificationFormat::Text => Body::builder().text(content).build(),
    })
}

fn utf8_content(data: &str) -> Result<Content, NotifyError> {
    Content::builder()
        .charset(UTF8)
        .data(data)
        .build()
        .map_err(|e| NotifyError::Build(e.to_string()))
}

/// Accepts `user@domain` or `Display Name <user@domain>` and returns the bare
/// address.
pub fn parse_address(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let addr = match (raw.find('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close && close == raw.len() - 1 => {
            raw[open + 1..close].trim()
        }
        (None, None) => raw,
        _ => return None,
    };

    let (local, domain) = addr.rsplit_once('@')?;
    let valid = !local.is_empty()
        && !local.contains('@')
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !addr.chars().any(|c| c.is_whitespace() || c == '<' || c == '>');
    valid.then_some(addr)
}
