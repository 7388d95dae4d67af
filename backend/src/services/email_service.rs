//! Transactional email delivery.
//!
//! Flows depend on [`NotificationSink`] only. [`EmailService`] sends through an
//! SMTP relay; [`DisabledNotificationSink`] stands in when SMTP is not
//! configured and fails every send.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{Config, EmailConfig};
use crate::errors::NotificationError;

/// The emails this backend knows how to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    AccountActivation { token: String },
    PasswordReset { token: String },
    LinkPublished {
        title: String,
        url: String,
        categories: Vec<String>,
    },
}

/// A template rendered against the client base url.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailTemplate {
    pub fn render(&self, client_url: &str) -> RenderedEmail {
        match self {
            EmailTemplate::AccountActivation { token } => {
                let link = format!("{client_url}/auth/activate/{token}");
                RenderedEmail {
                    subject: "Complete Your Registration".to_string(),
                    html: build_action_html(
                        "Verify your email to continue",
                        "Please use the following link to complete your registration:",
                        &link,
                    ),
                    text: format!(
                        "Verify your email to continue\n\n\
                         Please use the following link to complete your registration:\n{link}\n"
                    ),
                }
            }
            EmailTemplate::PasswordReset { token } => {
                let link = format!("{client_url}/auth/password/reset/{token}");
                RenderedEmail {
                    subject: "Password reset link".to_string(),
                    html: build_action_html(
                        "Reset Password Link",
                        "Please use the following link to reset your password:",
                        &link,
                    ),
                    text: format!(
                        "Reset Password Link\n\n\
                         Please use the following link to reset your password:\n{link}\n"
                    ),
                }
            }
            EmailTemplate::LinkPublished {
                title,
                url,
                categories,
            } => {
                let categories = categories.join(", ");
                let (html_title, html_url, html_categories) = (
                    escape_html(title),
                    escape_html(url),
                    escape_html(&categories),
                );
                RenderedEmail {
                    subject: "New link published".to_string(),
                    html: format!(
                        r#"
            <html>
                <h1>New link published | {client_url}</h1>
                <p>A new link titled <b>{html_title}</b> has just been published in the following categories:</p>
                <p>{html_categories}</p>
                <p><a href="{html_url}">{html_url}</a></p>
                <br />
                <p>Check it out on <a href="{client_url}">{client_url}</a></p>
            </html>
            "#
                    ),
                    text: format!(
                        "New link published\n\n\
                         A new link titled {title} has just been published in: {categories}\n\
                         {url}\n\nCheck it out on {client_url}\n"
                    ),
                }
            }
        }
    }
}

/// Escapes user-submitted text for element content and quoted attributes.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn build_action_html(heading: &str, intro: &str, link: &str) -> String {
    format!(
        r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>{heading}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h1 style="color: #2c3e50;">{heading}</h1>
                    <p>{intro}</p>
                    <p style="word-break: break-all; color: #7f8c8d;">{link}</p>
                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">
                    <p style="font-size: 12px; color: #7f8c8d;">
                        This link expires in 10 minutes. If you did not request it, you can safely ignore this email.
                    </p>
                </div>
            </body>
            </html>
            "#
    )
}

/// Outbound email channel used by the registration, reset and link flows.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, to: &str, template: &EmailTemplate) -> Result<(), NotificationError>;
}

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> Result<Self, NotificationError> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotificationError::Build(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends a multipart text/html email.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), NotificationError> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| NotificationError::Address(format!("from: {e}")))?;

        let to_mailbox =
            Mailbox::from_str(to_email).map_err(|e| NotificationError::Address(e.to_string()))?;

        let mut builder = Message::builder().from(from_mailbox).to(to_mailbox);
        if let Some(reply_to) = &self.config.reply_to {
            let reply_to = Mailbox::from_str(reply_to)
                .map_err(|e| NotificationError::Address(format!("reply-to: {e}")))?;
            builder = builder.reply_to(reply_to);
        }

        let email = builder
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for EmailService {
    async fn send(&self, to: &str, template: &EmailTemplate) -> Result<(), NotificationError> {
        let rendered = template.render(&self.config.base_url);
        self.send_email(to, &rendered.subject, &rendered.html, &rendered.text)
            .await?;
        tracing::info!("Email '{}' sent to {}", rendered.subject, to);
        Ok(())
    }
}

/// Sink used when SMTP is not configured. Every send fails with
/// [`NotificationError::Disabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotificationSink;

#[async_trait]
impl NotificationSink for DisabledNotificationSink {
    async fn send(&self, to: &str, _template: &EmailTemplate) -> Result<(), NotificationError> {
        tracing::warn!("Email to {} dropped: email delivery is not configured", to);
        Err(NotificationError::Disabled)
    }
}

/// Builds the SMTP sink from configuration, falling back to the disabled sink.
pub fn notification_sink_from_config(config: &Config) -> Arc<dyn NotificationSink> {
    match config.email_config() {
        Some(email_config) => match EmailService::new(email_config) {
            Ok(service) => {
                tracing::info!("Email service initialized successfully");
                Arc::new(service)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize email service: {}. Email notifications will be disabled.",
                    e
                );
                Arc::new(DisabledNotificationSink)
            }
        },
        None => {
            tracing::warn!("Email configuration not found. Email notifications will be disabled.");
            Arc::new(DisabledNotificationSink)
        }
    }
}
