/// 邮件客户端
///
/// 通过 SMTP (STARTTLS) 发送 HTML 邮件
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::MailError;

/// SMTP 邮件客户端
pub struct MailClient {
    sender: String,
    password: String,
    receiver: String,
    server: String,
    port: u16,
    timeout: Duration,
}

impl MailClient {
    pub fn new(config: &Config) -> Self {
        Self {
            sender: config.sender_email.clone(),
            password: config.sender_password.clone(),
            receiver: config.receiver_email.clone(),
            server: config.smtp_server.clone(),
            port: config.smtp_port,
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    /// 构建 HTML 邮件
    pub fn build_message(&self, subject: &str, html_content: &str) -> Result<Message, MailError> {
        let message = Message::builder()
            .from(parse_mailbox(&self.sender)?)
            .to(parse_mailbox(&self.receiver)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_content.to_string())?;
        Ok(message)
    }

    /// 发送邮件
    pub async fn send(&self, subject: &str, html_content: &str) -> Result<(), MailError> {
        let message = self.build_message(subject, html_content)?;

        let smtp_error = |source| MailError::SmtpFailed {
            server: format!("{}:{}", self.server, self.port),
            source,
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.server)
            .map_err(smtp_error)?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .timeout(Some(self.timeout))
            .build();

        debug!("连接 SMTP 服务器 {}:{}", self.server, self.port);
        let response = transport.send(message).await.map_err(smtp_error)?;
        info!("📨 SMTP 响应: {}", response.code());

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}
