use serde_json::json;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::config::Config;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email recipient cannot be empty")]
    EmptyRecipient,

    #[error("Invalid email address: {0}")]
    InvalidRecipient(String),

    #[error("Mail API key is not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Mail API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed after {retries} retries: {last_error}")]
    Exhausted { retries: u32, last_error: String },
}

pub async fn send_email(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), MailError> {
    if to_email.is_empty() {
        return Err(MailError::EmptyRecipient);
    }
    if !to_email.contains('@') {
        return Err(MailError::InvalidRecipient(to_email.to_string()));
    }
    if config.resend_api_key.is_empty() {
        return Err(MailError::MissingApiKey);
    }

    let mut last_error = None;

    for attempt in 1..=MAX_RETRIES {
        match send_via_resend(config, to_email, subject, html_body).await {
            Ok(email_id) => {
                tracing::info!("✓ Email sent to {} (id: {})", to_email, email_id);
                return Ok(());
            }
            Err(e) => {
                last_error = Some(e.to_string());
                if attempt < MAX_RETRIES {
                    let delay = RETRY_DELAY_MS * 2_u64.pow(attempt - 1);
                    tracing::warn!(
                        "Email send attempt {} failed for {}. Retrying in {}ms...",
                        attempt,
                        to_email,
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    let error = MailError::Exhausted {
        retries: MAX_RETRIES,
        last_error: last_error.unwrap_or_else(|| "unknown error".to_string()),
    };
    tracing::error!("✗ Email failed for {}: {}", to_email, error);
    Err(error)
}

async fn send_via_resend(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<String, MailError> {
    let client = reqwest::Client::new();
    let request_body = json!({
        "from": config.from_email,
        "to": to_email,
        "subject": subject,
        "html": html_body,
    });

    let response = client
        .post("https://api.resend.com/emails")
        .header("Authorization", format!("Bearer {}", config.resend_api_key))
        .header("Content-Type", "application/json")
        .json(&request_body)
        .send()
        .await?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .unwrap_or_else(|_| "No response body".to_string());

    if status.is_success() {
        if let Ok(body) = serde_json::from_str::<serde_json::Value>(&response_text) {
            if let Some(id) = body.get("id").and_then(|v| v.as_str()) {
                return Ok(id.to_string());
            }
        }
        Ok("success".to_string())
    } else {
        Err(MailError::Api {
            status: status.as_u16(),
            body: response_text,
        })
    }
}
