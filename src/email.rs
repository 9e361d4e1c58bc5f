use color_eyre::Result;
use serde::Serialize;

use crate::services::auth::EmailSender;

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

/// Sends OTP emails through the Resend API. Without an API key the sender is
/// disabled and callers fall back to logging the code (dev mode).
#[derive(Clone)]
pub struct ResendEmailSender {
    api_key: Option<String>,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            from: "Study.Pilot <noreply@studypilot.app>".to_string(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    async fn send(&self, to_email: &str, subject: String, html: String) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            color_eyre::eyre::bail!("email sending is not configured");
        };

        let client = reqwest::Client::new();

        let body = SendEmailRequest {
            from: self.from.clone(),
            to: vec![to_email.to_string()],
            subject,
            html,
        };

        let resp = client
            .post("https://api.resend.com/emails")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("Resend API error: {status} - {text}");
            color_eyre::eyre::bail!("Resend API returned {status}");
        }

        tracing::info!("OTP email sent to {to_email}");
        Ok(())
    }
}

impl EmailSender for ResendEmailSender {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_otp_email(&self, to_email: &str, otp: &str, is_new_user: bool) -> Result<()> {
        let (subject, html) = if is_new_user {
            (
                "Welcome to Study.Pilot - Your OTP".to_string(),
                format!(
                    r#"<h2>Welcome to Study.Pilot!</h2>
<p>Your OTP to complete registration is <strong>{otp}</strong>.</p>"#
                ),
            )
        } else {
            (
                "Parent Login OTP".to_string(),
                format!(
                    r#"<h2>Parent Login</h2>
<p>Your OTP to login as a parent is <strong>{otp}</strong>.</p>"#
                ),
            )
        };

        self.send(to_email, subject, html).await
    }
}
