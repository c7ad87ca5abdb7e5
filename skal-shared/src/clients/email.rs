use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(api_key: &str, from_email: &str, from_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), String> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("email send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("email API error: {body}"));
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    pub async fn send_verification_email(
        &self,
        to: &str,
        username: &str,
        verify_url: &str,
    ) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2>Skal - Verify Your Account</h2>
            <p>Dear {username},</p>
            <p>To verify your account, click the following link:</p>
            <p><a href="{verify_url}">{verify_url}</a></p>
            <p style="color: #666; margin-top: 20px;">If you did not register, please ignore this email.</p>
            </div>"#
        );

        self.send_email(to, "[Skal] Verify Your Account", &html).await
    }

    pub async fn send_password_reset_email(
        &self,
        to: &str,
        username: &str,
        reset_url: &str,
    ) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2>Skal - Reset Your Password</h2>
            <p>Dear {username},</p>
            <p>To reset your password, click the following link:</p>
            <p><a href="{reset_url}">{reset_url}</a></p>
            <p style="color: #666; margin-top: 20px;">This link expires shortly. If you did not request a password reset, please ignore this email.</p>
            </div>"#
        );

        self.send_email(to, "[Skal] Reset Your Password", &html).await
    }
}

/// Runs an email send on a background task. The request never waits on the
/// mail provider; failures are logged and otherwise dropped.
pub fn dispatch<F>(send: F)
where
    F: std::future::Future<Output = Result<(), String>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = send.await {
            tracing::error!(error = %e, "background email dispatch failed");
        }
    });
}
