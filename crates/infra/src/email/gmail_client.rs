use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::crypto::token_cipher::TokenCipher;
use domain::{
    repositories::{
        email::{MailboxEmailClient, MailboxOauthClient},
        settings::SettingsRepository,
    },
    value_objects::email::{MailboxConnection, OutboundEmail},
};

const OAUTH_CONSENT_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
const GMAIL_SCOPES: &str =
    "https://www.googleapis.com/auth/gmail.send https://www.googleapis.com/auth/gmail.readonly";

/// Gmail API client speaking for one linked user mailbox at a time. The
/// refresh token only ever exists decrypted inside a token exchange call.
pub struct GmailApiClient<S> {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    cipher: TokenCipher,
    settings_repository: Arc<S>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: serde_json::Value,
    error_description: Option<String>,
}

impl<S> GmailApiClient<S>
where
    S: SettingsRepository + Send + Sync,
{
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        cipher: TokenCipher,
        settings_repository: Arc<S>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
            cipher,
            settings_repository,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (google_error, google_error_description) =
            match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
                Ok(envelope) => (Some(envelope.error), envelope.error_description),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            google_error = ?google_error,
            google_error_description = ?google_error_description,
            response_body = %body,
            context = %context,
            "google api request failed"
        );

        anyhow::bail!("Google API request failed: {} (status {})", context, status);
    }

    async fn access_token_for_user(&self, user_id: Uuid) -> Result<String> {
        let settings = self.settings_repository.find_by_user_id(user_id).await?;
        let sealed = settings
            .and_then(|row| row.gmail_refresh_token)
            .context("Gmail not connected")?;
        let refresh_token = self.cipher.decrypt(&sealed)?;

        // https://developers.google.com/identity/protocols/oauth2/web-server#offline
        let body = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self
            .http
            .post(OAUTH_TOKEN_URL)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "refresh access token").await?;

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
        }

        let parsed: TokenResp = resp.json().await?;
        Ok(parsed.access_token)
    }
}

#[async_trait]
impl<S> MailboxEmailClient for GmailApiClient<S>
where
    S: SettingsRepository + Send + Sync,
{
    async fn send_email(&self, user_id: Uuid, email: OutboundEmail) -> Result<String> {
        let access_token = self.access_token_for_user(user_id).await?;

        let rfc822 = format!(
            "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}",
            email.to, email.subject, email.html_body
        );
        let raw = URL_SAFE_NO_PAD.encode(rfc822.as_bytes());

        // https://developers.google.com/gmail/api/reference/rest/v1/users.messages/send
        let resp = self
            .http
            .post(format!("{}/users/me/messages/send", GMAIL_API_BASE))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "send message").await?;

        #[derive(Deserialize)]
        struct SendResp {
            id: String,
        }

        let parsed: SendResp = resp.json().await?;
        Ok(parsed.id)
    }

    async fn has_thread_reply(&self, user_id: Uuid, provider_message_id: String) -> Result<bool> {
        let access_token = self.access_token_for_user(user_id).await?;

        #[derive(Deserialize)]
        struct MessageResp {
            #[serde(rename = "threadId")]
            thread_id: String,
        }

        let resp = self
            .http
            .get(format!(
                "{}/users/me/messages/{}?format=minimal",
                GMAIL_API_BASE, provider_message_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get message").await?;
        let message: MessageResp = resp.json().await?;

        #[derive(Deserialize)]
        struct ThreadResp {
            #[serde(default)]
            messages: Vec<serde_json::Value>,
        }

        let resp = self
            .http
            .get(format!(
                "{}/users/me/threads/{}?format=minimal",
                GMAIL_API_BASE, message.thread_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get thread").await?;
        let thread: ThreadResp = resp.json().await?;

        Ok(thread.messages.len() > 1)
    }
}

#[async_trait]
impl<S> MailboxOauthClient for GmailApiClient<S>
where
    S: SettingsRepository + Send + Sync,
{
    fn consent_url(&self, state: String) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", GMAIL_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state)
            .finish();

        format!("{}?{}", OAUTH_CONSENT_URL, query)
    }

    async fn establish_connection(&self, code: String) -> Result<MailboxConnection> {
        let body = [
            ("code", code.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let resp = self
            .http
            .post(OAUTH_TOKEN_URL)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "exchange authorization code").await?;

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
            refresh_token: Option<String>,
        }

        let parsed: TokenResp = resp.json().await?;
        let refresh_token = parsed
            .refresh_token
            .context("Gmail did not return a refresh token")?;

        // https://developers.google.com/gmail/api/reference/rest/v1/users/getProfile
        let resp = self
            .http
            .get(format!("{}/users/me/profile", GMAIL_API_BASE))
            .header(AUTHORIZATION, format!("Bearer {}", parsed.access_token))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get profile").await?;

        #[derive(Deserialize)]
        struct ProfileResp {
            #[serde(rename = "emailAddress")]
            email_address: String,
        }

        let profile: ProfileResp = resp.json().await?;
        let encrypted_refresh_token = self.cipher.encrypt(&refresh_token)?;

        Ok(MailboxConnection {
            encrypted_refresh_token,
            gmail_email: profile.email_address,
        })
    }
}
