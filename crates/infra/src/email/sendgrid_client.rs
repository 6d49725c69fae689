use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

use domain::{
    repositories::email::TransactionalEmailClient,
    value_objects::{email::OutboundEmail, email_events::InboundEmailEvent},
};

type HmacSha256 = Hmac<Sha256>;

/// Minimal SendGrid client built on reqwest.
pub struct SendGridClient {
    http: reqwest::Client,
    api_key: String,
    from_email: String,
    from_name: String,
    webhook_secret: Option<String>,
}

/// One raw entry from the event webhook payload, field names as SendGrid
/// posts them.
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridEvent {
    pub event: String,
    pub sg_message_id: Option<String>,
    pub email: Option<String>,
    pub timestamp: Option<i64>,
    pub url: Option<String>,
    pub ip: Option<String>,
    pub useragent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorEnvelope {
    errors: Vec<SendGridErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetails {
    message: Option<String>,
    field: Option<String>,
}

impl SendGridClient {
    pub fn new(
        api_key: String,
        from_email: String,
        from_name: String,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from_email,
            from_name,
            webhook_secret,
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

        let (sendgrid_error_message, sendgrid_error_field) =
            match serde_json::from_str::<SendGridErrorEnvelope>(&body) {
                Ok(envelope) => match envelope.errors.into_iter().next() {
                    Some(details) => (details.message, details.field),
                    None => (None, None),
                },
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            sendgrid_error_message = ?sendgrid_error_message,
            sendgrid_error_field = ?sendgrid_error_field,
            response_body = %body,
            context = %context,
            "sendgrid api request failed"
        );

        anyhow::bail!(
            "SendGrid API request failed: {} (status {})",
            context,
            status
        );
    }

    /// Verifies the shared-secret signature over the webhook body. A
    /// deployment without a configured secret accepts every payload.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        let Some(webhook_secret) = &self.webhook_secret else {
            return Ok(());
        };

        let mut timestamp: Option<String> = None;
        let mut signature: Option<String> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest.to_string());
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest.to_string());
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in webhook signature"))?;
        let signature =
            signature.ok_or_else(|| anyhow::anyhow!("missing v1 in webhook signature"))?;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())?;
        mac.update(signed_payload.as_bytes());
        let provided = hex::decode(signature)?;

        // Constant-time comparison.
        mac.verify_slice(&provided)
            .map_err(|_| anyhow::anyhow!("invalid webhook signature"))?;

        Ok(())
    }

    /// The webhook posts either a single event object or an array of them.
    pub fn parse_events(payload: &[u8]) -> Result<Vec<SendGridEvent>> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;

        let events = if value.is_array() {
            serde_json::from_value::<Vec<SendGridEvent>>(value)?
        } else {
            vec![serde_json::from_value::<SendGridEvent>(value)?]
        };

        Ok(events)
    }

    /// Maps a raw provider event onto the internal vocabulary. Events
    /// without a message id cannot be attributed and normalize to `None`.
    /// SendGrid suffixes `sg_message_id` with routing data after a dot;
    /// only the leading segment matches what the send API returned.
    pub fn normalize_event(event: &SendGridEvent) -> Option<InboundEmailEvent> {
        let raw_id = event.sg_message_id.as_deref()?;
        let provider_message_id = raw_id.split('.').next().unwrap_or(raw_id).to_string();

        let event_type = match event.event.as_str() {
            "delivered" => "delivered",
            "open" => "opened",
            "click" => "clicked",
            "bounce" | "dropped" => "bounced",
            "spamreport" => "spam_report",
            _ => "delivered",
        };

        Some(InboundEmailEvent {
            event_type: event_type.to_string(),
            provider_message_id,
            email: event.email.clone(),
            occurred_at: event
                .timestamp
                .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
            url: event.url.clone(),
            ip: event.ip.clone(),
            user_agent: event.useragent.clone(),
        })
    }
}

#[async_trait]
impl TransactionalEmailClient for SendGridClient {
    async fn send_email(&self, email: OutboundEmail) -> Result<String> {
        // https://www.twilio.com/docs/sendgrid/api-reference/mail-send/mail-send
        let mut personalization = serde_json::json!({
            "to": [{ "email": email.to }],
        });
        if let Some(refs) = &email.refs {
            personalization["custom_args"] = serde_json::json!({
                "message_id": refs.message_id.to_string(),
                "campaign_id": refs.campaign_id.to_string(),
                "lead_id": refs.lead_id.to_string(),
                "user_id": refs.user_id.to_string(),
            });
        }

        let payload = serde_json::json!({
            "personalizations": [personalization],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": strip_html_tags(&email.html_body) },
                { "type": "text/html", "value": email.html_body },
            ],
            "tracking_settings": {
                "click_tracking": { "enable": true, "enable_text": false },
                "open_tracking": { "enable": true },
            },
        });

        let resp = self
            .http
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "send mail").await?;

        let message_id = resp
            .headers()
            .get("X-Message-Id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(message_id)
    }
}

/// Reduces an html body to a whitespace-normalized text part.
pub fn strip_html_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_secret(secret: Option<&str>) -> SendGridClient {
        SendGridClient::new(
            "SG.test-key".to_string(),
            "hello@example.com".to_string(),
            "Example".to_string(),
            secret.map(|value| value.to_string()),
        )
    }

    fn sign(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, String::from_utf8_lossy(payload)).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn strip_html_tags_flattens_markup() {
        let html = "<p>Hi <b>there</b>,</p>\n<p>quick   question</p>";
        assert_eq!(strip_html_tags(html), "Hi there, quick question");
    }

    #[test]
    fn parse_events_accepts_single_object_and_array() {
        let single = br#"{"event":"open","sg_message_id":"abc.def"}"#;
        let parsed = SendGridClient::parse_events(single).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].event, "open");

        let array = br#"[{"event":"open"},{"event":"click","url":"https://example.com"}]"#;
        let parsed = SendGridClient::parse_events(array).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn normalize_event_trims_message_id_suffix() {
        let event = SendGridEvent {
            event: "open".to_string(),
            sg_message_id: Some("q1w2e3r4.filterdrecv-abc-123".to_string()),
            email: None,
            timestamp: Some(1_700_000_000),
            url: None,
            ip: None,
            useragent: None,
        };

        let normalized = SendGridClient::normalize_event(&event).unwrap();
        assert_eq!(normalized.provider_message_id, "q1w2e3r4");
        assert_eq!(normalized.event_type, "opened");
        assert!(normalized.occurred_at.is_some());
    }

    #[test]
    fn normalize_event_maps_provider_vocabulary() {
        let make = |kind: &str| SendGridEvent {
            event: kind.to_string(),
            sg_message_id: Some("id".to_string()),
            email: None,
            timestamp: None,
            url: None,
            ip: None,
            useragent: None,
        };

        let cases = [
            ("delivered", "delivered"),
            ("open", "opened"),
            ("click", "clicked"),
            ("bounce", "bounced"),
            ("dropped", "bounced"),
            ("spamreport", "spam_report"),
            ("processed", "delivered"),
        ];
        for (raw, expected) in cases {
            let normalized = SendGridClient::normalize_event(&make(raw)).unwrap();
            assert_eq!(normalized.event_type, expected, "event {raw}");
        }
    }

    #[test]
    fn normalize_event_without_message_id_is_dropped() {
        let event = SendGridEvent {
            event: "open".to_string(),
            sg_message_id: None,
            email: None,
            timestamp: None,
            url: None,
            ip: None,
            useragent: None,
        };

        assert!(SendGridClient::normalize_event(&event).is_none());
    }

    #[test]
    fn webhook_signature_is_skipped_without_secret() {
        let client = client_with_secret(None);
        assert!(client.verify_webhook_signature(b"[]", "whatever").is_ok());
    }

    #[test]
    fn webhook_signature_accepts_valid_and_rejects_forged() {
        let client = client_with_secret(Some("whsec"));
        let payload = br#"[{"event":"open"}]"#;
        let header = format!("t=12345,v1={}", sign("whsec", "12345", payload));

        assert!(client.verify_webhook_signature(payload, &header).is_ok());

        let forged = format!("t=12345,v1={}", sign("other", "12345", payload));
        assert!(client.verify_webhook_signature(payload, &forged).is_err());
    }

    #[test]
    fn webhook_signature_rejects_truncated_digest() {
        let client = client_with_secret(Some("whsec"));
        let payload = br#"[{"event":"open"}]"#;
        let full = sign("whsec", "12345", payload);
        let truncated = format!("t=12345,v1={}", &full[..full.len() - 2]);

        assert!(client.verify_webhook_signature(payload, &truncated).is_err());
    }
}
