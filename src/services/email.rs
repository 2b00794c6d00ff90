//! Inquiry notification email.
//!
//! After a successful inquiry classification the sales inbox gets a summary
//! email through a transactional email HTTP API. Sending is best-effort: the
//! caller logs failures and still returns the classification to the visitor.

use crate::core::config::EmailConfig;
use anyhow::{bail, Result};
use serde_json::{json, Value};

/// Everything the notification reports: the submitted form fields plus the
/// model's classification (read tolerantly; missing fields render blank).
pub struct InquiryNotification<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub company: &'a str,
    pub description: &'a str,
    pub classification: &'a Value,
}

/// Client for the transactional email API.
#[derive(Clone)]
pub struct EmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailSender {
    pub fn new(client: reqwest::Client, config: EmailConfig) -> Self {
        Self { client, config }
    }

    /// Send the inquiry notification to the configured sales inbox.
    pub async fn send_inquiry(&self, notification: &InquiryNotification<'_>) -> Result<()> {
        let payload = json!({
            "from": self.config.from,
            "to": [self.config.inquiry_recipient],
            "reply_to": notification.email,
            "subject": render_subject(notification),
            "html": render_html(notification),
        });

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("email API returned status {}: {}", status, body);
        }
        Ok(())
    }
}

fn urgency_emoji(urgency: &str) -> &'static str {
    match urgency {
        "low" => "🟢",
        "medium" => "🟡",
        "high" => "🟠",
        "critical" => "🔴",
        _ => "⚪",
    }
}

fn text_field<'a>(classification: &'a Value, key: &str) -> &'a str {
    classification.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Render a field that may legitimately be a string or a number (fitScore).
fn display_field(classification: &Value, key: &str) -> String {
    match classification.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_subject(notification: &InquiryNotification<'_>) -> String {
    let urgency = text_field(notification.classification, "urgency");
    let service = text_field(notification.classification, "service");
    let company_suffix = if notification.company.is_empty() {
        String::new()
    } else {
        format!(" ({})", notification.company)
    };

    format!(
        "[{} {}] New Inquiry: {} — {}{}",
        urgency_emoji(urgency),
        urgency.to_uppercase(),
        service,
        notification.name,
        company_suffix
    )
}

fn render_html(notification: &InquiryNotification<'_>) -> String {
    let classification = notification.classification;
    let urgency = text_field(classification, "urgency");
    let company = if notification.company.is_empty() {
        "Not provided"
    } else {
        notification.company
    };

    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto; background: #f8fafc; padding: 24px; border-radius: 12px;">
  <div style="background: linear-gradient(135deg, #00D4FF, #0066CC); padding: 20px 24px; border-radius: 8px; margin-bottom: 24px;">
    <h1 style="color: white; margin: 0; font-size: 20px;">New Inquiry — Tioga AI</h1>
    <p style="color: rgba(255,255,255,0.8); margin: 4px 0 0; font-size: 14px;">Respond {response_time}</p>
  </div>

  <div style="background: white; border-radius: 8px; padding: 20px; margin-bottom: 16px; border: 1px solid #e2e8f0;">
    <h2 style="font-size: 14px; text-transform: uppercase; color: #64748b; margin: 0 0 12px;">Contact Details</h2>
    <p style="margin: 4px 0;"><strong>Name:</strong> {name}</p>
    <p style="margin: 4px 0;"><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
    <p style="margin: 4px 0;"><strong>Company:</strong> {company}</p>
  </div>

  <div style="background: white; border-radius: 8px; padding: 20px; margin-bottom: 16px; border: 1px solid #e2e8f0;">
    <h2 style="font-size: 14px; text-transform: uppercase; color: #64748b; margin: 0 0 12px;">Project Description</h2>
    <p style="margin: 0; color: #334155; line-height: 1.6;">{description}</p>
  </div>

  <div style="background: #0f172a; border-radius: 8px; padding: 20px; margin-bottom: 16px;">
    <h2 style="font-size: 14px; text-transform: uppercase; color: #00D4FF; margin: 0 0 16px;">🤖 AI Classification</h2>
    <table style="width: 100%; border-collapse: collapse;">
      <tr>
        <td style="padding: 6px 0; color: #94a3b8; font-size: 13px; width: 40%;">Service Match</td>
        <td style="padding: 6px 0; color: white; font-size: 13px; font-weight: 600;">{service}</td>
      </tr>
      <tr>
        <td style="padding: 6px 0; color: #94a3b8; font-size: 13px;">Urgency</td>
        <td style="padding: 6px 0; color: white; font-size: 13px;">{emoji} {urgency_title}</td>
      </tr>
      <tr>
        <td style="padding: 6px 0; color: #94a3b8; font-size: 13px;">Project Size</td>
        <td style="padding: 6px 0; color: white; font-size: 13px;">{complexity}</td>
      </tr>
      <tr>
        <td style="padding: 6px 0; color: #94a3b8; font-size: 13px;">Fit Score</td>
        <td style="padding: 6px 0; color: white; font-size: 13px;">{fit_score}/10</td>
      </tr>
      <tr>
        <td style="padding: 6px 0; color: #94a3b8; font-size: 13px;">Summary</td>
        <td style="padding: 6px 0; color: white; font-size: 13px;">{summary}</td>
      </tr>
    </table>
    <div style="margin-top: 16px; padding: 12px; background: #00D4FF15; border-radius: 6px; border: 1px solid #00D4FF30;">
      <p style="margin: 0; font-size: 13px; color: #00D4FF; font-weight: 600;">Recommended Next Step</p>
      <p style="margin: 4px 0 0; font-size: 13px; color: #cbd5e1;">{next_step}</p>
    </div>
  </div>

  <p style="text-align: center; font-size: 12px; color: #94a3b8; margin: 0;">Sent by Tioga AI Smart Contact Form</p>
</div>"#,
        response_time = text_field(classification, "responseTime"),
        name = notification.name,
        email = notification.email,
        company = company,
        description = notification.description,
        service = text_field(classification, "service"),
        emoji = urgency_emoji(urgency),
        urgency_title = capitalize(urgency),
        complexity = text_field(classification, "complexity"),
        fit_score = display_field(classification, "fitScore"),
        summary = text_field(classification, "summary"),
        next_step = text_field(classification, "nextStep"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_classification() -> Value {
        json!({
            "service": "MCP Integrations",
            "urgency": "high",
            "complexity": "large",
            "summary": "Wants Claude wired into SAP.",
            "nextStep": "Schedule a discovery call.",
            "responseTime": "within 4 hours",
            "fitScore": 9
        })
    }

    fn sample_notification(classification: &Value) -> InquiryNotification<'_> {
        InquiryNotification {
            name: "Ada",
            email: "ada@example.com",
            company: "Analytical Engines",
            description: "We need an MCP connector for our SAP instance.",
            classification,
        }
    }

    // -- subject ----

    #[test]
    fn test_subject_includes_urgency_service_and_company() {
        let classification = sample_classification();
        let subject = render_subject(&sample_notification(&classification));
        assert_eq!(
            subject,
            "[🟠 HIGH] New Inquiry: MCP Integrations — Ada (Analytical Engines)"
        );
    }

    #[test]
    fn test_subject_omits_missing_company() {
        let classification = sample_classification();
        let mut notification = sample_notification(&classification);
        notification.company = "";
        let subject = render_subject(&notification);
        assert!(subject.ends_with("— Ada"));
    }

    #[test]
    fn test_urgency_emoji_mapping() {
        assert_eq!(urgency_emoji("low"), "🟢");
        assert_eq!(urgency_emoji("medium"), "🟡");
        assert_eq!(urgency_emoji("high"), "🟠");
        assert_eq!(urgency_emoji("critical"), "🔴");
        assert_eq!(urgency_emoji("weird"), "⚪");
    }

    // -- body ----

    #[test]
    fn test_html_carries_contact_and_classification() {
        let classification = sample_classification();
        let html = render_html(&sample_notification(&classification));
        assert!(html.contains("mailto:ada@example.com"));
        assert!(html.contains("MCP Integrations"));
        assert!(html.contains("9/10"));
        assert!(html.contains("Schedule a discovery call."));
    }

    #[test]
    fn test_html_tolerates_sparse_classification() {
        let classification = json!({});
        let notification = sample_notification(&classification);
        let html = render_html(&notification);
        assert!(html.contains("Contact Details"));
        assert!(html.contains("/10"));
    }

    #[test]
    fn test_empty_company_renders_placeholder() {
        let classification = sample_classification();
        let mut notification = sample_notification(&classification);
        notification.company = "";
        let html = render_html(&notification);
        assert!(html.contains("Not provided"));
    }
}
