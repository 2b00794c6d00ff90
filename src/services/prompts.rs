//! Prompt templates for the model-backed endpoints.
//!
//! Rendering is pure: identical inputs produce byte-identical strings, with
//! no timestamps or randomness. Document-style inputs are truncated to
//! [`MAX_EMBEDDED_CHARS`] before embedding so a pasted novel cannot blow up
//! cost or latency; truncation is silent, never a rejection.

use once_cell::sync::Lazy;
use serde_json::json;

/// Characters of caller-supplied content embedded in document-style prompts.
pub const MAX_EMBEDDED_CHARS: usize = 3000;

/// System prompt for the site chat assistant.
pub const CHAT_SYSTEM_PROMPT: &str = r#"You are Tioga AI's friendly and knowledgeable assistant. You help visitors learn about Tioga AI's services, answer questions, and qualify leads for the sales team.

## About Tioga AI
Tioga AI is an enterprise AI implementation company that builds production-ready AI systems for mid-to-large companies. We specialize in:

**Core Services:**
1. **Custom AI Solutions** - Bespoke AI agents, automation pipelines, and intelligent workflows tailored to specific business processes
2. **MCP Integrations** - Connecting Claude and other LLMs to enterprise systems (SAP, PeopleSoft, Salesforce, ServiceNow) via Model Context Protocol
3. **AI Strategy Consulting** - Discovery workshops, POC development, ROI analysis, and AI roadmapping
4. **AI Training & Enablement** - Team training on prompt engineering, AI governance, and responsible deployment

**Our Process:**
- 5-day paid discovery sprint → clear scope and prototype
- 2-4 week pilot → production-ready proof of concept
- Full deployment + ongoing support

**Key Differentiators:**
- SOC2-ready security practices
- Deep enterprise integration experience (SAP, Oracle, Salesforce, ServiceNow)
- MCP (Model Context Protocol) experts — we build the connectors that let Claude talk to your existing systems
- Anthropic partner — direct access to latest models and guidance

**Pricing:**
- Discovery Sprint: $5,000 flat
- Pilots: $15,000–$50,000 depending on scope
- Ongoing retainers: $5,000–$20,000/month

## Your Role
1. Answer questions about our services clearly and enthusiastically
2. Help visitors understand if Tioga AI is a good fit for their needs
3. Qualify leads by gently asking about: company size, current AI/tech stack, specific pain points, timeline
4. If they seem like a good fit, encourage them to fill out the contact form or share their email
5. Keep responses concise — 2-4 sentences max unless they ask for more detail

## Tone
- Professional but conversational
- Confident and knowledgeable
- Not salesy — focus on genuinely helping them understand if we're a fit
- Use concrete examples when explaining capabilities

## Lead Qualification Questions (ask naturally, not as a checklist)
- "What industry are you in / what does your company do?"
- "What systems are you hoping to integrate AI with?"
- "Do you have a timeline in mind for getting something live?"
- "Have you tried any AI implementations before?"

If someone shares their email or contact info, acknowledge it warmly and let them know the team will be in touch within 1 business day.

Keep your responses focused and helpful. Do not make up specific case studies or client names. Do not quote specific ROI numbers unless the visitor asks for ballpark estimates."#;

/// One prompt per model-backed use case; each variant carries the fields it
/// embeds. Rendered output states the task, embeds the caller content, and
/// pins the required reply shape with a worked example.
#[derive(Debug, Clone)]
pub enum Prompt<'a> {
    InquiryClassification {
        name: &'a str,
        email: &'a str,
        company: &'a str,
        description: &'a str,
    },
    DocumentClassification {
        text: &'a str,
    },
    EmailTriage {
        email: &'a str,
    },
    InvoiceExtraction {
        text: &'a str,
    },
}

impl Prompt<'_> {
    /// Render the instruction string for this use case.
    pub fn render(&self) -> String {
        match self {
            Prompt::InquiryClassification {
                name,
                email,
                company,
                description,
            } => {
                let company = if company.trim().is_empty() {
                    "Not provided"
                } else {
                    company
                };
                format!(
                    r#"You are an AI classifier for Tioga AI, an enterprise AI implementation company. Analyze this inbound inquiry and classify it.

Inquiry details:
- Name: {name}
- Company: {company}
- Email: {email}
- Project Description: {description}

Tioga AI's services:
1. Custom AI Agents - automating workflows, intelligent agents, process automation
2. MCP Integrations - connecting LLMs to SAP, PeopleSoft, Salesforce, ServiceNow via Model Context Protocol
3. AI Strategy Consulting - discovery workshops, POC development, ROI analysis, roadmapping
4. AI Training & Enablement - team training, prompt engineering, AI governance

Respond ONLY with a JSON object in this exact format:
{{
  "service": "one of: Custom AI Agents | MCP Integrations | AI Strategy Consulting | AI Training & Enablement",
  "urgency": "one of: low | medium | high | critical",
  "complexity": "one of: small | medium | large | enterprise",
  "summary": "one sentence summarizing what they need",
  "nextStep": "one concrete recommended next action for the Tioga AI team",
  "responseTime": "one of: within 4 hours | within 1 business day | within 2 business days",
  "fitScore": "a number 1-10 indicating how well this fits Tioga AI's services"
}}

Base urgency on: timeline mentions, business-critical language, company size signals.
Base complexity on: scope, number of systems mentioned, enterprise vs SMB signals."#
                )
            }

            Prompt::DocumentClassification { text } => format!(
                r#"You are an enterprise document classification AI. Analyze this document.

Document:
{}

Respond ONLY with a JSON object:
{{
  "documentType": "one of: Contract | Invoice | Purchase Order | Resume | Legal Brief | Policy Document | Report | Memo | NDA | Proposal | Receipt | Email | Other",
  "confidence": "a number 0-100 representing classification confidence",
  "summary": "2-3 sentence summary of the document",
  "keyEntities": {{
    "people": ["names mentioned"],
    "organizations": ["companies or orgs mentioned"],
    "dates": ["important dates mentioned"],
    "amounts": ["monetary amounts if any"]
  }},
  "suggestedActions": ["array of 2-3 recommended next actions"],
  "riskFlags": ["any concerning items to flag, empty array if none"],
  "department": "which department should own this: Finance | Legal | HR | Operations | Sales | Management"
}}"#,
                truncate_chars(text, MAX_EMBEDDED_CHARS)
            ),

            Prompt::EmailTriage { email } => format!(
                r#"You are an enterprise email triage AI. Analyze this email and classify it.

Email:
{email}

Respond ONLY with a JSON object:
{{
  "category": "one of: Sales Inquiry | Support Request | Complaint | Partnership | Spam | Internal | Invoice | Legal",
  "urgency": "one of: low | medium | high | critical",
  "sentiment": "one of: positive | neutral | negative | frustrated | urgent",
  "routeTo": "one of: Sales Team | Support Team | Finance | Legal | Management | Spam Filter | HR",
  "summary": "one sentence summary of the email",
  "suggestedReply": "a professional 2-3 sentence draft reply appropriate for this email type and tone",
  "keyEntities": ["array", "of", "key", "names", "companies", "or", "topics", "mentioned"]
}}"#
            ),

            Prompt::InvoiceExtraction { text } => format!(
                r#"You are an invoice data extraction AI. Extract all structured data from this invoice.

Invoice:
{}

Respond ONLY with a JSON object:
{{
  "vendor": "vendor/supplier name",
  "invoiceNumber": "invoice number or ID",
  "invoiceDate": "invoice date",
  "dueDate": "payment due date",
  "poNumber": "purchase order number if present, else N/A",
  "lineItems": [{{"description": "item description", "amount": "formatted dollar amount"}}],
  "subtotal": "subtotal amount",
  "tax": "tax amount",
  "total": "total amount due",
  "paymentInstructions": "payment method and details",
  "confidence": 95
}}"#,
                truncate_chars(text, MAX_EMBEDDED_CHARS)
            ),
        }
    }
}

/// System prompt for the enterprise-systems demo: a fixed snapshot of mock
/// Workday / Salesforce / SAP records the model answers from, plus the
/// `<mcp_calls>` reporting convention the handler parses back out.
pub fn systems_demo_system_prompt() -> &'static str {
    &SYSTEMS_DEMO_PROMPT
}

static SYSTEMS_DEMO_PROMPT: Lazy<String> = Lazy::new(|| {
    let workday = json!({
        "employees": [
            { "id": "EMP-4821", "name": "Sarah Chen", "dept": "Engineering", "title": "Sr. Engineer", "status": "Active", "location": "San Francisco" },
            { "id": "EMP-3301", "name": "James Whitfield", "dept": "Operations", "title": "VP Operations", "status": "Active", "location": "Chicago" },
            { "id": "EMP-5512", "name": "Rachel Donovan", "dept": "Technology", "title": "CTO", "status": "Active", "location": "New York" },
        ],
        "openReqs": 3,
        "headcount": 847,
    });
    let salesforce = json!({
        "opportunities": [
            { "id": "OPP-9921", "company": "Meridian Logistics", "value": "$120,000", "stage": "Proposal", "closeDate": "2026-03-31" },
            { "id": "OPP-8801", "company": "Apex Systems", "value": "$85,000", "stage": "Negotiation", "closeDate": "2026-02-28" },
        ],
        "pipelineTotal": "$2.4M",
        "wonThisQuarter": "$340K",
    });
    let sap = json!({
        "invoices": [
            { "id": "INV-2026-0892", "vendor": "CloudStack Ltd", "amount": "$8,831.90", "status": "Pending Approval", "due": "2026-03-03" },
            { "id": "INV-2026-0881", "vendor": "Apex Software", "amount": "$38,626.00", "status": "Approved", "due": "2026-03-17" },
        ],
        "pendingApprovals": 12,
        "monthlySpend": "$284,000",
    });

    format!(
        r#"You are Claude, an AI assistant connected to Tioga AI's enterprise systems via MCP (Model Context Protocol). You have access to the following live data:

**Workday (HR)**:
{}

**Salesforce (CRM)**:
{}

**SAP (Finance)**:
{}

Answer the user's question using this data. Be specific and cite actual values. Keep responses concise (2-4 sentences).
Also return a JSON block at the end of your response showing which MCP tool(s) you called, in this format:
<mcp_calls>
{{"tools": ["Workday::getEmployees" | "Salesforce::getOpportunities" | "SAP::getInvoices"], "system": "which system(s) you queried"}}
</mcp_calls>"#,
        pretty(&workday),
        pretty(&salesforce),
        pretty(&sap),
    )
});

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- determinism ----

    #[test]
    fn test_render_is_idempotent() {
        let prompt = Prompt::InquiryClassification {
            name: "Ada",
            email: "ada@example.com",
            company: "Analytical Engines",
            description: "We need an MCP connector for our SAP instance",
        };
        assert_eq!(prompt.render(), prompt.render());
    }

    #[test]
    fn test_systems_prompt_is_stable() {
        assert_eq!(systems_demo_system_prompt(), systems_demo_system_prompt());
    }

    // -- embedding and shape ----

    #[test]
    fn test_inquiry_prompt_embeds_fields_and_shape() {
        let rendered = Prompt::InquiryClassification {
            name: "Ada",
            email: "ada@example.com",
            company: "Analytical Engines",
            description: "Automate invoice approvals",
        }
        .render();

        assert!(rendered.contains("- Name: Ada"));
        assert!(rendered.contains("- Email: ada@example.com"));
        assert!(rendered.contains("\"fitScore\""));
        assert!(rendered.contains("Respond ONLY with a JSON object"));
    }

    #[test]
    fn test_inquiry_prompt_blank_company_placeholder() {
        let rendered = Prompt::InquiryClassification {
            name: "Ada",
            email: "ada@example.com",
            company: "  ",
            description: "Automate invoice approvals",
        }
        .render();
        assert!(rendered.contains("- Company: Not provided"));
    }

    #[test]
    fn test_email_triage_prompt_shape() {
        let rendered = Prompt::EmailTriage {
            email: "Hi, our invoices are late again and nobody answers.",
        }
        .render();
        assert!(rendered.contains("\"suggestedReply\""));
        assert!(rendered.contains("our invoices are late again"));
    }

    #[test]
    fn test_invoice_prompt_shape() {
        let rendered = Prompt::InvoiceExtraction {
            text: "INVOICE #42 from CloudStack Ltd, total $8,831.90",
        }
        .render();
        assert!(rendered.contains("\"paymentInstructions\""));
        assert!(rendered.contains("INVOICE #42"));
    }

    #[test]
    fn test_chat_system_prompt_forbids_invented_detail() {
        assert!(CHAT_SYSTEM_PROMPT.contains("Do not make up specific case studies"));
    }

    #[test]
    fn test_systems_prompt_carries_mock_data_and_convention() {
        let prompt = systems_demo_system_prompt();
        assert!(prompt.contains("**Workday (HR)**"));
        assert!(prompt.contains("Meridian Logistics"));
        assert!(prompt.contains("<mcp_calls>"));
    }

    // -- truncation ----

    #[test]
    fn test_document_text_truncated_to_limit() {
        let text = format!("{}SENTINEL", "a".repeat(MAX_EMBEDDED_CHARS));
        let rendered = Prompt::DocumentClassification { text: &text }.render();
        assert!(!rendered.contains("SENTINEL"));
        assert!(rendered.contains(&"a".repeat(MAX_EMBEDDED_CHARS)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(MAX_EMBEDDED_CHARS + 100);
        let truncated = truncate_chars(&text, MAX_EMBEDDED_CHARS);
        assert_eq!(truncated.chars().count(), MAX_EMBEDDED_CHARS);
    }

    #[test]
    fn test_short_text_not_padded() {
        assert_eq!(truncate_chars("short", MAX_EMBEDDED_CHARS), "short");
    }
}
