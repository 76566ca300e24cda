//! PDF preview renderers.
//!
//! `HtmlPreviewRenderer` runs in-process and produces a printable HTML
//! preview per RFI. `RemotePdfRenderer` hands the records to an external
//! rendering service and passes its artifacts through untouched.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pulldown_cmark::{html, Event, Options, Parser};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BasePdfRenderer, PdfPreview};

// =============================================================================
// In-process HTML previews
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct HtmlPreviewRenderer;

impl HtmlPreviewRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_one(&self, index: usize, rfi: &Value) -> Result<PdfPreview> {
        let Some(record) = rfi.as_object() else {
            bail!("RFI at position {} is not an object", index);
        };

        let text = |key: &str| record.get(key).and_then(Value::as_str).unwrap_or("");
        let number = text("rfiNumber");
        let title = text("title");
        let id = record.get("id").and_then(Value::as_str).map(str::to_string);

        let mut body = String::new();
        body.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
        body.push_str(&format!("<title>{}</title>", escape(title)));
        body.push_str("</head><body><article class=\"rfi\">");
        body.push_str(&format!(
            "<header><h1>{} {}</h1><p class=\"status\">{}</p></header>",
            escape(number),
            escape(title),
            escape(&status_label(text("status")))
        ));

        let mut meta = Vec::new();
        for (label, key) in [
            ("Urgency", "urgency"),
            ("Discipline", "discipline"),
            ("Due", "dueDate"),
            ("Raised", "createdAt"),
        ] {
            let value = text(key);
            if !value.is_empty() {
                meta.push(format!("<dt>{}</dt><dd>{}</dd>", label, escape(value)));
            }
        }
        if !meta.is_empty() {
            body.push_str(&format!("<dl>{}</dl>", meta.join("")));
        }

        body.push_str("<section class=\"description\">");
        body.push_str(&markdown_to_html(text("description")));
        body.push_str("</section>");

        if let Some(responses) = record.get("responses").and_then(Value::as_array) {
            if !responses.is_empty() {
                body.push_str("<section class=\"responses\"><h2>Responses</h2>");
                for response in responses {
                    let content = response.get("content").and_then(Value::as_str).unwrap_or("");
                    let at = response.get("createdAt").and_then(Value::as_str).unwrap_or("");
                    body.push_str(&format!(
                        "<div class=\"response\"><p class=\"when\">{}</p>{}</div>",
                        escape(at),
                        markdown_to_html(content)
                    ));
                }
                body.push_str("</section>");
            }
        }
        body.push_str("</article></body></html>");

        let stem = if !number.is_empty() {
            number.to_string()
        } else if let Some(id) = &id {
            format!("rfi-{}", id)
        } else {
            format!("rfi-{}", index + 1)
        };

        Ok(PdfPreview {
            rfi_id: id,
            file_name: format!("{}.html", stem),
            content_type: "text/html; charset=utf-8".to_string(),
            content: STANDARD.encode(body.as_bytes()),
        })
    }
}

#[async_trait]
impl BasePdfRenderer for HtmlPreviewRenderer {
    async fn render_previews(&self, rfis: &[Value]) -> Result<Vec<PdfPreview>> {
        rfis.iter()
            .enumerate()
            .map(|(index, rfi)| self.render_one(index, rfi))
            .collect()
    }
}

fn status_label(status: &str) -> String {
    match status {
        "open" => "Open".to_string(),
        "in_progress" => "In Progress".to_string(),
        "closed" => "Closed".to_string(),
        other => other.to_string(),
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Markdown to HTML with raw HTML blocks dropped.
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .filter(|event| !matches!(event, Event::Html(_)));
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

// =============================================================================
// Remote rendering service
// =============================================================================

#[derive(Serialize)]
struct RenderRequest<'a> {
    rfis: &'a [Value],
}

#[derive(Deserialize)]
struct RenderResponse {
    previews: Vec<PdfPreview>,
}

pub struct RemotePdfRenderer {
    http: Client,
    url: String,
}

impl RemotePdfRenderer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl BasePdfRenderer for RemotePdfRenderer {
    async fn render_previews(&self, rfis: &[Value]) -> Result<Vec<PdfPreview>> {
        let response = self
            .http
            .post(&self.url)
            .json(&RenderRequest { rfis })
            .send()
            .await
            .context("PDF render service unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("PDF render service returned {}: {}", status, body);
        }

        let rendered: RenderResponse = response
            .json()
            .await
            .context("PDF render service returned an unreadable body")?;

        if rendered.previews.len() != rfis.len() {
            bail!(
                "PDF render service returned {} previews for {} RFIs",
                rendered.previews.len(),
                rfis.len()
            );
        }
        Ok(rendered.previews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(preview: &PdfPreview) -> String {
        String::from_utf8(STANDARD.decode(&preview.content).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_one_preview_per_rfi_in_order() {
        let rfis = vec![
            json!({"id": "a", "rfiNumber": "RFI-001", "title": "Door", "status": "open"}),
            json!({"id": "b", "rfiNumber": "RFI-002", "title": "Window", "status": "closed"}),
        ];
        let previews = HtmlPreviewRenderer::new().render_previews(&rfis).await.unwrap();

        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].file_name, "RFI-001.html");
        assert_eq!(previews[1].rfi_id.as_deref(), Some("b"));
        assert!(decode(&previews[1]).contains("Closed"));
    }

    #[tokio::test]
    async fn test_markdown_rendered_and_html_escaped() {
        let rfis = vec![json!({
            "title": "<script>alert(1)</script>",
            "description": "Please confirm **fire rating**.\n\n<iframe src=x></iframe>",
        })];
        let previews = HtmlPreviewRenderer::new().render_previews(&rfis).await.unwrap();
        let html = decode(&previews[0]);

        assert!(html.contains("<strong>fire rating</strong>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<iframe"));
        assert_eq!(previews[0].file_name, "rfi-1.html");
    }

    #[tokio::test]
    async fn test_non_object_record_fails() {
        let err = HtmlPreviewRenderer::new()
            .render_previews(&[json!("just a string")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[tokio::test]
    async fn test_empty_input_renders_nothing() {
        let previews = HtmlPreviewRenderer::new().render_previews(&[]).await.unwrap();
        assert!(previews.is_empty());
    }
}
