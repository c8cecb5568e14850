//! Web page and PDF loading
//!
//! Fetches a URL, reduces it to plain text and splits it into chunks. PDF
//! documents go through a PDF text extractor; everything else is treated as
//! HTML.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use scout_core::{Chunk, ScoutError, ScoutResult};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use crate::providers::DocumentLoader;
use crate::splitter::TextSplitter;

/// Client for fetching documents referenced by search results
#[derive(Debug, Clone)]
pub struct WebDocumentLoader {
    client: Client,
    splitter: TextSplitter,
}

impl WebDocumentLoader {
    pub fn new() -> Result<Self, ScoutError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .map_err(|e| ScoutError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            splitter: TextSplitter::default(),
        })
    }

    /// Fetch a URL and extract its text content
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScoutError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScoutError::network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ScoutError::api(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        if is_pdf_url(url) || content_type.starts_with("application/pdf") {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ScoutError::network(format!("Failed to read {}: {}", url, e)))?;
            debug!("Extracting text from {} byte PDF", bytes.len());
            return extract_pdf_text(bytes.to_vec()).await;
        }

        if !content_type.is_empty()
            && !content_type.contains("html")
            && !content_type.starts_with("text/")
        {
            return Err(ScoutError::parse(format!(
                "Unsupported content type for {}: {}",
                url, content_type
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ScoutError::network(format!("Failed to read response from {}: {}", url, e)))?;

        Ok(extract_text_from_html(&html))
    }
}

#[async_trait]
impl DocumentLoader for WebDocumentLoader {
    #[instrument(skip(self))]
    async fn load(&self, url: &str) -> ScoutResult<Vec<Chunk>> {
        let text = self.fetch_text(url).await?;
        if text.trim().is_empty() {
            return Err(ScoutError::parse(format!("No text content at {}", url)));
        }

        let chunks = self.splitter.split_into_chunks(url, &text);
        info!("Loaded {} ({} chars, {} chunks)", url, text.len(), chunks.len());
        Ok(chunks)
    }
}

/// Whether the URL path names a PDF document
pub fn is_pdf_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase().ends_with(".pdf"),
        Err(_) => url.to_lowercase().ends_with(".pdf"),
    }
}

/// PDF parsing is CPU bound, so it runs on the blocking pool
async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, ScoutError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ScoutError::internal(format!("PDF extraction task failed: {}", e)))?
        .map(|text| clean_text(&text))
        .map_err(|e| ScoutError::parse(format!("Failed to extract PDF text: {}", e)))
}

/// Extract readable text from an HTML page
///
/// Prefers main content regions and falls back to the body.
pub fn extract_text_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut content = String::new();

    let main_selectors = ["main", "article", "#content", ".content", "#main", ".main"];

    for selector_str in main_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                let cleaned = clean_text(&visible_text(element));
                if !cleaned.is_empty() {
                    content.push_str(&cleaned);
                    content.push_str("\n\n");
                }
            }
        }
        if !content.is_empty() {
            break;
        }
    }

    // Fall back to body if no main content found
    if content.is_empty() {
        if let Ok(body_selector) = Selector::parse("body") {
            for body in document.select(&body_selector) {
                content = clean_text(&visible_text(body));
            }
        }
    }

    content.trim().to_string()
}

/// Text nodes under `element`, skipping script-like containers
fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"));
        if hidden {
            continue;
        }
        text.push_str(fragment);
        if node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|e| is_block(e.name()))
        {
            text.push('\n');
        }
    }
    text
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "td" | "th" | "tr"
            | "section" | "blockquote" | "pre"
    )
}

/// Trim lines, drop empty ones and keep single blank lines as paragraph breaks
fn clean_text(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if out.last().is_some_and(|l| !l.is_empty()) {
                out.push("");
            }
        } else {
            out.push(line);
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_url() {
        assert!(is_pdf_url("https://acme.example/reports/annual-2023.PDF"));
        assert!(is_pdf_url("https://acme.example/report.pdf?download=1"));
        assert!(!is_pdf_url("https://acme.example/pdf-viewer"));
        assert!(!is_pdf_url("https://acme.example/about"));
    }

    #[test]
    fn test_extract_prefers_main_content() {
        let html = r#"<html><body>
            <nav>Home | About</nav>
            <main><h1>Acme Corp</h1><p>Acme makes anvils.</p><script>var x = 1;</script></main>
            <footer>Copyright</footer>
        </body></html>"#;
        let text = extract_text_from_html(html);
        assert!(text.contains("Acme Corp"));
        assert!(text.contains("Acme makes anvils."));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let html = "<html><head><style>p { color: red; }</style></head><body><p>First</p><p>Second</p></body></html>";
        let text = extract_text_from_html(html);
        assert_eq!(text, "First\nSecond");
    }

    #[test]
    fn test_clean_text_keeps_paragraph_breaks() {
        let text = "  one  \n\n\n two\nthree \n\n";
        assert_eq!(clean_text(text), "one\n\ntwo\nthree");
    }
}
