use log::{error, warn};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ErrorKind;
use crate::models::certificate::{CertificateConfig, CertificateEntry};

const CARD_TEMPLATE: &str = "gallery/card.html.tera";
const EMPTY_TEMPLATE: &str = "gallery/empty.html.tera";
const ERROR_TEMPLATE: &str = "gallery/error.html.tera";
const LOADING_TEMPLATE: &str = "gallery/loading.html.tera";

/// Last-resort markup used only if a state template fails to render.
const FALLBACK_STATE: &str =
    r#"<div class="error-message"><h3>Error Loading Certificates</h3></div>"#;

/// URI schemes that can execute script when placed in src/href.
const DANGEROUS_SCHEMES: &[&str] = &[
    "javascript:",
    "vbscript:",
    "data:text/html",
    "data:application",
];

/// Escape the five HTML-reserved characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns the URL unchanged unless it uses a script-capable scheme.
/// Browsers ignore whitespace and control characters inside a scheme,
/// so those are stripped before matching.
pub fn safe_url(url: &str) -> Option<&str> {
    let squashed: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    if DANGEROUS_SCHEMES.iter().any(|s| squashed.starts_with(s)) {
        None
    } else {
        Some(url)
    }
}

// ── View models ───────────────────────────────────────

#[derive(Serialize)]
struct CardView<'a> {
    index: usize,
    name: &'a str,
    issuer: &'a str,
    image: Option<&'a str>,
    pdf: &'a str,
    date: Option<&'a str>,
    kind: Option<&'a str>,
    skills: &'a [String],
}

impl<'a> CardView<'a> {
    fn new(index: usize, entry: &'a CertificateEntry) -> Self {
        let image = entry.image.as_deref().and_then(|u| {
            let safe = safe_url(u);
            if safe.is_none() {
                warn!("Dropping unsafe image URL for certificate '{}'", entry.name);
            }
            safe
        });
        let pdf = entry
            .pdf
            .as_deref()
            .and_then(|u| {
                let safe = safe_url(u);
                if safe.is_none() {
                    warn!("Dropping unsafe pdf URL for certificate '{}'", entry.name);
                }
                safe
            })
            .unwrap_or("#");
        CardView {
            index,
            name: &entry.name,
            issuer: &entry.issuer,
            image,
            pdf,
            date: entry.date.as_deref(),
            kind: entry.kind.as_deref(),
            skills: &entry.skills,
        }
    }
}

/// Markup for one render pass, built before anything touches the target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedGallery {
    pub markup: String,
    pub cards: usize,
    pub skipped: usize,
}

// ── Renderer ──────────────────────────────────────────

/// Compiles the gallery templates once, with autoescaping on for every
/// `.html.tera` template and `html_escape` as the escape function.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, String> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera", ".html"]);
        tera.set_escape_fn(html_escape);
        tera.add_raw_templates(vec![
            (CARD_TEMPLATE, include_str!("../templates/gallery/card.html.tera")),
            (EMPTY_TEMPLATE, include_str!("../templates/gallery/empty.html.tera")),
            (ERROR_TEMPLATE, include_str!("../templates/gallery/error.html.tera")),
            (LOADING_TEMPLATE, include_str!("../templates/gallery/loading.html.tera")),
        ])
        .map_err(|e| format!("Failed to compile gallery templates: {}", e))?;
        Ok(Renderer { tera })
    }

    /// Render a single card. `index` is the card's position among rendered
    /// cards and drives its reveal delay.
    pub fn card(&self, index: usize, entry: &CertificateEntry) -> Result<String, String> {
        let view = CardView::new(index, entry);
        let ctx = Context::from_serialize(&view).map_err(|e| e.to_string())?;
        self.tera
            .render(CARD_TEMPLATE, &ctx)
            .map_err(|e| e.to_string())
    }

    /// Build card markup for every valid entry, skipping invalid ones.
    pub fn cards(&self, config: &CertificateConfig) -> RenderedGallery {
        let mut markup = String::new();
        let mut cards = 0usize;
        let mut skipped = 0usize;

        for (pos, entry) in config.entries().into_iter().enumerate() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        "Skipping certificate #{} ({}): {}",
                        pos + 1,
                        ErrorKind::EntryInvalid,
                        e
                    );
                    skipped += 1;
                    continue;
                }
            };
            match self.card(cards, &entry) {
                Ok(html) => {
                    markup.push_str(&html);
                    cards += 1;
                }
                Err(e) => {
                    error!("Failed to render certificate '{}': {}", entry.name, e);
                    skipped += 1;
                }
            }
        }

        RenderedGallery {
            markup,
            cards,
            skipped,
        }
    }

    pub fn empty_state(&self, source_path: &str) -> String {
        let mut ctx = Context::new();
        let message = ErrorKind::ConfigShapeInvalid
            .user_message(source_path)
            .unwrap_or_default();
        ctx.insert("message", &message);
        self.state(EMPTY_TEMPLATE, &ctx)
    }

    pub fn error_state(&self, kind: ErrorKind, source_path: &str) -> String {
        let mut ctx = Context::new();
        ctx.insert("kind", kind.name());
        ctx.insert("message", &kind.user_message(source_path).unwrap_or_default());
        self.state(ERROR_TEMPLATE, &ctx)
    }

    pub fn loading_state(&self) -> String {
        self.state(LOADING_TEMPLATE, &Context::new())
    }

    fn state(&self, template: &str, ctx: &Context) -> String {
        self.tera.render(template, ctx).unwrap_or_else(|e| {
            error!("Failed to render {}: {}", template, e);
            FALLBACK_STATE.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, issuer: &str) -> CertificateEntry {
        CertificateEntry::from_value(&json!({"name": name, "issuer": issuer})).unwrap()
    }

    #[test]
    fn test_escape_all_reserved() {
        let out = html_escape(r#"<a href="x">Tom & Jerry's</a>"#);
        for c in ['<', '>', '"', '\''] {
            assert!(!out.contains(c), "raw {:?} in {}", c, out);
        }
        assert_eq!(
            out,
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
        // Every '&' left must start an entity we produced.
        assert_eq!(out.matches('&').count(), out.matches(';').count());
    }

    #[test]
    fn test_escape_distinct_inputs_stay_distinct() {
        let inputs = ["&", "<", ">", "\"", "'", "&amp;", "&lt;", "a&b", "a<b"];
        let outputs: Vec<String> = inputs.iter().map(|s| html_escape(s)).collect();
        for i in 0..outputs.len() {
            for j in (i + 1)..outputs.len() {
                assert_ne!(outputs[i], outputs[j], "{:?} vs {:?}", inputs[i], inputs[j]);
            }
        }
    }

    #[test]
    fn test_escape_passthrough() {
        assert_eq!(html_escape("AWS Cloud Practitioner"), "AWS Cloud Practitioner");
        assert_eq!(html_escape("Zertifikat für Ölförderung"), "Zertifikat für Ölförderung");
        assert_eq!(html_escape(""), "");
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("certs/a.pdf"), Some("certs/a.pdf"));
        assert_eq!(safe_url("https://example.com/a.png"), Some("https://example.com/a.png"));
        assert_eq!(safe_url("data:image/png;base64,AAAA"), Some("data:image/png;base64,AAAA"));
        assert!(safe_url("javascript:alert(1)").is_none());
        assert!(safe_url("  JavaScript:alert(1)").is_none());
        assert!(safe_url("java\tscript:alert(1)").is_none());
        assert!(safe_url("vbscript:msgbox").is_none());
        assert!(safe_url("data:text/html,<script>").is_none());
    }

    #[test]
    fn test_templates_compile() {
        assert!(Renderer::new().is_ok());
    }

    #[test]
    fn test_card_escapes_fields() {
        let r = Renderer::new().unwrap();
        let e = CertificateEntry::from_value(&json!({
            "name": "<script>alert('x')</script>",
            "issuer": "Foo & \"Bar\"",
            "type": "<b>bold</b>",
            "date": "2024 <now>",
            "skills": ["C<T>", "R&D"]
        }))
        .unwrap();
        let html = r.card(0, &e).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<h3>&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;</h3>"));
        assert!(html.contains("Foo &amp; &quot;Bar&quot;"));
        assert!(html.contains(r#"<div class="cert-type">&lt;b&gt;bold&lt;/b&gt;</div>"#));
        assert!(html.contains("2024 &lt;now&gt;"));
        assert!(html.contains(r#"<span class="cert-skill">C&lt;T&gt;</span>"#));
        assert!(html.contains(r#"<span class="cert-skill">R&amp;D</span>"#));
    }

    #[test]
    fn test_card_optional_sections() {
        let r = Renderer::new().unwrap();
        let html = r.card(3, &entry("Name", "Issuer")).unwrap();
        assert!(html.contains(r#"data-index="3""#));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("certificate-placeholder"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("cert-type"));
        assert!(!html.contains("cert-skills"));
        assert!(!html.contains("cert-date"));
    }

    #[test]
    fn test_card_links_and_image() {
        let r = Renderer::new().unwrap();
        let e = CertificateEntry::from_value(&json!({
            "name": "N",
            "issuer": "I",
            "image": "certificates/images/n.png",
            "pdf": "certificates/pdfs/n.pdf"
        }))
        .unwrap();
        let html = r.card(0, &e).unwrap();
        assert!(html.contains(r#"<img src="certificates/images/n.png" alt="N""#));
        assert_eq!(html.matches(r#"href="certificates/pdfs/n.pdf""#).count(), 2);
    }

    #[test]
    fn test_card_neutralises_script_urls() {
        let r = Renderer::new().unwrap();
        let e = CertificateEntry::from_value(&json!({
            "name": "N",
            "issuer": "I",
            "image": "javascript:alert(1)",
            "pdf": "javascript:alert(2)"
        }))
        .unwrap();
        let html = r.card(0, &e).unwrap();
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("certificate-placeholder"));
    }

    #[test]
    fn test_cards_skip_invalid() {
        let r = Renderer::new().unwrap();
        let cfg = CertificateConfig::from_value(json!({"certificates": [
            {"name": "A", "issuer": "X"},
            {"name": "missing issuer"},
            42,
            {"name": "B", "issuer": "Y"}
        ]}))
        .unwrap();
        let out = r.cards(&cfg);
        assert_eq!(out.cards, 2);
        assert_eq!(out.skipped, 2);
        assert_eq!(out.markup.matches(r#"class="certificate-card""#).count(), 2);
        assert!(out.markup.contains(r#"data-index="0""#));
        assert!(out.markup.contains(r#"data-index="1""#));
        assert!(!out.markup.contains("missing issuer"));
    }

    #[test]
    fn test_state_messages() {
        let r = Renderer::new().unwrap();
        let path = "certificates/certificates-config.json";

        let empty = r.empty_state(path);
        assert!(empty.contains("No Certificates Found"));
        assert!(!empty.contains("Error Loading Certificates"));

        let unreachable = r.error_state(ErrorKind::ConfigUnreachable, path);
        assert!(unreachable.contains("Certificate config file not found"));
        assert!(unreachable.contains(path));
        assert!(unreachable.contains(r#"data-action="refresh-certificates""#));

        let malformed = r.error_state(ErrorKind::ConfigMalformed, path);
        assert!(malformed.contains("Invalid JSON format in certificates config file."));

        assert!(r.loading_state().contains("Refreshing certificates..."));
    }
}
