//! Plain-text extraction from XML full text and HTML pages.

use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{ElementRef, Html, Selector};

use crate::sources::SourceError;

/// Elements whose text never belongs to the article body
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

/// Article containers used by common publishers, tried in order
const ARTICLE_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    ".article-content",
    ".article__body",
    "#article-body",
    ".c-article-body",
    ".article-section",
    "main",
];

/// Concatenate all text nodes of an XML document, separated by spaces.
///
/// Used for JATS full text from Europe PMC and PMC efetch.
pub fn xml_to_text(xml: &str) -> Result<String, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut parts: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(text)) => {
                let content = text
                    .unescape()
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                push_trimmed(&mut parts, &content);
            }
            Ok(Event::CData(data)) => {
                push_trimmed(&mut parts, &String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SourceError::Parse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(parts.join(" "))
}

fn push_trimmed(parts: &mut Vec<String>, content: &str) {
    let trimmed = content.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Extract the readable article text from a publisher HTML page.
///
/// The first matching article container is used; without one the whole
/// document is read. Scripts, styles and page chrome are skipped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let container = ARTICLE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next());

    element_text(container.unwrap_or_else(|| document.root_element()))
}

/// Strip markup from an HTML fragment such as a JATS abstract
pub fn html_fragment_to_text(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    element_text(document.root_element())
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if skipped {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// Length of extracted text in characters, the unit of every text threshold
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_to_text() {
        let xml = r#"<?xml version="1.0"?>
            <article>
              <front><article-title>Reuse of &amp; data</article-title></front>
              <body><p>Data at <ext-link>10.48324/dandi.000130</ext-link>.</p></body>
              <back><![CDATA[raw ds000117]]></back>
            </article>"#;

        let text = xml_to_text(xml).unwrap();
        assert!(text.contains("Reuse of & data"));
        assert!(text.contains("Data at 10.48324/dandi.000130 ."));
        assert!(text.contains("raw ds000117"));
    }

    #[test]
    fn test_xml_to_text_rejects_malformed() {
        assert!(xml_to_text("<a><b></a>").is_err());
    }

    #[test]
    fn test_html_to_text_prefers_article() {
        let html = r#"<html><head><style>body {}</style></head>
            <body>
              <nav>Journal menu</nav>
              <article>
                <header>Skip me</header>
                <p>Recordings are on DANDI:000130.</p>
                <script>var x = "ds999999";</script>
              </article>
              <footer>Copyright</footer>
            </body></html>"#;

        let text = html_to_text(html);
        assert_eq!(text, "Recordings are on DANDI:000130.");
    }

    #[test]
    fn test_html_to_text_falls_back_to_document() {
        let html = "<html><body><div>Plain page with ds000001</div><footer>x</footer></body></html>";
        assert_eq!(html_to_text(html), "Plain page with ds000001");
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(text_len("Müller"), 6);
        assert_eq!(text_len("ds000117"), 8);
    }

    #[test]
    fn test_html_fragment_to_text() {
        let abstract_html = "<jats:p>We analysed <jats:italic>OpenNeuro</jats:italic> data.</jats:p>";
        assert_eq!(html_fragment_to_text(abstract_html), "We analysed OpenNeuro data.");
    }
}
