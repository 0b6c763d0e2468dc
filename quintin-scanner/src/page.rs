use crate::error::{Result, ScanError};
use scraper::{Html, Selector};
use tracing::debug;

/// Raw response for a single page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Text and links pulled out of a page body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Trimmed contents of the first `<title>`, if any.
    pub title: Option<String>,
    /// Non-empty text lines in document order.
    pub blocks: Vec<String>,
    /// Raw `href` values of every anchor, unresolved.
    pub links: Vec<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector {}: {:?}", css, e)))
}

// Text inside these elements is never page content.
fn is_hidden_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "noscript" | "template")
}

pub fn parse_page(html: &str) -> Result<ParsedPage> {
    let document = Html::parse_document(html);

    let title_selector = selector("title")?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut blocks = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| is_hidden_element(e.name()))
        });
        if hidden {
            continue;
        }
        blocks.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    let link_selector = selector("a[href]")?;
    let links: Vec<String> = document
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    debug!(
        "Parsed page: {} text blocks, {} links, title {:?}",
        blocks.len(),
        links.len(),
        title
    );

    Ok(ParsedPage {
        title,
        blocks,
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_text_and_links() {
        let html = r#"<html>
            <head><title>  The Sunken Tankard </title></head>
            <body>
                <h1>Welcome</h1>
                <p>Stew is served
                   at dusk.</p>
                <a href="/menu">Menu</a>
                <a href="https://other.test/">Elsewhere</a>
                <a name="no-href">Anchor</a>
            </body></html>"#;

        let page = parse_page(html).unwrap();

        assert_eq!(page.title.as_deref(), Some("The Sunken Tankard"));
        assert_eq!(
            page.blocks,
            vec![
                "The Sunken Tankard",
                "Welcome",
                "Stew is served",
                "at dusk.",
                "Menu",
                "Elsewhere",
                "Anchor",
            ]
        );
        assert_eq!(page.links, vec!["/menu", "https://other.test/"]);
    }

    #[test]
    fn test_missing_or_blank_title() {
        let page = parse_page("<html><body><p>No title here</p></body></html>").unwrap();
        assert_eq!(page.title, None);

        let page = parse_page("<html><head><title>   </title></head></html>").unwrap();
        assert_eq!(page.title, None);
    }

    #[test]
    fn test_scripts_and_styles_are_not_text() {
        let html = r#"<html><head><style>p { color: red; }</style></head>
            <body><script>var x = 1;</script><p>Visible</p>
            <noscript>Enable JS</noscript></body></html>"#;

        let page = parse_page(html).unwrap();
        assert_eq!(page.blocks, vec!["Visible"]);
    }

    #[test]
    fn test_plain_text_body() {
        let page = parse_page("just some words\nand more").unwrap();
        assert_eq!(page.title, None);
        assert_eq!(page.blocks, vec!["just some words", "and more"]);
        assert!(page.links.is_empty());
    }
}
