use crate::models::{HtmlTable, RawDocument, TableRow};
use crate::scraper::fetcher::FetchedPage;
use crate::scraper::text::{collapse_whitespace, truncate_chars};
use scraper::{ElementRef, Html, Node, Selector};

/// Upper bound on the page text kept for analysis.
pub const MAX_TEXT_CHARS: usize = 50_000;

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Reduce a fetched page to its readable text and tables.
pub fn parse_document(page: &FetchedPage) -> RawDocument {
    let document = Html::parse_document(&page.html);

    let text = content_root(&document)
        .map(readable_text)
        .unwrap_or_else(|| document.root_element().text().collect());
    let full_text = truncate_chars(&collapse_whitespace(&text), MAX_TEXT_CHARS).to_string();

    let html_fragments = extract_tables(&document);
    let fetched_at = chrono::Utc::now();
    tracing::debug!(
        url = %page.url,
        fetched_at = %fetched_at.to_rfc3339(),
        text_chars = full_text.chars().count(),
        tables = html_fragments.len(),
        "parsed documentation page"
    );

    RawDocument {
        url: page.url.clone(),
        full_text,
        html_fragments,
        fetched_at,
    }
}

/// `<main>` if the page has one, otherwise `<body>`.
fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    ["main", "body"].iter().find_map(|tag| {
        Selector::parse(tag)
            .ok()
            .and_then(|selector| document.select(&selector).next())
    })
}

fn readable_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in root.descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}

fn extract_tables(document: &Html) -> Vec<HtmlTable> {
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td, th"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .map(|table| HtmlTable {
            rows: table
                .select(&row_sel)
                .map(|row| TableRow {
                    cells: row
                        .select(&cell_sel)
                        .map(|cell| collapse_whitespace(&cell.text().collect::<String>()))
                        .collect(),
                    markup: row.html(),
                })
                .collect(),
        })
        .collect()
}
