//! Readable text from HTML error pages.

use scraper::{Html, Node};

/// Elements whose contents never reach the extracted text.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "footer", "nav"];

/// Visible text of `html` as trimmed, non-empty lines joined by `\n`.
///
/// The parser recovers from malformed markup, so any input yields text.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
