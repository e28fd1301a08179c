use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::{Html, Node};

fn is_skipped(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

fn breaks_before(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "br"
    )
}

fn breaks_after(tag: &str) -> bool {
    tag != "br" && breaks_before(tag)
}

fn push_newline(buf: &mut String) {
    if !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
}

fn push_text(buf: &mut String, text: &str) {
    let text = text.trim();

    if text.is_empty() {
        return;
    }

    if !buf.is_empty() && !buf.ends_with([' ', '\n']) {
        buf.push(' ');
    }

    buf.push_str(text);
}

fn collapse_newlines(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        if c == '\n' && result.ends_with('\n') {
            continue;
        }

        result.push(c);
    }

    result
}

/// Converts an HTML fragment to plain text.
///
/// Text nodes are joined with single spaces, block-level elements are separated by line breaks,
/// and the contents of `<script>` and `<style>` are dropped. Every run of line breaks, including
/// runs inside a single text node, becomes one `\n`.
///
/// The HTML parser recovers from any malformed input, so this never fails; garbage in yields
/// whatever text the parser could salvage (possibly none).
pub fn plain_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut buf = String::new();
    let mut skipped: Option<NodeId> = None;

    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => {
                if skipped.is_some() {
                    continue;
                }

                match node.value() {
                    Node::Element(element) if is_skipped(element.name()) => {
                        skipped = Some(node.id());
                    }

                    Node::Element(element) if breaks_before(element.name()) => {
                        push_newline(&mut buf);
                    }

                    Node::Text(text) => push_text(&mut buf, text),

                    _ => {}
                }
            }

            Edge::Close(node) => {
                if let Some(id) = skipped {
                    if id == node.id() {
                        skipped = None;
                    }

                    continue;
                }

                if let Node::Element(element) = node.value() {
                    if breaks_after(element.name()) {
                        push_newline(&mut buf);
                    }
                }
            }
        }
    }

    collapse_newlines(buf.trim())
}
