//! Renders a digest as a chat message using HTML markup.

use super::Digest;

pub const DIGEST_HEADER: &str = "<b>📰 New Important Articles:</b>\n\n";

/// Escape text for the chat service's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the digest, or `None` when there is nothing to send
pub fn format_digest(digest: &Digest) -> Option<String> {
    if digest.is_empty() {
        return None;
    }

    let mut message = String::from(DIGEST_HEADER);
    for entry in digest.entries() {
        message.push_str(&format!(
            "<b>🔗 Title:</b> <a href=\"{}\">{}</a>\n<b>📝 Summary:</b> {}\n\n",
            escape_html(&entry.url),
            escape_html(&entry.title),
            escape_html(&entry.summary),
        ));
    }

    Some(message)
}
