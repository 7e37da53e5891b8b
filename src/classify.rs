//! Content classification
//!
//! Picks the grammar for a response body from its content type, falling
//! back to content sniffing, and rewrites JSON and XML into a canonical
//! indented form before they are tokenized.

use std::borrow::Cow;

use tracing::debug;

use crate::error::Result;
use crate::format::{indent_json, pretty_xml};
use crate::lexer::registry::LexerRegistry;
use crate::lexer::syntax::{JSON, XML};
use crate::lexer::Lexer;

/// Outcome of classifying a body
pub struct Classified<'r, 'b> {
    /// Grammar to tokenize with. `None` means pass the content through as-is.
    pub lexer: Option<&'r dyn Lexer>,
    /// The body, possibly re-indented
    pub content: Cow<'b, str>,
}

impl std::fmt::Debug for Classified<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classified")
            .field("lexer", &self.lexer.map(|l| l.name()))
            .field("content", &self.content)
            .finish()
    }
}

/// The bare MIME type: parameters after `;` dropped, trimmed, lowercased
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Select a grammar for `body` and pre-format it
///
/// Malformed JSON is left untouched. Content that ends up classified as XML
/// must be well formed, otherwise this fails.
pub fn classify<'r, 'b>(
    registry: &'r LexerRegistry,
    body: &'b str,
    content_type: &str,
) -> Result<Classified<'r, 'b>> {
    let mime = mime_essence(content_type);
    let mut content = Cow::Borrowed(body);

    let lexer = if mime.contains("json") {
        if let Some(indented) = indent_json(body) {
            content = Cow::Owned(indented);
        } else {
            debug!(%mime, "body is not valid JSON, leaving it unindented");
        }
        registry.by_name(JSON)
    } else {
        None
    };

    let lexer = lexer
        .or_else(|| registry.for_mimetype(&mime))
        .or_else(|| {
            let guessed = registry.guess(body);
            if let Some(lexer) = guessed {
                debug!(%mime, grammar = lexer.name(), "grammar guessed from content");
            }
            guessed
        });

    let Some(lexer) = lexer else {
        debug!(%mime, "no grammar found, passing body through");
        return Ok(Classified {
            lexer: None,
            content,
        });
    };

    if lexer.name() == XML {
        content = Cow::Owned(pretty_xml(&content)?);
    }

    debug!(%mime, grammar = lexer.name(), "classified body");
    Ok(Classified {
        lexer: Some(lexer),
        content,
    })
}
