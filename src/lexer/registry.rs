//! Grammar lookup by name, MIME type or content

use tracing::trace;

use super::syntax::{syntax_set, SyntaxLexer};
use super::Lexer;

// Syntax token (name or extension) and the MIME types it is registered for
const MIMETYPES: &[(&str, &[&str])] = &[
    ("json", &["application/json", "application/x-json", "application/ld+json"]),
    (
        "xml",
        &[
            "text/xml",
            "application/xml",
            "image/svg+xml",
            "application/rss+xml",
            "application/atom+xml",
        ],
    ),
    ("html", &["text/html", "application/xhtml+xml"]),
    ("css", &["text/css"]),
    (
        "js",
        &[
            "application/javascript",
            "application/x-javascript",
            "text/javascript",
            "text/x-javascript",
        ],
    ),
    ("yaml", &["application/yaml", "application/x-yaml", "text/yaml", "text/x-yaml"]),
    ("toml", &["application/toml"]),
    ("md", &["text/markdown", "text/x-markdown"]),
    ("sh", &["application/x-sh", "text/x-shellscript"]),
    ("py", &["text/x-python", "application/x-python"]),
    ("sql", &["application/sql", "text/x-sql"]),
    ("diff", &["text/x-diff", "text/x-patch"]),
    ("txt", &["text/plain"]),
];

/// Collection of grammars available to the content classifier
pub struct LexerRegistry {
    lexers: Vec<Box<dyn Lexer>>,
}

impl Default for LexerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for LexerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.lexers.iter().map(|l| l.name()))
            .finish()
    }
}

impl LexerRegistry {
    /// A registry with no grammars at all
    pub fn empty() -> Self {
        Self { lexers: Vec::new() }
    }

    /// Every bundled syntax that has a MIME type
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (token, mimetypes) in MIMETYPES {
            match SyntaxLexer::find(token, mimetypes) {
                Some(lexer) => registry.register(Box::new(lexer)),
                None => trace!(token, "no bundled syntax"),
            }
        }
        registry
    }

    /// Add a grammar. Later registrations lose ties against earlier ones.
    pub fn register(&mut self, lexer: Box<dyn Lexer>) {
        self.lexers.push(lexer);
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn Lexer> {
        self.lexers
            .iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
            .map(|l| l.as_ref())
    }

    /// Exact lookup of a bare MIME type (no parameters)
    pub fn for_mimetype(&self, mimetype: &str) -> Option<&dyn Lexer> {
        self.lexers
            .iter()
            .find(|l| l.mimetypes().iter().any(|m| m.eq_ignore_ascii_case(mimetype)))
            .map(|l| l.as_ref())
    }

    /// Content sniffing
    ///
    /// A syntax whose first-line pattern matches (`<?xml `, `<!DOCTYPE html`,
    /// a shebang) wins if it is registered; otherwise the grammar with the
    /// highest positive [`Lexer::analyse`] score.
    pub fn guess(&self, text: &str) -> Option<&dyn Lexer> {
        let first_line = syntax_set()
            .find_syntax_by_first_line(text)
            .and_then(|syntax| self.by_name(&syntax.name));
        if first_line.is_some() {
            return first_line;
        }

        let mut best: Option<(&dyn Lexer, f32)> = None;
        for lexer in &self.lexers {
            let score = lexer.analyse(text);
            if score <= 0.0 {
                continue;
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((lexer.as_ref(), score));
            }
        }
        best.map(|(lexer, _)| lexer)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lexers.iter().map(|l| l.name())
    }
}
