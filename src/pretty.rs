//! The pretty printer facade

use ratatui::text::Line;

use crate::backend::{ColorSupport, Renderer};
use crate::classify::classify;
use crate::error::Result;
use crate::lexer::registry::LexerRegistry;
use crate::lexer::{http, RuleLexer};
use crate::style::StyleRegistry;
use crate::tui;

/// Renders HTTP header blocks and bodies with one fixed style
///
/// Built once per output session; holds no mutable state, so one instance can
/// be reused for any number of calls and shared between threads.
#[derive(Debug)]
pub struct PrettyPrinter {
    renderer: Renderer,
    header_lexer: RuleLexer,
    lexers: LexerRegistry,
}

impl PrettyPrinter {
    /// Build a printer for `style`, detecting color support from `TERM`
    pub fn new(style: &str) -> Result<Self> {
        Self::with_options(style, &StyleRegistry::builtin(), ColorSupport::detect())
    }

    /// Build a printer against an explicit style registry and color support
    pub fn with_options(style: &str, styles: &StyleRegistry, support: ColorSupport) -> Result<Self> {
        let theme = styles.resolve(style)?;
        tracing::debug!(style, ?support, "building pretty printer");
        Ok(Self {
            renderer: Renderer::new(theme, support),
            header_lexer: http::lexer(),
            lexers: LexerRegistry::builtin(),
        })
    }

    /// Replace the grammars used for bodies
    pub fn with_lexers(mut self, lexers: LexerRegistry) -> Self {
        self.lexers = lexers;
        self
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render a header block
    pub fn headers(&self, text: &str) -> Result<String> {
        self.renderer.render(self.header_lexer.tokens(text))
    }

    /// Render a body according to its content type
    ///
    /// Bodies no grammar claims are returned unchanged.
    pub fn body(&self, text: &str, content_type: &str) -> Result<String> {
        let classified = classify(&self.lexers, text, content_type)?;
        match classified.lexer {
            Some(lexer) => self.renderer.render(lexer.tokenize(&classified.content)),
            None => Ok(classified.content.into_owned()),
        }
    }

    /// Header block as styled TUI lines
    pub fn headers_lines(&self, text: &str) -> Result<Vec<Line<'static>>> {
        tui::to_lines(&self.renderer, self.header_lexer.tokens(text))
    }

    /// Body as styled TUI lines
    pub fn body_lines(&self, text: &str, content_type: &str) -> Result<Vec<Line<'static>>> {
        let classified = classify(&self.lexers, text, content_type)?;
        match classified.lexer {
            Some(lexer) => tui::to_lines(&self.renderer, lexer.tokenize(&classified.content)),
            None => Ok(tui::plain_lines(&classified.content)),
        }
    }
}
