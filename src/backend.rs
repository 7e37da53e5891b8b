//! Output backends
//!
//! A [`Renderer`] pairs an optional [`Theme`] with one of three backends,
//! chosen once from the requested style and the terminal's color support.

use std::fmt::Write;

use crossterm::style::Attribute;

use crate::error::Result;
use crate::style::{Attr, Theme};
use crate::token::Token;

/// What the terminal advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    /// The 16 standard colors
    Basic,
    /// The xterm 256-color palette
    Extended,
}

impl ColorSupport {
    /// Inspect `TERM`
    pub fn detect() -> Self {
        Self::from_term(std::env::var("TERM").ok().as_deref())
    }

    pub fn from_term(term: Option<&str>) -> Self {
        match term {
            Some(term) if term.contains("256color") => ColorSupport::Extended,
            _ => ColorSupport::Basic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// No escape sequences; text passes through unchanged
    Plain,
    /// 16-color SGR codes
    Ansi16,
    /// xterm 256-color SGR codes
    Ansi256,
}

impl Backend {
    pub fn select(colored: bool, support: ColorSupport) -> Self {
        match (colored, support) {
            (false, _) => Backend::Plain,
            (true, ColorSupport::Basic) => Backend::Ansi16,
            (true, ColorSupport::Extended) => Backend::Ansi256,
        }
    }
}

/// A theme bound to a backend. Immutable once built.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Option<Theme>,
    backend: Backend,
}

impl Renderer {
    /// `None` selects the plain backend regardless of `support`
    pub fn new(theme: Option<Theme>, support: ColorSupport) -> Self {
        let backend = Backend::select(theme.is_some(), support);
        Self { theme, backend }
    }

    pub fn plain() -> Self {
        Self {
            theme: None,
            backend: Backend::Plain,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    /// Render a token stream, stopping at the first lexing error
    pub fn render<'a, I>(&self, tokens: I) -> Result<String>
    where
        I: IntoIterator<Item = Result<Token<'a>>>,
    {
        let mut out = String::new();
        for token in tokens {
            self.paint(&mut out, token?)?;
        }
        Ok(out)
    }

    fn paint(&self, out: &mut String, token: Token<'_>) -> std::fmt::Result {
        let attr = match &self.theme {
            Some(theme) => theme.attr(token.category),
            None => Attr::default(),
        };
        if attr.is_plain() {
            return out.write_str(token.lexeme);
        }

        // SGR codes are written out rather than through crossterm's `Colored`,
        // which drops colors when `NO_COLOR` is set; only the `none` style
        // turns coloring off.
        let mut codes = Vec::with_capacity(2);
        if attr.bold {
            codes.push(Attribute::Bold.sgr());
        }
        match (self.backend, attr.color) {
            (Backend::Plain, _) => return out.write_str(token.lexeme),
            (Backend::Ansi256, Some(rgb)) => codes.push(format!("38;5;{}", rgb.to_xterm256())),
            (Backend::Ansi16, Some(rgb)) => {
                let index = rgb.to_ansi16();
                let code = if index < 8 { 30 + index } else { 90 + index - 8 };
                codes.push(code.to_string());
            }
            (_, None) => {}
        }
        write!(
            out,
            "\x1b[{}m{}\x1b[{}m",
            codes.join(";"),
            token.lexeme,
            Attribute::Reset.sgr()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgb;
    use crate::token::Category;

    fn theme() -> Theme {
        Theme::new("test")
            .with(Category::Number, Attr::fg(0xff0000))
            .with(Category::Keyword, Attr::fg(0x00ff00).bold())
    }

    fn tokens() -> Vec<Result<Token<'static>>> {
        vec![
            Ok(Token::new("x = ", Category::Text)),
            Ok(Token::new("42", Category::Number)),
        ]
    }

    #[test]
    fn test_detect_from_term() {
        assert_eq!(ColorSupport::from_term(Some("xterm-256color")), ColorSupport::Extended);
        assert_eq!(ColorSupport::from_term(Some("screen-256color")), ColorSupport::Extended);
        assert_eq!(ColorSupport::from_term(Some("xterm")), ColorSupport::Basic);
        assert_eq!(ColorSupport::from_term(None), ColorSupport::Basic);
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(Renderer::new(None, ColorSupport::Extended).backend(), Backend::Plain);
        assert_eq!(Renderer::new(Some(theme()), ColorSupport::Basic).backend(), Backend::Ansi16);
        assert_eq!(Renderer::new(Some(theme()), ColorSupport::Extended).backend(), Backend::Ansi256);
    }

    #[test]
    fn test_plain_passes_text_through() {
        let out = Renderer::plain().render(tokens()).unwrap();
        assert_eq!(out, "x = 42");
    }

    #[test]
    fn test_detect_reads_term_variable() {
        let saved = std::env::var("TERM").ok();

        std::env::set_var("TERM", "xterm-256color");
        assert_eq!(ColorSupport::detect(), ColorSupport::Extended);
        std::env::set_var("TERM", "vt100");
        assert_eq!(ColorSupport::detect(), ColorSupport::Basic);
        std::env::remove_var("TERM");
        assert_eq!(ColorSupport::detect(), ColorSupport::Basic);

        match saved {
            Some(term) => std::env::set_var("TERM", term),
            None => std::env::remove_var("TERM"),
        }
    }

    #[test]
    fn test_ansi256_uses_palette_index() {
        let out = Renderer::new(Some(theme()), ColorSupport::Extended)
            .render(tokens())
            .unwrap();
        let red = Rgb::hex(0xff0000).to_xterm256();
        assert_eq!(out, format!("x = \x1b[38;5;{red}m42\x1b[0m"));
    }

    #[test]
    fn test_ansi256_bold() {
        let out = Renderer::new(Some(theme()), ColorSupport::Extended)
            .render(vec![Ok(Token::new("if", Category::Keyword))])
            .unwrap();
        assert_eq!(out, "\x1b[1;38;5;46mif\x1b[0m");
    }

    #[test]
    fn test_ansi256_ignores_no_color() {
        std::env::set_var("NO_COLOR", "1");
        let out = Renderer::new(Some(theme()), ColorSupport::Extended)
            .render(tokens())
            .unwrap();
        std::env::remove_var("NO_COLOR");
        assert!(out.contains("\x1b[38;5;196m42"));
    }

    #[test]
    fn test_ansi16_uses_basic_codes() {
        let out = Renderer::new(Some(theme()), ColorSupport::Basic)
            .render(tokens())
            .unwrap();
        assert_eq!(out, "x = \x1b[91m42\x1b[0m");
    }

    #[test]
    fn test_bold_attribute() {
        let out = Renderer::new(Some(theme()), ColorSupport::Basic)
            .render(vec![Ok(Token::new("if", Category::Keyword))])
            .unwrap();
        assert_eq!(out, "\x1b[1;92mif\x1b[0m");
    }

    #[test]
    fn test_render_stops_at_error() {
        let tokens: Vec<Result<Token<'static>>> = vec![
            Ok(Token::new("a", Category::Text)),
            Err(crate::error::PrettyError::Xml("boom".to_string())),
        ];
        assert!(Renderer::plain().render(tokens).is_err());
    }
}
