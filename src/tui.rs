//! ratatui adapter
//!
//! Turns the same token streams the terminal renderer consumes into
//! `Line`s for a TUI panel, so the response view and the CLI agree on colors.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::backend::{Backend, Renderer};
use crate::error::Result;
use crate::style::Attr;
use crate::token::{Category, Token};

fn span_style(renderer: &Renderer, category: Category) -> Style {
    let attr = renderer
        .theme()
        .map(|theme| theme.attr(category))
        .unwrap_or_default();
    attr_style(renderer.backend(), attr)
}

fn attr_style(backend: Backend, attr: Attr) -> Style {
    let mut style = Style::default();
    if backend == Backend::Plain {
        return style;
    }
    if let Some(rgb) = attr.color {
        let index = match backend {
            Backend::Ansi256 => rgb.to_xterm256(),
            _ => rgb.to_ansi16(),
        };
        style = style.fg(Color::Indexed(index));
    }
    if attr.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Split a token stream into styled lines
///
/// Lexemes spanning several lines are cut at each `\n`; carriage returns are
/// dropped since a TUI cell grid has no use for them.
pub fn to_lines<'a, I>(renderer: &Renderer, tokens: I) -> Result<Vec<Line<'static>>>
where
    I: IntoIterator<Item = Result<Token<'a>>>,
{
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for token in tokens {
        let token = token?;
        let style = span_style(renderer, token.category);
        let mut pieces = token.lexeme.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            let piece = piece.trim_end_matches('\r');
            if !piece.is_empty() {
                current.push(Span::styled(piece.to_string(), style));
            }
            if pieces.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    Ok(lines)
}

/// Unstyled lines, for content no grammar claimed
pub fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(Span::raw(line.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ColorSupport;
    use crate::style::Theme;

    fn tokens() -> Vec<Result<Token<'static>>> {
        vec![
            Ok(Token::new("Host:", Category::Name)),
            Ok(Token::new(" example.com\r", Category::String)),
            Ok(Token::new("\n", Category::Text)),
            Ok(Token::new("Accept:", Category::Name)),
        ]
    }

    #[test]
    fn test_lines_are_split_on_newlines() {
        let lines = to_lines(&Renderer::plain(), tokens()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "Host: example.com");
        assert_eq!(lines[1].to_string(), "Accept:");
    }

    #[test]
    fn test_extended_colors_use_palette_index() {
        let theme = Theme::new("t").with(Category::Name, Attr::fg(0xff0000).bold());
        let renderer = Renderer::new(Some(theme), ColorSupport::Extended);
        let lines = to_lines(&renderer, tokens()).unwrap();
        let style = lines[0].spans[0].style;
        assert_eq!(style.fg, Some(Color::Indexed(196)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_plain_renderer_has_no_style() {
        let lines = to_lines(&Renderer::plain(), tokens()).unwrap();
        assert!(lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .all(|s| s.style == Style::default()));
    }

    #[test]
    fn test_plain_lines() {
        let lines = plain_lines("a\nb\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "b");
    }
}
