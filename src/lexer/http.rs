//! Grammar for HTTP header blocks
//!
//! Recognizes whitespace, a response status line, a request line and
//! `Name: Value` lines. Anything else is reported as unrecognized input
//! instead of being dropped.

use super::{groups, token, RuleLexer, Unmatched};
use crate::token::Category;

pub const NAME: &str = "HTTP";

pub fn lexer() -> RuleLexer {
    RuleLexer::builder(NAME)
        .mimetypes(&["message/http"])
        .state(
            "root",
            vec![
                token(r"\s+", Category::Text),
                // HTTP/1.1 200 OK
                groups(
                    r"([A-Za-z][\w.+-]*/[\d.]+[ \t]+)(\d+)((?:[ \t]+.*)?)",
                    &[Category::Operator, Category::Number, Category::String],
                ),
                // GET /path HTTP/1.1
                groups(
                    r"([A-Z]+)([ \t]+)(\S+)([ \t]+)([A-Za-z][\w.+-]*/[\d.]+)",
                    &[
                        Category::Keyword,
                        Category::Text,
                        Category::NameNamespace,
                        Category::Text,
                        Category::Operator,
                    ],
                ),
                groups(r"(.*?:)(.*)", &[Category::Name, Category::String]),
            ],
        )
        .unmatched(Unmatched::Fail)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrettyError;
    use crate::lexer::collect_tokens;
    use crate::token::Token;

    #[test]
    fn test_status_line_and_headers() {
        let lexer = lexer();
        let tokens =
            collect_tokens(&lexer, "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("HTTP/1.1 ", Category::Operator),
                Token::new("200", Category::Number),
                Token::new(" OK\r", Category::String),
                Token::new("\n", Category::Text),
                Token::new("Content-Type:", Category::Name),
                Token::new(" text/plain\r", Category::String),
                Token::new("\n", Category::Text),
            ]
        );
    }

    #[test]
    fn test_status_line_without_reason() {
        let lexer = lexer();
        let tokens = collect_tokens(&lexer, "HTTP/2 204\n").unwrap();
        assert_eq!(tokens[0], Token::new("HTTP/2 ", Category::Operator));
        assert_eq!(tokens[1], Token::new("204", Category::Number));
        assert_eq!(tokens[2], Token::new("\n", Category::Text));
    }

    #[test]
    fn test_request_line() {
        let lexer = lexer();
        let tokens = collect_tokens(&lexer, "GET /users?id=1 HTTP/1.1\nHost: example.com").unwrap();
        assert_eq!(tokens[0], Token::new("GET", Category::Keyword));
        assert_eq!(tokens[2], Token::new("/users?id=1", Category::NameNamespace));
        assert_eq!(tokens[4], Token::new("HTTP/1.1", Category::Operator));
        assert_eq!(tokens[6], Token::new("Host:", Category::Name));
    }

    #[test]
    fn test_value_with_colons_stays_one_token() {
        let lexer = lexer();
        let tokens = collect_tokens(&lexer, "Date: Mon, 01 Jan 2024 10:00:00 GMT").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("Date:", Category::Name),
                Token::new(" Mon, 01 Jan 2024 10:00:00 GMT", Category::String),
            ]
        );
    }

    #[test]
    fn test_empty_header_value() {
        let lexer = lexer();
        let tokens = collect_tokens(&lexer, "X-Empty:\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("X-Empty:", Category::Name),
                Token::new("\n", Category::Text),
            ]
        );
    }

    #[test]
    fn test_line_without_colon_is_rejected() {
        let lexer = lexer();
        let err = collect_tokens(&lexer, "Accept: */*\ngarbage line\n").unwrap_err();
        match err {
            PrettyError::UnrecognizedInput {
                grammar,
                offset,
                snippet,
            } => {
                assert_eq!(grammar, NAME);
                assert_eq!(offset, 12);
                assert_eq!(snippet, "garbage line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
