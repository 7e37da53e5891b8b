//! Colorized, pretty-printed HTTP headers and bodies for the terminal
//!
//! ```no_run
//! use httpretty::PrettyPrinter;
//!
//! let printer = PrettyPrinter::new("default")?;
//! print!("{}", printer.headers("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n")?);
//! println!("{}", printer.body(r#"{"b":1,"a":2}"#, "application/json")?);
//! # Ok::<(), httpretty::PrettyError>(())
//! ```

pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod lexer;
pub mod pretty;
pub mod request;
pub mod style;
pub mod token;
pub mod tui;

pub use backend::{Backend, ColorSupport, Renderer};
pub use error::PrettyError;
pub use pretty::PrettyPrinter;
pub use style::{StyleRegistry, Theme, DEFAULT_STYLE, NO_STYLE};
pub use token::{Category, Token};
