//! mica_scanner: Lexer for mica source code.
//!
//! Produces one token at a time from source text, skipping whitespace and
//! recording scan-time diagnostics (bad characters, malformed literals).

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{TokenInfo, TokenValue};
