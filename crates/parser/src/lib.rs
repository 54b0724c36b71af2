//! Go source parser for package-level declarations (Logos lexer + recursive descent).
//!
//! - Lexer uses Logos and implements Go semicolon insertion. Comments are kept as tokens.
//! - Parser builds an arena AST of imports, constants, variables, types and functions,
//!   with doc comments attached; function bodies are skipped.
//! - `render` turns type expressions back into canonical Go text.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;
pub mod render;

// Re-exports for convenience
pub use ast::ParsedFile;
pub use error::{Diag, ParseFailure};
pub use lexer::Lexer;
pub use parser::{parse_file, MAX_NESTING};
pub use render::render_type;
