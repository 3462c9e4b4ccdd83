//! Lexer and parser for the ecma engine.
//!
//! This crate turns guest source text into an arena-allocated syntax tree.
//! It includes:
//! - Lexical analysis with line-terminator tracking for semicolon insertion
//! - Abstract Syntax Tree (AST) definitions
//! - A recovering parser that reports every error with its position
//!
//! # Example
//!
//! ```
//! use ecma_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     function area(w, h) {
//!         return w * h;
//!     }
//!     var sizes = { small: area(1, 2) };
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(script) => println!("Parsed successfully: {} statements", script.stmts().len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

pub mod lexer;

pub mod ast;

pub use ast::{Parser, Script};
pub use ecma_core::Span;
pub use lexer::{Lexer, Token, TokenKind};
