//! Compilation and execution of guest scripts.
//!
//! ## Modules
//!
//! - [`compile`]: the compile entry point that feeds parse errors and static
//!   check findings through the reporter chain
//! - [`checks`]: static checks (redeclarations, statements without effect)
//! - [`interp`]: the tree-walking interpreter, builtins and `eval`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bumpalo::Bump;
//! use ecma_core::{DefaultReporter, InterruptHandle};
//! use ecma_interp::{InterpOptions, Interpreter};
//!
//! let arena = Bump::new();
//! let mut interp = Interpreter::new(
//!     &arena,
//!     InterpOptions::default(),
//!     Arc::new(DefaultReporter::new()),
//!     InterruptHandle::new(),
//! );
//! let source = "function sq(x) { return x * x; } sq(6);";
//! let value = interp.run_script(source, Some("sq.js")).unwrap();
//! assert_eq!(value.to_number(), 36.0);
//! ```

pub mod checks;
pub mod compile;
pub mod interp;

pub use checks::{Finding, check_script};
pub use compile::{CompileOptions, compile, report_warning};
pub use interp::{
    Builtin, Completion, DEFAULT_MAX_CALL_DEPTH, INTERRUPTED, InterpOptions, Interpreter,
    SourceUnit, eval_source_name,
};
