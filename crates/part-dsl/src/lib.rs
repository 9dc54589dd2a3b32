//! Two-statement program grammar and the sandboxed executor that runs it.
//!
//! A normalized program is `shape = <helper>(<constant args>)` followed by
//! `Part.show(shape)`. The executor resolves the helper through the
//! primitive registry and nothing else.

pub mod ast;
pub mod error;
pub mod executor;
mod lexer;
pub mod parser;

pub use ast::{Argument, Call, DISPLAY_HOOK, Expr, NormalizedProgram, RESULT_VARIABLE};
pub use error::DslError;
pub use executor::{Execution, ExecutionError, Executor, Namespace, evaluate};
pub use parser::{parse_call, parse_program};
