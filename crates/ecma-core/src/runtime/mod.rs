//! Guest value model used by the interpreter and carried inside exceptions.

mod environment;
mod object;
mod value;

pub use environment::{AssignError, EnvRef, Environment, Mutability, ScopeKind};
pub use object::{
    BuiltinId, Callable, ErrorData, FunctionData, FunctionId, JsObject, ObjectKind, ObjectRef,
};
pub use value::{Value, number_to_string};
