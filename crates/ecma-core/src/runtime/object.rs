//! Heap objects shared between guest values.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::environment::EnvRef;
use super::value::Value;
use crate::diagnostic::DiagnosticRecord;
use crate::error_kind::NativeErrorKind;

/// Index of a script function in the interpreter's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// Index of a host builtin in the interpreter's builtin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuiltinId(pub u16);

/// What happens when a function object is called.
#[derive(Clone)]
pub enum Callable {
    /// A guest function closing over its defining environment.
    Script {
        id: FunctionId,
        env: EnvRef,
        arrow: bool,
    },
    /// A host builtin.
    Builtin(BuiltinId),
    /// One of the native error constructors.
    ErrorConstructor(NativeErrorKind),
}

impl Callable {
    /// Whether `new` may be applied.
    pub fn is_constructor(&self) -> bool {
        match self {
            Callable::Script { arrow, .. } => !arrow,
            Callable::Builtin(_) => false,
            Callable::ErrorConstructor(_) => true,
        }
    }
}

#[derive(Clone)]
pub struct FunctionData {
    pub name: Rc<str>,
    pub callable: Callable,
}

/// Native error state attached to an error object.
#[derive(Debug, Clone)]
pub struct ErrorData {
    pub kind: NativeErrorKind,
    /// Where the error was created, reused when the object is thrown.
    pub origin: Option<DiagnosticRecord>,
}

#[derive(Clone)]
pub enum ObjectKind {
    Ordinary,
    Error(ErrorData),
    Function(FunctionData),
}

pub struct JsObject {
    pub kind: ObjectKind,
    pub properties: FxHashMap<Rc<str>, Value>,
    /// The function that built this object with `new`, for `instanceof`.
    pub constructed_by: Option<ObjectRef>,
}

/// Shared, mutable handle to a [`JsObject`].
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<JsObject>>);

impl ObjectRef {
    fn from_parts(kind: ObjectKind) -> Self {
        Self(Rc::new(RefCell::new(JsObject {
            kind,
            properties: FxHashMap::default(),
            constructed_by: None,
        })))
    }

    /// A fresh object with no properties.
    pub fn new_ordinary() -> Self {
        Self::from_parts(ObjectKind::Ordinary)
    }

    /// A function object.
    pub fn new_function(name: &str, callable: Callable) -> Self {
        let obj = Self::from_parts(ObjectKind::Function(FunctionData {
            name: Rc::from(name),
            callable,
        }));
        obj.set("name", Value::string(name));
        obj
    }

    /// A native error object of `kind` describing `record`.
    ///
    /// The object exposes `name`, `message`, `fileName`, `lineNumber` and
    /// `columnNumber`, and remembers `record` as its origin.
    pub fn new_error(kind: NativeErrorKind, record: &DiagnosticRecord) -> Self {
        let obj = Self::from_parts(ObjectKind::Error(ErrorData {
            kind,
            origin: Some(record.clone()),
        }));
        obj.set("name", Value::string(kind.name()));
        obj.set("message", Value::string(record.message()));
        obj.set(
            "fileName",
            Value::string(record.source_uri().unwrap_or_default()),
        );
        obj.set("lineNumber", Value::Number(f64::from(record.line())));
        obj.set(
            "columnNumber",
            Value::Number(f64::from(record.line_offset())),
        );
        obj
    }

    pub fn borrow(&self) -> Ref<'_, JsObject> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, JsObject> {
        self.0.borrow_mut()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Own property lookup; `None` when absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().properties.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.0.borrow_mut().properties.insert(Rc::from(key), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Function(_))
    }

    /// The call target of a function object.
    pub fn callable(&self) -> Option<Callable> {
        match &self.0.borrow().kind {
            ObjectKind::Function(data) => Some(data.callable.clone()),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<NativeErrorKind> {
        match &self.0.borrow().kind {
            ObjectKind::Error(data) => Some(data.kind),
            _ => None,
        }
    }

    /// The record captured when this error object was created.
    pub fn error_origin(&self) -> Option<DiagnosticRecord> {
        match &self.0.borrow().kind {
            ObjectKind::Error(data) => data.origin.clone(),
            _ => None,
        }
    }

    pub fn set_constructed_by(&self, ctor: &ObjectRef) {
        self.0.borrow_mut().constructed_by = Some(ctor.clone());
    }

    /// Whether `ctor` built this object with `new`.
    pub fn was_constructed_by(&self, ctor: &ObjectRef) -> bool {
        self.0
            .borrow()
            .constructed_by
            .as_ref()
            .is_some_and(|c| c.ptr_eq(ctor))
    }

    /// String conversion of the object.
    ///
    /// Error objects read their current `name` and `message` properties, so a
    /// guest that overwrites `message` sees the new text.
    pub fn to_display_string(&self) -> String {
        let obj = self.0.borrow();
        match &obj.kind {
            ObjectKind::Error(data) => {
                let name = obj
                    .properties
                    .get("name")
                    .map_or_else(|| Rc::from(data.kind.name()), Value::to_js_string);
                let message = obj
                    .properties
                    .get("message")
                    .map_or_else(|| Rc::from(""), Value::to_js_string);
                if message.is_empty() {
                    name.to_string()
                } else {
                    format!("{}: {}", name, message)
                }
            }
            ObjectKind::Function(data) => format!("function {}() {{ [code] }}", data.name),
            ObjectKind::Ordinary => "[object Object]".to_string(),
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obj = self.0.borrow();
        match &obj.kind {
            ObjectKind::Ordinary => write!(f, "Ordinary({} props)", obj.properties.len()),
            ObjectKind::Error(data) => write!(f, "{}", data.kind),
            ObjectKind::Function(data) => write!(f, "Function({})", data.name),
        }
    }
}
