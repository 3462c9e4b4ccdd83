//! The native error taxonomy visible to guest code.

use std::fmt;

/// Kind of a native exception.
///
/// Each variant corresponds to a global error constructor in the guest
/// environment. `InternalError` is reserved for host-injected faults such as
/// cancellation and is never produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
    InternalError,
}

impl NativeErrorKind {
    /// Every kind that has a guest-visible constructor.
    pub const CONSTRUCTIBLE: [NativeErrorKind; 7] = [
        NativeErrorKind::Error,
        NativeErrorKind::EvalError,
        NativeErrorKind::RangeError,
        NativeErrorKind::ReferenceError,
        NativeErrorKind::SyntaxError,
        NativeErrorKind::TypeError,
        NativeErrorKind::URIError,
    ];

    /// The constructor name, which is also the `name` property of instances.
    pub fn name(self) -> &'static str {
        match self {
            NativeErrorKind::Error => "Error",
            NativeErrorKind::EvalError => "EvalError",
            NativeErrorKind::RangeError => "RangeError",
            NativeErrorKind::ReferenceError => "ReferenceError",
            NativeErrorKind::SyntaxError => "SyntaxError",
            NativeErrorKind::TypeError => "TypeError",
            NativeErrorKind::URIError => "URIError",
            NativeErrorKind::InternalError => "InternalError",
        }
    }

    /// Look up a kind by constructor name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Error" => Some(NativeErrorKind::Error),
            "EvalError" => Some(NativeErrorKind::EvalError),
            "RangeError" => Some(NativeErrorKind::RangeError),
            "ReferenceError" => Some(NativeErrorKind::ReferenceError),
            "SyntaxError" => Some(NativeErrorKind::SyntaxError),
            "TypeError" => Some(NativeErrorKind::TypeError),
            "URIError" => Some(NativeErrorKind::URIError),
            "InternalError" => Some(NativeErrorKind::InternalError),
            _ => None,
        }
    }

    /// Whether an instance of `self` passes `instanceof` against the
    /// constructor for `ctor`.
    ///
    /// Every native error is an `Error`; the other kinds only match themselves.
    pub fn is_instance_of(self, ctor: NativeErrorKind) -> bool {
        ctor == NativeErrorKind::Error || self == ctor
    }
}

impl fmt::Display for NativeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
