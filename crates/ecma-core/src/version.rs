//! Selectable guest language levels.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A guest language level.
///
/// The discriminant is the conventional version number times one hundred, so
/// a harness can select a version from a number such as `170`.
///
/// ```
/// use ecma_core::LanguageVersion;
///
/// let version = LanguageVersion::try_from(170u16).unwrap();
/// assert_eq!(version, LanguageVersion::V1_7);
/// assert!(version.supports_block_scope());
/// assert!(!version.supports_arrow_functions());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u16)]
pub enum LanguageVersion {
    V1_0 = 100,
    V1_1 = 110,
    V1_2 = 120,
    V1_3 = 130,
    V1_4 = 140,
    V1_5 = 150,
    V1_6 = 160,
    V1_7 = 170,
    #[default]
    V1_8 = 180,
    /// The "harmony" level.
    Es6 = 200,
}

impl LanguageVersion {
    /// Every selectable version, oldest first.
    pub const ALL: [LanguageVersion; 10] = [
        LanguageVersion::V1_0,
        LanguageVersion::V1_1,
        LanguageVersion::V1_2,
        LanguageVersion::V1_3,
        LanguageVersion::V1_4,
        LanguageVersion::V1_5,
        LanguageVersion::V1_6,
        LanguageVersion::V1_7,
        LanguageVersion::V1_8,
        LanguageVersion::Es6,
    ];

    /// `let` and `const` declarations.
    pub fn supports_block_scope(self) -> bool {
        self >= LanguageVersion::V1_7
    }

    /// `(a) => a` function syntax.
    pub fn supports_arrow_functions(self) -> bool {
        self >= LanguageVersion::V1_8
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageVersion::Es6 => f.write_str("ES6"),
            other => {
                let raw = u16::from(*other);
                write!(f, "{}.{}", raw / 100, (raw % 100) / 10)
            }
        }
    }
}
