use bitflags::bitflags;

bitflags! {
    /// Optional compile and runtime behaviors of an evaluation context.
    ///
    /// ```
    /// use ecma_core::ContextFeatures;
    ///
    /// let features = ContextFeatures::STRICT_WARNINGS | ContextFeatures::WARNINGS_AS_ERRORS;
    /// assert!(features.warnings_are_errors());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContextFeatures: u32 {
        /// Report suspicious but legal code, such as statements with no effect.
        const STRICT_WARNINGS = 1 << 0;
        /// Deliver every warning through the error channel instead.
        const WARNINGS_AS_ERRORS = 1 << 1;
        /// Warn on reads of missing properties. Only honored together with
        /// `STRICT_WARNINGS`.
        const UNDEFINED_PROPERTY_WARNINGS = 1 << 2;
    }
}

impl ContextFeatures {
    pub fn strict_warnings(self) -> bool {
        self.contains(ContextFeatures::STRICT_WARNINGS)
    }

    pub fn warnings_are_errors(self) -> bool {
        self.contains(ContextFeatures::WARNINGS_AS_ERRORS)
    }

    /// Whether missing property reads produce a warning.
    pub fn undefined_property_warnings(self) -> bool {
        self.contains(
            ContextFeatures::STRICT_WARNINGS | ContextFeatures::UNDEFINED_PROPERTY_WARNINGS,
        )
    }
}
