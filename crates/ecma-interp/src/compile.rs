//! The compile entry point.
//!
//! Parsing and static checks collect findings; this module turns each one
//! into a [`DiagnosticRecord`] and feeds it through the active reporter
//! chain in source order.

use bumpalo::Bump;

use ecma_core::{
    ContextFeatures, DiagnosticRecord, ErrorReporter, LanguageVersion, NativeException, Severity,
};
use ecma_parser::{Parser, Script};

use crate::checks::{self, Finding};

/// Language level and feature flags for one compilation unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub version: LanguageVersion,
    pub features: ContextFeatures,
}

/// Deliver an advisory diagnostic, honoring warnings-as-errors.
pub fn report_warning(
    reporter: &dyn ErrorReporter,
    features: ContextFeatures,
    record: &DiagnosticRecord,
) -> Result<(), NativeException> {
    if features.warnings_are_errors() {
        reporter.error(record)
    } else {
        reporter.warning(record);
        Ok(())
    }
}

/// Parse and check `source`, reporting every problem through `reporter`.
///
/// The first error the chain refuses to absorb aborts compilation with the
/// exception it raised. If the chain absorbs every error, compilation still
/// fails, with the exception `reporter.runtime_error` builds for
/// `"Compilation produced N syntax errors."` at the first error's location.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile<'ast>(
    source: &'ast str,
    source_uri: Option<&str>,
    options: CompileOptions,
    reporter: &dyn ErrorReporter,
    arena: &'ast Bump,
) -> Result<Script<'ast>, NativeException> {
    let (script, parse_errors) = Parser::parse_versioned(source, arena, options.version);

    let mut findings: Vec<Finding> = parse_errors
        .iter()
        .map(|error| Finding {
            severity: Severity::Error,
            span: error.span,
            message: error.message.clone(),
        })
        .collect();
    findings.extend(checks::check_script(&script, options.features));
    findings.sort_by_key(|f| (f.span.line, f.span.col));

    let mut error_count = 0usize;
    let mut first_error: Option<DiagnosticRecord> = None;

    for finding in findings {
        let record = DiagnosticRecord::at_span(finding.message, source_uri, source, finding.span);
        let is_error =
            finding.severity == Severity::Error || options.features.warnings_are_errors();
        if !is_error {
            reporter.warning(&record);
            continue;
        }

        reporter.error(&record)?;
        error_count += 1;
        first_error.get_or_insert(record);
    }

    match first_error {
        Some(first) => {
            log::debug!("{} errors absorbed by the reporter chain", error_count);
            let message = format!("Compilation produced {} syntax errors.", error_count);
            Err(reporter.runtime_error(&first.with_message(message)))
        }
        None => Ok(script),
    }
}
