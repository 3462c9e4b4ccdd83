//! End-to-end tests: fixtures under `test_scripts/` run through [`Engine`].


use std::sync::Arc;
use std::time::Duration;

use ecma::prelude::*;
use ecma::{DefaultReporter, ErrorCategory};
use test_harness::TestHarness;

// ============================================================================
// Reporter chain
// ============================================================================

#[test]
fn warning_without_upstream_is_ignored() {
    let reporter = DefaultReporter::new();
    reporter.warning(&DiagnosticRecord::new("w", Some("a.js"), 1, Some("x"), 0));

    let config = EngineConfig::new().with_features(ContextFeatures::STRICT_WARNINGS);
    let harness = TestHarness::new().with_config(config);
    assert_eq!(harness.run("warnings.js").unwrap().to_number(), 1.0);
}

#[test]
fn error_without_upstream_throws_generic_with_same_fields() {
    let record = DiagnosticRecord::new("m", Some("u"), 3, Some("t"), 1);
    let exception = DefaultReporter::new().error(&record).unwrap_err();
    assert_eq!(exception.kind(), NativeErrorKind::Error);
    assert_eq!(exception.message(), "m");
    assert_eq!(exception.source_uri(), Some("u"));
    assert_eq!(exception.line(), 3);
    assert_eq!(exception.line_text(), Some("t"));
    assert_eq!(exception.line_offset(), 1);
}

#[test]
fn host_reporter_absorbs_compile_errors_then_compilation_fails() {
    let collector = Arc::new(CollectingReporter::new());
    let harness = TestHarness::new().with_reporter(collector.clone());

    let error = harness.eval("var = 1;\nvar ok = 2;\nvar = 3;", "broken.js").unwrap_err();
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind(), NativeErrorKind::Error);
    assert_eq!(exception.message(), "Compilation produced 2 syntax errors.");
    assert_eq!(exception.line(), 1);

    let diagnostics = collector.take();
    let lines: Vec<u32> = diagnostics.errors().map(|d| d.record.line()).collect();
    assert_eq!(lines, [1, 3]);
    assert!(diagnostics.iter().all(|d| d.record.source_uri() == Some("broken.js")));
}

#[test]
fn eval_errors_bypass_host_reporter() {
    let collector = Arc::new(CollectingReporter::new());
    let harness = TestHarness::new().with_reporter(collector.clone());

    let value = harness
        .eval("try { eval('var = 1;'); } catch (e) { e.name; }", "main.js")
        .unwrap();
    assert_eq!(value.to_js_string().as_ref(), "SyntaxError");
    assert!(collector.diagnostics().is_empty());
}

#[test]
fn warnings_reach_host_in_source_order() {
    let collector = Arc::new(CollectingReporter::new());
    let features = ContextFeatures::STRICT_WARNINGS | ContextFeatures::UNDEFINED_PROPERTY_WARNINGS;
    let harness = TestHarness::new()
        .with_config(EngineConfig::new().with_features(features))
        .with_reporter(collector.clone());

    assert_eq!(harness.run("warnings.js").unwrap().to_number(), 1.0);

    let diagnostics = collector.take();
    assert!(!diagnostics.has_errors());
    let messages: Vec<String> = diagnostics
        .warnings()
        .map(|d| d.record.message().to_string())
        .collect();
    assert_eq!(
        messages,
        ["Code has no side effects", "reference to undefined property \"missing\""]
    );
}

#[test]
fn warnings_as_errors_fail_compilation() {
    let collector = Arc::new(CollectingReporter::new());
    let features = ContextFeatures::STRICT_WARNINGS | ContextFeatures::WARNINGS_AS_ERRORS;
    let harness = TestHarness::new()
        .with_config(EngineConfig::new().with_features(features))
        .with_reporter(collector.clone());

    let exception = harness.expect_uncaught("warnings.js");
    assert_eq!(exception.message(), "Compilation produced 1 syntax errors.");
    assert_eq!(exception.line(), 2);
    assert_eq!(collector.diagnostics().error_count(), 1);
}

#[test]
fn logging_reporter_can_be_installed() {
    let harness = TestHarness::new().with_reporter(Arc::new(LoggingReporter::new()));
    let error = harness.eval("var = 1;", "logged.js").unwrap_err();
    assert_eq!(error.exception().unwrap().message(), "Compilation produced 1 syntax errors.");
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn eval_error_classification() {
    TestHarness::new().assert_success("eval_errors.js");
}

#[test]
fn classification_is_identical_across_versions() {
    for version in [LanguageVersion::V1_7, LanguageVersion::V1_8, LanguageVersion::Es6] {
        TestHarness::new().with_version(version).assert_success("eval_errors.js");
    }
}

#[test]
fn syntax_error_spelled_like_type_error_is_a_type_error() {
    let outer: Arc<dyn ErrorReporter> = Arc::new(DefaultReporter::new());
    let reporter = DefaultReporter::for_eval(outer).unwrap();
    let uri = Some("main.js#1(eval)");
    let record = DiagnosticRecord::new("TypeError: is not valid here", uri, 1, None, 0);

    let exception = reporter.error(&record).unwrap_err();
    assert_eq!(exception.kind(), NativeErrorKind::TypeError);
    assert_eq!(exception.message(), "is not valid here");
    assert_eq!(exception.source_uri(), Some("main.js#1(eval)"));
}

#[test]
fn uncaught_eval_syntax_error_carries_eval_location() {
    let exception = TestHarness::new().expect_uncaught("eval_uncaught.js");
    assert_eq!(exception.kind(), NativeErrorKind::SyntaxError);
    assert_eq!(exception.category(), ErrorCategory::CompileError);
    assert_eq!(exception.source_uri(), Some("eval_uncaught.js#3(eval)"));
    assert_eq!(exception.line(), 1);
    assert_eq!(exception.line_text(), Some("function("));
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn try_finally_completion_rules() {
    for version in LanguageVersion::ALL {
        TestHarness::new().with_version(version).assert_success("try_finally.js");
    }
}

#[test]
fn native_error_kinds() {
    TestHarness::new().assert_success("native_errors.js");
}

#[test]
fn stack_exhaustion_is_range_error() {
    TestHarness::new()
        .with_config(EngineConfig::new().with_max_call_depth(24))
        .assert_success("recursion.js");
}

#[test]
fn stack_exhaustion_at_default_depth_on_a_default_thread() {
    std::thread::spawn(|| TestHarness::new().assert_success("recursion.js"))
        .join()
        .unwrap();
}

#[test]
fn deeply_nested_eval_is_catchable_syntax_error() {
    let parens = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
    let source = format!("var c; try {{ eval('{}'); }} catch (e) {{ c = e.name; }} c;", parens);
    let value = TestHarness::new().eval(&source, "nested.js").unwrap();
    assert_eq!(value.to_js_string().as_ref(), "SyntaxError");
}

#[test]
fn deeply_nested_script_fails_compilation() {
    let source = format!("{}1{};", "(".repeat(50_000), ")".repeat(50_000));
    let collector = Arc::new(CollectingReporter::new());
    let harness = TestHarness::new().with_reporter(collector.clone());
    let error = harness.eval(&source, "nested.js").unwrap_err();
    assert_eq!(error.exception().unwrap().message(), "Compilation produced 1 syntax errors.");
    let diagnostics = collector.take();
    let messages: Vec<String> = diagnostics
        .errors()
        .map(|d| d.record.message().to_string())
        .collect();
    assert_eq!(messages, ["too deep recursion while parsing"]);
}

#[test]
fn escalated_warning_has_same_kind_inside_eval() {
    let features = ContextFeatures::STRICT_WARNINGS
        | ContextFeatures::UNDEFINED_PROPERTY_WARNINGS
        | ContextFeatures::WARNINGS_AS_ERRORS;
    let harness = TestHarness::new().with_config(EngineConfig::new().with_features(features));
    let caught = |read: &str| {
        let source = format!(
            "var o = {{}}; var r;
             try {{ {} }} catch (e) {{ r = e.name + '|' + e.message; }}
             r;",
            read
        );
        harness.eval(&source, "kinds.js").unwrap().to_js_string().to_string()
    };

    let expected = "Error|reference to undefined property \"missing\"";
    assert_eq!(caught("o.missing;"), expected);
    assert_eq!(caught("eval('o.missing;');"), expected);
}

#[test]
fn rethrow_keeps_original_location() {
    let exception = TestHarness::new().expect_uncaught("rethrow.js");
    assert_eq!(exception.kind(), NativeErrorKind::TypeError);
    assert_eq!(exception.message(), "original");
    assert_eq!(exception.source_uri(), Some("rethrow.js"));
    assert_eq!(exception.line(), 2);
    assert_eq!(exception.line_text().map(str::trim), Some("throw new TypeError(\"original\");"));
}

#[test]
fn uncaught_user_value_surfaces_as_error() {
    let error = TestHarness::new().eval("\nthrow 'plain';", "user.js").unwrap_err();
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind(), NativeErrorKind::Error);
    assert_eq!(exception.category(), ErrorCategory::UserThrow);
    assert_eq!(exception.to_string(), "plain");
    assert_eq!(exception.line(), 2);
    assert_eq!(exception.payload().to_js_string().as_ref(), "plain");
}

#[test]
fn interrupt_from_another_thread_is_uncatchable() {
    let engine = TestHarness::new().engine();
    let handle = engine.interrupt_handle();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        handle.interrupt();
    });

    let error = engine
        .evaluate(
            "var caught = false; try { while (true) {} } catch (e) { caught = true; } caught;",
            Some("spin.js"),
        )
        .unwrap_err();
    canceller.join().unwrap();

    let exception = error.exception().unwrap();
    assert_eq!(exception.kind(), NativeErrorKind::InternalError);
    assert!(!exception.is_catchable());
    assert_eq!(exception.message(), "Script execution was interrupted");
}

// ============================================================================
// Language versions
// ============================================================================

#[test]
fn arrow_functions_from_1_8() {
    TestHarness::new().with_version(LanguageVersion::V1_8).assert_success("arrow_functions.js");
    TestHarness::new().with_version(LanguageVersion::Es6).assert_success("arrow_functions.js");

    let exception = TestHarness::new()
        .with_version(LanguageVersion::V1_7)
        .expect_uncaught("arrow_functions.js");
    assert_eq!(exception.kind(), NativeErrorKind::Error);
    assert_eq!(exception.line(), 3);
}

#[test]
fn block_scope_from_1_7() {
    TestHarness::new().with_version(LanguageVersion::V1_7).assert_success("block_scope.js");

    let exception = TestHarness::new()
        .with_version(LanguageVersion::V1_6)
        .expect_uncaught("block_scope.js");
    assert_eq!(exception.kind(), NativeErrorKind::Error);
    assert_eq!(exception.message(), "syntax error");
    assert_eq!(exception.line(), 3);
}
