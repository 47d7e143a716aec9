//! End-to-end tests for the instrumentation driver.

use std::io::Write;

use lcc::{
    COUNT_LIBCALL_SYMBOL, DEFAULT_PASSES, Error, InstrumentConfig, Module, Pipeline,
    instrument_source, load_module, parse_module,
};
use lcc_ir::Value;
use lcc_pass::PassError;

const PROGRAM: &str = r#"; ModuleID = 'program'

@.str = private constant c"n=%d\0A\00"

declare i32 @printf(ptr, ...) nounwind

declare ptr @malloc(i64)

declare void @free(ptr)

declare void @llvm.memset(ptr, i8, i64)

define internal ptr @alloc_zeroed(i64 %n) {
entry:
  %p = call ptr @malloc(i64 %n)
  call void @llvm.memset(ptr %p, i8 0, i64 %n)
  ret ptr %p
}

define i32 @main(i32 %argc, ptr %argv) {
entry:
  %p = call ptr @alloc_zeroed(i64 16)
  %r = call i32 @printf(ptr @.str, i32 %argc)
  call void @free(ptr %p)
  ret i32 0
}
"#;

const RUNTIME: &str = r#"
declare i64 @fwrite(ptr, i64, i64, ptr)

define void @__noinstrument_count_libcall(ptr %name) nounwind {
entry:
  %n = call i64 @fwrite(ptr %name, i64 1, i64 1, ptr null)
  ret void
}
"#;

/// Names passed to the counter in `func`, in program order.
fn counted_names(m: &Module, func: &str) -> Vec<String> {
    let Some(entry) = m.get_function(COUNT_LIBCALL_SYMBOL) else {
        return Vec::new();
    };
    m.function(m.get_function(func).unwrap())
        .instructions()
        .filter(|i| i.called_function() == Some(entry))
        .map(|i| match &i.args()[0].value {
            Value::Global(g) => String::from_utf8(m.global(*g).bytes.clone()).unwrap(),
            other => panic!("unexpected counter argument {other:?}"),
        })
        .collect()
}

#[test]
fn test_compile_time_instruments_external_calls() {
    let config = InstrumentConfig::new(Pipeline::CompileTime);
    let (text, outcome) = instrument_source(PROGRAM, &config, DEFAULT_PASSES).unwrap();
    assert!(outcome.modified);
    assert_eq!(outcome.statistics[0].value, 3);

    let m = parse_module(&text).unwrap();
    assert_eq!(counted_names(&m, "main"), ["printf", "free"]);
    // Intrinsics and defined functions are never counted.
    assert_eq!(counted_names(&m, "alloc_zeroed"), ["malloc"]);

    let entry = m.function(m.get_function(COUNT_LIBCALL_SYMBOL).unwrap());
    assert!(entry.is_declaration());
    assert_eq!(entry.ty.to_string(), "void (ptr)");
}

#[test]
fn test_counter_immediately_precedes_call() {
    let config = InstrumentConfig::new(Pipeline::CompileTime);
    let (text, _) = instrument_source(PROGRAM, &config, DEFAULT_PASSES).unwrap();
    let m = parse_module(&text).unwrap();
    let entry = m.get_function(COUNT_LIBCALL_SYMBOL).unwrap();
    let free = m.get_function("free").unwrap();

    let instrs: Vec<_> = m
        .function(m.get_function("main").unwrap())
        .instructions()
        .collect();
    let pos = instrs
        .iter()
        .position(|i| i.called_function() == Some(free))
        .unwrap();
    assert_eq!(instrs[pos - 1].called_function(), Some(entry));
}

#[test]
fn test_output_reparses_to_same_text() {
    let config = InstrumentConfig::new(Pipeline::CompileTime);
    let (text, _) = instrument_source(PROGRAM, &config, DEFAULT_PASSES).unwrap();
    assert_eq!(parse_module(&text).unwrap().to_string(), text);
}

#[test]
fn test_link_time_requires_runtime() {
    let config = InstrumentConfig::new(Pipeline::LinkTime);
    let err = instrument_source(PROGRAM, &config, DEFAULT_PASSES).unwrap_err();
    assert!(matches!(
        err,
        Error::Pass(PassError::EntryPointMissing(ref name)) if name == COUNT_LIBCALL_SYMBOL
    ));
}

#[test]
fn test_link_time_with_runtime_merged() {
    let source = format!("{PROGRAM}{RUNTIME}");
    let config = InstrumentConfig::new(Pipeline::LinkTime);
    let (text, outcome) = instrument_source(&source, &config, DEFAULT_PASSES).unwrap();
    assert_eq!(outcome.statistics[0].value, 3);

    let m = parse_module(&text).unwrap();
    assert_eq!(counted_names(&m, "main"), ["printf", "free"]);
    assert!(counted_names(&m, COUNT_LIBCALL_SYMBOL).is_empty());
}

#[test]
fn test_exclusions_from_config() {
    let config = InstrumentConfig::new(Pipeline::CompileTime).with_exclude(["printf", "malloc"]);
    let (text, outcome) = instrument_source(PROGRAM, &config, DEFAULT_PASSES).unwrap();
    assert_eq!(outcome.statistics[0].value, 1);
    let m = parse_module(&text).unwrap();
    assert_eq!(counted_names(&m, "main"), ["free"]);
    assert!(counted_names(&m, "alloc_zeroed").is_empty());
}

#[test]
fn test_dump_ir_alone_leaves_module_unchanged() {
    let config = InstrumentConfig::default();
    let (text, outcome) = instrument_source(PROGRAM, &config, &["dump-ir"]).unwrap();
    assert!(!outcome.modified);
    assert_eq!(text, PROGRAM);
}

#[test]
fn test_load_module_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PROGRAM.as_bytes()).unwrap();
    let m = load_module(file.path()).unwrap();
    assert_eq!(m.name, "program");
    assert!(m.get_function("main").is_some());
}

#[test]
fn test_load_module_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"define void @f( {\n").unwrap();
    assert!(matches!(load_module(file.path()), Err(Error::Ir(_))));
}

#[test]
fn test_tail_calls_are_counted() {
    let src = "\
declare i32 @puts(ptr)

define i32 @main(ptr %p) {
entry:
  %r = tail call i32 @puts(ptr %p)
  ret i32 %r
}
";
    let config = InstrumentConfig::new(Pipeline::CompileTime);
    let (text, outcome) = instrument_source(src, &config, DEFAULT_PASSES).unwrap();
    assert_eq!(outcome.statistics[0].value, 1);
    assert!(text.contains(
        "  call void @__noinstrument_count_libcall(ptr @.str)\n  %r = tail call i32 @puts(ptr %p)\n"
    ));
    assert_eq!(counted_names(&parse_module(&text).unwrap(), "main"), ["puts"]);
}

#[test]
fn test_runtime_exports_the_instrumented_symbol() {
    assert_eq!(lcc_rt::ENTRY_SYMBOL, COUNT_LIBCALL_SYMBOL);
}
