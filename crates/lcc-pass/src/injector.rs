//! Instrumentation injector.

use lcc_ir::{FuncId, IRBuilder, Module, Type};
use tracing::trace;

use crate::error::Result;
use crate::resolver::EntryPoint;
use crate::scanner::CallSiteRecord;

/// Insert a counting call in front of every recorded call site.
///
/// Each counting call passes a read-only string holding the target's name.
/// All calls go in with one pass over the function body, so the records'
/// handles stay valid throughout. Returns the number of calls inserted.
pub fn inject_counters(
    module: &mut Module,
    func: FuncId,
    entry: EntryPoint,
    records: &[CallSiteRecord],
) -> Result<usize> {
    // Strings go into the module before the function is borrowed.
    let names: Vec<_> = records
        .iter()
        .map(|r| IRBuilder::create_global_string_ptr(module, &r.name))
        .collect();

    let mut builder = IRBuilder::new();
    for (record, name) in records.iter().zip(names) {
        builder.set_insert_point(record.instr);
        builder.create_call(Type::Void, entry.func, vec![name])?;
    }
    let function = module.function_mut(func);
    let calls = builder.finish(function)?;
    for (record, call) in records.iter().zip(&calls) {
        trace!(
            function = %function.name,
            target = %record.name,
            instr = %call,
            "inserted counter call"
        );
    }
    Ok(calls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusion::NoInstrumentPrefix;
    use crate::resolver::{CompileTimeResolver, ResolveEntryPoint};
    use crate::scanner::scan_call_sites;
    use lcc_ir::{InstrKind, Value, parse_module};

    const SRC: &str = "\
declare i32 @puts(ptr)
declare void @exit(i32)

define void @main(ptr %s) {
entry:
  %a = call i32 @puts(ptr %s)
  %b = call i32 @puts(ptr %s)
  call void @exit(i32 0)
  unreachable
}
";

    fn instrument(m: &mut Module) -> usize {
        let main = m.get_function("main").unwrap();
        let entry = CompileTimeResolver.resolve(m).unwrap();
        let records = scan_call_sites(m, main, &NoInstrumentPrefix);
        inject_counters(m, main, entry, &records).unwrap()
    }

    #[test]
    fn test_counter_precedes_each_call() {
        let mut m = parse_module(SRC).unwrap();
        assert_eq!(instrument(&mut m), 3);

        let main = m.function(m.get_function("main").unwrap());
        let entry = m.get_function(crate::COUNT_LIBCALL_SYMBOL).unwrap();
        let instrs: Vec<_> = main.instructions().collect();
        assert_eq!(instrs.len(), 7);

        let expected = ["puts", "puts", "exit"];
        for (pair, name) in instrs.chunks(2).zip(expected) {
            let [counter, call] = pair else {
                panic!("expected counter/call pairs");
            };
            assert_eq!(counter.called_function(), Some(entry));
            let Value::Global(g) = &counter.args()[0].value else {
                panic!("counter argument must be a string constant");
            };
            assert_eq!(m.global(*g).bytes, name.as_bytes());
            assert_eq!(
                m.function(call.called_function().unwrap()).name,
                name
            );
        }
        assert!(matches!(&instrs[6].kind, InstrKind::Other { opcode, .. } if opcode == "unreachable"));
    }

    #[test]
    fn test_same_name_shares_one_string() {
        let mut m = parse_module(SRC).unwrap();
        instrument(&mut m);
        assert_eq!(m.globals().count(), 2);
    }

    #[test]
    fn test_original_instructions_are_untouched() {
        let original = parse_module(SRC).unwrap();
        let mut m = original.clone();
        instrument(&mut m);

        let entry = m.get_function(crate::COUNT_LIBCALL_SYMBOL).unwrap();
        let kept: Vec<_> = m
            .function(m.get_function("main").unwrap())
            .instructions()
            .filter(|i| i.called_function() != Some(entry))
            .cloned()
            .collect();
        let before: Vec<_> = original
            .function(original.get_function("main").unwrap())
            .instructions()
            .cloned()
            .collect();
        assert_eq!(kept, before);
    }

    #[test]
    fn test_no_records_no_change() {
        let mut m = parse_module(SRC).unwrap();
        let main = m.get_function("main").unwrap();
        let entry = CompileTimeResolver.resolve(&mut m).unwrap();
        let before = m.function(main).clone();
        assert_eq!(inject_counters(&mut m, main, entry, &[]).unwrap(), 0);
        assert_eq!(*m.function(main), before);
        assert_eq!(m.globals().count(), 0);
    }
}
