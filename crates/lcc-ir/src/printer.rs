//! Textual IR output.

use std::fmt::{self, Write};

use crate::function::{Function, Linkage};
use crate::instr::{Callee, InstrKind, Instruction};
use crate::module::Module;
use crate::value::{Operand, Value};

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;

        let mut globals = self.globals().peekable();
        if globals.peek().is_some() {
            writeln!(f)?;
        }
        for (_, global) in globals {
            writeln!(
                f,
                "@{} = private constant c\"{}\\00\"",
                global.name,
                escape_bytes(&global.bytes)
            )?;
        }

        for (_, function) in self.functions() {
            writeln!(f)?;
            write_function(f, self, function)?;
        }
        Ok(())
    }
}

/// Escape string constant contents using `\XX` for anything unprintable.
pub(crate) fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "\\{b:02X}");
        }
    }
    out
}

fn write_function(f: &mut fmt::Formatter<'_>, module: &Module, function: &Function) -> fmt::Result {
    let keyword = if function.is_declaration() {
        "declare"
    } else {
        "define"
    };
    f.write_str(keyword)?;
    if function.linkage == Linkage::Internal {
        f.write_str(" internal")?;
    }
    write!(f, " {} @{}(", function.ty.ret, function.name)?;

    let named = !function.is_declaration() && function.params.len() == function.ty.params.len();
    for (i, ty) in function.ty.params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if named {
            write!(f, "{ty} %{}", function.params[i])?;
        } else {
            write!(f, "{ty}")?;
        }
    }
    if function.ty.variadic {
        f.write_str(if function.ty.params.is_empty() {
            "..."
        } else {
            ", ..."
        })?;
    }
    f.write_str(")")?;
    if function.attrs.nounwind {
        f.write_str(" nounwind")?;
    }

    if function.is_declaration() {
        return writeln!(f);
    }

    writeln!(f, " {{")?;
    for block in function.blocks() {
        writeln!(f, "{}:", block.label)?;
        for instr in block.instructions() {
            f.write_str("  ")?;
            write_instruction(f, module, instr)?;
            writeln!(f)?;
        }
    }
    writeln!(f, "}}")
}

fn write_instruction(f: &mut fmt::Formatter<'_>, module: &Module, instr: &Instruction) -> fmt::Result {
    if let Some(result) = &instr.result {
        write!(f, "%{result} = ")?;
    }
    match &instr.kind {
        InstrKind::Call {
            tail,
            ret,
            callee,
            args,
        } => {
            if let Some(tail) = tail {
                write!(f, "{} ", tail.keyword())?;
            }
            write!(f, "call {ret} ")?;
            write_call_tail(f, module, callee, args)
        }
        InstrKind::Invoke {
            ret,
            callee,
            args,
            normal,
            unwind,
        } => {
            write!(f, "invoke {ret} ")?;
            write_call_tail(f, module, callee, args)?;
            write!(f, " to label %{normal} unwind label %{unwind}")
        }
        InstrKind::Other { opcode, operands } => {
            f.write_str(opcode)?;
            if !operands.is_empty() {
                write!(f, " {operands}")?;
            }
            Ok(())
        }
    }
}

fn write_call_tail(
    f: &mut fmt::Formatter<'_>,
    module: &Module,
    callee: &Callee,
    args: &[Operand],
) -> fmt::Result {
    match callee {
        Callee::Direct(id) => write!(f, "@{}", module.function(*id).name)?,
        Callee::Indirect(value) => write_value(f, module, value)?,
    }
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} ", arg.ty)?;
        write_value(f, module, &arg.value)?;
    }
    f.write_str(")")
}

fn write_value(f: &mut fmt::Formatter<'_>, module: &Module, value: &Value) -> fmt::Result {
    match value {
        Value::Local(name) => write!(f, "%{name}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Null => f.write_str("null"),
        Value::Global(id) => write!(f, "@{}", module.global(*id).name),
        Value::Func(id) => write!(f, "@{}", module.function(*id).name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FnAttrs;
    use crate::types::{FunctionType, Type};

    #[test]
    fn test_escape_bytes() {
        assert_eq!(escape_bytes(b"puts"), "puts");
        assert_eq!(escape_bytes(b"a\"b\\c\n"), "a\\22b\\5Cc\\0A");
    }

    #[test]
    fn test_print_module() {
        let mut m = Module::new("hello");
        let puts = m
            .add_function(Function::declaration(
                "puts",
                FunctionType::new(Type::Int(32), vec![Type::Ptr]),
                FnAttrs::nounwind(),
            ))
            .unwrap();
        let msg = m.add_global_string(b"hi");

        let mut main = Function::declaration(
            "main",
            FunctionType::new(Type::Int(32), vec![]),
            FnAttrs::default(),
        );
        let entry = main.add_block("entry");
        main.push(
            entry,
            Some("r".into()),
            InstrKind::Call {
                tail: None,
                ret: Type::Int(32),
                callee: Callee::Direct(puts),
                args: vec![Operand::new(Type::Ptr, Value::Global(msg))],
            },
        )
        .unwrap();
        main.push(
            entry,
            None,
            InstrKind::Other {
                opcode: "ret".into(),
                operands: "i32 0".into(),
            },
        )
        .unwrap();
        m.add_function(main).unwrap();

        let expected = "\
; ModuleID = 'hello'

@.str = private constant c\"hi\\00\"

declare i32 @puts(ptr) nounwind

define i32 @main() {
entry:
  %r = call i32 @puts(ptr @.str)
  ret i32 0
}
";
        assert_eq!(m.to_string(), expected);
    }
}
