//! Textual IR input.
//!
//! The grammar is line oriented and mirrors what the printer emits:
//!
//! ```text
//! ; ModuleID = 'name'
//! @.str = private constant c"puts\00"
//! declare [internal] <ty> @f(<ty>, ..., [...]) [nounwind]
//! define [internal] <ty> @g(<ty> %a, ...) [nounwind] {
//! label:
//!   [%r =] [tail|musttail|notail] call <ty> <callee>(<ty> <value>, ...)
//!   [%r =] invoke <ty> <callee>(...) to label %ok unwind label %lpad
//!   [%r =] <opcode> <anything>
//! }
//! ```
//!
//! Symbols may be referenced before they are declared.

use crate::error::{IrError, Result};
use crate::function::{FnAttrs, Function, Linkage};
use crate::instr::{Callee, InstrKind, TailKind};
use crate::module::Module;
use crate::types::{FunctionType, Type};
use crate::value::{FuncId, Operand, Value};

const MODULE_ID_PREFIX: &str = "; ModuleID = '";

#[derive(Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

/// Parse a module from its textual form.
pub fn parse_module(source: &str) -> Result<Module> {
    let lines: Vec<Line<'_>> = source
        .lines()
        .enumerate()
        .map(|(i, text)| Line { number: i + 1, text })
        .collect();

    let name = lines
        .iter()
        .find_map(|l| l.text.trim().strip_prefix(MODULE_ID_PREFIX))
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or("module");
    let mut module = Module::new(name);

    // Headers first so bodies can reference any symbol.
    let mut bodies: Vec<(FuncId, Vec<Line<'_>>)> = Vec::new();
    let mut iter = lines.iter().copied();
    while let Some(line) = iter.next() {
        let text = strip_comment(line.text).trim();
        if text.is_empty() {
            continue;
        }
        let mut cur = Cursor::new(text, line.number);
        if cur.keyword("declare") {
            let function = parse_header(&mut cur, false)?;
            cur.expect_end()?;
            add_function(&mut module, function, line.number)?;
        } else if cur.keyword("define") {
            let function = parse_header(&mut cur, true)?;
            cur.expect("{")?;
            cur.expect_end()?;
            let id = add_function(&mut module, function, line.number)?;
            let mut body = Vec::new();
            let mut closed = false;
            for body_line in iter.by_ref() {
                if strip_comment(body_line.text).trim() == "}" {
                    closed = true;
                    break;
                }
                body.push(body_line);
            }
            if !closed {
                return Err(cur.error("unterminated function body"));
            }
            bodies.push((id, body));
        } else if text.starts_with('@') {
            parse_global(&mut module, &mut cur)?;
        } else {
            return Err(cur.error("expected `declare`, `define` or a global"));
        }
    }

    for (id, body) in bodies {
        parse_body(&mut module, id, &body)?;
    }
    Ok(module)
}

fn add_function(module: &mut Module, function: Function, line: usize) -> Result<FuncId> {
    module.add_function(function).map_err(|e| IrError::Parse {
        line,
        message: e.to_string(),
    })
}

/// Drop a trailing `;` comment, ignoring semicolons inside string literals.
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ';' if !in_string => return &text[..i],
            _ => {}
        }
    }
    text
}

fn parse_header(cur: &mut Cursor<'_>, is_definition: bool) -> Result<Function> {
    let linkage = if cur.keyword("internal") {
        Linkage::Internal
    } else {
        Linkage::External
    };
    let ret = cur.ty()?;
    cur.expect("@")?;
    let name = cur.ident()?.to_string();

    cur.expect("(")?;
    let mut params = Vec::new();
    let mut names = Vec::new();
    let mut variadic = false;
    if !cur.eat(")") {
        loop {
            if cur.eat("...") {
                variadic = true;
                cur.expect(")")?;
                break;
            }
            params.push(cur.ty()?);
            if cur.eat("%") {
                names.push(cur.ident()?.to_string());
            }
            if cur.eat(")") {
                break;
            }
            cur.expect(",")?;
        }
    }

    let mut attrs = FnAttrs::default();
    while cur.keyword("nounwind") {
        attrs.nounwind = true;
    }

    let mut ty = FunctionType::new(ret, params);
    ty.variadic = variadic;
    let mut function = Function::declaration(name, ty, attrs);
    function.linkage = linkage;
    if is_definition {
        if !names.is_empty() && names.len() != function.ty.params.len() {
            return Err(cur.error("either all parameters are named or none are"));
        }
        function.params = names;
    }
    Ok(function)
}

fn parse_global(module: &mut Module, cur: &mut Cursor<'_>) -> Result<()> {
    cur.expect("@")?;
    let name = cur.ident()?.to_string();
    cur.expect("=")?;
    if !cur.keyword("private") || !cur.keyword("constant") {
        return Err(cur.error("expected `private constant`"));
    }
    let mut bytes = cur.cstring()?;
    if bytes.pop() != Some(0) {
        return Err(cur.error("string constant must be NUL-terminated"));
    }
    cur.expect_end()?;
    module
        .add_named_string(name, bytes)
        .map_err(|e| cur.error(&e.to_string()))?;
    Ok(())
}

fn parse_body(module: &mut Module, id: FuncId, body: &[Line<'_>]) -> Result<()> {
    let mut current = None;
    let mut branch_targets = Vec::new();

    for line in body {
        let text = strip_comment(line.text).trim();
        if text.is_empty() {
            continue;
        }
        if let Some(label) = text.strip_suffix(':') {
            if !label.is_empty() && label.chars().all(is_ident_char) {
                let function = module.function_mut(id);
                if function.block_by_label(label).is_some() {
                    return Err(IrError::Parse {
                        line: line.number,
                        message: format!("duplicate label {label}"),
                    });
                }
                current = Some(function.add_block(label));
                continue;
            }
        }

        let mut cur = Cursor::new(text, line.number);
        let Some(block) = current else {
            return Err(cur.error("instruction outside of a block"));
        };
        let (result, kind) = parse_instruction(module, &mut cur)?;
        if let InstrKind::Invoke { normal, unwind, .. } = &kind {
            branch_targets.push((line.number, normal.clone()));
            branch_targets.push((line.number, unwind.clone()));
        }
        module.function_mut(id).push(block, result, kind)?;
    }

    let function = module.function(id);
    if function.is_declaration() {
        return Err(IrError::Parse {
            line: body.first().map_or(0, |l| l.number),
            message: format!("@{} has an empty body", function.name),
        });
    }
    for (line, label) in branch_targets {
        if function.block_by_label(&label).is_none() {
            return Err(IrError::Parse {
                line,
                message: format!("unknown label %{label}"),
            });
        }
    }
    Ok(())
}

fn parse_instruction(module: &Module, cur: &mut Cursor<'_>) -> Result<(Option<String>, InstrKind)> {
    let result = if cur.eat("%") {
        let name = cur.ident()?.to_string();
        cur.expect("=")?;
        Some(name)
    } else {
        None
    };

    let mut opcode = cur.ident()?;
    let tail = TailKind::from_keyword(opcode);
    if let Some(tail) = tail {
        if !cur.keyword("call") {
            return Err(cur.error(&format!("expected `call` after `{}`", tail.keyword())));
        }
        opcode = "call";
    }
    let kind = match opcode {
        "call" => {
            let ret = cur.ty()?;
            let callee = parse_callee(module, cur)?;
            let args = parse_args(module, cur)?;
            InstrKind::Call {
                tail,
                ret,
                callee,
                args,
            }
        }
        "invoke" => {
            let ret = cur.ty()?;
            let callee = parse_callee(module, cur)?;
            let args = parse_args(module, cur)?;
            let normal = parse_label_ref(cur, "to")?;
            let unwind = parse_label_ref(cur, "unwind")?;
            InstrKind::Invoke {
                ret,
                callee,
                args,
                normal,
                unwind,
            }
        }
        _ => InstrKind::Other {
            opcode: opcode.to_string(),
            operands: cur.take_rest().trim().to_string(),
        },
    };
    cur.expect_end()?;
    Ok((result, kind))
}

fn parse_label_ref(cur: &mut Cursor<'_>, keyword: &str) -> Result<String> {
    if !cur.keyword(keyword) || !cur.keyword("label") {
        return Err(cur.error(&format!("expected `{keyword} label`")));
    }
    cur.expect("%")?;
    Ok(cur.ident()?.to_string())
}

fn parse_callee(module: &Module, cur: &mut Cursor<'_>) -> Result<Callee> {
    if cur.eat("@") {
        let name = cur.ident()?;
        module
            .get_function(name)
            .map(Callee::Direct)
            .ok_or_else(|| cur.error(&format!("unknown function @{name}")))
    } else if cur.eat("%") {
        Ok(Callee::Indirect(Value::Local(cur.ident()?.to_string())))
    } else {
        Err(cur.error("expected a callee"))
    }
}

fn parse_args(module: &Module, cur: &mut Cursor<'_>) -> Result<Vec<Operand>> {
    cur.expect("(")?;
    let mut args = Vec::new();
    if cur.eat(")") {
        return Ok(args);
    }
    loop {
        let ty = cur.ty()?;
        let value = parse_value(module, cur)?;
        args.push(Operand::new(ty, value));
        if cur.eat(")") {
            return Ok(args);
        }
        cur.expect(",")?;
    }
}

fn parse_value(module: &Module, cur: &mut Cursor<'_>) -> Result<Value> {
    if cur.eat("%") {
        return Ok(Value::Local(cur.ident()?.to_string()));
    }
    if cur.eat("@") {
        let name = cur.ident()?;
        return module
            .get_global(name)
            .map(Value::Global)
            .or_else(|| module.get_function(name).map(Value::Func))
            .ok_or_else(|| cur.error(&format!("unknown symbol @{name}")));
    }
    if cur.keyword("null") {
        return Ok(Value::Null);
    }
    cur.int().map(Value::Int)
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-')
}

/// Cursor over one source line.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str, line: usize) -> Self {
        Self { text, pos: 0, line }
    }

    fn error(&self, message: &str) -> IrError {
        IrError::Parse {
            line: self.line,
            message: message.to_string(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn take_rest(&mut self) -> &'a str {
        let rest = self.rest();
        self.pos = self.text.len();
        rest
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{token}`")))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        self.skip_ws();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(self.error(&format!("unexpected `{}`", self.rest())))
        }
    }

    /// Consume `word` if it appears as a whole identifier.
    fn keyword(&mut self, word: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        let end = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        if &rest[..end] == word {
            self.pos += end;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected an identifier"));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn ty(&mut self) -> Result<Type> {
        let word = self.ident()?;
        match word {
            "void" => Ok(Type::Void),
            "ptr" => Ok(Type::Ptr),
            _ => word
                .strip_prefix('i')
                .and_then(|bits| bits.parse().ok())
                .filter(|&bits| bits > 0)
                .map(Type::Int)
                .ok_or_else(|| self.error(&format!("unknown type `{word}`"))),
        }
    }

    fn int(&mut self) -> Result<i64> {
        self.skip_ws();
        let rest = self.rest();
        let digits_start = usize::from(rest.starts_with('-'));
        let end = rest[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest.len(), |i| i + digits_start);
        let value = rest[..end]
            .parse()
            .map_err(|_| self.error("expected a value"))?;
        self.pos += end;
        Ok(value)
    }

    /// Parse `c"..."`, decoding `\XX` and `\\` escapes.
    fn cstring(&mut self) -> Result<Vec<u8>> {
        self.expect("c\"")?;
        let mut bytes = Vec::new();
        let raw = self.rest().as_bytes();
        let mut i = 0;
        loop {
            match raw.get(i) {
                None => return Err(self.error("unterminated string constant")),
                Some(b'"') => break,
                Some(b'\\') => {
                    if raw.get(i + 1) == Some(&b'\\') {
                        bytes.push(b'\\');
                        i += 2;
                        continue;
                    }
                    let byte = raw
                        .get(i + 1..i + 3)
                        .and_then(|hex| std::str::from_utf8(hex).ok())
                        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                        .ok_or_else(|| self.error("invalid escape in string constant"))?;
                    bytes.push(byte);
                    i += 3;
                }
                Some(&b) => {
                    bytes.push(b);
                    i += 1;
                }
            }
        }
        self.pos += i + 1;
        Ok(bytes)
    }
}
