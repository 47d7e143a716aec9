//! Module IR.

use rustc_hash::FxHashMap;

use crate::error::{IrError, Result};
use crate::function::{FnAttrs, Function};
use crate::types::FunctionType;
use crate::value::{FuncId, GlobalId};

/// Base name for interned string constants.
const STRING_BASE_NAME: &str = ".str";

/// Private, read-only, NUL-terminated string constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalString {
    /// Symbol name, without the `@` sigil.
    pub name: String,
    /// Contents, without the terminating NUL.
    pub bytes: Vec<u8>,
}

/// Compilation unit: functions plus string constants.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
    globals: Vec<GlobalString>,
    /// Functions and globals share one symbol namespace.
    symbols: FxHashMap<String, Symbol>,
    strings: FxHashMap<Vec<u8>, GlobalId>,
}

#[derive(Clone, Copy, Debug)]
enum Symbol {
    Func(FuncId),
    Global(GlobalId),
}

impl Module {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a function. Fails if the name is already taken.
    pub fn add_function(&mut self, function: Function) -> Result<FuncId> {
        if self.symbols.contains_key(&function.name) {
            return Err(IrError::DuplicateSymbol(function.name));
        }
        let id = FuncId(self.functions.len());
        self.symbols.insert(function.name.clone(), Symbol::Func(id));
        self.functions.push(function);
        Ok(id)
    }

    /// Look up a function by name.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        match self.symbols.get(name) {
            Some(Symbol::Func(id)) => Some(*id),
            _ => None,
        }
    }

    /// Return the function named `name`, declaring it first if absent.
    ///
    /// The boolean is `true` when a declaration was added. An existing
    /// function is returned as is, whatever its signature.
    pub fn get_or_insert_function(
        &mut self,
        name: &str,
        ty: FunctionType,
        attrs: FnAttrs,
    ) -> Result<(FuncId, bool)> {
        if let Some(id) = self.get_function(name) {
            return Ok((id, false));
        }
        let id = self.add_function(Function::declaration(name, ty, attrs))?;
        Ok((id, true))
    }

    /// Get a function by id.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this module.
    #[must_use]
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    /// Get a function by id, mutably.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this module.
    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0]
    }

    /// Iterate over functions in module order.
    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions.iter().enumerate().map(|(i, f)| (FuncId(i), f))
    }

    /// Snapshot of all function ids.
    #[must_use]
    pub fn function_ids(&self) -> Vec<FuncId> {
        (0..self.functions.len()).map(FuncId).collect()
    }

    /// Number of functions, declarations included.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Get a global string by id.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this module.
    #[must_use]
    pub fn global(&self, id: GlobalId) -> &GlobalString {
        &self.globals[id.0]
    }

    /// Look up a global string by name.
    #[must_use]
    pub fn get_global(&self, name: &str) -> Option<GlobalId> {
        match self.symbols.get(name) {
            Some(Symbol::Global(id)) => Some(*id),
            _ => None,
        }
    }

    /// Iterate over global strings in module order.
    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalString)> {
        self.globals.iter().enumerate().map(|(i, g)| (GlobalId(i), g))
    }

    /// Add a named string constant. Fails if the name is already taken.
    pub fn add_named_string(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<GlobalId> {
        let name = name.into();
        if self.symbols.contains_key(&name) {
            return Err(IrError::DuplicateSymbol(name));
        }
        let id = GlobalId(self.globals.len());
        self.symbols.insert(name.clone(), Symbol::Global(id));
        self.strings.entry(bytes.clone()).or_insert(id);
        self.globals.push(GlobalString { name, bytes });
        Ok(id)
    }

    /// Return a string constant holding `bytes`, creating it if needed.
    ///
    /// Identical contents share one constant.
    pub fn add_global_string(&mut self, bytes: &[u8]) -> GlobalId {
        if let Some(&id) = self.strings.get(bytes) {
            return id;
        }
        let name = self.unique_name(STRING_BASE_NAME);
        let id = GlobalId(self.globals.len());
        self.symbols.insert(name.clone(), Symbol::Global(id));
        self.strings.insert(bytes.to_vec(), id);
        self.globals.push(GlobalString {
            name,
            bytes: bytes.to_vec(),
        });
        id
    }

    /// First free symbol name of the form `base`, `base.1`, `base.2`, ...
    fn unique_name(&self, base: &str) -> String {
        if !self.symbols.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}.{n}"))
            .find(|name| !self.symbols.contains_key(name))
            .unwrap_or_else(|| base.to_string())
    }
}
