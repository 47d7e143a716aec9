//! Pass traits and the pass manager.

use lcc_ir::{FuncId, Module};
use tracing::{debug, debug_span};

use crate::error::Result;

/// Named counter reported by a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statistic {
    /// Pass that owns the counter.
    pub pass: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    pub value: u64,
}

/// A pass that visits every function with a body.
///
/// The manager calls `initialize_module` once, `run_on_function` for each
/// defined function in module order, then `finalize_module`. Each method
/// returns whether it changed the module.
pub trait FunctionPass {
    /// Registered pass name.
    fn name(&self) -> &'static str;

    /// Module-level setup, run before any function.
    fn initialize_module(&mut self, _module: &mut Module) -> Result<bool> {
        Ok(false)
    }

    /// Process one function.
    fn run_on_function(&mut self, module: &mut Module, func: FuncId) -> Result<bool>;

    /// Module-level teardown, run after all functions.
    fn finalize_module(&mut self, _module: &mut Module) -> Result<bool> {
        Ok(false)
    }

    /// Counters collected so far.
    fn statistics(&self) -> Vec<Statistic> {
        Vec::new()
    }
}

/// A pass that processes the module as a whole.
pub trait ModulePass {
    /// Registered pass name.
    fn name(&self) -> &'static str;

    /// Process the module.
    fn run_on_module(&mut self, module: &mut Module) -> Result<bool>;
}

/// A scheduled pass.
pub enum Pass {
    Function(Box<dyn FunctionPass>),
    Module(Box<dyn ModulePass>),
}

impl Pass {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Function(p) => p.name(),
            Self::Module(p) => p.name(),
        }
    }

    fn run(&mut self, module: &mut Module) -> Result<bool> {
        match self {
            Self::Function(p) => run_function_pass(p.as_mut(), module),
            Self::Module(p) => p.run_on_module(module),
        }
    }

    fn statistics(&self) -> Vec<Statistic> {
        match self {
            Self::Function(p) => p.statistics(),
            Self::Module(_) => Vec::new(),
        }
    }
}

/// Result of running a pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Any pass changed the module.
    pub modified: bool,
    /// Counters from every pass, in pipeline order.
    pub statistics: Vec<Statistic>,
}

/// Runs passes over a module in order.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Pass>,
}

impl PassManager {
    /// Create an empty pass manager.
    #[must_use]
    pub const fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a function pass.
    pub fn add_function_pass(&mut self, pass: impl FunctionPass + 'static) {
        self.passes.push(Pass::Function(Box::new(pass)));
    }

    /// Append a module pass.
    pub fn add_module_pass(&mut self, pass: impl ModulePass + 'static) {
        self.passes.push(Pass::Module(Box::new(pass)));
    }

    /// Append an already boxed pass.
    pub fn add(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    /// Names of the scheduled passes.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(Pass::name).collect()
    }

    /// Run every pass. The first error aborts the pipeline.
    pub fn run(&mut self, module: &mut Module) -> Result<PassOutcome> {
        let mut outcome = PassOutcome::default();
        for pass in &mut self.passes {
            let _span = debug_span!("pass", name = pass.name()).entered();
            let changed = pass.run(module)?;
            debug!(changed, "pass finished");
            outcome.modified |= changed;
            outcome.statistics.extend(pass.statistics());
        }
        Ok(outcome)
    }
}

fn run_function_pass(pass: &mut dyn FunctionPass, module: &mut Module) -> Result<bool> {
    let mut changed = pass.initialize_module(module)?;
    // Functions added while running are declarations and never visited.
    for func in module.function_ids() {
        if module.function(func).is_declaration() {
            continue;
        }
        changed |= pass.run_on_function(module, func)?;
    }
    changed |= pass.finalize_module(module)?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcc_ir::parse_module;

    #[derive(Default)]
    struct Visits {
        seen: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl FunctionPass for Visits {
        fn name(&self) -> &'static str {
            "visits"
        }

        fn initialize_module(&mut self, _module: &mut Module) -> Result<bool> {
            self.seen.borrow_mut().push("<init>".to_string());
            Ok(false)
        }

        fn run_on_function(&mut self, module: &mut Module, func: FuncId) -> Result<bool> {
            self.seen
                .borrow_mut()
                .push(module.function(func).name.clone());
            Ok(false)
        }

        fn finalize_module(&mut self, _module: &mut Module) -> Result<bool> {
            self.seen.borrow_mut().push("<fini>".to_string());
            Ok(true)
        }
    }

    struct Fails;

    impl ModulePass for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn run_on_module(&mut self, _module: &mut Module) -> Result<bool> {
            Err(crate::PassError::UnknownPass("boom".into()))
        }
    }

    const SRC: &str = "\
declare void @ext()
define void @a() {
entry:
  ret void
}
define void @b() {
entry:
  ret void
}
";

    #[test]
    fn test_function_pass_visits_definitions_in_order() {
        let mut m = parse_module(SRC).unwrap();
        let visits = Visits::default();
        let seen = std::rc::Rc::clone(&visits.seen);
        let mut pm = PassManager::new();
        pm.add_function_pass(visits);
        let outcome = pm.run(&mut m).unwrap();
        assert!(outcome.modified);
        assert_eq!(*seen.borrow(), ["<init>", "a", "b", "<fini>"]);
    }

    #[test]
    fn test_error_aborts_pipeline() {
        let mut m = parse_module(SRC).unwrap();
        let visits = Visits::default();
        let seen = std::rc::Rc::clone(&visits.seen);
        let mut pm = PassManager::new();
        pm.add_module_pass(Fails);
        pm.add_function_pass(visits);
        assert_eq!(pm.pass_names(), ["fails", "visits"]);
        assert!(pm.run(&mut m).is_err());
        assert!(seen.borrow().is_empty());
    }
}
