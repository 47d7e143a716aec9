//! Function IR.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::block::BasicBlock;
use crate::error::{IrError, Result};
use crate::instr::{InstrKind, Instruction};
use crate::types::FunctionType;
use crate::value::{BlockId, InstrId};

/// Prefix reserved for compiler intrinsics.
pub const INTRINSIC_PREFIX: &str = "llvm.";

/// Symbol linkage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Linkage {
    /// Visible to the linker.
    #[default]
    External,
    /// Local to the module.
    Internal,
}

/// Function attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FnAttrs {
    /// The function never unwinds.
    pub nounwind: bool,
}

impl FnAttrs {
    #[must_use]
    pub const fn nounwind() -> Self {
        Self { nounwind: true }
    }
}

/// A function declaration or definition.
///
/// A function without blocks is a declaration: its body is expected to be
/// supplied by the linker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub ty: FunctionType,
    pub attrs: FnAttrs,
    pub linkage: Linkage,
    /// Parameter names of a definition, without the `%` sigil.
    pub params: Vec<String>,
    blocks: Vec<BasicBlock>,
    next_id: u32,
}

impl Function {
    /// Create a declaration.
    pub fn declaration(name: impl Into<String>, ty: FunctionType, attrs: FnAttrs) -> Self {
        Self {
            name: name.into(),
            ty,
            attrs,
            linkage: Linkage::External,
            params: Vec::new(),
            blocks: Vec::new(),
            next_id: 0,
        }
    }

    /// Check if this function has no body in the module.
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if this function is a compiler intrinsic.
    #[must_use]
    pub fn is_intrinsic(&self) -> bool {
        self.name.starts_with(INTRINSIC_PREFIX)
    }

    /// Basic blocks in layout order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Get a block by id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    /// Find a block by label.
    #[must_use]
    pub fn block_by_label(&self, label: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.label == label)
            .map(BlockId)
    }

    /// Append an empty block.
    pub fn add_block(&mut self, label: impl Into<String>) -> BlockId {
        self.blocks.push(BasicBlock::new(label));
        BlockId(self.blocks.len() - 1)
    }

    /// Iterate over all instructions in layout order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    /// Total number of instructions.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(BasicBlock::len).sum()
    }

    /// Get an instruction by handle.
    #[must_use]
    pub fn instruction(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions().find(|i| i.id == id)
    }

    /// Current block and index of an instruction.
    #[must_use]
    pub fn position(&self, id: InstrId) -> Option<(BlockId, usize)> {
        self.blocks.iter().enumerate().find_map(|(b, block)| {
            block
                .instructions
                .iter()
                .position(|i| i.id == id)
                .map(|idx| (BlockId(b), idx))
        })
    }

    /// Append an instruction to the end of a block.
    pub fn push(
        &mut self,
        block: BlockId,
        result: Option<String>,
        kind: InstrKind,
    ) -> Result<InstrId> {
        let id = InstrId(self.next_id);
        let name = self.name.clone();
        let block = self.blocks.get_mut(block.0).ok_or(IrError::NoBody(name))?;
        block.instructions.push(Instruction { id, result, kind });
        self.next_id += 1;
        Ok(id)
    }

    /// Insert each instruction immediately before its anchor.
    ///
    /// Instructions sharing an anchor keep their relative order. Every block
    /// is rebuilt at most once. Handles come back in input order; nothing is
    /// inserted if an anchor is not in this function.
    pub fn insert_before_each(&mut self, items: Vec<(InstrId, InstrKind)>) -> Result<Vec<InstrId>> {
        let mut pending: FxHashMap<InstrId, Vec<Instruction>> = FxHashMap::default();
        let mut ids = Vec::with_capacity(items.len());
        let mut next_id = self.next_id;
        for (anchor, kind) in items {
            let id = InstrId(next_id);
            next_id += 1;
            ids.push(id);
            pending.entry(anchor).or_default().push(Instruction {
                id,
                result: None,
                kind,
            });
        }

        let present: FxHashSet<InstrId> = self.instructions().map(|i| i.id).collect();
        if let Some(&missing) = pending.keys().find(|anchor| !present.contains(anchor)) {
            return Err(IrError::InstrNotFound {
                id: missing,
                function: self.name.clone(),
            });
        }

        for block in &mut self.blocks {
            if !block.instructions.iter().any(|i| pending.contains_key(&i.id)) {
                continue;
            }
            let old = std::mem::take(&mut block.instructions);
            block.instructions.reserve(old.len());
            for instr in old {
                if let Some(before) = pending.remove(&instr.id) {
                    block.instructions.extend(before);
                }
                block.instructions.push(instr);
            }
        }
        self.next_id = next_id;
        Ok(ids)
    }
}
