//! Builder for method bodies.
//!
//! Follows the "position at a block, emit instructions, terminate" shape of
//! an LLVM-style IR builder. Synthesizers use it to write fresh bodies; the
//! weaver's in-place edits of existing bodies go through [`Body`] directly.

use crate::body::{Block, BlockId, Body, Dispatch, Instr, Operand, Terminator, VarId};
use crate::{FieldId, MethodRef, TypeRef};

/// In-progress basic block.
struct BlockBuilder {
    id: BlockId,
    body: Vec<Instr>,
    terminator: Option<Terminator>,
}

/// Builder for an in-progress [`Body`].
pub struct BodyBuilder {
    blocks: Vec<BlockBuilder>,
    current_block: BlockId,
    var_types: Vec<TypeRef>,
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyBuilder {
    /// Create a builder with an entry block already allocated.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockBuilder {
                id: BlockId::new(0),
                body: Vec::new(),
                terminator: None,
            }],
            current_block: BlockId::new(0),
            var_types: Vec::new(),
        }
    }

    // Block management

    /// Allocate a new empty block and return its ID.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId::new(
            u32::try_from(self.blocks.len())
                .unwrap_or_else(|_| panic!("block count exceeds u32::MAX")),
        );
        self.blocks.push(BlockBuilder {
            id,
            body: Vec::new(),
            terminator: None,
        });
        id
    }

    /// Set the current insertion point to the given block.
    pub fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "BlockId {} out of bounds (have {} blocks)",
            block.raw(),
            self.blocks.len(),
        );
        self.current_block = block;
    }

    // Variables and emission

    pub fn fresh_var(&mut self, ty: TypeRef) -> VarId {
        let id = u32::try_from(self.var_types.len())
            .unwrap_or_else(|_| panic!("variable count exceeds u32::MAX"));
        self.var_types.push(ty);
        VarId::new(id)
    }

    /// Append an instruction to the current block.
    pub fn emit(&mut self, instr: Instr) {
        let block = &mut self.blocks[self.current_block.index()];
        debug_assert!(
            block.terminator.is_none(),
            "emitting into terminated block {}",
            block.id.raw()
        );
        block.body.push(instr);
    }

    /// `let v = new ty(args...)` through `ctor`.
    pub fn new_obj(&mut self, ty: TypeRef, ctor: MethodRef, args: Vec<Operand>) -> VarId {
        let dst = self.fresh_var(ty);
        self.emit(Instr::NewObj { dst, ctor, args });
        dst
    }

    pub fn bind_delegate(&mut self, ty: TypeRef, target: Operand, method: MethodRef) -> VarId {
        let dst = self.fresh_var(ty.clone());
        self.emit(Instr::BindDelegate {
            dst,
            ty,
            target,
            method,
        });
        dst
    }

    pub fn load_field(&mut self, ty: TypeRef, obj: Operand, field: FieldId) -> VarId {
        let dst = self.fresh_var(ty);
        self.emit(Instr::LoadField { dst, obj, field });
        dst
    }

    pub fn store_field(&mut self, obj: Operand, field: FieldId, value: Operand) {
        self.emit(Instr::StoreField { obj, field, value });
    }

    /// Call with no result.
    pub fn call(
        &mut self,
        method: MethodRef,
        receiver: Option<Operand>,
        args: Vec<Operand>,
        dispatch: Dispatch,
    ) {
        self.emit(Instr::Call {
            dst: None,
            method,
            receiver,
            args,
            dispatch,
        });
    }

    /// Call whose result of type `ty` is bound to a fresh variable.
    pub fn call_value(
        &mut self,
        ty: TypeRef,
        method: MethodRef,
        receiver: Option<Operand>,
        args: Vec<Operand>,
        dispatch: Dispatch,
    ) -> VarId {
        let dst = self.fresh_var(ty);
        self.emit(Instr::Call {
            dst: Some(dst),
            method,
            receiver,
            args,
            dispatch,
        });
        dst
    }

    pub fn convert(&mut self, value: Operand, ty: TypeRef) -> VarId {
        let dst = self.fresh_var(ty.clone());
        self.emit(Instr::Convert { dst, value, ty });
        dst
    }

    pub fn is_null(&mut self, value: Operand) -> VarId {
        let dst = self.fresh_var(TypeRef::Bool);
        self.emit(Instr::IsNull { dst, value });
        dst
    }

    // Terminators

    fn terminate(&mut self, terminator: Terminator) {
        let block = &mut self.blocks[self.current_block.index()];
        debug_assert!(
            block.terminator.is_none(),
            "block {} already terminated",
            self.current_block.raw()
        );
        block.terminator = Some(terminator);
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        self.terminate(Terminator::Return { value });
    }

    pub fn jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump { target });
    }

    pub fn branch(&mut self, cond: Operand, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn throw(&mut self, value: Operand) {
        self.terminate(Terminator::Throw { value });
    }

    // Finalization

    /// Consume the builder and produce a finished [`Body`] entered at block 0.
    ///
    /// Unterminated blocks get a bare `Return` (with a tracing warning).
    pub fn finish(self) -> Body {
        let blocks = self
            .blocks
            .into_iter()
            .map(|bb| {
                let terminator = bb.terminator.unwrap_or_else(|| {
                    tracing::warn!(block = bb.id.raw(), "unterminated block, adding Return");
                    Terminator::Return { value: None }
                });
                Block {
                    id: bb.id,
                    body: bb.body,
                    terminator,
                }
            })
            .collect();
        Body {
            blocks,
            entry: BlockId::new(0),
            var_types: self.var_types,
        }
    }
}
