//! Instruction IR for method bodies.
//!
//! A small basic-block IR that the weaver builds and edits without caring
//! about the final stack-machine encoding:
//!
//! - **[`Body`]**: blocks, entry block, variable types
//! - **[`Block`]**: sequential instructions plus one terminator
//! - **[`Instr`]**: construct an object, bind a delegate, load/store a field,
//!   invoke a member, convert a value, test for null
//! - **[`Terminator`]**: return, jump, branch on a guard, throw
//!
//! Values flow through [`VarId`]s (each defined once) and method arguments
//! ([`Operand::Arg`]). Lowering to opcodes lives in [`crate::lower`].

use smallvec::SmallVec;

use crate::{FieldId, MethodRef, Name, TypeRef};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Variable ID within a [`Body`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Basic block ID within a [`Body`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Operands ────────────────────────────────────────────────────────

/// An instruction input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Method argument by slot; slot 0 is `this` on instance methods.
    Arg(u16),
    Var(VarId),
    Null,
    Bool(bool),
    Int(i32),
    Str(Name),
}

impl Operand {
    /// The receiver of an instance method.
    pub const THIS: Operand = Operand::Arg(0);
}

// ── Instructions ────────────────────────────────────────────────────

/// How a `Call` selects its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dispatch {
    Direct,
    Virtual,
}

/// A single instruction in a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// Allocate and construct: `let dst = new ctor.owner(args...)`.
    NewObj {
        dst: VarId,
        ctor: MethodRef,
        args: Vec<Operand>,
    },

    /// Delegate of type `ty` bound to `target` and `method`.
    ///
    /// A parameterless method may be bound to a one-argument delegate; the
    /// argument is dropped on invocation.
    BindDelegate {
        dst: VarId,
        ty: TypeRef,
        target: Operand,
        method: MethodRef,
    },

    /// `let dst = obj.field`.
    LoadField {
        dst: VarId,
        obj: Operand,
        field: FieldId,
    },

    /// `obj.field = value`.
    StoreField {
        obj: Operand,
        field: FieldId,
        value: Operand,
    },

    /// Invoke a member: `let dst = receiver.method(args...)`.
    Call {
        dst: Option<VarId>,
        method: MethodRef,
        receiver: Option<Operand>,
        args: Vec<Operand>,
        dispatch: Dispatch,
    },

    /// `let dst = value as ty`, unboxing value types.
    Convert {
        dst: VarId,
        value: Operand,
        ty: TypeRef,
    },

    /// `let dst: bool = value == null`.
    IsNull { dst: VarId, value: Operand },
}

impl Instr {
    /// The variable written by this instruction, if any.
    pub fn defined_var(&self) -> Option<VarId> {
        match self {
            Instr::NewObj { dst, .. }
            | Instr::BindDelegate { dst, .. }
            | Instr::LoadField { dst, .. }
            | Instr::Convert { dst, .. }
            | Instr::IsNull { dst, .. } => Some(*dst),
            Instr::Call { dst, .. } => *dst,
            Instr::StoreField { .. } => None,
        }
    }

    /// Every operand read by this instruction, in evaluation order.
    pub fn used_operands(&self) -> Vec<Operand> {
        match self {
            Instr::NewObj { args, .. } => args.clone(),
            Instr::BindDelegate { target, .. } => vec![*target],
            Instr::LoadField { obj, .. } => vec![*obj],
            Instr::StoreField { obj, value, .. } => vec![*obj, *value],
            Instr::Call { receiver, args, .. } => {
                let mut ops = Vec::with_capacity(1 + args.len());
                ops.extend(receiver.iter().copied());
                ops.extend_from_slice(args);
                ops
            }
            Instr::Convert { value, .. } | Instr::IsNull { value, .. } => vec![*value],
        }
    }

    /// Whether this instruction invokes `method` (as a call, not a delegate binding).
    pub fn calls(&self, method: &MethodRef) -> bool {
        matches!(self, Instr::Call { method: m, .. } if m == method)
    }
}

// ── Terminators ─────────────────────────────────────────────────────

/// How control leaves a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    Return { value: Option<Operand> },

    Jump { target: BlockId },

    /// Branch on a boolean guard.
    Branch {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },

    /// Raise the exception object in `value`.
    Throw { value: Operand },
}

impl Terminator {
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Terminator::Return { .. } | Terminator::Throw { .. } => SmallVec::new(),
            Terminator::Jump { target } => smallvec::smallvec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => smallvec::smallvec![*then_block, *else_block],
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Terminator::Return { .. })
    }
}

// ── Blocks and bodies ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub body: Vec<Instr>,
    pub terminator: Terminator,
}

/// A complete method body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Body {
    /// Blocks in definition order; `blocks[i].id == BlockId::new(i)`.
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    /// Type of each variable, indexed by `VarId::index()`.
    pub var_types: Vec<TypeRef>,
}

impl Body {
    /// A body that only returns.
    pub fn returning() -> Self {
        Self {
            blocks: vec![Block {
                id: BlockId::new(0),
                body: Vec::new(),
                terminator: Terminator::Return { value: None },
            }],
            entry: BlockId::new(0),
            var_types: Vec::new(),
        }
    }

    /// Allocate a fresh variable with the given type.
    pub fn fresh_var(&mut self, ty: TypeRef) -> VarId {
        let id = u32::try_from(self.var_types.len())
            .unwrap_or_else(|_| panic!("variable count exceeds u32::MAX"));
        self.var_types.push(ty);
        VarId::new(id)
    }

    /// The ID the next [`push_block`](Self::push_block) will use.
    pub fn next_block_id(&self) -> BlockId {
        BlockId::new(
            u32::try_from(self.blocks.len())
                .unwrap_or_else(|_| panic!("block count exceeds u32::MAX")),
        )
    }

    /// Append a block and return its ID.
    pub fn push_block(&mut self, body: Vec<Instr>, terminator: Terminator) -> BlockId {
        let id = self.next_block_id();
        self.blocks.push(Block {
            id,
            body,
            terminator,
        });
        id
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    #[inline]
    pub fn var_type(&self, var: VarId) -> &TypeRef {
        &self.var_types[var.index()]
    }

    /// Blocks that end in `Return`, in definition order.
    pub fn return_blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.terminator.is_return())
            .map(|b| b.id)
            .collect()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.body.iter())
    }

    /// Whether any instruction calls `method`.
    pub fn calls(&self, method: &MethodRef) -> bool {
        self.instructions().any(|i| i.calls(method))
    }

    /// Number of calls to `method`.
    pub fn call_count(&self, method: &MethodRef) -> usize {
        self.instructions().filter(|i| i.calls(method)).count()
    }
}
