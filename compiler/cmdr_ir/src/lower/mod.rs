//! Lowering from the block IR to stack-machine opcodes.
//!
//! This is the last step before a binary encoder: every [`Body`] becomes a
//! flat [`Op`] sequence with one local slot per IR variable and a label
//! offset per block. Blocks are laid out entry first, then in definition
//! order; a `Jump` to the block laid out next is elided.
//!
//! Delegate binding lowers to `ldftn` + `newobj Delegate::.ctor(object, native int)`;
//! `Convert` lowers to `unbox.any` for value types and generic parameters,
//! `castclass` for other reference types and to nothing for `object`.

use crate::body::{BlockId, Body, Dispatch, Instr, Operand, Terminator};
use crate::{FieldId, MethodRef, Module, Name, TypeRef};

/// A stack-machine opcode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Nop,
    Ldarg(u16),
    Ldloc(u32),
    Stloc(u32),
    Ldnull,
    LdcI4(i32),
    Ldstr(Name),
    Ldfld(FieldId),
    Stfld(FieldId),
    Ldftn(MethodRef),
    Newobj(MethodRef),
    Call(MethodRef),
    Callvirt(MethodRef),
    UnboxAny(TypeRef),
    Castclass(TypeRef),
    Ceq,
    Pop,
    /// Unconditional branch to a block's label.
    Br(BlockId),
    /// Branch if the popped value is non-zero.
    Brtrue(BlockId),
    Throw,
    Ret,
}

/// Result of lowering one body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredBody {
    pub ops: Vec<Op>,
    /// Op offset of each block, indexed by `BlockId::index()`.
    pub labels: Vec<usize>,
    /// Local slot types; slot `i` holds IR variable `i`.
    pub locals: Vec<TypeRef>,
}

impl LoweredBody {
    /// Offset a branch to `block` resolves to.
    pub fn label(&self, block: BlockId) -> usize {
        self.labels[block.index()]
    }
}

/// Lower `body` (which belongs to a method of `module`) to opcodes.
pub fn lower_body(module: &Module, body: &Body) -> LoweredBody {
    let order = layout(body);
    let mut lowerer = Lowerer {
        module,
        ops: Vec::new(),
        labels: vec![0; body.blocks.len()],
    };

    for (pos, &block_id) in order.iter().enumerate() {
        lowerer.labels[block_id.index()] = lowerer.ops.len();
        let block = body.block(block_id);
        for instr in &block.body {
            lowerer.instr(instr);
        }
        let next = order.get(pos + 1).copied();
        lowerer.terminator(&block.terminator, next);
    }

    tracing::trace!(
        blocks = body.blocks.len(),
        ops = lowerer.ops.len(),
        "lowered body"
    );

    LoweredBody {
        ops: lowerer.ops,
        labels: lowerer.labels,
        locals: body.var_types.clone(),
    }
}

/// Entry block first, remaining blocks in definition order.
fn layout(body: &Body) -> Vec<BlockId> {
    let mut order = Vec::with_capacity(body.blocks.len());
    order.push(body.entry);
    order.extend(body.blocks.iter().map(|b| b.id).filter(|&id| id != body.entry));
    order
}

struct Lowerer<'a> {
    module: &'a Module,
    ops: Vec<Op>,
    labels: Vec<usize>,
}

impl Lowerer<'_> {
    fn load(&mut self, operand: Operand) {
        let op = match operand {
            Operand::Arg(slot) => Op::Ldarg(slot),
            Operand::Var(v) => Op::Ldloc(v.raw()),
            Operand::Null => Op::Ldnull,
            Operand::Bool(b) => Op::LdcI4(i32::from(b)),
            Operand::Int(i) => Op::LdcI4(i),
            Operand::Str(s) => Op::Ldstr(s),
        };
        self.ops.push(op);
    }

    fn store(&mut self, dst: crate::body::VarId) {
        self.ops.push(Op::Stloc(dst.raw()));
    }

    fn instr(&mut self, instr: &Instr) {
        match instr {
            Instr::NewObj { dst, ctor, args } => {
                for &a in args {
                    self.load(a);
                }
                self.ops.push(Op::Newobj(ctor.clone()));
                self.store(*dst);
            }
            Instr::BindDelegate {
                dst,
                ty,
                target,
                method,
            } => {
                self.load(*target);
                self.ops.push(Op::Ldftn(method.clone()));
                self.ops.push(Op::Newobj(MethodRef::External {
                    owner: ty.clone(),
                    name: self.module.intern(".ctor"),
                    params: vec![TypeRef::Object, TypeRef::IntPtr],
                    ret: TypeRef::Void,
                }));
                self.store(*dst);
            }
            Instr::LoadField { dst, obj, field } => {
                self.load(*obj);
                self.ops.push(Op::Ldfld(*field));
                self.store(*dst);
            }
            Instr::StoreField { obj, field, value } => {
                self.load(*obj);
                self.load(*value);
                self.ops.push(Op::Stfld(*field));
            }
            Instr::Call {
                dst,
                method,
                receiver,
                args,
                dispatch,
            } => {
                if let Some(r) = receiver {
                    self.load(*r);
                }
                for &a in args {
                    self.load(a);
                }
                self.ops.push(match dispatch {
                    Dispatch::Direct => Op::Call(method.clone()),
                    Dispatch::Virtual => Op::Callvirt(method.clone()),
                });
                match dst {
                    Some(d) => self.store(*d),
                    None if self.module.ref_ret(method) != TypeRef::Void => self.ops.push(Op::Pop),
                    None => {}
                }
            }
            Instr::Convert { dst, value, ty } => {
                self.load(*value);
                match ty {
                    TypeRef::Object => {}
                    t if t.is_value_type() || matches!(t, TypeRef::GenericParam(_)) => {
                        self.ops.push(Op::UnboxAny(t.clone()));
                    }
                    t => self.ops.push(Op::Castclass(t.clone())),
                }
                self.store(*dst);
            }
            Instr::IsNull { dst, value } => {
                self.load(*value);
                self.ops.push(Op::Ldnull);
                self.ops.push(Op::Ceq);
                self.store(*dst);
            }
        }
    }

    fn terminator(&mut self, terminator: &Terminator, next: Option<BlockId>) {
        match terminator {
            Terminator::Return { value } => {
                if let Some(v) = value {
                    self.load(*v);
                }
                self.ops.push(Op::Ret);
            }
            Terminator::Jump { target } => {
                if next != Some(*target) {
                    self.ops.push(Op::Br(*target));
                }
            }
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => {
                self.load(*cond);
                self.ops.push(Op::Brtrue(*then_block));
                if next != Some(*else_block) {
                    self.ops.push(Op::Br(*else_block));
                }
            }
            Terminator::Throw { value } => {
                self.load(*value);
                self.ops.push(Op::Throw);
            }
        }
    }
}

#[cfg(test)]
mod tests;
