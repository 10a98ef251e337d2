//! Initialization weaver.
//!
//! Wires every command of a type into a private initializer method that
//! every instance constructor calls. Each command gets one guarded
//! construction block:
//!
//! ```text
//! void <Commander_Fody>InitializeCommands()
//! {
//!     if (this.get_Save() == null)
//!         this.set_Save(new Impl<T>(new Action<T>(this.OnSave), new Predicate<T>(this.CanSave)));
//!     ...
//!     return;
//! }
//! ```
//!
//! # Per-command algorithm
//!
//! 1. **Execute handler**: the first discovered one; none is an error.
//!    Every selected handler must be declared by the owner type.
//! 2. **Can-execute handler**: none means always executable; more than one
//!    is [`WeaveError::AmbiguousCanExecute`].
//! 3. **Constructor**: the one-argument constructor without a can-execute
//!    handler, otherwise the widest one, which must take two arguments.
//! 4. **Instantiation**: a generic implementation is instantiated with the
//!    execute handler's parameter type (`object` when it takes none).
//! 5. **Delegates**: `this` + handler bound to each constructor parameter's
//!    delegate type, after a shape check.
//! 6. **Assignment** through the property setter, guarded by a null test
//!    of the getter so re-running the initializer never overwrites.
//!
//! On the nested path steps 3-5 are replaced by constructing the command's
//! nested type with `this`.
//!
//! # Ordering
//!
//! [`InitializerOrder::Declaration`] splits the initializer's last return
//! block and appends the guard there, so blocks run in command order.
//! [`InitializerOrder::Reverse`] prepends each guard at the entry block.
//!
//! # Idempotency
//!
//! An existing initializer is reused; a command whose setter the
//! initializer already calls is left alone, and constructors that already
//! call the initializer are skipped.

use smallvec::SmallVec;

use cmdr_ir::{
    BlockId, Body, Dispatch, Instr, MethodDef, MethodFlags, MethodId, MethodRef, Module, Name,
    Operand, Terminator, TypeId, TypeRef,
};

use crate::assets::{Assets, Implementation};
use crate::nested_impl::ensure_nested_command;
use crate::registry::{CommandData, CommandId};
use crate::{InitializerOrder, WeaveContext, WeaveError};

/// Name of the synthesized initializer method.
pub const INITIALIZER_NAME: &str = "<Commander_Fody>InitializeCommands";

/// How the module's commands are implemented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// One shared implementation type: a user type or the generated
    /// delegate command.
    Shared(Implementation),
    /// One nested implementation type per command.
    Nested,
}

/// What happened to one type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeOutcome {
    /// The initializer, when at least one command is wired.
    pub initializer: Option<MethodId>,
    /// Commands that received a construction block in this weave.
    pub commands_wired: usize,
    /// Commands whose block was already present.
    pub already_wired: usize,
    /// Constructors that received an initializer call in this weave.
    pub constructors_wired: usize,
    /// Nested implementation types created in this weave.
    pub nested_types: Vec<TypeId>,
}

/// A constructor argument of a construction block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CtorArg {
    /// Delegate of type `ty` bound to `target` and `handler`.
    Delegate {
        ty: TypeRef,
        target: Operand,
        handler: MethodRef,
    },
    /// The owner instance.
    This,
}

/// `new ty(args...)` through `ctor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Construction {
    pub ty: TypeRef,
    pub ctor: MethodRef,
    pub args: SmallVec<[CtorArg; 2]>,
}

/// Wire `commands`, all declared by `ty`, into the type's initializer.
pub fn weave_initialization(
    cx: &mut WeaveContext<'_>,
    module: &mut Module,
    ty: TypeId,
    commands: &[CommandId],
    strategy: &Strategy,
) -> TypeOutcome {
    let mut outcome = TypeOutcome::default();
    let init_name = module.intern(INITIALIZER_NAME);
    let existing = match find_initializer(module, ty, init_name) {
        Ok(existing) => existing,
        Err(err) => {
            cx.report(&err, module.full_name(ty));
            return outcome;
        }
    };
    let mut body = existing
        .and_then(|id| module.method_mut(id).body.take())
        .unwrap_or_else(Body::returning);

    for &id in commands {
        let command = cx.registry.command(id).clone();
        let command_name = module.str(command.name);
        let Some((getter, setter)) = command
            .property
            .and_then(|p| Some((module.getter(p)?, module.setter(p)?)))
        else {
            // Property injection failed and was reported.
            tracing::debug!(command = command_name, "skipping command without property");
            continue;
        };
        let setter = MethodRef::def(setter);
        if body.calls(&setter) {
            tracing::debug!(command = command_name, "command already wired");
            cx.registry.command_mut(id).initialization_injected = true;
            outcome.already_wired += 1;
            continue;
        }

        let planned = plan_construction(&cx.assets, module, ty, &command, strategy);
        match planned {
            Ok((construction, nested)) => {
                let guard = Guard {
                    getter: MethodRef::def(getter),
                    setter,
                    command_ty: cx.assets.command.clone(),
                };
                insert_guarded_block(&mut body, cx.config.initializer_order, &guard, &construction);
                let data = cx.registry.command_mut(id);
                data.initialization_injected = true;
                data.uses_nested_implementation = nested.is_some();
                if let Some((nested_ty, true)) = nested {
                    outcome.nested_types.push(nested_ty);
                }
                outcome.commands_wired += 1;
                tracing::debug!(
                    ty = %module.full_name(ty),
                    command = command_name,
                    "added command initialization"
                );
            }
            Err(err) => {
                cx.report(&err, format!("{}::{command_name}", module.full_name(ty)));
            }
        }
    }

    if outcome.commands_wired + outcome.already_wired == 0 {
        if let Some(id) = existing {
            module.method_mut(id).body = Some(body);
        }
        return outcome;
    }

    let init = match existing {
        Some(id) => {
            module.method_mut(id).body = Some(body);
            id
        }
        None => module.add_method(
            ty,
            MethodDef::new(
                init_name,
                MethodFlags::PRIVATE | MethodFlags::HIDE_BY_SIG | MethodFlags::SPECIAL_NAME,
                TypeRef::Void,
            )
            .with_body(body),
        ),
    };
    outcome.initializer = Some(init);
    outcome.constructors_wired = wire_constructors(module, ty, init);
    tracing::info!(
        ty = %module.full_name(ty),
        wired = outcome.commands_wired,
        already_wired = outcome.already_wired,
        constructors = outcome.constructors_wired,
        "woven type"
    );
    outcome
}

/// The existing initializer of `ty`, if any. A method of that name with
/// another shape is a clash.
fn find_initializer(module: &Module, ty: TypeId, name: Name) -> Result<Option<MethodId>, WeaveError> {
    let Some(index) = module.ty(ty).find_method(name) else {
        return Ok(None);
    };
    let id = MethodId { ty, index };
    let method = module.method(id);
    if method.is_static() || !method.params.is_empty() || method.ret != TypeRef::Void || method.body.is_none() {
        return Err(WeaveError::InitializerClash {
            ty: module.full_name(ty),
            name: INITIALIZER_NAME.to_owned(),
        });
    }
    Ok(Some(id))
}

/// The execute handler and optional can-execute handler of `command`.
pub fn select_handlers(
    module: &Module,
    command: &CommandData,
) -> Result<(MethodId, Option<MethodId>), WeaveError> {
    let execute = command
        .execute_method()
        .ok_or_else(|| WeaveError::MissingExecuteHandler {
            command: module.str(command.name).to_owned(),
        })?;
    let can_execute = match command.can_execute_methods.as_slice() {
        [] => None,
        [one] => Some(*one),
        many => {
            return Err(WeaveError::AmbiguousCanExecute {
                command: module.str(command.name).to_owned(),
                handlers: many.iter().map(|&m| module.display_method(m)).collect(),
            })
        }
    };
    Ok((execute, can_execute))
}

/// Plan the construction for `command`. The second value is the nested
/// type and whether it was created, on the nested path.
fn plan_construction(
    assets: &Assets,
    module: &mut Module,
    owner: TypeId,
    command: &CommandData,
    strategy: &Strategy,
) -> Result<(Construction, Option<(TypeId, bool)>), WeaveError> {
    let (execute, can_execute) = select_handlers(module, command)?;
    for handler in std::iter::once(execute).chain(can_execute) {
        check_handler_owner(module, owner, handler)?;
    }
    match strategy {
        Strategy::Shared(implementation) => {
            plan_shared(assets, module, implementation, execute, can_execute).map(|c| (c, None))
        }
        Strategy::Nested => {
            let name = module.str(command.name);
            let nested = ensure_nested_command(module, assets, owner, name, execute, can_execute)?;
            let construction = Construction {
                ty: TypeRef::Def(nested.ty),
                ctor: MethodRef::def(nested.ctor),
                args: smallvec::smallvec![CtorArg::This],
            };
            Ok((construction, Some((nested.ty, nested.created))))
        }
    }
}

/// Handlers are bound to or called on the owner instance, so they must be
/// declared by the owner type itself.
pub fn check_handler_owner(module: &Module, owner: TypeId, handler: MethodId) -> Result<(), WeaveError> {
    if handler.ty == owner {
        return Ok(());
    }
    Err(WeaveError::ForeignHandler {
        handler: module.display_method(handler),
        owner: module.full_name(owner),
    })
}

/// Constructor selection, generic instantiation and delegate binding
/// against a shared implementation.
pub fn plan_shared(
    assets: &Assets,
    module: &Module,
    implementation: &Implementation,
    execute: MethodId,
    can_execute: Option<MethodId>,
) -> Result<Construction, WeaveError> {
    let arity = |c: &MethodId| module.method(*c).params.len();
    let ctor = match can_execute {
        None => implementation.constructors.iter().copied().find(|c| arity(c) == 1),
        Some(_) => implementation
            .constructors
            .iter()
            .copied()
            .max_by_key(arity)
            .filter(|c| arity(c) == 2),
    }
    .ok_or_else(|| WeaveError::ConstructorNotFound {
        implementation: module.full_name(implementation.ty),
        arity: if can_execute.is_some() { 2 } else { 1 },
    })?;

    let impl_def = TypeRef::Def(implementation.ty);
    let (ty, ctor) = if module.ty(implementation.ty).is_generic() {
        let arg = module
            .method(execute)
            .params
            .first()
            .map_or(TypeRef::Object, |p| p.ty.clone());
        (
            TypeRef::generic(impl_def, [arg.clone()]),
            MethodRef::instantiated(ctor, [arg]),
        )
    } else {
        (impl_def, MethodRef::def(ctor))
    };

    let params = module.ref_params(&ctor);
    let mut args = SmallVec::new();
    args.push(bind(assets, module, execute, &params[0])?);
    if let Some(can_execute) = can_execute {
        args.push(bind(assets, module, can_execute, &params[1])?);
    }
    Ok(Construction { ty, ctor, args })
}

fn bind(assets: &Assets, module: &Module, handler: MethodId, delegate: &TypeRef) -> Result<CtorArg, WeaveError> {
    let method = module.method(handler);
    if !assets.fits_delegate(&method.param_types(), &method.ret, delegate) {
        return Err(WeaveError::DelegateShapeMismatch {
            handler: module.display_method(handler),
            delegate: module.display_type(delegate),
        });
    }
    let target = if method.is_static() {
        Operand::Null
    } else {
        Operand::THIS
    };
    Ok(CtorArg::Delegate {
        ty: delegate.clone(),
        target,
        handler: MethodRef::def(handler),
    })
}

/// Accessors of the command property.
pub struct Guard {
    pub getter: MethodRef,
    pub setter: MethodRef,
    pub command_ty: TypeRef,
}

/// Add `if (getter() == null) setter(new ...)` to `body`.
pub fn insert_guarded_block(
    body: &mut Body,
    order: InitializerOrder,
    guard: &Guard,
    construction: &Construction,
) {
    let current = body.fresh_var(guard.command_ty.clone());
    let is_null = body.fresh_var(TypeRef::Bool);
    let test = vec![
        Instr::Call {
            dst: Some(current),
            method: guard.getter.clone(),
            receiver: Some(Operand::THIS),
            args: Vec::new(),
            dispatch: Dispatch::Direct,
        },
        Instr::IsNull {
            dst: is_null,
            value: Operand::Var(current),
        },
    ];

    let mut assign = Vec::with_capacity(construction.args.len() + 2);
    let mut ctor_args = Vec::with_capacity(construction.args.len());
    for arg in &construction.args {
        match arg {
            CtorArg::This => ctor_args.push(Operand::THIS),
            CtorArg::Delegate {
                ty,
                target,
                handler,
            } => {
                let dst = body.fresh_var(ty.clone());
                assign.push(Instr::BindDelegate {
                    dst,
                    ty: ty.clone(),
                    target: *target,
                    method: handler.clone(),
                });
                ctor_args.push(Operand::Var(dst));
            }
        }
    }
    let command = body.fresh_var(construction.ty.clone());
    assign.push(Instr::NewObj {
        dst: command,
        ctor: construction.ctor.clone(),
        args: ctor_args,
    });
    assign.push(Instr::Call {
        dst: None,
        method: guard.setter.clone(),
        receiver: Some(Operand::THIS),
        args: vec![Operand::Var(command)],
        dispatch: Dispatch::Direct,
    });

    let last_return = body.return_blocks().last().copied();
    match (order, last_return) {
        (InitializerOrder::Declaration, Some(ret)) => {
            // ret: [..., test] -> assign -> tail: return
            let assign_id = body.next_block_id();
            let tail_id = BlockId::new(assign_id.raw() + 1);
            let block = body.block_mut(ret);
            block.body.extend(test);
            let terminator = std::mem::replace(
                &mut block.terminator,
                Terminator::Branch {
                    cond: Operand::Var(is_null),
                    then_block: assign_id,
                    else_block: tail_id,
                },
            );
            body.push_block(assign, Terminator::Jump { target: tail_id });
            body.push_block(Vec::new(), terminator);
        }
        _ => {
            // test -> assign -> old entry
            let old_entry = body.entry;
            let guard_id = body.next_block_id();
            let assign_id = BlockId::new(guard_id.raw() + 1);
            body.push_block(
                test,
                Terminator::Branch {
                    cond: Operand::Var(is_null),
                    then_block: assign_id,
                    else_block: old_entry,
                },
            );
            body.push_block(assign, Terminator::Jump { target: old_entry });
            body.entry = guard_id;
        }
    }
}

/// Call `init` before every return of each instance constructor of `ty`
/// that does not call it yet. Returns the number of constructors changed;
/// a constructor that never returns is left alone.
pub fn wire_constructors(module: &mut Module, ty: TypeId, init: MethodId) -> usize {
    let init_ref = MethodRef::def(init);
    let ctors: Vec<u32> = module.ty(ty).constructors().collect();
    let mut wired = 0;
    for index in ctors {
        let Some(body) = module.method_mut(MethodId { ty, index }).body.as_mut() else {
            continue;
        };
        let returns = body.return_blocks();
        if returns.is_empty() || body.calls(&init_ref) {
            continue;
        }
        for ret in returns {
            body.block_mut(ret).body.push(Instr::Call {
                dst: None,
                method: init_ref.clone(),
                receiver: Some(Operand::THIS),
                args: Vec::new(),
                dispatch: Dispatch::Direct,
            });
        }
        wired += 1;
    }
    wired
}
