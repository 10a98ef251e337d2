//! Nested implementation synthesizer (fallback path).
//!
//! One private nested type per command, calling the owner's handlers
//! directly instead of through delegates:
//!
//! ```text
//! class Owner
//! {
//!     class <>__NestedCommandImplementationForSave : ICommand
//!     {
//!         readonly Owner _owner;
//!         event EventHandler CanExecuteChanged;
//!         .ctor(Owner owner) { _owner = owner; }
//!         void Execute(object parameter) => _owner.OnSave((T)parameter);
//!         bool CanExecute(object parameter) => _owner.CanSave(parameter);  // or `true`
//!     }
//! }
//! ```
//!
//! The argument is passed through when the handler takes `object`,
//! converted when it takes another type, and dropped when it takes none.

use cmdr_ir::{
    BodyBuilder, FieldDef, FieldFlags, MethodDef, MethodFlags, MethodId, MethodRef, Module, Name,
    Operand, TypeDef, TypeFlags, TypeId, TypeRef, VarId,
};

use crate::assets::Assets;
use crate::init::check_handler_owner;
use crate::members::{
    add_can_execute_changed_event, can_execute_signature, constructor_prologue, execute_signature,
    handler_argument, handler_dispatch,
};
use crate::WeaveError;

/// Prefix of every nested implementation type name.
pub const NESTED_PREFIX: &str = "<>__NestedCommandImplementationFor";

/// Name of the nested implementation of `command`.
pub fn nested_type_name(command: &str) -> String {
    format!("{NESTED_PREFIX}{command}")
}

/// Result of [`ensure_nested_command`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NestedCommand {
    pub ty: TypeId,
    /// The single `.ctor(owner)`.
    pub ctor: MethodId,
    pub created: bool,
}

/// Find or generate the nested implementation of `command` inside `owner`.
///
/// `execute` is the selected execute handler; `can_execute` the selected
/// can-execute handler, if any.
pub fn ensure_nested_command(
    module: &mut Module,
    assets: &Assets,
    owner: TypeId,
    command: &str,
    execute: MethodId,
    can_execute: Option<MethodId>,
) -> Result<NestedCommand, WeaveError> {
    for handler in std::iter::once(execute).chain(can_execute) {
        check_handler_owner(module, owner, handler)?;
    }
    let type_name = nested_type_name(command);
    let name = module.intern(&type_name);
    let existing = module
        .ty(owner)
        .nested
        .iter()
        .copied()
        .find(|&id| module.ty(id).name == name);
    if let Some(ty) = existing {
        let ctor = module
            .ty(ty)
            .constructors()
            .find(|&index| module.method(MethodId { ty, index }).params.len() == 1)
            .ok_or_else(|| WeaveError::GeneratedTypeShape {
                ty: module.full_name(ty),
                detail: "expected a one-argument constructor".to_owned(),
            })?;
        tracing::debug!(ty = %module.full_name(ty), "reusing nested command type");
        return Ok(NestedCommand {
            ty,
            ctor: MethodId { ty, index: ctor },
            created: false,
        });
    }

    let mut def = TypeDef::new(
        Name::EMPTY,
        name,
        TypeFlags::SPECIAL_NAME | TypeFlags::NESTED_PRIVATE | TypeFlags::BEFORE_FIELD_INIT,
    );
    def.interfaces.push(assets.command.clone());
    let ty = module.add_nested_type(owner, def);
    let owner_ty = TypeRef::Def(owner);

    let owner_field = module.add_field(
        ty,
        FieldDef {
            name: module.intern("_owner"),
            ty: owner_ty.clone(),
            flags: FieldFlags::PRIVATE | FieldFlags::INIT_ONLY,
        },
    );
    add_can_execute_changed_event(module, assets, ty);

    // CanExecute(object)
    let mut b = BodyBuilder::new();
    match can_execute {
        None => b.ret(Some(Operand::Bool(true))),
        Some(handler) => {
            let target = b.load_field(owner_ty.clone(), Operand::THIS, owner_field);
            let args = handler_args(module, &mut b, handler);
            let result = b.call_value(
                TypeRef::Bool,
                MethodRef::def(handler),
                receiver(module, handler, target),
                args,
                handler_dispatch(module, handler),
            );
            b.ret(Some(Operand::Var(result)));
        }
    }
    module.add_method(ty, can_execute_signature(assets).with_body(b.finish()));

    // Execute(object)
    let mut b = BodyBuilder::new();
    let target = b.load_field(owner_ty.clone(), Operand::THIS, owner_field);
    let args = handler_args(module, &mut b, execute);
    b.call(
        MethodRef::def(execute),
        receiver(module, execute, target),
        args,
        handler_dispatch(module, execute),
    );
    b.ret(None);
    module.add_method(ty, execute_signature(assets).with_body(b.finish()));

    // .ctor(owner)
    let mut b = constructor_prologue(assets);
    b.store_field(Operand::THIS, owner_field, Operand::Arg(1));
    b.ret(None);
    let ctor = module.add_method(
        ty,
        MethodDef::new(assets.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void)
            .with_param(module.intern("owner"), owner_ty)
            .with_body(b.finish()),
    );

    tracing::debug!(ty = %module.full_name(ty), "generated nested command type");
    Ok(NestedCommand {
        ty,
        ctor,
        created: true,
    })
}

fn handler_args(module: &Module, b: &mut BodyBuilder, handler: MethodId) -> Vec<Operand> {
    match module.method(handler).params.first() {
        Some(param) => vec![handler_argument(b, &param.ty)],
        None => Vec::new(),
    }
}

/// Static handlers are called without a receiver.
fn receiver(module: &Module, handler: MethodId, target: VarId) -> Option<Operand> {
    (!module.method(handler).is_static()).then_some(Operand::Var(target))
}

#[cfg(test)]
mod tests;
