//! Member synthesis shared by the generated implementation types.

use cmdr_ir::{
    BodyBuilder, Dispatch, EventDef, FieldDef, FieldFlags, FieldId, MethodDef, MethodFlags,
    MethodId, Module, Operand, TypeId, TypeRef,
};

use crate::assets::Assets;

/// Add a `CanExecuteChanged` event with a private backing field and
/// `add_`/`remove_` accessors built on `Delegate.Combine`/`Delegate.Remove`.
pub(crate) fn add_can_execute_changed_event(module: &mut Module, assets: &Assets, ty: TypeId) {
    let field = module.add_field(
        ty,
        FieldDef {
            name: assets.can_execute_changed,
            ty: assets.event_handler.clone(),
            flags: FieldFlags::PRIVATE,
        },
    );
    let add = add_event_accessor(module, assets, ty, field, assets.add_can_execute_changed, assets.combine);
    let remove = add_event_accessor(
        module,
        assets,
        ty,
        field,
        assets.remove_can_execute_changed,
        assets.remove,
    );
    module.add_event(
        ty,
        EventDef {
            name: assets.can_execute_changed,
            ty: assets.event_handler.clone(),
            field: Some(field.index),
            add: Some(add.index),
            remove: Some(remove.index),
        },
    );
}

/// `void name(EventHandler value) { this.field = (EventHandler)Delegate.op(this.field, value); }`
fn add_event_accessor(
    module: &mut Module,
    assets: &Assets,
    ty: TypeId,
    field: FieldId,
    name: cmdr_ir::Name,
    op: cmdr_ir::Name,
) -> MethodId {
    let handler = assets.event_handler.clone();
    let mut b = BodyBuilder::new();
    let current = b.load_field(handler.clone(), Operand::THIS, field);
    let combined = b.call_value(
        assets.delegate.clone(),
        assets.delegate_op(op),
        None,
        vec![Operand::Var(current), Operand::Arg(1)],
        Dispatch::Direct,
    );
    let cast = b.convert(Operand::Var(combined), handler.clone());
    b.store_field(Operand::THIS, field, Operand::Var(cast));
    b.ret(None);

    module.add_method(
        ty,
        MethodDef::new(
            name,
            MethodFlags::INTERFACE_IMPL | MethodFlags::SPECIAL_NAME,
            TypeRef::Void,
        )
        .with_param(assets.value, handler)
        .with_body(b.finish()),
    )
}

/// Signature of `Execute(object parameter)`.
pub(crate) fn execute_signature(assets: &Assets) -> MethodDef {
    MethodDef::new(assets.execute, MethodFlags::INTERFACE_IMPL, TypeRef::Void)
        .with_param(assets.parameter, TypeRef::Object)
}

/// Signature of `bool CanExecute(object parameter)`.
pub(crate) fn can_execute_signature(assets: &Assets) -> MethodDef {
    MethodDef::new(assets.can_execute, MethodFlags::INTERFACE_IMPL, TypeRef::Bool)
        .with_param(assets.parameter, TypeRef::Object)
}

/// Start a constructor body with the base `object` constructor call.
pub(crate) fn constructor_prologue(assets: &Assets) -> BodyBuilder {
    let mut b = BodyBuilder::new();
    b.call(assets.object_ctor(), Some(Operand::THIS), Vec::new(), Dispatch::Direct);
    b
}

/// Load the argument of `Execute`/`CanExecute` as `param`, converting
/// unless the handler takes `object`.
pub(crate) fn handler_argument(b: &mut BodyBuilder, param: &TypeRef) -> Operand {
    if param.is_object() {
        Operand::Arg(1)
    } else {
        Operand::Var(b.convert(Operand::Arg(1), param.clone()))
    }
}

/// Dispatch for calling a handler: virtual handlers are called virtually.
pub(crate) fn handler_dispatch(module: &Module, handler: MethodId) -> Dispatch {
    if module.method(handler).is_virtual() {
        Dispatch::Virtual
    } else {
        Dispatch::Direct
    }
}

