//! Shared test utilities for weave passes. Only compiled in test builds.

use cmdr_ir::{
    AttrArg, Body, BodyBuilder, CustomAttribute, Dispatch, MethodDef, MethodFlags, MethodId,
    MethodRef, Module, Operand, Terminator, TypeDef, TypeFlags, TypeId, TypeRef,
};

use crate::scan::MarkerRole;
use crate::WeaveConfig;

/// A module named `App`.
pub(crate) fn module() -> Module {
    Module::new("App")
}

/// Public class `App.<name>` with a parameterless constructor calling
/// `object::.ctor`.
pub(crate) fn class(module: &mut Module, name: &str) -> TypeId {
    let ns = module.intern("App");
    let name = module.intern(name);
    let ty = module.add_type(TypeDef::new(ns, name, TypeFlags::PUBLIC));
    add_ctor(module, ty);
    ty
}

pub(crate) fn add_ctor(module: &mut Module, ty: TypeId) -> MethodId {
    let ctor = module.intern(".ctor");
    let object_ctor = MethodRef::External {
        owner: TypeRef::Object,
        name: ctor,
        params: Vec::new(),
        ret: TypeRef::Void,
    };
    let mut b = BodyBuilder::new();
    b.call(object_ctor, Some(Operand::THIS), Vec::new(), Dispatch::Direct);
    b.ret(None);
    module.add_method(
        ty,
        MethodDef::new(ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void).with_body(b.finish()),
    )
}

/// Marker attribute with the default configured name.
pub(crate) fn marker(module: &Module, role: MarkerRole, command: &str) -> CustomAttribute {
    let config = WeaveConfig::default();
    let ty = match role {
        MarkerRole::Execute => config.execute_attribute,
        MarkerRole::CanExecute => config.can_execute_attribute,
    };
    CustomAttribute::new(
        module.intern(&ty),
        vec![AttrArg::String(module.intern(command))],
    )
}

/// Public instance method with the given shape and attributes. The body
/// returns `true` for `bool` methods and nothing otherwise.
pub(crate) fn method(
    module: &mut Module,
    ty: TypeId,
    name: &str,
    ret: TypeRef,
    params: &[TypeRef],
    attributes: Vec<CustomAttribute>,
) -> MethodId {
    let name = module.intern(name);
    let value = (ret == TypeRef::Bool).then_some(Operand::Bool(true));
    let mut body = Body::returning();
    body.blocks[0].terminator = Terminator::Return { value };

    let mut def = MethodDef::new(name, MethodFlags::PUBLIC | MethodFlags::HIDE_BY_SIG, ret)
        .with_body(body);
    for (i, p) in params.iter().enumerate() {
        def = def.with_param(module.intern(&format!("arg{i}")), p.clone());
    }
    def.attributes = attributes;
    module.add_method(ty, def)
}

/// `void <name>()` marked as the execute handler of `command`.
pub(crate) fn execute_handler(module: &mut Module, ty: TypeId, name: &str, command: &str) -> MethodId {
    let attr = marker(module, MarkerRole::Execute, command);
    method(module, ty, name, TypeRef::Void, &[], vec![attr])
}

/// `bool <name>(object)` marked as the can-execute handler of `command`.
pub(crate) fn can_execute_handler(module: &mut Module, ty: TypeId, name: &str, command: &str) -> MethodId {
    let attr = marker(module, MarkerRole::CanExecute, command);
    method(module, ty, name, TypeRef::Bool, &[TypeRef::Object], vec![attr])
}
