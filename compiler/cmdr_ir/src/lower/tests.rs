use pretty_assertions::assert_eq;

use crate::{
    BodyBuilder, FieldDef, FieldFlags, MethodDef, MethodFlags, Module, Name, TypeDef, TypeFlags,
};

use super::*;

fn module_with_type() -> (Module, crate::TypeId) {
    let mut module = Module::new("Test");
    let name = module.intern("Owner");
    let ty = module.add_type(TypeDef::new(Name::EMPTY, name, TypeFlags::PUBLIC));
    (module, ty)
}

#[test]
fn guarded_assignment_shape() {
    let (mut module, ty) = module_with_type();
    let field_name = module.intern("_cmd");
    let field = module.add_field(
        ty,
        FieldDef {
            name: field_name,
            ty: TypeRef::Object,
            flags: FieldFlags::PRIVATE,
        },
    );

    // if (this._cmd == null) { this._cmd = "x"; } return;
    let mut b = BodyBuilder::new();
    let then_block = b.new_block();
    let exit = b.new_block();
    let current = b.load_field(TypeRef::Object, Operand::THIS, field);
    let is_null = b.is_null(Operand::Var(current));
    b.branch(Operand::Var(is_null), then_block, exit);
    b.position_at(then_block);
    let text = module.intern("x");
    b.store_field(Operand::THIS, field, Operand::Str(text));
    b.jump(exit);
    b.position_at(exit);
    b.ret(None);
    let body = b.finish();

    let lowered = lower_body(&module, &body);
    assert_eq!(
        lowered.ops,
        vec![
            Op::Ldarg(0),
            Op::Ldfld(field),
            Op::Stloc(0),
            Op::Ldloc(0),
            Op::Ldnull,
            Op::Ceq,
            Op::Stloc(1),
            Op::Ldloc(1),
            Op::Brtrue(then_block),
            Op::Br(exit),
            Op::Ldarg(0),
            Op::Ldstr(text),
            Op::Stfld(field),
            Op::Ret,
        ]
    );
    assert_eq!(lowered.label(then_block), 10);
    assert_eq!(lowered.label(exit), 13);
    assert_eq!(lowered.locals, vec![TypeRef::Object, TypeRef::Bool]);
}

#[test]
fn entry_block_is_laid_out_first() {
    let (module, _) = module_with_type();
    let mut body = Body::returning();
    let old_entry = body.entry;
    let new_entry = body.push_block(Vec::new(), Terminator::Jump { target: old_entry });
    body.entry = new_entry;

    // The jump falls through to the old entry, so it is elided.
    let lowered = lower_body(&module, &body);
    assert_eq!(lowered.ops, vec![Op::Ret]);
    assert_eq!(lowered.label(new_entry), 0);
    assert_eq!(lowered.label(old_entry), 0);
}

#[test]
fn delegate_binding_and_conversions() {
    let (mut module, ty) = module_with_type();
    let on_save = module.intern("OnSave");
    let m = module.add_method(ty, MethodDef::new(on_save, MethodFlags::PUBLIC, TypeRef::Void));
    let action = TypeRef::Named(module.intern("System.Action"));
    let text_ty = TypeRef::Named(module.intern("System.Uri"));

    let mut b = BodyBuilder::new();
    b.bind_delegate(action.clone(), Operand::THIS, MethodRef::def(m));
    b.convert(Operand::Arg(1), TypeRef::Int32);
    b.convert(Operand::Arg(1), text_ty.clone());
    b.convert(Operand::Arg(1), TypeRef::Object);
    b.ret(None);
    let lowered = lower_body(&module, &b.finish());

    let ctor = MethodRef::External {
        owner: action,
        name: module.intern(".ctor"),
        params: vec![TypeRef::Object, TypeRef::IntPtr],
        ret: TypeRef::Void,
    };
    assert_eq!(
        lowered.ops,
        vec![
            Op::Ldarg(0),
            Op::Ldftn(MethodRef::def(m)),
            Op::Newobj(ctor),
            Op::Stloc(0),
            Op::Ldarg(1),
            Op::UnboxAny(TypeRef::Int32),
            Op::Stloc(1),
            Op::Ldarg(1),
            Op::Castclass(text_ty),
            Op::Stloc(2),
            Op::Ldarg(1),
            Op::Stloc(3),
            Op::Ret,
        ]
    );
}

#[test]
fn discarded_call_result_is_popped() {
    let (mut module, ty) = module_with_type();
    let can_save = module.intern("CanSave");
    let on_save = module.intern("OnSave");
    let pred = module.add_method(ty, MethodDef::new(can_save, MethodFlags::PUBLIC, TypeRef::Bool));
    let act = module.add_method(
        ty,
        MethodDef::new(on_save, MethodFlags::PUBLIC | MethodFlags::VIRTUAL, TypeRef::Void),
    );

    let mut b = BodyBuilder::new();
    b.call(MethodRef::def(pred), Some(Operand::THIS), vec![], Dispatch::Direct);
    b.call(MethodRef::def(act), Some(Operand::THIS), vec![], Dispatch::Virtual);
    b.ret(None);
    let lowered = lower_body(&module, &b.finish());

    assert_eq!(
        lowered.ops,
        vec![
            Op::Ldarg(0),
            Op::Call(MethodRef::def(pred)),
            Op::Pop,
            Op::Ldarg(0),
            Op::Callvirt(MethodRef::def(act)),
            Op::Ret,
        ]
    );
}
