use pretty_assertions::assert_eq;

use cmdr_ir::lower::{lower_body, Op};
use cmdr_ir::Dispatch;

use super::*;
use crate::test_helpers::{can_execute_handler, class, execute_handler, method, module};
use crate::WeaveConfig;

fn method_named(m: &Module, ty: TypeId, name: Name) -> MethodId {
    MethodId {
        ty,
        index: m.ty(ty).find_method(name).unwrap(),
    }
}

#[test]
fn generates_nested_type_with_owner_field() {
    let mut m = module();
    let a = Assets::new(&m, &WeaveConfig::default());
    let vm = class(&mut m, "Vm");
    let on_save = execute_handler(&mut m, vm, "OnSave", "Save");

    let nested = ensure_nested_command(&mut m, &a, vm, "Save", on_save, None).unwrap();
    assert!(nested.created);
    assert_eq!(
        m.full_name(nested.ty),
        "App.Vm/<>__NestedCommandImplementationForSave"
    );
    assert_eq!(m.ty(vm).nested, vec![nested.ty]);

    let def = m.ty(nested.ty);
    assert!(def.flags.contains(TypeFlags::NESTED_PRIVATE));
    assert!(def.implements(&a.command));
    assert_eq!(m.str(def.fields[0].name), "_owner");
    assert_eq!(def.fields[0].ty, TypeRef::Def(vm));
    assert_eq!(m.method(nested.ctor).param_types(), vec![TypeRef::Def(vm)]);
}

#[test]
fn can_execute_without_handler_returns_true() {
    let mut m = module();
    let a = Assets::new(&m, &WeaveConfig::default());
    let vm = class(&mut m, "Vm");
    let on_save = execute_handler(&mut m, vm, "OnSave", "Save");
    let nested = ensure_nested_command(&mut m, &a, vm, "Save", on_save, None).unwrap();

    let can = method_named(&m, nested.ty, a.can_execute);
    let lowered = lower_body(&m, m.method(can).body.as_ref().unwrap());
    assert_eq!(lowered.ops, vec![Op::LdcI4(1), Op::Ret]);
}

#[test]
fn handlers_called_directly_with_conversion() {
    let mut m = module();
    let a = Assets::new(&m, &WeaveConfig::default());
    let vm = class(&mut m, "Vm");
    let attr = crate::test_helpers::marker(&m, crate::scan::MarkerRole::Execute, "Save");
    let on_save = method(&mut m, vm, "OnSave", TypeRef::Void, &[TypeRef::Int32], vec![attr]);
    let can_save = can_execute_handler(&mut m, vm, "CanSave", "Save");
    m.method_mut(on_save).flags |= MethodFlags::VIRTUAL;

    let nested = ensure_nested_command(&mut m, &a, vm, "Save", on_save, Some(can_save)).unwrap();

    let execute = method_named(&m, nested.ty, a.execute);
    let body = m.method(execute).body.as_ref().unwrap();
    let call = body
        .instructions()
        .find(|i| i.calls(&MethodRef::def(on_save)))
        .unwrap();
    assert!(matches!(
        call,
        cmdr_ir::Instr::Call {
            dispatch: Dispatch::Virtual,
            ..
        }
    ));
    let lowered = lower_body(&m, body);
    assert!(lowered.ops.contains(&Op::UnboxAny(TypeRef::Int32)));

    // `object` parameter: passed through untouched.
    let can = method_named(&m, nested.ty, a.can_execute);
    let lowered = lower_body(&m, m.method(can).body.as_ref().unwrap());
    assert!(!lowered
        .ops
        .iter()
        .any(|op| matches!(op, Op::UnboxAny(_) | Op::Castclass(_))));
    assert!(lowered.ops.contains(&Op::Call(MethodRef::def(can_save))));
}

#[test]
fn existing_nested_type_is_reused() {
    let mut m = module();
    let a = Assets::new(&m, &WeaveConfig::default());
    let vm = class(&mut m, "Vm");
    let on_save = execute_handler(&mut m, vm, "OnSave", "Save");

    let first = ensure_nested_command(&mut m, &a, vm, "Save", on_save, None).unwrap();
    let second = ensure_nested_command(&mut m, &a, vm, "Save", on_save, None).unwrap();
    assert!(!second.created);
    assert_eq!(first.ty, second.ty);
    assert_eq!(first.ctor, second.ctor);
    assert_eq!(m.ty(vm).nested.len(), 1);
}

#[test]
fn handler_of_another_type_is_rejected() {
    let mut m = module();
    let a = Assets::new(&m, &WeaveConfig::default());
    let vm = class(&mut m, "Vm");
    let other = class(&mut m, "Other");
    let on_save = execute_handler(&mut m, other, "OnSave", "Save");
    let types = m.type_count();

    let err = ensure_nested_command(&mut m, &a, vm, "Save", on_save, None).unwrap_err();
    assert_eq!(
        err,
        WeaveError::ForeignHandler {
            handler: m.display_method(on_save),
            owner: "App.Vm".to_owned(),
        }
    );
    assert_eq!(m.type_count(), types);
}
