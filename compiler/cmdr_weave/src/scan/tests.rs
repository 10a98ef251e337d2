use pretty_assertions::assert_eq;

use cmdr_diagnostic::{DiagnosticQueue, ErrorCode, Severity};
use cmdr_ir::{AttrArg, CustomAttribute, TypeRef};

use super::*;
use crate::registry::CommandRegistry;
use crate::test_helpers::{can_execute_handler, class, execute_handler, marker, method, module};
use crate::{AttributeMatch, WeaveConfig};

struct Scanned {
    registry: CommandRegistry,
    queue: DiagnosticQueue,
}

fn scan(module: &Module, config: &WeaveConfig) -> Scanned {
    let mut cx = WeaveContext::new(module, config);
    scan_markers(&mut cx, module);
    Scanned {
        registry: cx.registry,
        queue: cx.queue,
    }
}

#[test]
fn aggregates_handlers_by_name() {
    let mut m = module();
    let vm = class(&mut m, "MainViewModel");
    let on_save = execute_handler(&mut m, vm, "OnSave", "Save");
    let can_save = can_execute_handler(&mut m, vm, "CanSave", "Save");
    let on_load = execute_handler(&mut m, vm, "OnLoad", "Load");

    let cx = scan(&m, &WeaveConfig::default());
    assert_eq!(cx.registry.len(), 2);

    let save = cx.registry.get(m.intern("Save")).unwrap();
    assert_eq!(save.declaring_type, vm);
    assert_eq!(save.execute_methods.as_slice(), &[on_save]);
    assert_eq!(save.can_execute_methods.as_slice(), &[can_save]);

    let load = cx.registry.get(m.intern("Load")).unwrap();
    assert_eq!(load.execute_methods.as_slice(), &[on_load]);
    assert!(cx.queue.is_empty());
}

#[test]
fn one_method_may_serve_several_commands() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let attrs = vec![
        marker(&m, MarkerRole::Execute, "Save"),
        marker(&m, MarkerRole::Execute, "SaveAll"),
    ];
    let on_save = method(&mut m, vm, "OnSave", TypeRef::Void, &[], attrs);

    let cx = scan(&m, &WeaveConfig::default());
    assert_eq!(cx.registry.len(), 2);
    for name in ["Save", "SaveAll"] {
        let cmd = cx.registry.get(m.intern(name)).unwrap();
        assert_eq!(cmd.execute_methods.as_slice(), &[on_save]);
    }
}

#[test]
fn two_parameter_execute_handler_is_rejected() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let attr = marker(&m, MarkerRole::Execute, "Save");
    method(
        &mut m,
        vm,
        "OnSave",
        TypeRef::Void,
        &[TypeRef::Int32, TypeRef::String],
        vec![attr],
    );

    let cx = scan(&m, &WeaveConfig::default());
    assert!(cx.registry.is_empty());

    let diags = cx.queue.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, ErrorCode::E1001);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(
        diags[0].notes,
        vec![
            "parameter[0]: System.Int32 arg0".to_owned(),
            "parameter[1]: System.String arg1".to_owned(),
        ]
    );
}

#[test]
fn out_parameter_is_rejected() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let attr = marker(&m, MarkerRole::Execute, "Save");
    let def = MethodDef::new(
        m.intern("OnSave"),
        cmdr_ir::MethodFlags::PUBLIC | cmdr_ir::MethodFlags::HIDE_BY_SIG,
        TypeRef::Void,
    )
    .with_out_param(m.intern("result"), TypeRef::Int32)
    .with_attribute(attr);
    m.add_method(vm, def);

    let cx = scan(&m, &WeaveConfig::default());
    assert!(cx.registry.is_empty());
    let diags = cx.queue.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].notes,
        vec!["parameter[0]: out System.Int32 result".to_owned()]
    );
}

#[test]
fn can_execute_shape_rules() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let bad_ret = marker(&m, MarkerRole::CanExecute, "A");
    method(&mut m, vm, "CanA", TypeRef::Void, &[], vec![bad_ret]);
    let bad_param = marker(&m, MarkerRole::CanExecute, "B");
    method(&mut m, vm, "CanB", TypeRef::Bool, &[TypeRef::Int32], vec![bad_param]);
    let ok = marker(&m, MarkerRole::CanExecute, "C");
    let can_c = method(&mut m, vm, "CanC", TypeRef::Bool, &[], vec![ok]);

    let cx = scan(&m, &WeaveConfig::default());
    assert_eq!(cx.registry.len(), 1);
    let c = cx.registry.get(m.intern("C")).unwrap();
    assert_eq!(c.can_execute_methods.as_slice(), &[can_c]);
    assert_eq!(cx.queue.warning_count(), 2);
    assert!(cx
        .queue
        .diagnostics()
        .iter()
        .all(|d| d.code == ErrorCode::E1002));
}

#[test]
fn unnamed_marker_is_reported() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let attr_ty = m.intern("Commander.OnCommandAttribute");
    let unnamed = CustomAttribute::new(attr_ty, vec![AttrArg::Int(1)]);
    method(&mut m, vm, "OnSave", TypeRef::Void, &[], vec![unnamed]);

    let cx = scan(&m, &WeaveConfig::default());
    assert!(cx.registry.is_empty());
    assert_eq!(cx.queue.diagnostics()[0].code, ErrorCode::E1003);
}

#[test]
fn simple_name_matching() {
    let mut m = module();
    let vm = class(&mut m, "Vm");
    let attr_ty = m.intern("Elsewhere.OnCommandAttribute");
    let save = m.intern("Save");
    let attr = CustomAttribute::new(attr_ty, vec![AttrArg::String(save)]);
    method(&mut m, vm, "OnSave", TypeRef::Void, &[], vec![attr]);

    assert!(scan(&m, &WeaveConfig::default()).registry.is_empty());
    let simple = WeaveConfig::default().with_attribute_match(AttributeMatch::SimpleName);
    assert_eq!(scan(&m, &simple).registry.len(), 1);
}

#[test]
fn declaring_type_is_first_discovery() {
    let mut m = module();
    let first = class(&mut m, "First");
    let second = class(&mut m, "Second");
    // Can-execute in the first type is discovered before the execute
    // handler in the second one.
    can_execute_handler(&mut m, first, "CanSave", "Save");
    execute_handler(&mut m, second, "OnSave", "Save");

    let cx = scan(&m, &WeaveConfig::default());
    assert_eq!(cx.registry.get(m.intern("Save")).unwrap().declaring_type, first);
}
