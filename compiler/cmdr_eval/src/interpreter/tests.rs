use pretty_assertions::assert_eq;

use cmdr_ir::{
    BodyBuilder, FieldDef, FieldFlags, FieldId, MethodDef, MethodFlags, TypeDef, TypeFlags,
};

use super::*;

/// `App.Target` with two bool fields, a parameterless constructor and
/// `void SetA()` / `void SetB(object)` setting one field each.
struct Fixture {
    module: Module,
    ty: TypeId,
    set_a: MethodId,
    set_b: MethodId,
}

fn object_ctor(m: &Module) -> MethodRef {
    MethodRef::External {
        owner: TypeRef::Object,
        name: m.intern(".ctor"),
        params: Vec::new(),
        ret: TypeRef::Void,
    }
}

fn field(m: &mut Module, ty: TypeId, name: &str, field_ty: TypeRef) -> FieldId {
    let name = m.intern(name);
    m.add_field(
        ty,
        FieldDef {
            name,
            ty: field_ty,
            flags: FieldFlags::PRIVATE,
        },
    )
}

fn setter_of(m: &mut Module, ty: TypeId, name: &str, field: FieldId, params: &[TypeRef]) -> MethodId {
    let mut b = BodyBuilder::new();
    b.store_field(Operand::THIS, field, Operand::Bool(true));
    b.ret(None);
    let mut def = MethodDef::new(m.intern(name), MethodFlags::PUBLIC, TypeRef::Void).with_body(b.finish());
    for p in params {
        def = def.with_param(m.intern("arg"), p.clone());
    }
    m.add_method(ty, def)
}

fn fixture() -> Fixture {
    let mut m = Module::new("App");
    let ns = m.intern("App");
    let name = m.intern("Target");
    let ty = m.add_type(TypeDef::new(ns, name, TypeFlags::PUBLIC));
    let a = field(&mut m, ty, "a", TypeRef::Bool);
    let b_field = field(&mut m, ty, "b", TypeRef::Bool);

    let mut b = BodyBuilder::new();
    b.call(object_ctor(&m), Some(Operand::THIS), Vec::new(), Dispatch::Direct);
    b.ret(None);
    let ctor = m.intern(".ctor");
    m.add_method(
        ty,
        MethodDef::new(ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void).with_body(b.finish()),
    );
    let set_a = setter_of(&mut m, ty, "SetA", a, &[]);
    let set_b = setter_of(&mut m, ty, "SetB", b_field, &[TypeRef::Object]);
    Fixture {
        module: m,
        ty,
        set_a,
        set_b,
    }
}

fn action_of(m: &Module, arg: TypeRef) -> TypeRef {
    TypeRef::generic(TypeRef::Named(m.intern("System.Action`1")), [arg])
}

/// Static `object Make(Target target)` returning `Delegate.op(bind(SetA), bind(SetB))`
/// or a single binding when `op` is `None`.
fn delegate_factory(f: &mut Fixture, op: Option<&str>) -> MethodId {
    let m = &mut f.module;
    let action = action_of(m, TypeRef::Object);
    let delegate = TypeRef::Named(m.intern("System.Delegate"));
    let mut b = BodyBuilder::new();
    let first = b.bind_delegate(action.clone(), Operand::Arg(0), MethodRef::def(f.set_a));
    let result = match op {
        None => first,
        Some(op) => {
            let second = b.bind_delegate(action, Operand::Arg(0), MethodRef::def(f.set_b));
            b.call_value(
                delegate.clone(),
                MethodRef::External {
                    owner: delegate.clone(),
                    name: m.intern(op),
                    params: vec![delegate.clone(), delegate.clone()],
                    ret: delegate,
                },
                None,
                vec![Operand::Var(first), Operand::Var(second)],
                Dispatch::Direct,
            )
        }
    };
    b.ret(Some(Operand::Var(result)));
    let name = m.intern("Make");
    let target = m.intern("target");
    m.add_method(
        f.ty,
        MethodDef::new(name, MethodFlags::PUBLIC | MethodFlags::STATIC, TypeRef::Object)
            .with_param(target, TypeRef::Def(f.ty))
            .with_body(b.finish()),
    )
}

#[test]
fn constructs_with_default_fields() {
    let f = fixture();
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();
    assert_eq!(interp.field(obj, "a").unwrap(), Value::Bool(false));
    assert_eq!(interp.type_of(Value::Ref(obj)), Some(TypeRef::Def(f.ty)));

    interp.call_by_name(obj, "SetA", Vec::new()).unwrap();
    assert_eq!(interp.field(obj, "a").unwrap(), Value::Bool(true));
    assert_eq!(interp.field(obj, "b").unwrap(), Value::Bool(false));
}

#[test]
fn missing_method_and_field_are_errors() {
    let f = fixture();
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();
    assert!(matches!(
        interp.call_by_name(obj, "SetA", vec![Value::Null]),
        Err(EvalError::MethodNotFound { arity: 1, .. })
    ));
    assert!(matches!(interp.field(obj, "c"), Err(EvalError::NoField { .. })));
    assert!(matches!(
        interp.set_field(obj, "c", Value::Null),
        Err(EvalError::NoField { .. })
    ));
}

#[test]
fn set_field_overwrites_instance_state() {
    let mut f = fixture();
    field(&mut f.module, f.ty, "count", TypeRef::Int32);
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();
    assert_eq!(interp.field(obj, "count").unwrap().as_int(), Some(0));

    interp.set_field(obj, "count", Value::Int(7)).unwrap();
    assert_eq!(interp.field(obj, "count").unwrap().as_int(), Some(7));
}

#[test]
fn delegate_drops_extra_arguments() {
    let mut f = fixture();
    let make = delegate_factory(&mut f, None);
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();

    let delegate = interp.call(make, None, vec![Value::Ref(obj)]).unwrap();
    interp.invoke_delegate(delegate, vec![Value::Int(5)]).unwrap();
    assert_eq!(interp.field(obj, "a").unwrap(), Value::Bool(true));
}

#[test]
fn combined_delegates_run_in_order() {
    let mut f = fixture();
    let make = delegate_factory(&mut f, Some("Combine"));
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();

    let delegate = interp.call(make, None, vec![Value::Ref(obj)]).unwrap();
    interp.invoke_delegate(delegate, vec![Value::Null]).unwrap();
    assert_eq!(interp.field(obj, "a").unwrap(), Value::Bool(true));
    assert_eq!(interp.field(obj, "b").unwrap(), Value::Bool(true));
}

#[test]
fn removing_an_absent_binding_keeps_the_source() {
    let mut f = fixture();
    let make = delegate_factory(&mut f, Some("Remove"));
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();

    // SetB was never part of the SetA delegate.
    let delegate = interp.call(make, None, vec![Value::Ref(obj)]).unwrap();
    interp.invoke_delegate(delegate, Vec::new()).unwrap();
    assert_eq!(interp.field(obj, "a").unwrap(), Value::Bool(true));
    assert_eq!(interp.field(obj, "b").unwrap(), Value::Bool(false));
}

#[test]
fn remove_of_whole_list_yields_null() {
    let f = fixture();
    let mut interp = Interpreter::new(&f.module);
    let obj = interp.construct(f.ty, Vec::new()).unwrap();
    let action = action_of(&f.module, TypeRef::Object);
    let d = Value::Ref(interp.heap.alloc(HeapObject::Delegate {
        ty: action,
        invocation: smallvec::smallvec![Binding {
            target: Value::Ref(obj),
            method: MethodRef::def(f.set_a),
        }],
    }));

    let both = interp.combine(d, d).unwrap();
    let one = interp.remove(both, d).unwrap();
    assert!(!one.is_null());
    assert_eq!(interp.remove(one, d).unwrap(), Value::Null);
    assert_eq!(interp.combine(Value::Null, d).unwrap(), d);
}

#[test]
fn throw_surfaces_exception() {
    let mut f = fixture();
    let m = &mut f.module;
    let exception = TypeRef::Named(m.intern("System.ArgumentNullException"));
    let mut b = BodyBuilder::new();
    let e = b.new_obj(
        exception.clone(),
        MethodRef::External {
            owner: exception,
            name: m.intern(".ctor"),
            params: vec![TypeRef::String],
            ret: TypeRef::Void,
        },
        vec![Operand::Str(m.intern("execute"))],
    );
    b.throw(Operand::Var(e));
    let name = m.intern("Fail");
    let fail = m.add_method(
        f.ty,
        MethodDef::new(name, MethodFlags::PUBLIC | MethodFlags::STATIC, TypeRef::Void)
            .with_body(b.finish()),
    );

    let mut interp = Interpreter::new(&f.module);
    assert_eq!(
        interp.call(fail, None, Vec::new()),
        Err(EvalError::Thrown {
            ty: "System.ArgumentNullException".to_owned(),
            message: "execute".to_owned(),
        })
    );
}

#[test]
fn conversions_check_runtime_values() {
    let f = fixture();
    let interp = Interpreter::new(&f.module);
    assert_eq!(interp.convert(Value::Int(3), &TypeRef::Int32), Ok(Value::Int(3)));
    assert_eq!(interp.convert(Value::Int(3), &TypeRef::Object), Ok(Value::Int(3)));
    assert!(matches!(
        interp.convert(Value::Null, &TypeRef::Int32),
        Err(EvalError::NullReference { .. })
    ));
    assert!(matches!(
        interp.convert(Value::Bool(true), &TypeRef::Int32),
        Err(EvalError::InvalidCast { .. })
    ));
    assert!(matches!(
        interp.convert(Value::Int(1), &TypeRef::Def(f.ty)),
        Err(EvalError::InvalidCast { .. })
    ));
}

#[test]
fn generic_parameters_follow_the_instance() {
    let mut m = Module::new("App");
    let name = m.intern("Box`1");
    let mut def = TypeDef::new(Name::EMPTY, name, TypeFlags::PUBLIC);
    def.generic_params.push(m.intern("T"));
    let ty = m.add_type(def);
    let ctor = m.intern(".ctor");
    let mut b = BodyBuilder::new();
    b.ret(None);
    m.add_method(
        ty,
        MethodDef::new(ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void).with_body(b.finish()),
    );
    // object Unwrap(object value) => (T)value
    let mut b = BodyBuilder::new();
    let v = b.convert(Operand::Arg(1), TypeRef::GenericParam(0));
    b.ret(Some(Operand::Var(v)));
    let unwrap = m.intern("Unwrap");
    let value = m.intern("value");
    m.add_method(
        ty,
        MethodDef::new(unwrap, MethodFlags::PUBLIC, TypeRef::Object)
            .with_param(value, TypeRef::Object)
            .with_body(b.finish()),
    );

    let mut interp = Interpreter::new(&m);
    let boxed = interp.construct_generic(ty, [TypeRef::Int32], Vec::new()).unwrap();
    assert_eq!(
        interp.type_of(Value::Ref(boxed)),
        Some(TypeRef::generic(TypeRef::Def(ty), [TypeRef::Int32]))
    );
    assert_eq!(
        interp.call_by_name(boxed, "Unwrap", vec![Value::Int(7)]),
        Ok(Value::Int(7))
    );
    assert!(matches!(
        interp.call_by_name(boxed, "Unwrap", vec![Value::Bool(true)]),
        Err(EvalError::InvalidCast { .. })
    ));
}

#[test]
fn runaway_loops_hit_the_step_limit() {
    let mut f = fixture();
    let mut b = BodyBuilder::new();
    let spin = b.new_block();
    b.jump(spin);
    b.position_at(spin);
    b.jump(spin);
    let name = f.module.intern("Spin");
    let method = f.module.add_method(
        f.ty,
        MethodDef::new(name, MethodFlags::PUBLIC | MethodFlags::STATIC, TypeRef::Void)
            .with_body(b.finish()),
    );

    let mut interp = Interpreter::new(&f.module).with_step_limit(100);
    assert_eq!(interp.call(method, None, Vec::new()), Err(EvalError::StepLimit(100)));
}

#[test]
fn unbounded_recursion_hits_the_depth_limit() {
    let mut f = fixture();
    let name = f.module.intern("Recurse");
    let method = f.module.add_method(
        f.ty,
        MethodDef::new(name, MethodFlags::PUBLIC | MethodFlags::STATIC, TypeRef::Void),
    );
    let mut b = BodyBuilder::new();
    b.call(MethodRef::def(method), None, Vec::new(), Dispatch::Direct);
    b.ret(None);
    f.module.method_mut(method).body = Some(b.finish());

    let mut interp = Interpreter::new(&f.module).with_depth_limit(8);
    assert_eq!(interp.call(method, None, Vec::new()), Err(EvalError::DepthLimit(8)));
}

#[test]
fn instance_call_on_null_is_a_null_reference() {
    let f = fixture();
    let mut interp = Interpreter::new(&f.module);
    assert!(matches!(
        interp.call(f.set_a, Some(Value::Null), Vec::new()),
        Err(EvalError::NullReference { .. })
    ));
    assert!(matches!(
        interp.execute(Value::Null, Value::Null),
        Err(EvalError::NullReference { .. })
    ));
}
