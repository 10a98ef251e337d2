//! Module fixtures for weave scenarios.

#![allow(dead_code)]

use cmdr_ir::{
    AssemblyRef, AttrArg, BodyBuilder, CustomAttribute, Dispatch, FieldDef, FieldFlags, FieldId,
    MethodDef, MethodFlags, MethodId, MethodRef, Module, Name, Operand, TypeDef, TypeFlags,
    TypeId, TypeRef,
};

pub const EXECUTE_MARKER: &str = "Commander.OnCommandAttribute";
pub const CAN_EXECUTE_MARKER: &str = "Commander.OnCommandCanExecuteAttribute";

/// A module `App` referencing `Commander`, holding `App.MainViewModel`.
pub struct Fixture {
    pub module: Module,
    pub vm: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut module = Module::new("App");
        let commander = module.intern("Commander");
        module.references.push(AssemblyRef { name: commander });
        let vm = class(&mut module, "MainViewModel");
        Fixture { module, vm }
    }

    pub fn name(&self, s: &str) -> Name {
        self.module.intern(s)
    }

    pub fn field(&mut self, name: &str, ty: TypeRef) -> FieldId {
        add_field(&mut self.module, self.vm, name, ty)
    }

    /// `void name(params)` marked for `command`. The body sets the bool
    /// field `{name}_called` and stores its argument, if any, in the object
    /// field `{name}_arg`.
    pub fn execute_handler(&mut self, name: &str, command: &str, params: &[TypeRef]) -> MethodId {
        let called = self.field(&format!("{name}_called"), TypeRef::Bool);
        let arg = (!params.is_empty()).then(|| self.field(&format!("{name}_arg"), TypeRef::Object));
        let mut b = BodyBuilder::new();
        b.store_field(Operand::THIS, called, Operand::Bool(true));
        if let Some(arg) = arg {
            b.store_field(Operand::THIS, arg, Operand::Arg(1));
        }
        b.ret(None);
        let marker = marker(&self.module, EXECUTE_MARKER, command);
        self.method(name, TypeRef::Void, params, b.finish(), marker)
    }

    /// `bool name(object parameter) => parameter == null` marked for `command`.
    pub fn can_execute_handler(&mut self, name: &str, command: &str) -> MethodId {
        let mut b = BodyBuilder::new();
        let is_null = b.is_null(Operand::Arg(1));
        b.ret(Some(Operand::Var(is_null)));
        let marker = marker(&self.module, CAN_EXECUTE_MARKER, command);
        self.method(name, TypeRef::Bool, &[TypeRef::Object], b.finish(), marker)
    }

    fn method(
        &mut self,
        name: &str,
        ret: TypeRef,
        params: &[TypeRef],
        body: cmdr_ir::Body,
        marker: CustomAttribute,
    ) -> MethodId {
        let mut def = MethodDef::new(self.name(name), MethodFlags::PUBLIC | MethodFlags::HIDE_BY_SIG, ret)
            .with_body(body)
            .with_attribute(marker);
        for (i, p) in params.iter().enumerate() {
            def = def.with_param(self.name(&format!("p{i}")), p.clone());
        }
        self.module.add_method(self.vm, def)
    }

    /// A second constructor `.ctor(object)` on the view model.
    pub fn add_ctor_with_param(&mut self) -> MethodId {
        let mut b = BodyBuilder::new();
        b.call(object_ctor(&self.module), Some(Operand::THIS), Vec::new(), Dispatch::Direct);
        b.ret(None);
        let def = MethodDef::new(self.name(".ctor"), MethodFlags::CONSTRUCTOR, TypeRef::Void)
            .with_param(self.name("seed"), TypeRef::Object)
            .with_body(b.finish());
        self.module.add_method(self.vm, def)
    }

    /// Every type definition, for before/after comparisons.
    pub fn snapshot(&self) -> Vec<TypeDef> {
        self.module
            .all_types()
            .into_iter()
            .map(|ty| self.module.ty(ty).clone())
            .collect()
    }
}

pub fn marker(module: &Module, attribute: &str, command: &str) -> CustomAttribute {
    CustomAttribute::new(
        module.intern(attribute),
        vec![AttrArg::String(module.intern(command))],
    )
}

pub fn object_ctor(module: &Module) -> MethodRef {
    MethodRef::External {
        owner: TypeRef::Object,
        name: module.intern(".ctor"),
        params: Vec::new(),
        ret: TypeRef::Void,
    }
}

pub fn command_interface(module: &Module) -> TypeRef {
    TypeRef::Named(module.intern("System.Windows.Input.ICommand"))
}

/// Public class `App.{name}` with a parameterless constructor.
pub fn class(module: &mut Module, name: &str) -> TypeId {
    let ns = module.intern("App");
    let name = module.intern(name);
    let ty = module.add_type(TypeDef::new(ns, name, TypeFlags::PUBLIC));
    let mut b = BodyBuilder::new();
    b.call(object_ctor(module), Some(Operand::THIS), Vec::new(), Dispatch::Direct);
    b.ret(None);
    let ctor = module.intern(".ctor");
    module.add_method(
        ty,
        MethodDef::new(ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void).with_body(b.finish()),
    );
    ty
}

pub fn add_field(module: &mut Module, ty: TypeId, name: &str, field_ty: TypeRef) -> FieldId {
    let name = module.intern(name);
    module.add_field(
        ty,
        FieldDef {
            name,
            ty: field_ty,
            flags: FieldFlags::PRIVATE,
        },
    )
}

/// `App.RelayCommand : ICommand` with `.ctor(Action execute)`,
/// `Execute(object)` invoking it and `CanExecute(object)` returning true.
pub fn relay_command(module: &mut Module) -> TypeId {
    let ns = module.intern("App");
    let name = module.intern("RelayCommand");
    let mut def = TypeDef::new(ns, name, TypeFlags::PUBLIC);
    def.interfaces.push(command_interface(module));
    let ty = module.add_type(def);
    let action = TypeRef::Named(module.intern("System.Action"));
    let execute = add_field(module, ty, "_execute", action.clone());

    let mut b = BodyBuilder::new();
    b.call(object_ctor(module), Some(Operand::THIS), Vec::new(), Dispatch::Direct);
    b.store_field(Operand::THIS, execute, Operand::Arg(1));
    b.ret(None);
    let ctor = MethodDef::new(module.intern(".ctor"), MethodFlags::CONSTRUCTOR, TypeRef::Void)
        .with_param(module.intern("execute"), action.clone())
        .with_body(b.finish());
    module.add_method(ty, ctor);

    let mut b = BodyBuilder::new();
    let delegate = b.load_field(action.clone(), Operand::THIS, execute);
    b.call(
        MethodRef::External {
            owner: action,
            name: module.intern("Invoke"),
            params: Vec::new(),
            ret: TypeRef::Void,
        },
        Some(Operand::Var(delegate)),
        Vec::new(),
        Dispatch::Virtual,
    );
    b.ret(None);
    let parameter = module.intern("parameter");
    let method = MethodDef::new(module.intern("Execute"), MethodFlags::INTERFACE_IMPL, TypeRef::Void)
        .with_param(parameter, TypeRef::Object)
        .with_body(b.finish());
    module.add_method(ty, method);

    let mut b = BodyBuilder::new();
    b.ret(Some(Operand::Bool(true)));
    let method = MethodDef::new(module.intern("CanExecute"), MethodFlags::INTERFACE_IMPL, TypeRef::Bool)
        .with_param(parameter, TypeRef::Object)
        .with_body(b.finish());
    module.add_method(ty, method);
    ty
}
