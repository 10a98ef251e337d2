//! Generic implementation synthesizer.
//!
//! Produces the module's single shared command implementation when the
//! module has none of its own:
//!
//! ```text
//! class <Commander_Fody>__DelegateCommand<TParameter> : ICommand
//! {
//!     readonly Predicate<TParameter> _canExecute;
//!     readonly Action<TParameter> _execute;
//!     event EventHandler CanExecuteChanged;
//!
//!     .ctor(Action<TParameter> execute, Predicate<TParameter> canExecute)
//!     {
//!         if (execute == null) throw new ArgumentNullException("execute");
//!         _execute = execute;
//!         _canExecute = canExecute;
//!     }
//!     .ctor(Action<TParameter> execute) : this(execute, null) {}
//!
//!     void Execute(object parameter) => _execute((TParameter)parameter);
//!     bool CanExecute(object parameter) =>
//!         _canExecute == null || _canExecute((TParameter)parameter);
//! }
//! ```
//!
//! The type is generated at most once per module and instantiated per
//! command with the execute handler's parameter type. A type of the same
//! name left by an earlier weave is reused after a shape check.

use smallvec::SmallVec;

use cmdr_ir::{
    BodyBuilder, Dispatch, FieldDef, FieldFlags, MethodDef, MethodFlags, MethodId, MethodRef,
    Module, Name, Operand, TypeDef, TypeFlags, TypeId, TypeRef,
};

use crate::assets::{Assets, Implementation, GENERATED_PREFIX};
use crate::members::{
    add_can_execute_changed_event, can_execute_signature, constructor_prologue, execute_signature,
};
use crate::WeaveError;

/// Name of the generated delegate command type (top level, no namespace).
pub const DELEGATE_COMMAND_NAME: &str = "<Commander_Fody>__DelegateCommand";

/// Find the delegate command from an earlier weave, or generate it.
pub fn ensure_delegate_command(module: &mut Module, assets: &Assets) -> Result<Implementation, WeaveError> {
    debug_assert!(DELEGATE_COMMAND_NAME.starts_with(GENERATED_PREFIX));
    if let Some(existing) = module.find_type(DELEGATE_COMMAND_NAME) {
        let implementation = check_existing(module, existing)?;
        tracing::debug!("reusing generated delegate command");
        return Ok(implementation);
    }
    let ty = generate(module, assets);
    tracing::info!(ty = ty.raw(), "generated delegate command type");
    Ok(Implementation {
        ty,
        constructors: module
            .ty(ty)
            .constructors()
            .map(|index| MethodId { ty, index })
            .collect(),
        generated: true,
    })
}

fn check_existing(module: &Module, ty: TypeId) -> Result<Implementation, WeaveError> {
    let def = module.ty(ty);
    let shape_error = |detail: &str| WeaveError::GeneratedTypeShape {
        ty: DELEGATE_COMMAND_NAME.to_owned(),
        detail: detail.to_owned(),
    };
    if def.generic_params.len() != 1 {
        return Err(shape_error("expected exactly one generic parameter"));
    }
    let constructors: SmallVec<[MethodId; 2]> =
        def.constructors().map(|index| MethodId { ty, index }).collect();
    let has_arity = |n: usize| {
        constructors
            .iter()
            .any(|&c| module.method(c).params.len() == n)
    };
    if !has_arity(1) || !has_arity(2) {
        return Err(shape_error("expected one- and two-argument constructors"));
    }
    Ok(Implementation {
        ty,
        constructors,
        generated: true,
    })
}

fn generate(module: &mut Module, assets: &Assets) -> TypeId {
    let name = module.intern(DELEGATE_COMMAND_NAME);
    let mut def = TypeDef::new(
        Name::EMPTY,
        name,
        TypeFlags::SPECIAL_NAME | TypeFlags::BEFORE_FIELD_INIT,
    );
    def.interfaces.push(assets.command.clone());
    def.generic_params.push(module.intern("TParameter"));
    let ty = module.add_type(def);

    let t = TypeRef::GenericParam(0);
    let action_t = TypeRef::generic(assets.action_of_t.clone(), [t.clone()]);
    let predicate_t = TypeRef::generic(assets.predicate_of_t.clone(), [t.clone()]);

    let readonly = FieldFlags::PRIVATE | FieldFlags::INIT_ONLY;
    let can_execute_field = module.add_field(
        ty,
        FieldDef {
            name: module.intern("_canExecute"),
            ty: predicate_t.clone(),
            flags: readonly,
        },
    );
    let execute_field = module.add_field(
        ty,
        FieldDef {
            name: module.intern("_execute"),
            ty: action_t.clone(),
            flags: readonly,
        },
    );

    let execute_param = module.intern("execute");
    let can_execute_param = module.intern("canExecute");

    // .ctor(execute, canExecute)
    let mut b = constructor_prologue(assets);
    let throw_block = b.new_block();
    let assign_block = b.new_block();
    let is_null = b.is_null(Operand::Arg(1));
    b.branch(Operand::Var(is_null), throw_block, assign_block);

    b.position_at(throw_block);
    let exception = b.new_obj(
        assets.argument_null_exception.clone(),
        assets.argument_null_ctor(),
        vec![Operand::Str(execute_param)],
    );
    b.throw(Operand::Var(exception));

    b.position_at(assign_block);
    b.store_field(Operand::THIS, execute_field, Operand::Arg(1));
    b.store_field(Operand::THIS, can_execute_field, Operand::Arg(2));
    b.ret(None);
    let main_ctor = module.add_method(
        ty,
        MethodDef::new(assets.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void)
            .with_param(execute_param, action_t.clone())
            .with_param(can_execute_param, predicate_t.clone())
            .with_body(b.finish()),
    );

    // .ctor(execute) : this(execute, null)
    let mut b = BodyBuilder::new();
    b.call(
        MethodRef::def(main_ctor),
        Some(Operand::THIS),
        vec![Operand::Arg(1), Operand::Null],
        Dispatch::Direct,
    );
    b.ret(None);
    module.add_method(
        ty,
        MethodDef::new(assets.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void)
            .with_param(execute_param, action_t.clone())
            .with_body(b.finish()),
    );

    // Execute(object)
    let mut b = BodyBuilder::new();
    let execute = b.load_field(action_t.clone(), Operand::THIS, execute_field);
    let arg = b.convert(Operand::Arg(1), t.clone());
    b.call(
        invoke(assets, &action_t, TypeRef::Void),
        Some(Operand::Var(execute)),
        vec![Operand::Var(arg)],
        Dispatch::Virtual,
    );
    b.ret(None);
    module.add_method(ty, execute_signature(assets).with_body(b.finish()));

    // CanExecute(object)
    let mut b = BodyBuilder::new();
    let always = b.new_block();
    let ask = b.new_block();
    let predicate = b.load_field(predicate_t.clone(), Operand::THIS, can_execute_field);
    let missing = b.is_null(Operand::Var(predicate));
    b.branch(Operand::Var(missing), always, ask);

    b.position_at(always);
    b.ret(Some(Operand::Bool(true)));

    b.position_at(ask);
    let arg = b.convert(Operand::Arg(1), t);
    let result = b.call_value(
        TypeRef::Bool,
        invoke(assets, &predicate_t, TypeRef::Bool),
        Some(Operand::Var(predicate)),
        vec![Operand::Var(arg)],
        Dispatch::Virtual,
    );
    b.ret(Some(Operand::Var(result)));
    module.add_method(ty, can_execute_signature(assets).with_body(b.finish()));

    add_can_execute_changed_event(module, assets, ty);
    ty
}

/// `Invoke` on an instantiated `Action<T>` or `Predicate<T>`.
fn invoke(assets: &Assets, delegate: &TypeRef, ret: TypeRef) -> MethodRef {
    MethodRef::External {
        owner: delegate.clone(),
        name: assets.invoke,
        params: delegate.generic_args().to_vec(),
        ret,
    }
}
