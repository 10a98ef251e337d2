//! Well-known types and members the weave refers to.
//!
//! Every name is interned once into the module at the start of the pass.
//! Imported members (delegate constructors and `Invoke`, `Delegate.Combine`,
//! exception constructors) are described by [`MethodRef::External`]
//! signatures built here.

use smallvec::SmallVec;

use cmdr_ir::{MethodFlags, MethodId, MethodRef, Module, Name, TypeFlags, TypeId, TypeRef};

use crate::WeaveConfig;

/// Prefix shared by every generated type and member name.
pub const GENERATED_PREFIX: &str = "<Commander_Fody>";

/// Interned well-known names for one module.
#[derive(Clone, Debug)]
pub struct Assets {
    /// The command interface (`System.Windows.Input.ICommand`).
    pub command: TypeRef,
    pub action: TypeRef,
    /// Open `System.Action`1`; instantiate with [`TypeRef::generic`].
    pub action_of_t: TypeRef,
    pub predicate_of_t: TypeRef,
    pub func_of_t: TypeRef,
    pub event_handler: TypeRef,
    pub delegate: TypeRef,
    pub argument_null_exception: TypeRef,

    pub ctor: Name,
    pub invoke: Name,
    pub execute: Name,
    pub can_execute: Name,
    pub can_execute_changed: Name,
    pub add_can_execute_changed: Name,
    pub remove_can_execute_changed: Name,
    pub parameter: Name,
    pub value: Name,
    pub combine: Name,
    pub remove: Name,
}

impl Assets {
    pub fn new(module: &Module, config: &WeaveConfig) -> Self {
        let named = |s: &str| TypeRef::Named(module.intern(s));
        Assets {
            command: named(&config.command_interface),
            action: named("System.Action"),
            action_of_t: named("System.Action`1"),
            predicate_of_t: named("System.Predicate`1"),
            func_of_t: named("System.Func`1"),
            event_handler: named("System.EventHandler"),
            delegate: named("System.Delegate"),
            argument_null_exception: named("System.ArgumentNullException"),

            ctor: module.intern(".ctor"),
            invoke: module.intern("Invoke"),
            execute: module.intern("Execute"),
            can_execute: module.intern("CanExecute"),
            can_execute_changed: module.intern("CanExecuteChanged"),
            add_can_execute_changed: module.intern("add_CanExecuteChanged"),
            remove_can_execute_changed: module.intern("remove_CanExecuteChanged"),
            parameter: module.intern("parameter"),
            value: module.intern("value"),
            combine: module.intern("Combine"),
            remove: module.intern("Remove"),
        }
    }

    /// `System.Object::.ctor()`.
    pub fn object_ctor(&self) -> MethodRef {
        MethodRef::External {
            owner: TypeRef::Object,
            name: self.ctor,
            params: Vec::new(),
            ret: TypeRef::Void,
        }
    }

    /// `System.ArgumentNullException::.ctor(string)`.
    pub fn argument_null_ctor(&self) -> MethodRef {
        MethodRef::External {
            owner: self.argument_null_exception.clone(),
            name: self.ctor,
            params: vec![TypeRef::String],
            ret: TypeRef::Void,
        }
    }

    /// `System.Delegate::Combine` or `Remove`.
    pub fn delegate_op(&self, name: Name) -> MethodRef {
        MethodRef::External {
            owner: self.delegate.clone(),
            name,
            params: vec![self.delegate.clone(), self.delegate.clone()],
            ret: self.delegate.clone(),
        }
    }

    /// Argument types and return type of a supported delegate type:
    /// `Action`, `Action<T>`, `Predicate<T>`, `Func<bool>`.
    pub fn delegate_signature(&self, ty: &TypeRef) -> Option<(SmallVec<[TypeRef; 1]>, TypeRef)> {
        let element = ty.element();
        let args = ty.generic_args();
        if *element == self.action && args.is_empty() {
            Some((SmallVec::new(), TypeRef::Void))
        } else if *element == self.action_of_t && args.len() == 1 {
            Some((smallvec::smallvec![args[0].clone()], TypeRef::Void))
        } else if *element == self.predicate_of_t && args.len() == 1 {
            Some((smallvec::smallvec![args[0].clone()], TypeRef::Bool))
        } else if *element == self.func_of_t && args.len() == 1 && args[0] == TypeRef::Bool {
            Some((SmallVec::new(), TypeRef::Bool))
        } else {
            None
        }
    }

    fn is_execute_delegate(&self, ty: &TypeRef) -> bool {
        let element = ty.element();
        *element == self.action || *element == self.action_of_t
    }

    fn is_can_execute_delegate(&self, ty: &TypeRef) -> bool {
        let element = ty.element();
        *element == self.predicate_of_t || *element == self.func_of_t
    }

    /// Whether a handler with `params` and `ret` can be bound to a delegate
    /// of type `delegate`.
    ///
    /// The handler's parameter must equal the delegate argument or be
    /// `object`; a parameterless handler may be bound to a one-argument
    /// delegate and ignores the argument.
    pub fn fits_delegate(&self, params: &[TypeRef], ret: &TypeRef, delegate: &TypeRef) -> bool {
        let Some((args, delegate_ret)) = self.delegate_signature(delegate) else {
            return false;
        };
        if *ret != delegate_ret {
            return false;
        }
        match (params, args.as_slice()) {
            ([], _) => true,
            ([param], [arg]) => param == arg || param.is_object(),
            _ => false,
        }
    }

    /// Find a usable command implementation among the module's own types.
    ///
    /// Usable: a non-abstract class implementing the command interface with
    /// a public instance constructor whose first parameter is an execute
    /// delegate (`Action`, `Action<T>`) and whose optional second parameter
    /// is a can-execute delegate (`Predicate<T>`, `Func<bool>`). Generated
    /// types are skipped. The first usable type in module order wins.
    pub fn find_user_implementation(&self, module: &Module) -> Option<Implementation> {
        module.all_types().into_iter().find_map(|id| {
            let def = module.ty(id);
            if def.flags.intersects(TypeFlags::ABSTRACT | TypeFlags::INTERFACE)
                || !def.implements(&self.command)
                || module.str(def.name).starts_with(GENERATED_PREFIX)
                || module.str(def.name).starts_with(crate::nested_impl::NESTED_PREFIX)
            {
                return None;
            }
            let constructors: SmallVec<[MethodId; 2]> = def
                .constructors()
                .filter(|&index| {
                    let m = &def.methods[index as usize];
                    m.flags.contains(MethodFlags::PUBLIC) && self.is_command_ctor(&m.param_types())
                })
                .map(|index| MethodId { ty: id, index })
                .collect();
            if constructors.is_empty() {
                return None;
            }
            tracing::debug!(
                implementation = %module.full_name(id),
                constructors = constructors.len(),
                "found command implementation"
            );
            Some(Implementation {
                ty: id,
                constructors,
                generated: false,
            })
        })
    }

    fn is_command_ctor(&self, params: &[TypeRef]) -> bool {
        match params {
            [execute] => self.is_execute_delegate(execute),
            [execute, can_execute] => {
                self.is_execute_delegate(execute) && self.is_can_execute_delegate(can_execute)
            }
            _ => false,
        }
    }
}

/// A shared command implementation: a user type or the generated generic
/// delegate command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Implementation {
    pub ty: TypeId,
    /// Usable constructors, in declaration order.
    pub constructors: SmallVec<[MethodId; 2]>,
    /// Synthesized by this weave or a previous one.
    pub generated: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use cmdr_ir::{MethodDef, TypeDef};

    use super::*;

    fn setup() -> (Module, Assets) {
        let module = Module::new("App");
        let assets = Assets::new(&module, &WeaveConfig::default());
        (module, assets)
    }

    #[test]
    fn delegate_signatures() {
        let (_, a) = setup();
        let action_int = TypeRef::generic(a.action_of_t.clone(), [TypeRef::Int32]);
        let predicate_obj = TypeRef::generic(a.predicate_of_t.clone(), [TypeRef::Object]);
        let func_bool = TypeRef::generic(a.func_of_t.clone(), [TypeRef::Bool]);

        assert_eq!(
            a.delegate_signature(&action_int),
            Some((smallvec::smallvec![TypeRef::Int32], TypeRef::Void))
        );
        assert_eq!(
            a.delegate_signature(&predicate_obj),
            Some((smallvec::smallvec![TypeRef::Object], TypeRef::Bool))
        );
        assert_eq!(
            a.delegate_signature(&func_bool),
            Some((SmallVec::new(), TypeRef::Bool))
        );
        assert_eq!(a.delegate_signature(&a.action), Some((SmallVec::new(), TypeRef::Void)));
        assert_eq!(a.delegate_signature(&TypeRef::Object), None);
    }

    #[test]
    fn delegate_fit_rules() {
        let (_, a) = setup();
        let action_int = TypeRef::generic(a.action_of_t.clone(), [TypeRef::Int32]);
        let predicate_int = TypeRef::generic(a.predicate_of_t.clone(), [TypeRef::Int32]);

        // Exact parameter, object parameter, or no parameter.
        assert!(a.fits_delegate(&[TypeRef::Int32], &TypeRef::Void, &action_int));
        assert!(a.fits_delegate(&[TypeRef::Object], &TypeRef::Void, &action_int));
        assert!(a.fits_delegate(&[], &TypeRef::Void, &action_int));
        assert!(a.fits_delegate(&[TypeRef::Object], &TypeRef::Bool, &predicate_int));

        assert!(!a.fits_delegate(&[TypeRef::String], &TypeRef::Void, &action_int));
        assert!(!a.fits_delegate(&[TypeRef::Int32], &TypeRef::Bool, &action_int));
        assert!(!a.fits_delegate(&[TypeRef::Int32], &TypeRef::Void, &a.action));
    }

    #[test]
    fn user_implementation_requires_delegate_ctor() {
        let (mut module, a) = setup();
        let name = module.intern("RelayCommand");
        let mut def = TypeDef::new(module.intern("App"), name, TypeFlags::PUBLIC);
        def.interfaces.push(a.command.clone());
        let ty = module.add_type(def);

        // Only a parameterless constructor: not usable.
        module.add_method(ty, MethodDef::new(a.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void));
        assert_eq!(a.find_user_implementation(&module), None);

        let execute = module.intern("execute");
        let can_execute = module.intern("canExecute");
        let ctor = module.add_method(
            ty,
            MethodDef::new(a.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void)
                .with_param(execute, a.action.clone())
                .with_param(
                    can_execute,
                    TypeRef::generic(a.func_of_t.clone(), [TypeRef::Bool]),
                ),
        );
        let found = a.find_user_implementation(&module).unwrap();
        assert_eq!(found.ty, ty);
        assert_eq!(found.constructors.as_slice(), &[ctor]);
        assert!(!found.generated);
    }

    #[test]
    fn abstract_types_are_not_implementations() {
        let (mut module, a) = setup();
        let name = module.intern("CommandBase");
        let mut def = TypeDef::new(Name::EMPTY, name, TypeFlags::PUBLIC | TypeFlags::ABSTRACT);
        def.interfaces.push(a.command.clone());
        let ty = module.add_type(def);
        let execute = module.intern("execute");
        module.add_method(
            ty,
            MethodDef::new(a.ctor, MethodFlags::CONSTRUCTOR, TypeRef::Void)
                .with_param(execute, a.action.clone()),
        );
        assert_eq!(a.find_user_implementation(&module), None);
    }
}
