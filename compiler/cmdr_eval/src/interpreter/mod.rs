//! Block-IR interpreter.
//!
//! Each call runs one [`Body`] in a fresh frame:
//!
//! ```text
//! Frame { args: [this?, params...], vars: [one slot per VarId], type_args }
//! ```
//!
//! `type_args` instantiate the generic parameters of the method's declaring
//! type; they come from the [`MethodRef`] when it carries them, otherwise
//! from the receiver's runtime type. Every `Convert`, `NewObj` and call
//! target is resolved against them before use.
//!
//! Imported methods are limited to what generated code calls: the
//! `object` constructor, exception constructors, delegate `Invoke`, and
//! `Delegate.Combine` / `Delegate.Remove`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use cmdr_ir::{
    Body, Dispatch, Instr, MethodId, MethodRef, Module, Name, Operand, Terminator, TypeId, TypeRef,
    VarId,
};

use crate::heap::{Binding, Heap, HeapObject, ObjRef, Value};
use crate::{EvalError, EvalResult};

/// Nested call limit.
pub const DEFAULT_DEPTH_LIMIT: usize = 256;
/// Instruction limit across the interpreter's lifetime.
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

type TypeArgs = SmallVec<[TypeRef; 1]>;

/// Names the interpreter dispatches on, interned once.
struct Names {
    ctor: Name,
    invoke: Name,
    combine: Name,
    remove: Name,
    delegate: Name,
}

impl Names {
    fn new(module: &Module) -> Self {
        Names {
            ctor: module.intern(".ctor"),
            invoke: module.intern("Invoke"),
            combine: module.intern("Combine"),
            remove: module.intern("Remove"),
            delegate: module.intern("System.Delegate"),
        }
    }
}

struct Frame {
    args: Vec<Value>,
    vars: Vec<Value>,
    type_args: TypeArgs,
}

impl Frame {
    fn load(&self, operand: Operand) -> Value {
        match operand {
            Operand::Arg(slot) => self.args.get(usize::from(slot)).copied().unwrap_or_default(),
            Operand::Var(v) => self.vars[v.index()],
            Operand::Null => Value::Null,
            Operand::Bool(b) => Value::Bool(b),
            Operand::Int(i) => Value::Int(i),
            Operand::Str(s) => Value::Str(s),
        }
    }

    fn load_all(&self, operands: &[Operand]) -> Vec<Value> {
        operands.iter().map(|&o| self.load(o)).collect()
    }

    fn set(&mut self, var: VarId, value: Value) {
        self.vars[var.index()] = value;
    }
}

/// Interpreter over one module.
pub struct Interpreter<'m> {
    module: &'m Module,
    heap: Heap,
    names: Names,
    /// `(runtime type, name, arity)` to the instance method found there.
    method_cache: FxHashMap<(TypeId, Name, usize), Option<MethodId>>,
    depth: usize,
    depth_limit: usize,
    steps: u64,
    step_limit: u64,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m Module) -> Self {
        Interpreter {
            module,
            heap: Heap::default(),
            names: Names::new(module),
            method_cache: FxHashMap::default(),
            depth: 0,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    #[must_use]
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn module(&self) -> &'m Module {
        self.module
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn object(&self, obj: ObjRef) -> &HeapObject {
        self.heap.get(obj)
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    // Public entry points

    /// Construct a non-generic module type through its first constructor
    /// taking `args.len()` arguments.
    pub fn construct(&mut self, ty: TypeId, args: Vec<Value>) -> EvalResult<ObjRef> {
        self.construct_generic(ty, [], args)
    }

    /// Construct an instantiation of a generic module type.
    pub fn construct_generic(
        &mut self,
        ty: TypeId,
        type_args: impl IntoIterator<Item = TypeRef>,
        args: Vec<Value>,
    ) -> EvalResult<ObjRef> {
        let def = self.module.ty(ty);
        let index = def
            .constructors()
            .find(|&i| def.methods[i as usize].params.len() == args.len())
            .ok_or_else(|| EvalError::MethodNotFound {
                ty: self.module.full_name(ty),
                name: ".ctor".to_owned(),
                arity: args.len(),
            })?;
        self.new_instance(MethodId { ty, index }, type_args.into_iter().collect(), args)
    }

    /// Call `method` without virtual dispatch.
    pub fn call(&mut self, method: MethodId, receiver: Option<Value>, args: Vec<Value>) -> EvalResult<Value> {
        let type_args = self.receiver_type_args(receiver, method.ty);
        self.run(method, type_args, receiver, args)
    }

    /// Call the instance method `name` taking `args.len()` arguments, looked
    /// up on the runtime type of `obj`.
    pub fn call_by_name(&mut self, obj: ObjRef, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let (ty, type_args) = self.instance(obj)?;
        let method = self
            .find_method(ty, self.module.intern(name), args.len())
            .ok_or_else(|| EvalError::MethodNotFound {
                ty: self.module.full_name(ty),
                name: name.to_owned(),
                arity: args.len(),
            })?;
        self.run(method, type_args, Some(Value::Ref(obj)), args)
    }

    /// Read the property `name` through its getter.
    pub fn get_property(&mut self, obj: ObjRef, name: &str) -> EvalResult<Value> {
        self.call_by_name(obj, &format!("get_{name}"), Vec::new())
    }

    /// Write the property `name` through its setter.
    pub fn set_property(&mut self, obj: ObjRef, name: &str, value: Value) -> EvalResult<()> {
        self.call_by_name(obj, &format!("set_{name}"), vec![value])
            .map(|_| ())
    }

    /// Read the field `name` of an instance directly.
    pub fn field(&self, obj: ObjRef, name: &str) -> EvalResult<Value> {
        let (ty, _) = self.instance(obj)?;
        let def = self.module.ty(ty);
        let no_field = || EvalError::NoField {
            ty: self.module.full_name(ty),
            field: name.to_owned(),
        };
        let index = def
            .fields
            .iter()
            .position(|f| self.module.str(f.name) == name)
            .ok_or_else(no_field)?;
        match self.heap.get(obj) {
            HeapObject::Instance { fields, .. } => fields.get(index).copied().ok_or_else(no_field),
            _ => Err(no_field()),
        }
    }

    /// Overwrite the field `name` of an instance directly.
    pub fn set_field(&mut self, obj: ObjRef, name: &str, value: Value) -> EvalResult<()> {
        let (ty, _) = self.instance(obj)?;
        let index = self
            .module
            .ty(ty)
            .fields
            .iter()
            .position(|f| self.module.str(f.name) == name)
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| EvalError::NoField {
                ty: self.module.full_name(ty),
                field: name.to_owned(),
            })?;
        *self.field_slot(obj, cmdr_ir::FieldId { ty, index })? = value;
        Ok(())
    }

    /// A delegate of type `ty` bound to `target` and `method`.
    pub fn create_delegate(&mut self, ty: TypeRef, target: Value, method: MethodRef) -> Value {
        Value::Ref(self.heap.alloc(HeapObject::Delegate {
            ty,
            invocation: smallvec::smallvec![Binding { target, method }],
        }))
    }

    /// `command.Execute(parameter)`.
    pub fn execute(&mut self, command: Value, parameter: Value) -> EvalResult<()> {
        let obj = self.non_null(command, "Execute")?;
        self.call_by_name(obj, "Execute", vec![parameter]).map(|_| ())
    }

    /// `command.CanExecute(parameter)`.
    pub fn can_execute(&mut self, command: Value, parameter: Value) -> EvalResult<bool> {
        let obj = self.non_null(command, "CanExecute")?;
        let result = self.call_by_name(obj, "CanExecute", vec![parameter])?;
        result.as_bool().ok_or_else(|| EvalError::TypeMismatch {
            expected: "bool",
            found: self.describe(result),
        })
    }

    /// Invoke every binding of a delegate; the last result is returned.
    ///
    /// A handler taking fewer parameters than the delegate receives only the
    /// leading arguments.
    pub fn invoke_delegate(&mut self, delegate: Value, args: Vec<Value>) -> EvalResult<Value> {
        let (_, invocation) = self.invocation(delegate)?;
        let mut result = Value::Null;
        for binding in invocation {
            let receiver = (!binding.target.is_null()).then_some(binding.target);
            let MethodRef::Def { method, type_args } = &binding.method else {
                return Err(EvalError::UnsupportedExternal(self.display_ref(&binding.method)));
            };
            let arity = self.module.method(*method).params.len();
            let args: Vec<Value> = args.iter().copied().take(arity).collect();
            let type_args = if type_args.is_empty() {
                self.receiver_type_args(receiver, method.ty)
            } else {
                type_args.clone()
            };
            result = self.run(*method, type_args, receiver, args)?;
        }
        Ok(result)
    }

    /// Runtime type of a value; `None` for null.
    pub fn type_of(&self, value: Value) -> Option<TypeRef> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(TypeRef::Bool),
            Value::Int(_) => Some(TypeRef::Int32),
            Value::Str(_) => Some(TypeRef::String),
            Value::Ref(obj) => Some(match self.heap.get(obj) {
                HeapObject::Instance { ty, type_args, .. } if type_args.is_empty() => TypeRef::Def(*ty),
                HeapObject::Instance { ty, type_args, .. } => {
                    TypeRef::generic(TypeRef::Def(*ty), type_args.iter().cloned())
                }
                HeapObject::Delegate { ty, .. } | HeapObject::Exception { ty, .. } => ty.clone(),
            }),
        }
    }

    // Execution

    fn new_instance(&mut self, ctor: MethodId, type_args: TypeArgs, args: Vec<Value>) -> EvalResult<ObjRef> {
        let fields = self
            .module
            .ty(ctor.ty)
            .fields
            .iter()
            .map(|f| Value::default_for(&f.ty))
            .collect();
        let obj = self.heap.alloc(HeapObject::Instance {
            ty: ctor.ty,
            type_args: type_args.clone(),
            fields,
        });
        self.run(ctor, type_args, Some(Value::Ref(obj)), args)?;
        Ok(obj)
    }

    fn run(
        &mut self,
        method: MethodId,
        type_args: TypeArgs,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        let module = self.module;
        let def = module.method(method);
        let body = def.body.as_ref().ok_or_else(|| EvalError::NoBody {
            method: module.display_method(method),
        })?;
        if args.len() != def.params.len() {
            return Err(EvalError::MethodNotFound {
                ty: module.full_name(method.ty),
                name: module.str(def.name).to_owned(),
                arity: args.len(),
            });
        }

        let mut frame_args = Vec::with_capacity(args.len() + 1);
        if !def.is_static() {
            let this = receiver
                .filter(|r| !r.is_null())
                .ok_or_else(|| EvalError::NullReference {
                    context: format!("call to {}", module.display_method(method)),
                })?;
            frame_args.push(this);
        }
        frame_args.extend(args);

        if self.depth >= self.depth_limit {
            return Err(EvalError::DepthLimit(self.depth_limit));
        }
        self.depth += 1;
        tracing::trace!(method = %module.display_method(method), depth = self.depth, "call");
        let mut frame = Frame {
            args: frame_args,
            vars: body.var_types.iter().map(Value::default_for).collect(),
            type_args,
        };
        let result = self.exec_body(body, &mut frame);
        self.depth -= 1;
        result
    }

    fn exec_body(&mut self, body: &Body, frame: &mut Frame) -> EvalResult<Value> {
        let mut block = body.entry;
        loop {
            let current = body.block(block);
            for instr in &current.body {
                self.tick()?;
                self.exec(instr, frame)?;
            }
            self.tick()?;
            match &current.terminator {
                Terminator::Return { value } => {
                    return Ok(value.map_or(Value::Null, |v| frame.load(v)));
                }
                Terminator::Jump { target } => block = *target,
                Terminator::Branch {
                    cond,
                    then_block,
                    else_block,
                } => {
                    block = if truthy(frame.load(*cond)) {
                        *then_block
                    } else {
                        *else_block
                    };
                }
                Terminator::Throw { value } => return Err(self.thrown(frame.load(*value))),
            }
        }
    }

    fn exec(&mut self, instr: &Instr, frame: &mut Frame) -> EvalResult<()> {
        match instr {
            Instr::NewObj { dst, ctor, args } => {
                let args = frame.load_all(args);
                let value = self.new_object(&resolve_ref(ctor, &frame.type_args), args)?;
                frame.set(*dst, value);
            }
            Instr::BindDelegate {
                dst,
                ty,
                target,
                method,
            } => {
                let obj = self.heap.alloc(HeapObject::Delegate {
                    ty: ty.substitute(&frame.type_args),
                    invocation: smallvec::smallvec![Binding {
                        target: frame.load(*target),
                        method: resolve_ref(method, &frame.type_args),
                    }],
                });
                frame.set(*dst, Value::Ref(obj));
            }
            Instr::LoadField { dst, obj, field } => {
                let obj = self.non_null(frame.load(*obj), "field load")?;
                let value = *self.field_slot(obj, *field)?;
                frame.set(*dst, value);
            }
            Instr::StoreField { obj, field, value } => {
                let obj = self.non_null(frame.load(*obj), "field store")?;
                let value = frame.load(*value);
                *self.field_slot(obj, *field)? = value;
            }
            Instr::Call {
                dst,
                method,
                receiver,
                args,
                dispatch,
            } => {
                let receiver = receiver.map(|r| frame.load(r));
                let args = frame.load_all(args);
                let method = resolve_ref(method, &frame.type_args);
                let result = self.call_ref(&method, receiver, args, *dispatch)?;
                if let Some(dst) = dst {
                    frame.set(*dst, result);
                }
            }
            Instr::Convert { dst, value, ty } => {
                let value = self.convert(frame.load(*value), &ty.substitute(&frame.type_args))?;
                frame.set(*dst, value);
            }
            Instr::IsNull { dst, value } => {
                let is_null = frame.load(*value).is_null();
                frame.set(*dst, Value::Bool(is_null));
            }
        }
        Ok(())
    }

    fn new_object(&mut self, ctor: &MethodRef, args: Vec<Value>) -> EvalResult<Value> {
        match ctor {
            MethodRef::Def { method, type_args } => {
                Ok(Value::Ref(self.new_instance(*method, type_args.clone(), args)?))
            }
            MethodRef::External { owner, name, .. }
                if *name == self.names.ctor && self.is_exception(owner) =>
            {
                Ok(Value::Ref(self.heap.alloc(HeapObject::Exception {
                    ty: owner.clone(),
                    args,
                })))
            }
            other => Err(EvalError::UnsupportedExternal(self.display_ref(other))),
        }
    }

    fn call_ref(
        &mut self,
        method: &MethodRef,
        receiver: Option<Value>,
        args: Vec<Value>,
        dispatch: Dispatch,
    ) -> EvalResult<Value> {
        match method {
            MethodRef::Def { method, type_args } => {
                let target = match (dispatch, receiver) {
                    (Dispatch::Virtual, Some(Value::Ref(obj))) => self.resolve_virtual(obj, *method),
                    _ => *method,
                };
                let type_args = if type_args.is_empty() {
                    self.receiver_type_args(receiver, target.ty)
                } else {
                    type_args.clone()
                };
                self.run(target, type_args, receiver, args)
            }
            MethodRef::External { owner, name, .. } => self.call_external(owner, *name, receiver, args),
        }
    }

    fn call_external(
        &mut self,
        owner: &TypeRef,
        name: Name,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        if name == self.names.ctor && owner.is_object() {
            return Ok(Value::Null);
        }
        if name == self.names.invoke {
            return self.invoke_delegate(receiver.unwrap_or_default(), args);
        }
        if *owner == TypeRef::Named(self.names.delegate) {
            if let [a, b] = args[..] {
                if name == self.names.combine {
                    return self.combine(a, b);
                }
                if name == self.names.remove {
                    return self.remove(a, b);
                }
            }
        }
        Err(EvalError::UnsupportedExternal(format!(
            "{}::{}",
            self.module.display_type(owner),
            self.module.str(name)
        )))
    }

    /// Override of `method` on the runtime type of `obj`, matched by name
    /// and arity.
    fn resolve_virtual(&mut self, obj: ObjRef, method: MethodId) -> MethodId {
        let HeapObject::Instance { ty, .. } = self.heap.get(obj) else {
            return method;
        };
        let ty = *ty;
        if ty == method.ty {
            return method;
        }
        let def = self.module.method(method);
        self.find_method(ty, def.name, def.params.len())
            .unwrap_or(method)
    }

    fn find_method(&mut self, ty: TypeId, name: Name, arity: usize) -> Option<MethodId> {
        let module = self.module;
        *self.method_cache.entry((ty, name, arity)).or_insert_with(|| {
            module
                .ty(ty)
                .methods
                .iter()
                .position(|m| m.name == name && m.params.len() == arity && !m.is_static())
                .and_then(|i| u32::try_from(i).ok())
                .map(|index| MethodId { ty, index })
        })
    }

    // Delegates

    fn invocation(&self, delegate: Value) -> EvalResult<(TypeRef, SmallVec<[Binding; 1]>)> {
        let obj = self.non_null(delegate, "delegate invocation")?;
        match self.heap.get(obj) {
            HeapObject::Delegate { ty, invocation } => Ok((ty.clone(), invocation.clone())),
            _ => Err(EvalError::TypeMismatch {
                expected: "delegate",
                found: self.describe(delegate),
            }),
        }
    }

    fn combine(&mut self, a: Value, b: Value) -> EvalResult<Value> {
        match (a, b) {
            (Value::Null, other) | (other, Value::Null) => Ok(other),
            _ => {
                let (ty, mut invocation) = self.invocation(a)?;
                let (_, tail) = self.invocation(b)?;
                invocation.extend(tail);
                Ok(Value::Ref(self.heap.alloc(HeapObject::Delegate { ty, invocation })))
            }
        }
    }

    /// Remove the last occurrence of `value`'s invocation list from
    /// `source`'s. An emptied list yields null.
    fn remove(&mut self, source: Value, value: Value) -> EvalResult<Value> {
        if source.is_null() || value.is_null() {
            return Ok(source);
        }
        let (ty, mut invocation) = self.invocation(source)?;
        let (_, removed) = self.invocation(value)?;
        if removed.len() > invocation.len() {
            return Ok(source);
        }
        let Some(start) = (0..=invocation.len() - removed.len())
            .rev()
            .find(|&i| invocation[i..].starts_with(&removed))
        else {
            return Ok(source);
        };
        invocation.drain(start..start + removed.len());
        if invocation.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Ref(self.heap.alloc(HeapObject::Delegate { ty, invocation })))
    }

    // Values

    fn convert(&self, value: Value, ty: &TypeRef) -> EvalResult<Value> {
        let ok = match (ty, value) {
            (TypeRef::Object | TypeRef::GenericParam(_), _)
            | (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::Int32 | TypeRef::IntPtr, Value::Int(_))
            | (TypeRef::String, Value::Str(_) | Value::Null) => true,
            (TypeRef::Bool | TypeRef::Int32 | TypeRef::IntPtr, Value::Null) => {
                return Err(EvalError::NullReference {
                    context: format!("unboxing to {}", self.module.display_type(ty)),
                });
            }
            (TypeRef::Def(_) | TypeRef::Named(_) | TypeRef::Generic { .. }, Value::Null) => true,
            (TypeRef::Def(id), Value::Ref(obj)) => self.is_instance_of(obj, *id),
            (TypeRef::Generic { base, .. }, Value::Ref(obj)) => match **base {
                TypeRef::Def(id) => self.is_instance_of(obj, id),
                _ => true,
            },
            (TypeRef::Named(_), Value::Ref(_)) => true,
            _ => false,
        };
        if ok {
            Ok(value)
        } else {
            Err(EvalError::InvalidCast {
                value: self.describe(value),
                target: self.module.display_type(ty),
            })
        }
    }

    fn is_instance_of(&self, obj: ObjRef, target: TypeId) -> bool {
        match self.heap.get(obj) {
            HeapObject::Instance { ty, .. } => {
                *ty == target || self.module.ty(*ty).implements(&TypeRef::Def(target))
            }
            _ => false,
        }
    }

    fn is_exception(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Named(name) if self.module.str(*name).ends_with("Exception"))
    }

    fn thrown(&self, value: Value) -> EvalError {
        match value.as_obj().map(|obj| self.heap.get(obj)) {
            Some(HeapObject::Exception { ty, args }) => EvalError::Thrown {
                ty: self.module.display_type(ty),
                message: args
                    .iter()
                    .map(|&a| self.describe(a))
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            _ => EvalError::Thrown {
                ty: self.describe(value),
                message: String::new(),
            },
        }
    }

    fn field_slot(&mut self, obj: ObjRef, field: cmdr_ir::FieldId) -> EvalResult<&mut Value> {
        let module = self.module;
        let no_field = |ty: String| EvalError::NoField {
            ty,
            field: module.str(module.ty(field.ty).fields[field.index as usize].name).to_owned(),
        };
        match self.heap.get_mut(obj) {
            HeapObject::Instance { ty, fields, .. } if *ty == field.ty => {
                let ty = *ty;
                fields
                    .get_mut(field.index as usize)
                    .ok_or_else(|| no_field(module.full_name(ty)))
            }
            HeapObject::Instance { ty, .. } => Err(no_field(module.full_name(*ty))),
            _ => Err(no_field("<non-instance>".to_owned())),
        }
    }

    fn instance(&self, obj: ObjRef) -> EvalResult<(TypeId, TypeArgs)> {
        match self.heap.get(obj) {
            HeapObject::Instance { ty, type_args, .. } => Ok((*ty, type_args.clone())),
            _ => Err(EvalError::TypeMismatch {
                expected: "instance",
                found: self.describe(Value::Ref(obj)),
            }),
        }
    }

    /// Generic arguments of `receiver` when it is an instance of `ty`.
    fn receiver_type_args(&self, receiver: Option<Value>, ty: TypeId) -> TypeArgs {
        match receiver.and_then(Value::as_obj).map(|obj| self.heap.get(obj)) {
            Some(HeapObject::Instance {
                ty: runtime,
                type_args,
                ..
            }) if *runtime == ty => type_args.clone(),
            _ => TypeArgs::new(),
        }
    }

    fn non_null(&self, value: Value, context: &str) -> EvalResult<ObjRef> {
        match value {
            Value::Ref(obj) => Ok(obj),
            Value::Null => Err(EvalError::NullReference {
                context: context.to_owned(),
            }),
            other => Err(EvalError::TypeMismatch {
                expected: "object reference",
                found: self.describe(other),
            }),
        }
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(EvalError::StepLimit(self.step_limit));
        }
        Ok(())
    }

    /// Short rendering of a value for error messages.
    pub fn describe(&self, value: Value) -> String {
        match value {
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Str(s) => self.module.str(s).to_owned(),
            Value::Ref(_) => self
                .type_of(value)
                .map_or_else(String::new, |ty| self.module.display_type(&ty)),
        }
    }

    fn display_ref(&self, method: &MethodRef) -> String {
        match method {
            MethodRef::Def { method, .. } => self.module.display_method(*method),
            MethodRef::External { owner, name, .. } => {
                format!("{}::{}", self.module.display_type(owner), self.module.str(*name))
            }
        }
    }
}

fn truthy(value: Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Int(i) => i != 0,
        Value::Str(_) | Value::Ref(_) => true,
    }
}

/// Substitute the caller's generic arguments into a method reference.
fn resolve_ref(method: &MethodRef, type_args: &[TypeRef]) -> MethodRef {
    if type_args.is_empty() {
        return method.clone();
    }
    match method {
        MethodRef::Def {
            method,
            type_args: inner,
        } => MethodRef::Def {
            method: *method,
            type_args: inner.iter().map(|t| t.substitute(type_args)).collect(),
        },
        MethodRef::External {
            owner,
            name,
            params,
            ret,
        } => MethodRef::External {
            owner: owner.substitute(type_args),
            name: *name,
            params: params.iter().map(|t| t.substitute(type_args)).collect(),
            ret: ret.substitute(type_args),
        },
    }
}

#[cfg(test)]
mod tests;
