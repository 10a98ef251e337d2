//! Runtime values and the object heap.

use smallvec::SmallVec;

use cmdr_ir::{MethodRef, Name, TypeId, TypeRef};

/// Handle to a heap object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjRef(u32);

impl ObjRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A runtime value. Value types are carried inline, boxed or not.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Str(Name),
    Ref(ObjRef),
}

impl Value {
    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_obj(self) -> Option<ObjRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Zero value of a field or local of type `ty`.
    pub fn default_for(ty: &TypeRef) -> Value {
        match ty {
            TypeRef::Bool => Value::Bool(false),
            TypeRef::Int32 | TypeRef::IntPtr => Value::Int(0),
            _ => Value::Null,
        }
    }
}

/// One entry of a delegate's invocation list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    /// `Null` for static methods.
    pub target: Value,
    pub method: MethodRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapObject {
    /// Instance of a module type.
    Instance {
        ty: TypeId,
        type_args: SmallVec<[TypeRef; 1]>,
        fields: Vec<Value>,
    },
    /// Delegate with a non-empty invocation list.
    Delegate {
        ty: TypeRef,
        invocation: SmallVec<[Binding; 1]>,
    },
    /// Exception constructed by an imported exception constructor.
    Exception { ty: TypeRef, args: Vec<Value> },
}

/// Append-only object heap. Objects live as long as the interpreter.
#[derive(Clone, Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn alloc(&mut self, object: HeapObject) -> ObjRef {
        let id = u32::try_from(self.objects.len())
            .unwrap_or_else(|_| panic!("heap object count exceeds u32::MAX"));
        self.objects.push(object);
        ObjRef(id)
    }

    #[inline]
    pub fn get(&self, obj: ObjRef) -> &HeapObject {
        &self.objects[obj.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, obj: ObjRef) -> &mut HeapObject {
        &mut self.objects[obj.index()]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
