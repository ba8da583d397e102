//! Canonical C type representation and interning arena.
//!
//! Types are handles (`TypeId`) into an arena (`TypeArena`). Two derived types built from the
//! same structural key (e.g. `int *` constructed twice) resolve to the same handle, so structural
//! equality collapses to handle equality — see `TypeArena::intern_pointer` and friends.

mod cast;

pub use cast::{cast_to_bool, cast_value};

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Debug,
    hash::{Hash, Hasher},
    rc::Rc,
};

/// Relative ordering used to pick the "common type" of two arithmetic operands.
/// Higher priority wins: the lower-priority operand is cast up to the higher one.
pub type Priority = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// `char`, one byte.
    Char,
    /// `int`, eight bytes (this dialect models `int` at pointer width).
    Int,
}

pub struct StructFields {
    /// `None` while the struct is declared but not yet defined (incomplete).
    pub members: RefCell<Option<Vec<(String, TypeId)>>>,
}

pub enum TypeKind {
    Void,
    Integer(IntWidth),
    /// Both `float` and `double` resolve here; this dialect keeps a single
    /// double-backed floating type (see DESIGN.md, open question d).
    Floating,
    Bool,
    Pointer(TypeId),
    Array(TypeId, u64),
    Function {
        ret: TypeId,
        params: Vec<TypeId>,
        variadic: bool,
    },
    Struct {
        tag: String,
        fields: StructFields,
    },
}

pub struct TypeData {
    pub kind: TypeKind,
}

/// A canonical, cheaply-clonable handle to an interned type.
#[derive(Clone)]
pub struct TypeId(Rc<TypeData>);

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for TypeId {}

impl Hash for TypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state)
    }
}

impl Debug for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.llvm_type())
    }
}

impl TypeId {
    fn new(kind: TypeKind) -> Self {
        TypeId(Rc::new(TypeData { kind }))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind(), TypeKind::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.kind(), TypeKind::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind(), TypeKind::Floating)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind(), TypeKind::Bool)
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_bool()
    }

    /// Scalars are the things `!`, `&&`, `||`, and conditions can operate on.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind(), TypeKind::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind(), TypeKind::Array(_, _))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind(), TypeKind::Function { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind(), TypeKind::Struct { .. })
    }

    pub fn is_complete(&self) -> bool {
        match self.kind() {
            TypeKind::Struct { fields, .. } => fields.members.borrow().is_some(),
            _ => true,
        }
    }

    pub fn target_type(&self) -> Option<TypeId> {
        match self.kind() {
            TypeKind::Pointer(t) | TypeKind::Array(t, _) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn array_length(&self) -> Option<u64> {
        match self.kind() {
            TypeKind::Array(_, len) => Some(*len),
            _ => None,
        }
    }

    pub fn function_signature(&self) -> Option<(TypeId, &[TypeId], bool)> {
        match self.kind() {
            TypeKind::Function {
                ret,
                params,
                variadic,
            } => Some((ret.clone(), params, *variadic)),
            _ => None,
        }
    }

    /// Priority used by `TypeArena::common_type`. Only meaningful for arithmetic types.
    pub fn priority(&self) -> Priority {
        match self.kind() {
            TypeKind::Bool => 0,
            TypeKind::Integer(IntWidth::Char) => 1,
            TypeKind::Integer(IntWidth::Int) => 2,
            TypeKind::Floating => 3,
            _ => 0,
        }
    }

    /// The textual LLVM type used wherever this type appears in emitted IR.
    pub fn llvm_type(&self) -> String {
        match self.kind() {
            TypeKind::Void => "void".to_string(),
            TypeKind::Integer(IntWidth::Int) => "i64".to_string(),
            TypeKind::Integer(IntWidth::Char) => "i8".to_string(),
            TypeKind::Floating => "double".to_string(),
            TypeKind::Bool => "i1".to_string(),
            TypeKind::Pointer(target) => {
                if target.is_void() {
                    // void* is modeled as a pointer to the smallest addressable unit.
                    "i8 *".to_string()
                } else {
                    format!("{} *", target.llvm_type())
                }
            }
            TypeKind::Array(target, len) => format!("[{len} x {}]", target.llvm_type()),
            TypeKind::Function {
                ret,
                params,
                variadic,
            } => {
                let mut parts: Vec<String> = params.iter().map(|p| p.llvm_type()).collect();
                if *variadic {
                    parts.push("...".to_string());
                }
                format!("{}({})", ret.llvm_type(), parts.join(", "))
            }
            TypeKind::Struct { tag, .. } => format!("%struct.{tag}"),
        }
    }

    /// The `{ t1, t2, ... }` body used when emitting the struct alias declaration.
    pub fn struct_body(&self) -> Option<String> {
        match self.kind() {
            TypeKind::Struct { fields, .. } => {
                let members = fields.members.borrow();
                let members = members.as_ref()?;
                let parts: Vec<String> = members.iter().map(|(_, t)| t.llvm_type()).collect();
                Some(format!("{{ {} }}", parts.join(", ")))
            }
            _ => None,
        }
    }

    pub fn size_of(&self) -> u64 {
        match self.kind() {
            TypeKind::Void => 0,
            TypeKind::Integer(IntWidth::Int) => 8,
            TypeKind::Integer(IntWidth::Char) => 1,
            TypeKind::Floating => 8,
            TypeKind::Bool => 1,
            TypeKind::Pointer(_) | TypeKind::Function { .. } => 8,
            TypeKind::Array(target, len) => target.size_of() * len,
            TypeKind::Struct { fields, .. } => fields
                .members
                .borrow()
                .as_ref()
                .map(|members| members.iter().map(|(_, t)| t.size_of()).sum())
                .unwrap_or(0),
        }
    }

    pub fn default_value(&self) -> String {
        match self.kind() {
            TypeKind::Floating => "0.0".to_string(),
            TypeKind::Pointer(_) => "null".to_string(),
            TypeKind::Struct { .. } => "zeroinitializer".to_string(),
            TypeKind::Array(_, _) => "zeroinitializer".to_string(),
            _ => "0".to_string(),
        }
    }

    /// Looks up a member by name on a (complete) struct type.
    pub fn get_member(&self, name: &str) -> Option<(usize, TypeId)> {
        match self.kind() {
            TypeKind::Struct { fields, .. } => {
                let members = fields.members.borrow();
                let members = members.as_ref()?;
                members
                    .iter()
                    .enumerate()
                    .find(|(_, (member_name, _))| member_name == name)
                    .map(|(idx, (_, ty))| (idx, ty.clone()))
            }
            _ => None,
        }
    }
}

/// Key used to intern function types: two calls with structurally-equal
/// parameter lists and return type must resolve to the same handle.
struct FnKey(TypeId, Vec<TypeId>, bool);

impl PartialEq for FnKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1 && self.2 == other.2
    }
}
impl Eq for FnKey {}
impl Hash for FnKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        for p in &self.1 {
            p.hash(state);
        }
        self.2.hash(state);
    }
}

/// The type library: prepopulated with builtins, interns derived types on demand.
pub struct TypeArena {
    builtins: HashMap<&'static str, TypeId>,
    pointers: RefCell<HashMap<TypeId, TypeId>>,
    arrays: RefCell<HashMap<(TypeId, u64), TypeId>>,
    functions: RefCell<HashMap<FnKey, TypeId>>,
    structs: RefCell<HashMap<String, TypeId>>,
}

impl Default for TypeArena {
    fn default() -> Self {
        let mut builtins = HashMap::new();
        builtins.insert("void", TypeId::new(TypeKind::Void));
        builtins.insert("int", TypeId::new(TypeKind::Integer(IntWidth::Int)));
        builtins.insert("char", TypeId::new(TypeKind::Integer(IntWidth::Char)));
        builtins.insert("float", TypeId::new(TypeKind::Floating));
        builtins.insert("double", TypeId::new(TypeKind::Floating));
        builtins.insert("_Bool", TypeId::new(TypeKind::Bool));

        TypeArena {
            builtins,
            pointers: RefCell::default(),
            arrays: RefCell::default(),
            functions: RefCell::default(),
            structs: RefCell::default(),
        }
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a named builtin, or a struct tag previously interned via `intern_struct`.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        if let Some(t) = self.builtins.get(name) {
            return Some(t.clone());
        }
        self.structs.borrow().get(name).cloned()
    }

    pub fn intern_pointer(&self, target: TypeId) -> TypeId {
        if let Some(existing) = self.pointers.borrow().get(&target) {
            return existing.clone();
        }
        let ptr = TypeId::new(TypeKind::Pointer(target.clone()));
        self.pointers.borrow_mut().insert(target, ptr.clone());
        ptr
    }

    pub fn intern_array(&self, target: TypeId, length: u64) -> TypeId {
        let key = (target.clone(), length);
        if let Some(existing) = self.arrays.borrow().get(&key) {
            return existing.clone();
        }
        let array = TypeId::new(TypeKind::Array(target, length));
        self.arrays.borrow_mut().insert(key, array.clone());
        array
    }

    pub fn intern_function(&self, ret: TypeId, params: Vec<TypeId>, variadic: bool) -> TypeId {
        let key = FnKey(ret.clone(), params.clone(), variadic);
        if let Some(existing) = self.functions.borrow().get(&key) {
            return existing.clone();
        }
        let func = TypeId::new(TypeKind::Function {
            ret,
            params,
            variadic,
        });
        self.functions.borrow_mut().insert(key, func.clone());
        func
    }

    /// Returns the (possibly incomplete) handle for `tag`, creating it on first use.
    pub fn intern_struct(&self, tag: &str) -> TypeId {
        if let Some(existing) = self.structs.borrow().get(tag) {
            return existing.clone();
        }
        let handle = TypeId::new(TypeKind::Struct {
            tag: tag.to_string(),
            fields: StructFields {
                members: RefCell::new(None),
            },
        });
        self.structs
            .borrow_mut()
            .insert(tag.to_string(), handle.clone());
        handle
    }

    /// Transitions an interned struct handle from incomplete to complete.
    /// Returns `false` if the struct was already complete (redefinition).
    pub fn complete_struct(&self, handle: &TypeId, members: Vec<(String, TypeId)>) -> bool {
        match handle.kind() {
            TypeKind::Struct { fields, .. } => {
                let mut slot = fields.members.borrow_mut();
                if slot.is_some() {
                    return false;
                }
                *slot = Some(members);
                true
            }
            _ => false,
        }
    }

    /// The higher-priority of two arithmetic types, used for implicit promotion.
    pub fn common_type(&self, a: &TypeId, b: &TypeId) -> TypeId {
        if a.priority() >= b.priority() {
            a.clone()
        } else {
            b.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_a_pointer_twice_returns_the_same_handle() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let a = arena.intern_pointer(int_ty.clone());
        let b = arena.intern_pointer(int_ty);
        assert!(a == b, "two pointers to the same target must collapse to one handle");
    }

    #[test]
    fn arrays_of_different_lengths_are_distinct_handles() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let a = arena.intern_array(int_ty.clone(), 3);
        let b = arena.intern_array(int_ty, 4);
        assert!(a != b);
        assert_eq!(a.llvm_type(), "[3 x i64]");
        assert_eq!(b.llvm_type(), "[4 x i64]");
    }

    #[test]
    fn function_types_intern_by_full_signature() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let float_ty = arena.get("float").unwrap();
        let a = arena.intern_function(int_ty.clone(), vec![int_ty.clone()], false);
        let b = arena.intern_function(int_ty.clone(), vec![int_ty.clone()], false);
        let c = arena.intern_function(int_ty.clone(), vec![float_ty], false);
        assert!(a == b);
        assert!(a != c);
    }

    #[test]
    fn common_type_promotes_to_the_higher_priority_operand() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let float_ty = arena.get("float").unwrap();
        assert!(arena.common_type(&int_ty, &float_ty) == float_ty);
    }

    #[test]
    fn an_incomplete_struct_becomes_complete_exactly_once() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let handle = arena.intern_struct("Point");
        assert!(!handle.is_complete());
        assert!(arena.complete_struct(&handle, vec![("x".to_string(), int_ty.clone())]));
        assert!(handle.is_complete());
        // A second attempt to complete the same struct must be rejected (redefinition).
        assert!(!arena.complete_struct(&handle, vec![("y".to_string(), int_ty)]));
    }

    #[test]
    fn struct_member_lookup_returns_declaration_order_index() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let float_ty = arena.get("float").unwrap();
        let handle = arena.intern_struct("Point");
        arena.complete_struct(&handle, vec![("x".to_string(), int_ty), ("y".to_string(), float_ty)]);

        let (idx, ty) = handle.get_member("y").expect("y is a member");
        assert_eq!(idx, 1);
        assert!(ty.is_float());
        assert!(handle.get_member("z").is_none());
    }
}
