use std::collections::HashMap;
use std::fmt::Write;

use super::decls::{Decl, DeclId, DeclTable};
use super::symbol::Symbol;

/// Index into the [`TypeTable`]. Identical ids always mean the same
/// type; distinct ids may still be equivalent through aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 14] = [
        BuiltinKind::Void,
        BuiltinKind::Bool,
        BuiltinKind::Char,
        BuiltinKind::String,
        BuiltinKind::Int8,
        BuiltinKind::Int16,
        BuiltinKind::Int32,
        BuiltinKind::Int64,
        BuiltinKind::UInt8,
        BuiltinKind::UInt16,
        BuiltinKind::UInt32,
        BuiltinKind::UInt64,
        BuiltinKind::Float32,
        BuiltinKind::Float64,
    ];

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Int8
                | BuiltinKind::Int16
                | BuiltinKind::Int32
                | BuiltinKind::Int64
                | BuiltinKind::UInt8
                | BuiltinKind::UInt16
                | BuiltinKind::UInt32
                | BuiltinKind::UInt64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BuiltinKind::Float32 | BuiltinKind::Float64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::String => "string",
            BuiltinKind::Int8 => "int8",
            BuiltinKind::Int16 => "int16",
            BuiltinKind::Int32 => "int32",
            BuiltinKind::Int64 => "int64",
            BuiltinKind::UInt8 => "uint8",
            BuiltinKind::UInt16 => "uint16",
            BuiltinKind::UInt32 => "uint32",
            BuiltinKind::UInt64 => "uint64",
            BuiltinKind::Float32 => "float32",
            BuiltinKind::Float64 => "float64",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Builtin(BuiltinKind),
    /// `pointer to T`. `None` is the type of the bare `nothing` literal,
    /// a pointer whose pointee is not yet known.
    Pointer(Option<TypeId>),
    Class(DeclId),
    Alias(DeclId),
    Qualified {
        inner: TypeId,
        constant: bool,
        volatile: bool,
    },
    /// A name the resolver has not looked up yet, or failed to.
    Unresolved(Symbol),
}

/// Interner for types. Builtins, pointer types and qualified wrappers
/// are memoized so the common shapes compare by id.
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    builtins: HashMap<BuiltinKind, TypeId>,
    null_pointer: TypeId,
    pointers: HashMap<TypeId, TypeId>,
    qualified: HashMap<(TypeId, bool, bool), TypeId>,
}

impl TypeTable {
    pub fn new() -> TypeTable {
        let mut table = TypeTable {
            kinds: vec![],
            builtins: HashMap::new(),
            null_pointer: TypeId(0),
            pointers: HashMap::new(),
            qualified: HashMap::new(),
        };
        for kind in BuiltinKind::ALL {
            let id = table.alloc(TypeKind::Builtin(kind));
            table.builtins.insert(kind, id);
        }
        table.null_pointer = table.alloc(TypeKind::Pointer(None));
        table
    }

    fn alloc(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.0 as usize]
    }

    pub fn builtin(&self, kind: BuiltinKind) -> TypeId {
        self.builtins[&kind]
    }

    pub fn null_pointer(&self) -> TypeId {
        self.null_pointer
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        if let Some(id) = self.pointers.get(&pointee) {
            return *id;
        }
        let id = self.alloc(TypeKind::Pointer(Some(pointee)));
        self.pointers.insert(pointee, id);
        id
    }

    /// Wraps `inner` with qualifiers. Asking for neither qualifier is a
    /// no-op and returns `inner` itself.
    pub fn qualified(&mut self, inner: TypeId, constant: bool, volatile: bool) -> TypeId {
        if !constant && !volatile {
            return inner;
        }
        if let Some(id) = self.qualified.get(&(inner, constant, volatile)) {
            return *id;
        }
        let id = self.alloc(TypeKind::Qualified {
            inner,
            constant,
            volatile,
        });
        self.qualified.insert((inner, constant, volatile), id);
        id
    }

    pub fn class(&mut self, decl: DeclId) -> TypeId {
        self.alloc(TypeKind::Class(decl))
    }

    pub fn alias(&mut self, decl: DeclId) -> TypeId {
        self.alloc(TypeKind::Alias(decl))
    }

    pub fn unresolved(&mut self, symbol: Symbol) -> TypeId {
        self.alloc(TypeKind::Unresolved(symbol))
    }

    /// The canonical form: aliases peeled, qualifier chains merged into
    /// a single wrapper, pointee canonicalized. Two types are the same
    /// type exactly when their canonical ids are equal.
    pub fn canonical(&mut self, id: TypeId, decls: &DeclTable) -> TypeId {
        let mut current = id;
        let mut constant = false;
        let mut volatile = false;
        loop {
            match self.kind(current).clone() {
                TypeKind::Alias(decl) => match decls.get(decl) {
                    Decl::TypeAlias(alias) => current = alias.target,
                    _ => break,
                },
                TypeKind::Qualified {
                    inner,
                    constant: c,
                    volatile: v,
                } => {
                    constant |= c;
                    volatile |= v;
                    current = inner;
                }
                TypeKind::Pointer(Some(pointee)) => {
                    let canon = self.canonical(pointee, decls);
                    current = self.pointer_to(canon);
                    break;
                }
                _ => break,
            }
        }
        self.qualified(current, constant, volatile)
    }

    pub fn are_equivalent(&mut self, a: TypeId, b: TypeId, decls: &DeclTable) -> bool {
        self.canonical(a, decls) == self.canonical(b, decls)
    }

    /// Peels qualifier wrappers off an already-canonical id.
    pub fn unqualified(&self, id: TypeId) -> TypeId {
        match self.kind(id) {
            TypeKind::Qualified { inner, .. } => *inner,
            _ => id,
        }
    }

    /// Whether an already-canonical id carries the `const` qualifier.
    pub fn is_const(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Qualified { constant: true, .. })
    }

    pub fn as_builtin(&mut self, id: TypeId, decls: &DeclTable) -> Option<BuiltinKind> {
        let canon = self.canonical(id, decls);
        match self.kind(self.unqualified(canon)) {
            TypeKind::Builtin(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_void(&mut self, id: TypeId, decls: &DeclTable) -> bool {
        self.as_builtin(id, decls) == Some(BuiltinKind::Void)
    }

    pub fn is_bool(&mut self, id: TypeId, decls: &DeclTable) -> bool {
        self.as_builtin(id, decls) == Some(BuiltinKind::Bool)
    }

    pub fn is_pointer(&mut self, id: TypeId, decls: &DeclTable) -> bool {
        let canon = self.canonical(id, decls);
        matches!(self.kind(self.unqualified(canon)), TypeKind::Pointer(_))
    }

    fn builtin_cast(a: BuiltinKind, b: BuiltinKind, explicit: bool) -> bool {
        use BuiltinKind::*;
        if a == b {
            return true;
        }
        // void and string never convert; bool is produced only by
        // condition evaluation, not by casting into it.
        if matches!(a, Void | String) || matches!(b, Void | String | Bool) {
            return false;
        }
        if a == Bool {
            return explicit && b.is_integer();
        }
        let a_int = a.is_integer() || a == Char;
        let b_int = b.is_integer() || b == Char;
        if a_int && b_int {
            return true;
        }
        if a_int && b.is_float() {
            return true;
        }
        if a.is_float() && b_int {
            return explicit;
        }
        // Both floats: widening is implicit, narrowing needs a cast.
        matches!((a, b), (Float32, Float64)) || explicit
    }

    /// Whether `src` converts to `dest`. Implicit conversions are the
    /// value-preserving ones; `explicit` additionally admits narrowing.
    pub fn can_cast_to(
        &mut self,
        src: TypeId,
        dest: TypeId,
        explicit: bool,
        decls: &DeclTable,
    ) -> bool {
        let s = self.canonical(src, decls);
        let s = self.unqualified(s);
        let d = self.canonical(dest, decls);
        let d = self.unqualified(d);
        if s == d {
            return true;
        }
        match (self.kind(s).clone(), self.kind(d).clone()) {
            (TypeKind::Builtin(a), TypeKind::Builtin(b)) => Self::builtin_cast(a, b, explicit),
            (TypeKind::Pointer(None), TypeKind::Pointer(_)) => true,
            (TypeKind::Pointer(Some(a)), TypeKind::Pointer(Some(b))) => {
                explicit || self.are_equivalent(a, b, decls)
            }
            _ => false,
        }
    }

    /// Assignment is more permissive than implicit casting for numeric
    /// operands: any numeric value may be stored into any numeric slot.
    pub fn can_assign_to(&mut self, src: TypeId, dest: TypeId, decls: &DeclTable) -> bool {
        if let (Some(a), Some(b)) = (self.as_builtin(src, decls), self.as_builtin(dest, decls)) {
            if a.is_numeric() && b.is_numeric() {
                return true;
            }
        }
        self.can_cast_to(src, dest, false, decls)
    }

    /// Human-readable spelling for diagnostics.
    pub fn display(&self, id: TypeId, decls: &DeclTable) -> String {
        match self.kind(id) {
            TypeKind::Builtin(kind) => kind.name().to_string(),
            TypeKind::Pointer(None) => String::from("pointer to nothing"),
            TypeKind::Pointer(Some(pointee)) => {
                format!("pointer to {}", self.display(*pointee, decls))
            }
            TypeKind::Class(decl) => decls.name_of(*decl).to_string(),
            TypeKind::Alias(decl) => decls.name_of(*decl).to_string(),
            TypeKind::Qualified {
                inner,
                constant,
                volatile,
            } => {
                let mut out = String::new();
                if *constant {
                    let _ = write!(out, "const ");
                }
                if *volatile {
                    let _ = write!(out, "volatile ");
                }
                let _ = write!(out, "{}", self.display(*inner, decls));
                out
            }
            TypeKind::Unresolved(symbol) => symbol.path_string(),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}
