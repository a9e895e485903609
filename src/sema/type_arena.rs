// src/sema/type_arena.rs
//
// Interned type system using TypeId handles for O(1) equality and minimal
// allocations.
//
// This module provides the canonical type representation for Janus
// semantic analysis:
// - TypeId: u32 handle to an interned type (Copy, trivial Eq/Hash)
// - TypeArena: per-compilation storage with automatic deduplication
// - SemaType: the canonical representation using TypeId for child types
//
// Composite types hash over the TypeIds of their children, never over
// nested structure, so self-referential shapes (a pointer to a struct
// containing a pointer to itself) intern without re-descending.

use hashbrown::HashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::intern::{Interner, Symbol};
use crate::sema::infer::InferVarId;

/// Concrete type identity in the TypeArena.
///
/// Two structurally identical type descriptions always resolve to the
/// same TypeId; equality on TypeId is structural equality.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    // ========================================================================
    // Reserved TypeIds for primitives and special types
    // These are guaranteed to be interned at these indices by TypeArena::new()
    // ========================================================================

    // Invalid type (must be 0 for is_invalid() check)
    pub const INVALID: TypeId = TypeId(0);

    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);

    // Signed integers
    pub const I8: TypeId = TypeId(3);
    pub const I16: TypeId = TypeId(4);
    pub const I32: TypeId = TypeId(5);
    pub const I64: TypeId = TypeId(6);

    // Unsigned integers
    pub const U8: TypeId = TypeId(7);
    pub const U16: TypeId = TypeId(8);
    pub const U32: TypeId = TypeId(9);
    pub const U64: TypeId = TypeId(10);

    // Floating point
    pub const F32: TypeId = TypeId(11);
    pub const F64: TypeId = TypeId(12);

    pub const STRING: TypeId = TypeId(13);

    /// First non-reserved TypeId index (for dynamic types)
    pub const FIRST_DYNAMIC: u32 = 14;

    /// Get the raw index (for debugging/serialization)
    pub fn index(self) -> u32 {
        self.0
    }

    /// Check if this is a reserved (primitive/special) TypeId
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self == Self::VOID
    }

    /// Check if this is a signed integer type (no arena needed)
    #[inline]
    pub fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Check if this is an unsigned integer type (no arena needed)
    #[inline]
    pub fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Bit width for integer and float primitives
    #[inline]
    pub fn numeric_width(self) -> Option<u8> {
        match self {
            Self::I8 | Self::U8 => Some(8),
            Self::I16 | Self::U16 => Some(16),
            Self::I32 | Self::U32 | Self::F32 => Some(32),
            Self::I64 | Self::U64 | Self::F64 => Some(64),
            _ => None,
        }
    }
}

/// SmallVec for type children - inline up to 4 (covers most param lists)
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// Fixed-width primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
        }
    }
}

/// Array size: fixed length known at compile time, or dynamic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySize {
    Fixed(u64),
    Dynamic,
}

/// The canonical type representation in Janus.
///
/// Interned in the TypeArena; use TypeId handles for O(1) equality and
/// pass-by-copy. Access the SemaType via arena.get(id).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum SemaType {
    Primitive(PrimitiveType),
    Void,

    // Error/invalid type, compatible with anything for local recovery
    Invalid {
        kind: &'static str,
    },

    Function {
        params: TypeIdVec,
        ret: TypeId,
        is_pure: bool,
    },
    Array {
        element: TypeId,
        size: ArraySize,
    },
    Pointer {
        pointee: TypeId,
        mutable: bool,
        nullable: bool,
    },
    Optional(TypeId),

    // Nominal struct type. Identity is the declared name; the field
    // table lives beside the arena so a struct can reference itself
    // through a pointer before its fields are known.
    Struct {
        name: Symbol,
    },

    // Placeholder bound by constraint solving
    Inferred(InferVarId),
}

/// Field table of a registered struct type
#[derive(Debug, Clone, Default)]
pub struct StructFields {
    pub fields: SmallVec<[(Symbol, TypeId); 4]>,
}

impl StructFields {
    pub fn get(&self, name: Symbol) -> Option<TypeId> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, ty)| *ty)
    }
}

/// Pre-interned primitive types for O(1) access
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveTypes {
    pub invalid: TypeId,
    pub void: TypeId,
    pub bool: TypeId,
    pub i8: TypeId,
    pub i16: TypeId,
    pub i32: TypeId,
    pub i64: TypeId,
    pub u8: TypeId,
    pub u16: TypeId,
    pub u32: TypeId,
    pub u64: TypeId,
    pub f32: TypeId,
    pub f64: TypeId,
    pub string: TypeId,
}

/// Running counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeArenaStatistics {
    pub types_interned: usize,
    pub dedup_hits: usize,
}

/// Per-compilation type arena with automatic interning/deduplication.
pub struct TypeArena {
    /// Interned types, indexed by TypeId
    types: Vec<SemaType>,
    /// Deduplication map - hashbrown for better perf
    intern_map: HashMap<SemaType, TypeId>,
    /// Pre-interned primitives for O(1) access
    pub primitives: PrimitiveTypes,
    /// Field tables for registered struct types
    struct_fields: FxHashMap<TypeId, StructFields>,
    dedup_hits: usize,
}

impl std::fmt::Debug for TypeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("types_count", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl TypeArena {
    /// Create a new TypeArena with pre-interned primitive types
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: HashMap::new(),
            struct_fields: FxHashMap::default(),
            dedup_hits: 0,
            primitives: PrimitiveTypes {
                // Temporary placeholders - filled in below
                invalid: TypeId(0),
                void: TypeId(0),
                bool: TypeId(0),
                i8: TypeId(0),
                i16: TypeId(0),
                i32: TypeId(0),
                i64: TypeId(0),
                u8: TypeId(0),
                u16: TypeId(0),
                u32: TypeId(0),
                u64: TypeId(0),
                f32: TypeId(0),
                f64: TypeId(0),
                string: TypeId(0),
            },
        };

        // Pre-intern all primitive types in the order defined by TypeId
        // constants. The debug_asserts verify the constants match the
        // actual interned indices.
        arena.primitives.invalid = arena.intern(SemaType::Invalid { kind: "invalid" });
        debug_assert_eq!(arena.primitives.invalid, TypeId::INVALID);
        arena.primitives.void = arena.intern(SemaType::Void);
        debug_assert_eq!(arena.primitives.void, TypeId::VOID);
        arena.primitives.bool = arena.intern(SemaType::Primitive(PrimitiveType::Bool));
        debug_assert_eq!(arena.primitives.bool, TypeId::BOOL);

        arena.primitives.i8 = arena.intern(SemaType::Primitive(PrimitiveType::I8));
        debug_assert_eq!(arena.primitives.i8, TypeId::I8);
        arena.primitives.i16 = arena.intern(SemaType::Primitive(PrimitiveType::I16));
        debug_assert_eq!(arena.primitives.i16, TypeId::I16);
        arena.primitives.i32 = arena.intern(SemaType::Primitive(PrimitiveType::I32));
        debug_assert_eq!(arena.primitives.i32, TypeId::I32);
        arena.primitives.i64 = arena.intern(SemaType::Primitive(PrimitiveType::I64));
        debug_assert_eq!(arena.primitives.i64, TypeId::I64);

        arena.primitives.u8 = arena.intern(SemaType::Primitive(PrimitiveType::U8));
        debug_assert_eq!(arena.primitives.u8, TypeId::U8);
        arena.primitives.u16 = arena.intern(SemaType::Primitive(PrimitiveType::U16));
        debug_assert_eq!(arena.primitives.u16, TypeId::U16);
        arena.primitives.u32 = arena.intern(SemaType::Primitive(PrimitiveType::U32));
        debug_assert_eq!(arena.primitives.u32, TypeId::U32);
        arena.primitives.u64 = arena.intern(SemaType::Primitive(PrimitiveType::U64));
        debug_assert_eq!(arena.primitives.u64, TypeId::U64);

        arena.primitives.f32 = arena.intern(SemaType::Primitive(PrimitiveType::F32));
        debug_assert_eq!(arena.primitives.f32, TypeId::F32);
        arena.primitives.f64 = arena.intern(SemaType::Primitive(PrimitiveType::F64));
        debug_assert_eq!(arena.primitives.f64, TypeId::F64);

        arena.primitives.string = arena.intern(SemaType::Primitive(PrimitiveType::String));
        debug_assert_eq!(arena.primitives.string, TypeId::STRING);

        arena
    }

    /// Intern a type, returning the existing TypeId if already interned.
    /// The hash covers the shape and child TypeIds only.
    fn intern(&mut self, ty: SemaType) -> TypeId {
        if let Some(&existing) = self.intern_map.get(&ty) {
            self.dedup_hits += 1;
            return existing;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern_map.insert(ty, id);
        id
    }

    /// Look up the canonical representation. A missing slot is a broken
    /// internal invariant, not a user error.
    pub fn get(&self, id: TypeId) -> &SemaType {
        self.types
            .get(id.index() as usize)
            .unwrap_or_else(|| panic!("no canonical slot for {:?}", id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ------------------------------------------------------------------
    // Composite constructors
    // ------------------------------------------------------------------

    pub fn function_type(&mut self, params: TypeIdVec, ret: TypeId, is_pure: bool) -> TypeId {
        self.intern(SemaType::Function {
            params,
            ret,
            is_pure,
        })
    }

    pub fn array_type(&mut self, element: TypeId, size: ArraySize) -> TypeId {
        self.intern(SemaType::Array { element, size })
    }

    pub fn pointer_type(&mut self, pointee: TypeId, mutable: bool, nullable: bool) -> TypeId {
        self.intern(SemaType::Pointer {
            pointee,
            mutable,
            nullable,
        })
    }

    pub fn optional_type(&mut self, wrapped: TypeId) -> TypeId {
        self.intern(SemaType::Optional(wrapped))
    }

    /// Placeholder type wrapping an inference variable
    pub fn inferred_type(&mut self, var: InferVarId) -> TypeId {
        self.intern(SemaType::Inferred(var))
    }

    /// Register a struct type by name. Returns the same TypeId for the
    /// same name, so a struct can reference itself before its fields are
    /// attached with [`set_struct_fields`](Self::set_struct_fields).
    pub fn struct_type(&mut self, name: Symbol) -> TypeId {
        self.intern(SemaType::Struct { name })
    }

    pub fn set_struct_fields(&mut self, ty: TypeId, fields: StructFields) {
        debug_assert!(
            matches!(self.get(ty), SemaType::Struct { .. }),
            "field table attached to a non-struct type"
        );
        self.struct_fields.insert(ty, fields);
    }

    pub fn struct_field(&self, ty: TypeId, name: Symbol) -> Option<TypeId> {
        self.struct_fields.get(&ty)?.get(name)
    }

    pub fn struct_field_names(&self, ty: TypeId) -> Vec<Symbol> {
        self.struct_fields
            .get(&ty)
            .map(|f| f.fields.iter().map(|(name, _)| *name).collect())
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> TypeArenaStatistics {
        TypeArenaStatistics {
            types_interned: self.types.len(),
            dedup_hits: self.dedup_hits,
        }
    }

    /// Human-readable form for diagnostics
    pub fn display(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            SemaType::Primitive(p) => p.name().to_string(),
            SemaType::Void => "void".to_string(),
            SemaType::Invalid { kind } => format!("<invalid: {}>", kind),
            SemaType::Function {
                params,
                ret,
                is_pure,
            } => {
                let params = params
                    .iter()
                    .map(|&p| self.display(p, interner))
                    .collect::<Vec<_>>()
                    .join(", ");
                let prefix = if *is_pure { "pure fn" } else { "fn" };
                format!("{}({}) -> {}", prefix, params, self.display(*ret, interner))
            }
            SemaType::Array { element, size } => match size {
                ArraySize::Fixed(n) => format!("[{}; {}]", self.display(*element, interner), n),
                ArraySize::Dynamic => format!("[{}]", self.display(*element, interner)),
            },
            SemaType::Pointer {
                pointee,
                mutable,
                nullable,
            } => {
                let mut out = String::from("*");
                if *mutable {
                    out.push_str("mut ");
                }
                out.push_str(&self.display(*pointee, interner));
                if *nullable {
                    out.push('?');
                }
                out
            }
            SemaType::Optional(wrapped) => format!("{}?", self.display(*wrapped, interner)),
            SemaType::Struct { name } => interner.resolve(*name).to_string(),
            SemaType::Inferred(var) => format!("_{}", var.index()),
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}
