// src/sema/compatibility.rs
//
// Type compatibility checking over the canonical arena.
//
// Assignability is reflexive; numeric promotion goes strictly upward in
// width within a signedness family, unsigned widens into strictly larger
// signed, f32 widens to f64. Functions are contravariant in parameters
// and covariant in return type. Container types (array/pointer/optional)
// are invariant in their components, which interning reduces to a TypeId
// comparison.

use crate::sema::type_arena::{SemaType, TypeArena, TypeId};

/// Check if a primitive can widen to another primitive.
fn can_widen_primitive(from: TypeId, to: TypeId) -> bool {
    let (Some(from_width), Some(to_width)) = (from.numeric_width(), to.numeric_width()) else {
        return false;
    };

    if from.is_signed_int() && to.is_signed_int() {
        return from_width < to_width;
    }
    if from.is_unsigned_int() && to.is_unsigned_int() {
        return from_width < to_width;
    }
    // Unsigned fits into any strictly larger signed type
    if from.is_unsigned_int() && to.is_signed_int() {
        return from_width < to_width;
    }
    if from.is_float() && to.is_float() {
        return from_width < to_width;
    }
    false
}

/// Check if a value of type `from` can be assigned to a location of type
/// `to`.
pub fn is_assignable(arena: &TypeArena, from: TypeId, to: TypeId) -> bool {
    // Interning makes structural equality a handle comparison
    if from == to {
        return true;
    }

    // Error type is compatible with anything (for error recovery)
    if from.is_invalid() || to.is_invalid() {
        return true;
    }

    if can_widen_primitive(from, to) {
        return true;
    }

    // Function types: contravariant parameters, covariant return
    if let (
        SemaType::Function {
            params: from_params,
            ret: from_ret,
            is_pure: from_pure,
        },
        SemaType::Function {
            params: to_params,
            ret: to_ret,
            is_pure: to_pure,
        },
    ) = (arena.get(from), arena.get(to))
    {
        if from_params.len() != to_params.len() {
            return false;
        }
        // A slot expecting a pure function only accepts pure functions
        if *to_pure && !*from_pure {
            return false;
        }
        let params_ok = to_params
            .iter()
            .zip(from_params.iter())
            .all(|(&expected, &actual)| is_assignable(arena, expected, actual));
        return params_ok && is_assignable(arena, *from_ret, *to_ret);
    }

    // Arrays, pointers, optionals, structs: invariant, already covered
    // by the handle comparison above
    false
}

/// Result type of a binary arithmetic operation: the join of the two
/// operand types on the promotion lattice, if one exists.
pub fn promote_arithmetic_types(arena: &TypeArena, a: TypeId, b: TypeId) -> Option<TypeId> {
    if a.is_invalid() || b.is_invalid() {
        return Some(TypeId::INVALID);
    }
    if !is_numeric_type(arena, a) || !is_numeric_type(arena, b) {
        return None;
    }
    if a == b {
        return Some(a);
    }
    if can_widen_primitive(a, b) {
        return Some(b);
    }
    if can_widen_primitive(b, a) {
        return Some(a);
    }
    None
}

/// Types that satisfy a `numeric` constraint
pub fn is_numeric_type(arena: &TypeArena, ty: TypeId) -> bool {
    match arena.get(ty) {
        SemaType::Primitive(_) => ty.is_numeric(),
        SemaType::Invalid { .. } => true,
        _ => false,
    }
}

/// Types that satisfy a `comparable` constraint (ordered comparison)
pub fn is_comparable_type(arena: &TypeArena, ty: TypeId) -> bool {
    match arena.get(ty) {
        SemaType::Primitive(_) => ty.is_numeric() || ty == TypeId::STRING || ty == TypeId::BOOL,
        SemaType::Invalid { .. } => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::type_arena::TypeIdVec;
    use smallvec::smallvec;

    #[test]
    fn assignability_is_reflexive() {
        let mut arena = TypeArena::new();
        let array = arena.array_type(TypeId::I32, crate::sema::type_arena::ArraySize::Dynamic);
        for ty in [TypeId::I8, TypeId::F64, TypeId::STRING, TypeId::VOID, array] {
            assert!(is_assignable(&arena, ty, ty));
        }
    }

    #[test]
    fn integer_widening_is_upward_only() {
        let arena = TypeArena::new();
        assert!(is_assignable(&arena, TypeId::I8, TypeId::I16));
        assert!(is_assignable(&arena, TypeId::I16, TypeId::I32));
        assert!(is_assignable(&arena, TypeId::I8, TypeId::I32));
        assert!(!is_assignable(&arena, TypeId::I32, TypeId::I16));
        assert!(!is_assignable(&arena, TypeId::I64, TypeId::I8));
    }

    #[test]
    fn unsigned_widens_into_larger_signed() {
        let arena = TypeArena::new();
        assert!(is_assignable(&arena, TypeId::U8, TypeId::I16));
        assert!(is_assignable(&arena, TypeId::U16, TypeId::I32));
        assert!(is_assignable(&arena, TypeId::U32, TypeId::I64));
        // Same width is not allowed
        assert!(!is_assignable(&arena, TypeId::U8, TypeId::I8));
        assert!(!is_assignable(&arena, TypeId::U64, TypeId::I64));
        // Signed never widens into unsigned
        assert!(!is_assignable(&arena, TypeId::I8, TypeId::U16));
    }

    #[test]
    fn float_promotion_is_one_way() {
        let arena = TypeArena::new();
        assert!(is_assignable(&arena, TypeId::F32, TypeId::F64));
        assert!(!is_assignable(&arena, TypeId::F64, TypeId::F32));
        // No implicit int-to-float promotion
        assert!(!is_assignable(&arena, TypeId::I32, TypeId::F64));
    }

    #[test]
    fn unrelated_primitives_are_incompatible() {
        let arena = TypeArena::new();
        assert!(!is_assignable(&arena, TypeId::BOOL, TypeId::I32));
        assert!(!is_assignable(&arena, TypeId::STRING, TypeId::BOOL));
        assert!(!is_assignable(&arena, TypeId::I32, TypeId::STRING));
    }

    #[test]
    fn invalid_is_compatible_with_anything() {
        let arena = TypeArena::new();
        assert!(is_assignable(&arena, TypeId::INVALID, TypeId::I32));
        assert!(is_assignable(&arena, TypeId::STRING, TypeId::INVALID));
    }

    #[test]
    fn function_params_are_contravariant_return_covariant() {
        let mut arena = TypeArena::new();
        // fn(i32) -> i16 assignable to a slot expecting fn(i16) -> i32:
        // accepts a wider argument, returns a narrower result
        let params_wide: TypeIdVec = smallvec![TypeId::I32];
        let from = arena.function_type(params_wide, TypeId::I16, false);
        let params_narrow: TypeIdVec = smallvec![TypeId::I16];
        let to = arena.function_type(params_narrow, TypeId::I32, false);
        assert!(is_assignable(&arena, from, to));
        assert!(!is_assignable(&arena, to, from));
    }

    #[test]
    fn function_arity_must_match() {
        let mut arena = TypeArena::new();
        let one: TypeIdVec = smallvec![TypeId::I32];
        let two: TypeIdVec = smallvec![TypeId::I32, TypeId::I32];
        let f1 = arena.function_type(one, TypeId::VOID, false);
        let f2 = arena.function_type(two, TypeId::VOID, false);
        assert!(!is_assignable(&arena, f1, f2));
    }

    #[test]
    fn pure_slot_rejects_impure_function() {
        let mut arena = TypeArena::new();
        let impure = arena.function_type(TypeIdVec::new(), TypeId::VOID, false);
        let pure = arena.function_type(TypeIdVec::new(), TypeId::VOID, true);
        assert!(!is_assignable(&arena, impure, pure));
        assert!(is_assignable(&arena, pure, impure));
    }

    #[test]
    fn containers_are_invariant() {
        let mut arena = TypeArena::new();
        use crate::sema::type_arena::ArraySize;
        let arr_i16 = arena.array_type(TypeId::I16, ArraySize::Dynamic);
        let arr_i32 = arena.array_type(TypeId::I32, ArraySize::Dynamic);
        assert!(!is_assignable(&arena, arr_i16, arr_i32));

        let opt_i16 = arena.optional_type(TypeId::I16);
        let opt_i32 = arena.optional_type(TypeId::I32);
        assert!(!is_assignable(&arena, opt_i16, opt_i32));

        let ptr_i16 = arena.pointer_type(TypeId::I16, false, false);
        let ptr_i32 = arena.pointer_type(TypeId::I32, false, false);
        assert!(!is_assignable(&arena, ptr_i16, ptr_i32));
    }

    #[test]
    fn promotion_computes_the_join() {
        let arena = TypeArena::new();
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::I8, TypeId::I32),
            Some(TypeId::I32)
        );
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::I32, TypeId::I8),
            Some(TypeId::I32)
        );
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::F32, TypeId::F64),
            Some(TypeId::F64)
        );
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::I32, TypeId::I32),
            Some(TypeId::I32)
        );
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::BOOL, TypeId::I32),
            None
        );
        // Incomparable pair: same-width signed/unsigned has no join here
        assert_eq!(
            promote_arithmetic_types(&arena, TypeId::U64, TypeId::I64),
            None
        );
    }

    #[test]
    fn comparable_covers_strings_but_not_composites() {
        let mut arena = TypeArena::new();
        assert!(is_comparable_type(&arena, TypeId::STRING));
        assert!(is_comparable_type(&arena, TypeId::I32));
        let opt = arena.optional_type(TypeId::I32);
        assert!(!is_comparable_type(&arena, opt));
    }
}
