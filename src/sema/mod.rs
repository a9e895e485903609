// src/sema/mod.rs
//
// Semantic analysis: name resolution, type interning and inference,
// and validation rules, all reporting through one diagnostic sink.

pub mod analyzer;
pub mod compatibility;
pub mod infer;
pub mod profile;
pub mod resolve;
pub mod scope;
pub mod symbol_table;
pub mod type_arena;
pub mod validator;

pub use analyzer::{AnalysisStatistics, Analyzer};
pub use compatibility::{
    is_assignable, is_comparable_type, is_numeric_type, promote_arithmetic_types,
};
pub use infer::{Constraint, InferVarId, InferenceEngine, InferenceStatistics};
pub use profile::{has_feature, lowest_profile_with, Feature, Profile};
pub use resolve::{Resolution, Resolver};
pub use scope::{Scope, ScopeId, ScopeKind};
pub use symbol_table::{
    ModuleRef, SymbolData, SymbolId, SymbolKind, SymbolTable, SymbolTableStatistics, Visibility,
};
pub use type_arena::{
    ArraySize, PrimitiveType, SemaType, StructFields, TypeArena, TypeArenaStatistics, TypeId,
    TypeIdVec,
};
pub use validator::{AssignmentState, SemanticValidator, ValidatorStatistics};
