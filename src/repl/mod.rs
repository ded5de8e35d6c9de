mod decl;
mod error;
mod eval;
mod expr;
mod mem;
mod registry;
mod session;
mod ty;

/// Declaration model and glue-source generation types.
pub use decl::{Declaration, EmitState, ParsedDecl, RawDecl, SourceFragments, ValueDecl};
/// Error and result aliases.
pub use error::{ReplError, Result};
/// Memory evaluator entry points and render limits.
pub use eval::{Evaluator, RenderOptions, resolve_casts};
/// Navigation expression parser types.
pub use expr::{NavExpr, Op, OpKind, ParseNote};
/// Checked live-memory access types.
pub use mem::{MemSpan, MemView};
/// Type registry, aggregate builder, and static reflection trait.
pub use registry::{AggregateBuilder, Reflect, TypeRegistry};
/// Session state and the front-end facade.
pub use session::{ListedSymbol, Session};
/// Type descriptor model and layout constants.
pub use ty::{DYN_ARRAY_SIZE, Member, POINTER_SIZE, TypeDescriptor, TypeId, TypeKind};
