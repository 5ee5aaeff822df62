use reify_model::{ClassId, TypeVarId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failures while resolving a declared type expression.
///
/// These are registration-time errors: declared type shapes are static, so a
/// malformed expression is a caller bug to surface immediately, not a
/// condition to retry. "Not an ancestor" and "no such type argument" are
/// expected outcomes and reported as `None` by the query methods instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("wildcard type has no resolvable bound")]
    UnboundedWildcard,
    #[error("unknown class {0:?}")]
    UnknownClass(ClassId),
    #[error("unknown type variable {0:?}")]
    UnknownTypeVar(TypeVarId),
    #[error("type argument arity mismatch for {class}: declared {declared}, supplied {supplied}")]
    TypeArgumentArity {
        class: String,
        declared: usize,
        supplied: usize,
    },
}
