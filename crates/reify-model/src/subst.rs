use std::collections::HashMap;

use crate::{ClassType, Type, TypeVarId, WildcardBound};

/// Mapping from type-variable identity to a concrete type expression.
///
/// Insertion order is irrelevant; layering is done by cloning and inserting
/// on top, so inner entries shadow outer ones while outer substitutions stay
/// visible to nested resolution.
pub type Substitution = HashMap<TypeVarId, Type>;

/// Replace mapped type variables in `ty`, structurally.
///
/// Replacement values are taken as-is; chained variables (`T -> U -> ..`) are
/// followed at resolution time, not here.
pub fn substitute(ty: &Type, subst: &Substitution) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::Class(ClassType {
            def: *def,
            args: args.iter().map(|arg| substitute(arg, subst)).collect(),
        }),
        Type::Array(elem) => Type::Array(Box::new(substitute(elem, subst))),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, subst))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, subst))))
        }
        Type::Wildcard(WildcardBound::Unbounded) | Type::Primitive(_) => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{TypeEnv, TypeStore};

    #[test]
    fn substitute_replaces_nested_occurrences() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = store.well_known().string;
        let list = store.class_id("java.util.List").unwrap();
        let object = Type::class(store.well_known().object, vec![]);

        let t = store.add_type_param("T", vec![object]);
        let subst = Substitution::from([(t, Type::class(string, vec![]))]);

        let ty = Type::Array(Box::new(Type::class(list, vec![Type::TypeVar(t)])));
        assert_eq!(
            substitute(&ty, &subst),
            Type::Array(Box::new(Type::class(
                list,
                vec![Type::class(string, vec![])]
            )))
        );
    }

    #[test]
    fn substitute_leaves_unmapped_variables_alone() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);
        let t = store.add_type_param("T", vec![object]);

        let ty = Type::Wildcard(WildcardBound::Extends(Box::new(Type::TypeVar(t))));
        assert_eq!(substitute(&ty, &Substitution::new()), ty);
    }
}
