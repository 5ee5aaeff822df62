//! Declared-hierarchy walking with type-argument substitution applied along
//! the way.

use std::collections::HashSet;

use reify_model::{substitute, ClassId, ClassType, Substitution, Type, TypeEnv};

/// View `ty` as an instantiation of `target`.
///
/// Walks the declared supertype graph depth-first, superclass before
/// interfaces and interfaces in declaration order, substituting each
/// instantiation's type arguments into its supertype declarations. The first
/// match wins, which keeps the result deterministic for identical inputs.
///
/// Raw usage of a generic class contributes no substitution entries, so
/// supertype arguments stay as their declared variables; the caller decides
/// how to treat those (see `TypeDescriptor::type_argument_at`).
///
/// Example: `ArrayList<String>` viewed as `Collection` yields
/// `Collection<String>`.
pub(crate) fn view_as_ancestor(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let mut seen = HashSet::new();
    inner(env, ty, target, &mut seen)
}

fn inner(
    env: &dyn TypeEnv,
    ty: &Type,
    target: ClassId,
    seen: &mut HashSet<(ClassId, Vec<Type>)>,
) -> Option<Type> {
    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };
    if !seen.insert((*def, args.clone())) {
        return None;
    }
    if *def == target {
        return Some(ty.clone());
    }

    let class_def = env.class(*def)?;

    let mut subst = Substitution::new();
    if !args.is_empty() {
        for (formal, actual) in class_def.type_params.iter().copied().zip(args.iter()) {
            subst.insert(formal, actual.clone());
        }
    }

    if let Some(super_class) = &class_def.super_class {
        let super_class = substitute(super_class, &subst);
        if let Some(found) = inner(env, &super_class, target, seen) {
            return Some(found);
        }
    }

    for iface in &class_def.interfaces {
        let iface = substitute(iface, &subst);
        if let Some(found) = inner(env, &iface, target, seen) {
            return Some(found);
        }
    }

    None
}

/// Whether `target` is reachable from `raw` in the erased declared graph.
pub(crate) fn raw_reaches(env: &dyn TypeEnv, raw: ClassId, target: ClassId) -> bool {
    view_as_ancestor(env, &Type::class(raw, Vec::new()), target).is_some()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use reify_model::{TypeEnv, TypeStore};

    use super::*;

    #[test]
    fn view_as_ancestor_carries_type_arguments_up() {
        let store = TypeStore::with_minimal_jdk();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let string = Type::class(store.well_known().string, vec![]);

        let viewed = view_as_ancestor(
            &store,
            &Type::class(array_list, vec![string.clone()]),
            collection,
        )
        .unwrap();
        assert_eq!(viewed, Type::class(collection, vec![string]));
    }

    #[test]
    fn superclass_is_searched_before_interfaces() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let integer_id = store.class_id("java.lang.Integer").unwrap();
        let integer = Type::class(integer_id, vec![]);

        let base = store.add_class(reify_model::ClassDef {
            name: "com.example.Base".to_string(),
            kind: reify_model::ClassKind::Class,
            type_params: vec![],
            super_class: Some(object.clone()),
            interfaces: vec![Type::class(list, vec![string.clone()])],
            constructors: vec![],
            methods: vec![],
        });
        let derived = store.add_class(reify_model::ClassDef {
            name: "com.example.Derived".to_string(),
            kind: reify_model::ClassKind::Class,
            type_params: vec![],
            super_class: Some(Type::class(base, vec![])),
            interfaces: vec![Type::class(list, vec![integer.clone()])],
            constructors: vec![],
            methods: vec![],
        });

        // The superclass path reaches List<String> only transitively, while
        // the direct interface declares List<Integer>; superclass-first
        // depth-first order must still pick the superclass path.
        let viewed = view_as_ancestor(&store, &Type::class(derived, vec![]), list).unwrap();
        assert_eq!(viewed, Type::class(list, vec![string]));
    }

    #[test]
    fn unrelated_target_is_not_an_ancestor() {
        let store = TypeStore::with_minimal_jdk();
        let string = store.well_known().string;
        let map = store.well_known().map;

        assert_eq!(
            view_as_ancestor(&store, &Type::class(string, vec![]), map),
            None
        );
        assert!(!raw_reaches(&store, string, map));
    }
}
