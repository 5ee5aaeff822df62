use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, Type, TypeEnv, TypeParamDef, TypeVarId,
};

/// Ids of classes the resolver itself needs to know about: the top type and
/// the collection/map roots that drive structural classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub iterable: ClassId,
    pub collection: ClassId,
    pub map: ClassId,
}

/// Registry of class and type-parameter definitions.
///
/// Definitions are interned once and referred to by id afterwards; ids are
/// only meaningful against the store that allocated them.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    /// A store pre-seeded with the slice of `java.lang`/`java.util` the
    /// resolver's structural queries depend on.
    pub fn with_minimal_jdk() -> Self {
        let placeholder = ClassId(0);
        let mut store = Self {
            classes: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                iterable: placeholder,
                collection: placeholder,
                map: placeholder,
            },
        };

        let object = store.add_simple("java.lang.Object", ClassKind::Class, None, vec![]);
        let object_ty = Type::class(object, vec![]);

        let serializable =
            store.add_simple("java.io.Serializable", ClassKind::Interface, None, vec![]);
        let char_sequence =
            store.add_simple("java.lang.CharSequence", ClassKind::Interface, None, vec![]);

        let comparable_t = store.add_type_param("T", vec![object_ty.clone()]);
        let comparable = store.add_class(ClassDef {
            name: "java.lang.Comparable".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![comparable_t],
            super_class: None,
            interfaces: vec![],
            constructors: vec![],
            methods: vec![],
        });

        let string = store.add_simple(
            "java.lang.String",
            ClassKind::Class,
            Some(object_ty.clone()),
            vec![],
        );
        store.classes[string.0 as usize].interfaces = vec![
            Type::class(comparable, vec![Type::class(string, vec![])]),
            Type::class(char_sequence, vec![]),
            Type::class(serializable, vec![]),
        ];

        let number = store.add_simple(
            "java.lang.Number",
            ClassKind::Class,
            Some(object_ty.clone()),
            vec![Type::class(serializable, vec![])],
        );
        let integer = store.add_simple(
            "java.lang.Integer",
            ClassKind::Class,
            Some(Type::class(number, vec![])),
            vec![],
        );
        store.classes[integer.0 as usize].interfaces =
            vec![Type::class(comparable, vec![Type::class(integer, vec![])])];
        let long = store.add_simple(
            "java.lang.Long",
            ClassKind::Class,
            Some(Type::class(number, vec![])),
            vec![],
        );
        store.classes[long.0 as usize].interfaces =
            vec![Type::class(comparable, vec![Type::class(long, vec![])])];

        let iterable_t = store.add_type_param("T", vec![object_ty.clone()]);
        let iterable = store.add_class(ClassDef {
            name: "java.lang.Iterable".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![iterable_t],
            super_class: None,
            interfaces: vec![],
            constructors: vec![],
            methods: vec![],
        });

        let collection_e = store.add_type_param("E", vec![object_ty.clone()]);
        let collection = store.add_class(ClassDef {
            name: "java.util.Collection".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![collection_e],
            super_class: None,
            interfaces: vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])],
            constructors: vec![],
            methods: vec![],
        });

        let list_e = store.add_type_param("E", vec![object_ty.clone()]);
        let list = store.add_class(ClassDef {
            name: "java.util.List".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![list_e],
            super_class: None,
            interfaces: vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
            constructors: vec![],
            methods: vec![],
        });

        let set_e = store.add_type_param("E", vec![object_ty.clone()]);
        let _set = store.add_class(ClassDef {
            name: "java.util.Set".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![set_e],
            super_class: None,
            interfaces: vec![Type::class(collection, vec![Type::TypeVar(set_e)])],
            constructors: vec![],
            methods: vec![],
        });

        let array_list_e = store.add_type_param("E", vec![object_ty.clone()]);
        let _array_list = store.add_class(ClassDef {
            name: "java.util.ArrayList".to_string(),
            kind: ClassKind::Class,
            type_params: vec![array_list_e],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
            constructors: vec![],
            methods: vec![],
        });

        let map_k = store.add_type_param("K", vec![object_ty.clone()]);
        let map_v = store.add_type_param("V", vec![object_ty.clone()]);
        let map = store.add_class(ClassDef {
            name: "java.util.Map".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![map_k, map_v],
            super_class: None,
            interfaces: vec![],
            constructors: vec![],
            methods: vec![],
        });

        let hash_map_k = store.add_type_param("K", vec![object_ty.clone()]);
        let hash_map_v = store.add_type_param("V", vec![object_ty.clone()]);
        let _hash_map = store.add_class(ClassDef {
            name: "java.util.HashMap".to_string(),
            kind: ClassKind::Class,
            type_params: vec![hash_map_k, hash_map_v],
            super_class: Some(object_ty),
            interfaces: vec![Type::class(
                map,
                vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
            )],
            constructors: vec![],
            methods: vec![],
        });

        store.well_known = WellKnownTypes {
            object,
            string,
            iterable,
            collection,
            map,
        };
        store
    }

    fn add_simple(
        &mut self,
        name: &str,
        kind: ClassKind,
        super_class: Option<Type>,
        interfaces: Vec<Type>,
    ) -> ClassId {
        self.add_class(ClassDef {
            name: name.to_string(),
            kind,
            type_params: vec![],
            super_class,
            interfaces,
            constructors: vec![],
            methods: vec![],
        })
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    /// Allocate a fresh type parameter. Each call yields a distinct id, so
    /// parameters that share a name across declaration sites stay distinct.
    pub fn add_type_param(&mut self, name: &str, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            upper_bounds,
        });
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    /// Mutable access to a type parameter, for bounds that can only be
    /// written once the parameter's own id exists (`T extends Comparable<T>`).
    pub fn type_param_mut(&mut self, id: TypeVarId) -> Option<&mut TypeParamDef> {
        self.type_params.get_mut(id.0 as usize)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn minimal_jdk_wires_the_collection_hierarchy() {
        let store = TypeStore::with_minimal_jdk();

        let list = store.class_id("java.util.List").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();

        let list_def = store.class(list).unwrap();
        assert_eq!(list_def.kind, ClassKind::Interface);
        assert_eq!(list_def.type_params.len(), 1);
        assert_eq!(
            list_def.interfaces,
            vec![Type::class(
                collection,
                vec![Type::TypeVar(list_def.type_params[0])]
            )]
        );
    }

    #[test]
    fn well_known_ids_match_registered_names() {
        let store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();

        assert_eq!(store.class_id("java.lang.Object"), Some(wk.object));
        assert_eq!(store.class_id("java.lang.String"), Some(wk.string));
        assert_eq!(store.class_id("java.lang.Iterable"), Some(wk.iterable));
        assert_eq!(store.class_id("java.util.Collection"), Some(wk.collection));
        assert_eq!(store.class_id("java.util.Map"), Some(wk.map));
    }

    #[test]
    fn type_params_with_the_same_name_get_distinct_ids() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);

        let a = store.add_type_param("T", vec![object.clone()]);
        let b = store.add_type_param("T", vec![object]);

        assert_ne!(a, b);
        assert_eq!(store.type_param(a).unwrap().name, "T");
        assert_eq!(store.type_param(b).unwrap().name, "T");
    }
}
