use std::collections::HashSet;

use reify_model::{
    substitute, ClassId, ClassType, ConstructorDef, MethodDef, PrimitiveType, Substitution, Type,
    TypeEnv, TypeVarId, WildcardBound,
};

use crate::supertype::{raw_reaches, view_as_ancestor};
use crate::{ResolveError, Result};

/// The erased type a descriptor ultimately denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawType {
    Class(ClassId),
    Primitive(PrimitiveType),
    Array,
}

/// How a descriptor came to denote its resolved type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Provenance {
    /// Written directly in the declaration.
    Declared,
    /// Reached through a type variable. `substituted` records whether the
    /// context supplied the value, as opposed to falling back to the
    /// variable's declared bound.
    Variable { substituted: bool },
}

/// Recursion guards for a single top-level resolve call.
///
/// `vars` stops a type variable from being expanded through its own bound
/// (`T extends Comparable<T>`); on re-entry the variable resolves to the
/// bound's erased form instead. `exprs` does the same for class types whose
/// derived facts refer back to themselves (`class M implements
/// Map<String, M>`).
#[derive(Default)]
struct ResolutionGuards {
    vars: HashSet<TypeVarId>,
    exprs: HashSet<Type>,
}

/// The resolved, queryable form of a declared type expression under a
/// substitution context.
///
/// All derived facts (raw type, type arguments, component type, map value
/// type) are computed eagerly at construction, so a descriptor never mutates
/// and can be shared freely across threads, e.g. behind an `Arc` in a
/// [`crate::DescriptorCache`].
///
/// Equality is the (source expression, substitution context) pair, not
/// instance identity: two descriptors resolved from the same inputs compare
/// equal. Descriptors that originated from a type variable compare by their
/// resolved structure instead, so `T` substituted with `String` equals a
/// descriptor for `String` itself.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    source: Type,
    substitution: Substitution,
    raw: RawType,
    type_arguments: Vec<TypeDescriptor>,
    component_type: Option<Box<TypeDescriptor>>,
    map_value_type: Option<Box<TypeDescriptor>>,
    collection_like: bool,
    map_like: bool,
    provenance: Provenance,
}

impl TypeDescriptor {
    /// Resolve `ty` under `substitution`.
    ///
    /// Either yields a complete descriptor or fails; there is no partial
    /// result. Failures are immediate and synchronous, and callers binding
    /// declared members are expected to treat them as registration-time
    /// errors.
    pub fn resolve(
        env: &dyn TypeEnv,
        ty: &Type,
        substitution: &Substitution,
    ) -> Result<TypeDescriptor> {
        let mut guards = ResolutionGuards::default();
        resolve_inner(env, ty, substitution, Provenance::Declared, &mut guards)
    }

    /// Resolve the raw (unparameterized) form of `class`.
    pub fn of_class(env: &dyn TypeEnv, class: ClassId) -> Result<TypeDescriptor> {
        Self::resolve(env, &Type::class(class, Vec::new()), &Substitution::new())
    }

    /// The expression this descriptor was resolved from. For descriptors
    /// that originated from a type variable this is the resolved target, not
    /// the variable itself.
    pub fn source(&self) -> &Type {
        &self.source
    }

    pub fn raw_type(&self) -> RawType {
        self.raw
    }

    pub fn raw_class(&self) -> Option<ClassId> {
        match self.raw {
            RawType::Class(id) => Some(id),
            _ => None,
        }
    }

    /// Ordered resolved type arguments; empty for non-parameterized types.
    pub fn type_arguments(&self) -> &[TypeDescriptor] {
        &self.type_arguments
    }

    /// Element type of an array or collection-like type.
    pub fn component_type(&self) -> Option<&TypeDescriptor> {
        self.component_type.as_deref()
    }

    /// Value type of a map-like type, or the second type argument of a
    /// two-or-more-argument generic container (pair/tuple shapes).
    pub fn map_value_type(&self) -> Option<&TypeDescriptor> {
        self.map_value_type.as_deref()
    }

    pub fn is_collection_like(&self) -> bool {
        self.collection_like
    }

    pub fn is_map_like(&self) -> bool {
        self.map_like
    }

    /// The type this descriptor "contains": the map value type for map-like
    /// types, the component type for collection-like types, itself otherwise.
    pub fn actual_type(&self) -> &TypeDescriptor {
        if self.map_like {
            if let Some(value) = self.map_value_type.as_deref() {
                return value;
            }
        }
        if self.collection_like {
            if let Some(component) = self.component_type.as_deref() {
                return component;
            }
        }
        self
    }

    /// The descriptor for `target` as inherited by this descriptor's raw
    /// type, searching the declared superclass first and then interfaces in
    /// declaration order, depth-first. `None` when `target` is not an
    /// ancestor.
    pub fn ancestor_descriptor(
        &self,
        env: &dyn TypeEnv,
        target: ClassId,
    ) -> Option<TypeDescriptor> {
        let raw = self.raw_class()?;
        if raw == target {
            return Some(self.clone());
        }
        let grounded = substitute(&self.source, &self.substitution);
        let viewed = view_as_ancestor(env, &grounded, target)?;
        match TypeDescriptor::resolve(env, &viewed, &self.substitution) {
            Ok(ancestor) => Some(ancestor),
            // A malformed ancestor declaration is a registration-time caller
            // bug; keep it visible instead of folding it into "not an
            // ancestor" silently.
            Err(error) => {
                tracing::debug!(?target, %error, "ancestor declaration failed to resolve");
                None
            }
        }
    }

    /// Whether `other` resolves to this type through its declared ancestor
    /// chain. Comparison is structural (raw type plus resolved type
    /// arguments), so independently constructed descriptors for the same
    /// parameterization are assignable to and from one another.
    pub fn is_assignable_from(&self, env: &dyn TypeEnv, other: &TypeDescriptor) -> bool {
        if self.structurally_equal(other) {
            return true;
        }
        let Some(raw) = self.raw_class() else {
            return false;
        };
        other
            .ancestor_descriptor(env, raw)
            .is_some_and(|ancestor| ancestor.structurally_equal(self))
    }

    /// The resolved type argument at `index` of `bound` as inherited by this
    /// descriptor's raw type.
    ///
    /// Best-effort fallback: when the argument exists but is not concrete
    /// (raw or otherwise unsubstituted generic usage), and `bound` is
    /// reached through a parameterized declaration, this returns the
    /// `java.lang.Object` top type rather than failing. Downstream callers
    /// should not treat that as a precise resolution. `None` when `bound` is
    /// not an ancestor, is reached only through a raw declaration, or has no
    /// argument at `index`.
    pub fn type_argument_at(
        &self,
        env: &dyn TypeEnv,
        bound: ClassId,
        index: usize,
    ) -> Option<TypeDescriptor> {
        let grounded = substitute(&self.source, &self.substitution);
        let mut guards = ResolutionGuards::default();
        derived_argument(env, &grounded, &self.substitution, bound, index, &mut guards)
            .ok()
            .flatten()
    }

    /// Resolve a method's declared return type in this descriptor's member
    /// scope, so class-level parameters substituted on this descriptor are
    /// visible.
    pub fn method_return_type(
        &self,
        env: &dyn TypeEnv,
        method: &MethodDef,
    ) -> Result<TypeDescriptor> {
        TypeDescriptor::resolve(env, &method.return_type, &self.substitution)
    }

    /// Resolve a method's declared parameter types in this descriptor's
    /// member scope.
    pub fn method_parameter_types(
        &self,
        env: &dyn TypeEnv,
        method: &MethodDef,
    ) -> Result<Vec<TypeDescriptor>> {
        method
            .params
            .iter()
            .map(|param| TypeDescriptor::resolve(env, param, &self.substitution))
            .collect()
    }

    /// Resolve a constructor's declared parameter types in this descriptor's
    /// member scope.
    pub fn constructor_parameter_types(
        &self,
        env: &dyn TypeEnv,
        constructor: &ConstructorDef,
    ) -> Result<Vec<TypeDescriptor>> {
        constructor
            .params
            .iter()
            .map(|param| TypeDescriptor::resolve(env, param, &self.substitution))
            .collect()
    }

    fn structurally_equal(&self, other: &TypeDescriptor) -> bool {
        self.raw == other.raw
            && self.type_arguments.len() == other.type_arguments.len()
            && self
                .type_arguments
                .iter()
                .zip(&other.type_arguments)
                .all(|(a, b)| a.structurally_equal(b))
    }

    fn from_variable(&self) -> bool {
        matches!(self.provenance, Provenance::Variable { .. })
    }

    /// Whether the resolved type was pinned down by the declaration or the
    /// substitution context, as opposed to falling back to a variable's
    /// declared bound.
    fn is_concrete(&self) -> bool {
        !matches!(self.provenance, Provenance::Variable { substituted: false })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        if self.from_variable() || other.from_variable() {
            return self.structurally_equal(other);
        }
        self.source == other.source && self.substitution == other.substitution
    }
}

impl Eq for TypeDescriptor {}

fn resolve_inner(
    env: &dyn TypeEnv,
    ty: &Type,
    substitution: &Substitution,
    provenance: Provenance,
    guards: &mut ResolutionGuards,
) -> Result<TypeDescriptor> {
    match ty {
        Type::Primitive(primitive) => Ok(TypeDescriptor {
            source: ty.clone(),
            substitution: substitution.clone(),
            raw: RawType::Primitive(*primitive),
            type_arguments: Vec::new(),
            component_type: None,
            map_value_type: None,
            collection_like: false,
            map_like: false,
            provenance,
        }),
        Type::Array(elem) => {
            let component = resolve_inner(env, elem, substitution, Provenance::Declared, guards)?;
            Ok(TypeDescriptor {
                source: ty.clone(),
                substitution: substitution.clone(),
                raw: RawType::Array,
                type_arguments: Vec::new(),
                component_type: Some(Box::new(component)),
                map_value_type: None,
                collection_like: true,
                map_like: false,
                provenance,
            })
        }
        Type::Wildcard(bound) => match bound {
            // Contravariant position: the lower bound is the most specific
            // known type, so it wins over the upper bound.
            WildcardBound::Super(lower) => {
                resolve_inner(env, lower, substitution, provenance, guards)
            }
            WildcardBound::Extends(upper) => {
                resolve_inner(env, upper, substitution, provenance, guards)
            }
            WildcardBound::Unbounded => Err(ResolveError::UnboundedWildcard),
        },
        Type::TypeVar(id) => {
            let (target, substituted) = match substitution.get(id) {
                Some(value) => (value.clone(), true),
                None => {
                    let param = env
                        .type_param(*id)
                        .ok_or(ResolveError::UnknownTypeVar(*id))?;
                    let bound = param
                        .upper_bounds
                        .first()
                        .cloned()
                        .unwrap_or_else(|| Type::class(env.well_known().object, Vec::new()));
                    (bound, false)
                }
            };
            let provenance = Provenance::Variable { substituted };
            if !guards.vars.insert(*id) {
                // Re-entered through this variable's own bound or value:
                // stop at the nearest erased form instead of expanding.
                let erased = erase(env, &target);
                return resolve_inner(env, &erased, substitution, provenance, guards);
            }
            let resolved = resolve_inner(env, &target, substitution, provenance, guards);
            guards.vars.remove(id);
            resolved
        }
        Type::Class(ClassType { def, args }) => {
            let class_def = env.class(*def).ok_or(ResolveError::UnknownClass(*def))?;
            let class_name = class_def.name.clone();
            let declared_params = class_def.type_params.clone();

            let mut type_arguments = Vec::with_capacity(args.len());
            let mut member_subst = substitution.clone();
            if !args.is_empty() {
                if args.len() != declared_params.len() {
                    return Err(ResolveError::TypeArgumentArity {
                        class: class_name,
                        declared: declared_params.len(),
                        supplied: args.len(),
                    });
                }
                // Arguments are written in the enclosing scope, so they
                // resolve under the incoming context; the zipped entries are
                // layered on top for everything scoped to this class.
                for arg in args {
                    type_arguments.push(resolve_inner(
                        env,
                        arg,
                        substitution,
                        Provenance::Declared,
                        guards,
                    )?);
                }
                for (formal, actual) in declared_params.iter().copied().zip(args.iter()) {
                    member_subst.insert(formal, actual.clone());
                }
            }

            let wk = *env.well_known();
            let collection_like = *def == wk.iterable || raw_reaches(env, *def, wk.collection);
            let map_like = raw_reaches(env, *def, wk.map);

            let grounded = substitute(ty, substitution);
            let mut component_type = None;
            let mut map_value_type = None;
            if guards.exprs.insert(grounded.clone()) {
                if collection_like {
                    component_type =
                        derived_argument(env, &grounded, &member_subst, wk.iterable, 0, guards)?;
                }
                if map_like {
                    map_value_type =
                        derived_argument(env, &grounded, &member_subst, wk.map, 1, guards)?;
                }
                guards.exprs.remove(&grounded);
            }
            if map_value_type.is_none() && !map_like && type_arguments.len() > 1 {
                map_value_type = Some(type_arguments[1].clone());
            }

            Ok(TypeDescriptor {
                source: ty.clone(),
                substitution: member_subst,
                raw: RawType::Class(*def),
                type_arguments,
                component_type: component_type.map(Box::new),
                map_value_type: map_value_type.map(Box::new),
                collection_like,
                map_like,
                provenance,
            })
        }
    }
}

/// Resolve the type argument at `index` of `bound` as seen from `grounded`,
/// applying the `Object` fallback for non-concrete arguments.
fn derived_argument(
    env: &dyn TypeEnv,
    grounded: &Type,
    substitution: &Substitution,
    bound: ClassId,
    index: usize,
    guards: &mut ResolutionGuards,
) -> Result<Option<TypeDescriptor>> {
    let Some(viewed) = view_as_ancestor(env, grounded, bound) else {
        return Ok(None);
    };
    let Type::Class(ClassType { args, .. }) = &viewed else {
        return Ok(None);
    };
    let Some(arg) = args.get(index) else {
        return Ok(None);
    };

    let resolved = resolve_inner(env, arg, substitution, Provenance::Declared, guards)?;
    if resolved.is_concrete() {
        return Ok(Some(resolved));
    }

    tracing::debug!(
        ?bound,
        index,
        "raw generic usage, defaulting type argument to java.lang.Object"
    );
    let object = Type::class(env.well_known().object, Vec::new());
    let empty = Substitution::new();
    Ok(Some(resolve_inner(
        env,
        &object,
        &empty,
        Provenance::Declared,
        guards,
    )?))
}

/// The erased form of `ty`: type arguments stripped, variables and unbounded
/// wildcards collapsed to `Object`.
fn erase(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Class(ClassType { def, .. }) => Type::class(*def, Vec::new()),
        Type::Array(elem) => Type::Array(Box::new(erase(env, elem))),
        Type::Wildcard(WildcardBound::Extends(upper)) => erase(env, upper),
        Type::Wildcard(WildcardBound::Super(lower)) => erase(env, lower),
        Type::Wildcard(WildcardBound::Unbounded) | Type::TypeVar(_) => {
            Type::class(env.well_known().object, Vec::new())
        }
        Type::Primitive(_) => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use reify_model::TypeStore;

    use super::*;

    #[test]
    fn erase_strips_arguments_and_collapses_variables() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let list = store.class_id("java.util.List").unwrap();
        let t = store.add_type_param("T", vec![Type::class(wk.object, vec![])]);

        let ty = Type::class(list, vec![Type::TypeVar(t)]);
        assert_eq!(erase(&store, &ty), Type::class(list, vec![]));
        assert_eq!(
            erase(&store, &Type::TypeVar(t)),
            Type::class(wk.object, vec![])
        );
        assert_eq!(
            erase(&store, &Type::Array(Box::new(ty))),
            Type::Array(Box::new(Type::class(list, vec![])))
        );
    }

    #[test]
    fn map_classification_covers_implementations() {
        let store = TypeStore::with_minimal_jdk();
        let hash_map = store.class_id("java.util.HashMap").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let integer = Type::class(store.class_id("java.lang.Integer").unwrap(), vec![]);

        let descriptor = TypeDescriptor::resolve(
            &store,
            &Type::class(hash_map, vec![string, integer]),
            &Substitution::new(),
        )
        .unwrap();

        assert!(descriptor.is_map_like());
        assert!(!descriptor.is_collection_like());
        assert_eq!(
            descriptor.map_value_type().unwrap().raw_class(),
            store.class_id("java.lang.Integer")
        );
    }
}
