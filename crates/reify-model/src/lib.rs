//! Declared-type model for JVM-style generics.
//!
//! This crate holds the closed representation of declared (not runtime) type
//! expressions: classes with ordered type arguments, arrays, primitives,
//! type variables and wildcards, plus the class/method/type-parameter
//! definitions they refer to. The [`TypeStore`] registry interns definitions
//! and hands out ids; the [`TypeEnv`] trait is the read surface threaded
//! through resolution. Resolving expressions into queryable descriptors lives
//! in `reify-resolve`.

use std::fmt;

use serde::{Deserialize, Serialize};

mod store;
mod subst;

pub use store::{TypeStore, WellKnownTypes};
pub use subst::{substitute, Substitution};

/// Id of a class definition registered in a [`TypeStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) u32);

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Id of a declared type parameter.
///
/// Ids are allocated per declaration site, so two methods that each declare a
/// parameter named `T` get distinct ids. Identity therefore already includes
/// the declaring owner; no (owner, name) pair is needed as a map key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub(crate) u32);

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

/// Bound of a wildcard type argument.
///
/// `Unbounded` carries no usable bound; translation layers may still need to
/// represent a bare `?`, but resolving one is an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// A class reference together with its ordered type arguments.
///
/// `args` is empty both for non-generic classes and for raw usage of a
/// generic class; the distinction is made against the [`ClassDef`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

/// A declared type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Class(ClassType),
    Primitive(PrimitiveType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

/// A declared type parameter. Bounds are upper bounds only; lower bounds
/// exist solely on wildcards in declared Java types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDef {
    pub params: Vec<Type>,
    pub is_varargs: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

/// Read access to class and type-parameter definitions.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;

    fn lookup_class(&self, name: &str) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;
}
