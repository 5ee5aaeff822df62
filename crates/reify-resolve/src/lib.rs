//! Resolution of declared generic type expressions into queryable
//! descriptors.
//!
//! Given a [`reify_model::Type`] and a substitution context, the resolver
//! produces an immutable [`TypeDescriptor`] answering structural questions:
//! is this map-like and what is its value type, is this collection-like and
//! what is its element type, what does a method parameter resolve to once
//! generic parameters are substituted. All derived facts are computed at
//! construction; descriptors are plain values, safe to share behind an `Arc`.

mod cache;
mod descriptor;
mod error;
mod supertype;

pub use cache::DescriptorCache;
pub use descriptor::{RawType, TypeDescriptor};
pub use error::{ResolveError, Result};
