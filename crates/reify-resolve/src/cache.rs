use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use reify_model::{ClassId, TypeEnv};

use crate::{Result, TypeDescriptor};

/// Caller-side cache of raw class descriptors.
///
/// Member binding typically resolves the same declared classes repeatedly at
/// registration time and reads the results concurrently afterwards.
/// Descriptors are immutable, so one shared `Arc` per class is enough; a
/// race between two writers of the same class keeps the first inserted
/// value.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    by_class: RwLock<HashMap<ClassId, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The descriptor for the raw form of `class`, resolving and caching it
    /// on first use.
    pub fn class_descriptor(
        &self,
        env: &dyn TypeEnv,
        class: ClassId,
    ) -> Result<Arc<TypeDescriptor>> {
        if let Some(found) = self
            .by_class
            .read()
            .expect("descriptor cache lock poisoned")
            .get(&class)
        {
            return Ok(Arc::clone(found));
        }

        let resolved = Arc::new(TypeDescriptor::of_class(env, class)?);
        let mut cache = self
            .by_class
            .write()
            .expect("descriptor cache lock poisoned");
        Ok(Arc::clone(cache.entry(class).or_insert(resolved)))
    }
}
