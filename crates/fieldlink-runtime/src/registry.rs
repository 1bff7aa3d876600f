//! Class registry
//!
//! Holds every loaded class by name and serves as the engine's
//! [`TypeResolver`]. A remap table, keyed by `"Class.field"`, renames fields
//! as classes are defined, the way obfuscating runtimes ship classes whose
//! field names differ from the ones source code was written against.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fieldlink_engine::{RuntimeClass, TypeResolver};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::class::{Class, ClassBuilder};
use crate::error::RuntimeError;

/// Registry of loaded classes
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: DashMap<String, Arc<Class>>,
    /// class name -> (logical field name -> runtime field name)
    remap: FxHashMap<String, FxHashMap<String, String>>,
}

impl ClassRegistry {
    /// Create an empty registry without renaming
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that renames fields per `"Class.field" -> name`
    pub fn with_remap(table: &HashMap<String, String>) -> Result<Self, RuntimeError> {
        let mut remap: FxHashMap<String, FxHashMap<String, String>> = FxHashMap::default();
        for (key, runtime_name) in table {
            let (class, field) = key
                .split_once('.')
                .filter(|(class, field)| !class.is_empty() && !field.is_empty())
                .ok_or_else(|| {
                    RuntimeError::InvalidConfig(format!(
                        "remap key '{}' must have the form Class.field",
                        key
                    ))
                })?;
            remap
                .entry(class.to_string())
                .or_default()
                .insert(field.to_string(), runtime_name.clone());
        }

        Ok(Self {
            classes: DashMap::new(),
            remap,
        })
    }

    /// Define a class, applying any configured renaming
    pub fn define(&self, builder: ClassBuilder) -> Result<Arc<Class>, RuntimeError> {
        let builder = match self.remap.get(builder.name()) {
            Some(renames) => builder.rename_fields(|field| renames.get(field).cloned()),
            None => builder,
        };

        match self.classes.entry(builder.name().to_string()) {
            Entry::Occupied(entry) => Err(RuntimeError::DuplicateClass(entry.key().clone())),
            Entry::Vacant(entry) => {
                let class = Arc::new(builder.build()?);
                trace!(class = class.name(), fields = class.fields().len(), "defined class");
                entry.insert(class.clone());
                Ok(class)
            }
        }
    }

    /// Look up a class by name
    pub fn get(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    /// Number of loaded classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no class is loaded
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeResolver for ClassRegistry {
    fn resolve_class(&self, owner: &str) -> Option<Arc<dyn RuntimeClass>> {
        self.get(owner).map(|class| class as Arc<dyn RuntimeClass>)
    }
}
