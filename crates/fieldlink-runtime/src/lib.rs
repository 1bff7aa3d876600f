//! Fieldlink Runtime
//!
//! An in-memory managed heap that hosts the fieldlink engine:
//! - **Classes** (`class`): declared fields, slot layout, forced accessibility
//! - **Instances** (`object`): per-object slot storage
//! - **Registry** (`registry`): class loading with optional field renaming
//! - **Lookup** (`lookup`): handle construction, standard or intercepting
//! - **Config** (`config`): `fieldlink.toml`
//!
//! # Example
//!
//! ```rust,ignore
//! use fieldlink_runtime::{ClassBuilder, Runtime};
//! use fieldlink_engine::{TypeRef, Value};
//!
//! let runtime = Runtime::default();
//! runtime.define_class(ClassBuilder::new("Player").field("health", TypeRef::Int))?;
//!
//! let player = runtime.instantiate("Player")?;
//! let health = runtime.field("Player", "health", TypeRef::Int, false);
//! health.set(&player, 20)?;
//! assert_eq!(health.get(&player)?, Value::Int(20));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod config;
pub mod error;
pub mod lookup;
pub mod object;
pub mod registry;

use std::path::Path;
use std::sync::Arc;

use fieldlink_engine::{FieldAccessResolver, FieldDescriptor, Lookup, TypeRef, Value};
use tracing::debug;

pub use class::{Class, ClassBuilder, FieldDef, Modifiers};
pub use config::{RuntimeConfig, RuntimeSection};
pub use error::RuntimeError;
pub use lookup::{HeapLookup, LookupPolicy};
pub use object::{allocate, Instance};
pub use registry::ClassRegistry;

/// A heap plus a resolver bound to it
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    registry: Arc<ClassRegistry>,
    resolver: Arc<FieldAccessResolver>,
}

impl Runtime {
    /// Create a runtime using the lookup policy from `config`
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let lookup = Arc::new(HeapLookup::new(config.runtime.lookup));
        Self::with_lookup(config, lookup)
    }

    /// Create a runtime with a caller-supplied lookup capability
    pub fn with_lookup(config: RuntimeConfig, lookup: Arc<dyn Lookup>) -> Result<Self, RuntimeError> {
        let registry = Arc::new(ClassRegistry::with_remap(&config.remap)?);
        let resolver = Arc::new(FieldAccessResolver::with_options(
            registry.clone(),
            lookup,
            config.resolver.clone(),
        ));

        debug!(
            lookup = ?config.runtime.lookup,
            fast_path = config.resolver.fast_path,
            remapped_fields = config.remap.len(),
            "runtime created"
        );

        Ok(Self {
            config,
            registry,
            resolver,
        })
    }

    /// Create a runtime from a `fieldlink.toml`
    pub fn from_config_file(path: &Path) -> Result<Self, RuntimeError> {
        Self::new(RuntimeConfig::from_file(path)?)
    }

    /// Active configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Loaded classes
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Shared resolver
    pub fn resolver(&self) -> &Arc<FieldAccessResolver> {
        &self.resolver
    }

    /// Load a class
    pub fn define_class(&self, builder: ClassBuilder) -> Result<Arc<Class>, RuntimeError> {
        self.registry.define(builder)
    }

    /// Look up a loaded class
    pub fn class(&self, name: &str) -> Option<Arc<Class>> {
        self.registry.get(name)
    }

    /// Allocate an instance of a loaded class
    pub fn instantiate(&self, class_name: &str) -> Result<Value, RuntimeError> {
        let class = self
            .registry
            .get(class_name)
            .ok_or_else(|| RuntimeError::UnknownClass(class_name.to_string()))?;
        Ok(allocate(&class))
    }

    /// Describe a field of `owner`; resolution happens on first access
    pub fn field(&self, owner: &str, name: &str, ty: TypeRef, is_static: bool) -> FieldDescriptor {
        FieldDescriptor::new(self.resolver.clone(), owner, name, ty, is_static)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        // An empty remap table is always valid.
        match Self::with_lookup(RuntimeConfig::default(), Arc::new(HeapLookup::default())) {
            Ok(runtime) => runtime,
            Err(err) => unreachable!("default runtime config rejected: {err}"),
        }
    }
}
