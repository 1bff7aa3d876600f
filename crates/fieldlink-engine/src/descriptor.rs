//! Field descriptors with memoized accessors

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::error::{AccessError, AccessResult};
use crate::handle::{AccessDirection, ResolutionPath, ResolvedHandle};
use crate::invoker::AccessInvoker;
use crate::resolver::FieldAccessResolver;
use crate::value::{FromValue, TypeRef, Value};

/// A logical field of an owner type.
///
/// The getter and setter handles are resolved on first use and kept for the
/// descriptor's lifetime. A failed resolution is not cached.
pub struct FieldDescriptor {
    owner: String,
    name: String,
    declared_type: TypeRef,
    is_static: bool,
    resolver: Arc<FieldAccessResolver>,
    getter: OnceCell<ResolvedHandle>,
    setter: OnceCell<ResolvedHandle>,
}

impl FieldDescriptor {
    /// Describe a field; nothing is resolved yet
    pub fn new(
        resolver: Arc<FieldAccessResolver>,
        owner: &str,
        name: &str,
        declared_type: TypeRef,
        is_static: bool,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            declared_type,
            is_static,
            resolver,
            getter: OnceCell::new(),
            setter: OnceCell::new(),
        }
    }

    /// Owner type name
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Logical field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field type
    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Read the field. `source` is ignored for static fields.
    pub fn get(&self, source: &Value) -> AccessResult<Value> {
        AccessInvoker::new(self).read(source)
    }

    /// Write the field. `source` is ignored for static fields.
    pub fn set(&self, source: &Value, value: impl Into<Value>) -> AccessResult<()> {
        AccessInvoker::new(self).write(source, value.into())
    }

    /// Read the field and convert it
    pub fn get_as<T: FromValue>(&self, source: &Value) -> AccessResult<T> {
        let value = self.get(source)?;
        let found = value.type_name();
        T::from_value(value).ok_or_else(|| {
            AccessError::TypeMismatch(format!(
                "{}.{} holds {}, which cannot be converted to {}",
                self.owner,
                self.name,
                found,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Resolved handle for a direction, resolving on first use
    pub fn handle(&self, direction: AccessDirection) -> AccessResult<&ResolvedHandle> {
        let cell = self.cell(direction);
        if let Some(handle) = cell.get() {
            return Ok(handle);
        }
        trace!(owner = %self.owner, field = %self.name, %direction, "resolving on first use");
        cell.get_or_try_init(|| self.resolver.resolve(self, direction))
    }

    /// How the handle for a direction was resolved, if it has been
    pub fn resolution(&self, direction: AccessDirection) -> Option<ResolutionPath> {
        self.cell(direction).get().map(ResolvedHandle::path)
    }

    fn cell(&self, direction: AccessDirection) -> &OnceCell<ResolvedHandle> {
        match direction {
            AccessDirection::Getter => &self.getter,
            AccessDirection::Setter => &self.setter,
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("is_static", &self.is_static)
            .field("getter", &self.resolution(AccessDirection::Getter))
            .field("setter", &self.resolution(AccessDirection::Setter))
            .finish()
    }
}
