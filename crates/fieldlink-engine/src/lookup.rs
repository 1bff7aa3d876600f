//! Capabilities consumed from the hosting runtime
//!
//! The engine never inspects classes or objects itself. A runtime provides:
//! - [`TypeResolver`]: owner type name to live class
//! - [`RuntimeClass`]: non-failing field probe, declared-field enumeration,
//!   and forced accessibility
//! - [`Lookup`]: raw handle construction, either directly from a
//!   name+type+owner triple or by unreflecting a [`FieldRef`]

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::LookupError;
use crate::handle::{AccessDirection, HandleKind, RawHandle};
use crate::value::TypeRef;

/// Reflected field as reported by a [`RuntimeClass`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Declaring class name
    pub owner: String,
    /// Field name as known to the runtime
    pub name: String,
    /// Field type
    pub ty: TypeRef,
    /// Whether the field is static
    pub is_static: bool,
    /// Runtime-specific storage slot
    pub slot: usize,
}

/// Resolves owner type names to live classes
pub trait TypeResolver: Send + Sync {
    /// Look up a class, `None` when it is not loaded
    fn resolve_class(&self, owner: &str) -> Option<Arc<dyn RuntimeClass>>;
}

/// Live class object
pub trait RuntimeClass: Send + Sync + fmt::Debug {
    /// Class name
    fn name(&self) -> &str;

    /// Find a declared field by name; never fails
    fn find_field(&self, name: &str) -> Option<FieldRef>;

    /// All declared fields, in declaration order
    fn declared_fields(&self) -> Vec<FieldRef>;

    /// Permanently lift visibility restrictions on a field
    fn force_accessible(&self, field: &FieldRef) -> Result<(), LookupError>;

    /// Upcast for the runtime's own downcasts
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Raw handle factory
pub trait Lookup: Send + Sync {
    /// Fast path: build a handle from owner, name, type, and handle family
    fn find_handle(
        &self,
        class: &Arc<dyn RuntimeClass>,
        name: &str,
        ty: &TypeRef,
        kind: HandleKind,
    ) -> Result<RawHandle, LookupError>;

    /// Reflective path: build a handle for an already located field
    fn unreflect(
        &self,
        class: &Arc<dyn RuntimeClass>,
        field: &FieldRef,
        direction: AccessDirection,
    ) -> Result<RawHandle, LookupError>;
}
