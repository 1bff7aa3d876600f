//! Error types for field access resolution and invocation.

use crate::handle::HandleKind;
use crate::value::TypeRef;

/// Boxed error used to carry an underlying cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`FieldDescriptor::get`](crate::FieldDescriptor::get)
/// and [`FieldDescriptor::set`](crate::FieldDescriptor::set).
///
/// This is the only error category callers observe from the access boundary;
/// capability-level errors are either recovered or wrapped into
/// [`AccessError::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Owner type cannot be resolved to a live class
    #[error("Owner type not found: {owner}")]
    OwnerNotFound {
        /// Owner type name
        owner: String,
    },

    /// The field's declared type is the unknown sentinel
    #[error("Unknown type for field {owner}.{field}")]
    TypeUnresolved {
        /// Owner type name
        owner: String,
        /// Field name
        field: String,
    },

    /// Neither the name nor the type/static filter matched a field
    #[error("Couldn't find {} field of type {ty} in {owner}", staticness(.is_static))]
    FieldNotFound {
        /// Owner type name
        owner: String,
        /// Declared field type
        ty: TypeRef,
        /// Requested static-ness
        is_static: bool,
    },

    /// Static marker passed as the source of an instance field
    #[error("Field {owner}.{field} is not static")]
    IllegalUsage {
        /// Owner type name
        owner: String,
        /// Field name
        field: String,
    },

    /// Receiver or value does not match the handle's type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Instance field accessed without a receiver
    #[error("Null receiver for instance field {owner}.{field}")]
    NullReceiver {
        /// Owner type name
        owner: String,
        /// Field name
        field: String,
    },

    /// Any other failure, with the original cause preserved
    #[error("Field access failed: {source}")]
    Failed {
        /// Underlying cause
        #[source]
        source: BoxError,
    },
}

fn staticness(is_static: &bool) -> &'static str {
    if *is_static {
        "static"
    } else {
        "instance"
    }
}

impl AccessError {
    /// Wrap an arbitrary cause into [`AccessError::Failed`]
    pub fn failed(source: impl Into<BoxError>) -> Self {
        AccessError::Failed {
            source: source.into(),
        }
    }
}

/// Result alias for the access boundary
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors reported by a [`Lookup`](crate::Lookup) capability while building
/// raw handles.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No field with that name and type
    #[error("No such field: {owner}.{name}: {ty}")]
    NoSuchField {
        /// Owner type name
        owner: String,
        /// Field name
        name: String,
        /// Requested type
        ty: TypeRef,
    },

    /// The field exists but the caller may not access it
    #[error("Illegal access to {owner}.{name}: {reason}")]
    IllegalAccess {
        /// Owner type name
        owner: String,
        /// Field name
        name: String,
        /// Why access was denied
        reason: String,
    },

    /// The environment intercepted the lookup
    #[error("Lookup of {owner}.{name} intercepted by the runtime")]
    Intercepted {
        /// Owner type name
        owner: String,
        /// Field name
        name: String,
    },

    /// Runtime-specific failure
    #[error("{0}")]
    Other(String),
}

/// Errors raised while invoking a raw handle
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// Receiver or value does not fit the handle
    #[error("{0}")]
    TypeMismatch(String),

    /// Handle invoked with the wrong number of arguments
    #[error("{kind:?} handle expects {} argument(s), got {got}", .kind.arity())]
    Arity {
        /// Shape of the handle
        kind: HandleKind,
        /// Arguments supplied
        got: usize,
    },

    /// Instance handle invoked with a null receiver
    #[error("null receiver")]
    NullReceiver,

    /// Runtime-specific failure
    #[error("{0}")]
    Other(#[source] BoxError),
}
