//! Fieldlink Engine
//!
//! Resilient field access for managed runtimes. Given an owner type, a
//! logical field name, a declared type, and a static flag, the engine
//! resolves a getter/setter pair that works whether the hosting runtime
//! resolves fields by name, renames them, or intercepts direct lookups.
//!
//! - **Resolver** (`resolver`): probe by name, fast lookup, reflective
//!   fallback, type-based disambiguation
//! - **Invoker** (`invoker`): invocation and error normalization
//! - **Descriptor** (`descriptor`): per-field memoized handles, `get`/`set`
//! - **Capabilities** (`lookup`): traits the hosting runtime implements
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldlink_engine::{FieldAccessResolver, FieldDescriptor, TypeRef, Value};
//!
//! let resolver = Arc::new(FieldAccessResolver::new(types, lookup));
//! let health = FieldDescriptor::new(resolver, "Player", "health", TypeRef::Int, false);
//!
//! health.set(&player, 20)?;
//! assert_eq!(health.get(&player)?, Value::Int(20));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod descriptor;
pub mod error;
pub mod handle;
pub mod invoker;
pub mod lookup;
pub mod resolver;
pub mod value;

pub use descriptor::FieldDescriptor;
pub use error::{AccessError, AccessResult, BoxError, HandleError, LookupError};
pub use handle::{
    AccessDirection, GetterFn, HandleKind, RawHandle, ResolutionPath, ResolvedHandle, SetterFn,
    StaticGetterFn, StaticSetterFn,
};
pub use invoker::AccessInvoker;
pub use lookup::{FieldRef, Lookup, RuntimeClass, TypeResolver};
pub use resolver::{FieldAccessResolver, ResolverOptions};
pub use value::{FromValue, ManagedObject, ObjectRef, TypeRef, Value};
