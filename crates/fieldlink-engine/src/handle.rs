//! Raw and resolved field handles
//!
//! A [`Lookup`](crate::Lookup) produces [`RawHandle`]s whose calling shape
//! depends on the access direction and on whether the field is static. The
//! resolver erases that shape into a [`ResolvedHandle`] which is invoked
//! uniformly with a slice of arguments.

use std::fmt;
use std::sync::Arc;

use crate::error::HandleError;
use crate::value::Value;

/// Which raw-lookup operation family a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDirection {
    /// Read the field
    Getter,
    /// Write the field
    Setter,
}

impl fmt::Display for AccessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDirection::Getter => write!(f, "getter"),
            AccessDirection::Setter => write!(f, "setter"),
        }
    }
}

/// Direction combined with static-ness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// `(receiver) -> value`
    Getter,
    /// `(receiver, value) -> ()`
    Setter,
    /// `() -> value`
    StaticGetter,
    /// `(value) -> ()`
    StaticSetter,
}

impl HandleKind {
    /// Select the handle family for a direction and static flag
    pub fn of(direction: AccessDirection, is_static: bool) -> Self {
        match (direction, is_static) {
            (AccessDirection::Getter, false) => HandleKind::Getter,
            (AccessDirection::Setter, false) => HandleKind::Setter,
            (AccessDirection::Getter, true) => HandleKind::StaticGetter,
            (AccessDirection::Setter, true) => HandleKind::StaticSetter,
        }
    }

    /// Number of arguments a handle of this kind takes
    pub fn arity(self) -> usize {
        match self {
            HandleKind::StaticGetter => 0,
            HandleKind::Getter | HandleKind::StaticSetter => 1,
            HandleKind::Setter => 2,
        }
    }
}

/// Instance getter
pub type GetterFn = Arc<dyn Fn(&Value) -> Result<Value, HandleError> + Send + Sync>;
/// Instance setter
pub type SetterFn = Arc<dyn Fn(&Value, Value) -> Result<(), HandleError> + Send + Sync>;
/// Static getter
pub type StaticGetterFn = Arc<dyn Fn() -> Result<Value, HandleError> + Send + Sync>;
/// Static setter
pub type StaticSetterFn = Arc<dyn Fn(Value) -> Result<(), HandleError> + Send + Sync>;

/// Typed callable produced by a lookup capability
#[derive(Clone)]
pub enum RawHandle {
    /// Instance getter
    Getter(GetterFn),
    /// Instance setter
    Setter(SetterFn),
    /// Static getter
    StaticGetter(StaticGetterFn),
    /// Static setter
    StaticSetter(StaticSetterFn),
}

impl RawHandle {
    /// Wrap an instance getter
    pub fn getter<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, HandleError> + Send + Sync + 'static,
    {
        RawHandle::Getter(Arc::new(f))
    }

    /// Wrap an instance setter
    pub fn setter<F>(f: F) -> Self
    where
        F: Fn(&Value, Value) -> Result<(), HandleError> + Send + Sync + 'static,
    {
        RawHandle::Setter(Arc::new(f))
    }

    /// Wrap a static getter
    pub fn static_getter<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, HandleError> + Send + Sync + 'static,
    {
        RawHandle::StaticGetter(Arc::new(f))
    }

    /// Wrap a static setter
    pub fn static_setter<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<(), HandleError> + Send + Sync + 'static,
    {
        RawHandle::StaticSetter(Arc::new(f))
    }

    /// The family this handle belongs to
    pub fn kind(&self) -> HandleKind {
        match self {
            RawHandle::Getter(_) => HandleKind::Getter,
            RawHandle::Setter(_) => HandleKind::Setter,
            RawHandle::StaticGetter(_) => HandleKind::StaticGetter,
            RawHandle::StaticSetter(_) => HandleKind::StaticSetter,
        }
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawHandle").field(&self.kind()).finish()
    }
}

/// How a handle was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPath {
    /// Fast lookup by name and type
    Direct,
    /// Reflective lookup of the field found by name
    Reflective,
    /// Reflective lookup of the field matched by type and static-ness
    ByType,
}

type ErasedFn = Arc<dyn Fn(&[Value]) -> Result<Value, HandleError> + Send + Sync>;

/// Direction-tagged handle with a uniform, untyped calling signature
#[derive(Clone)]
pub struct ResolvedHandle {
    direction: AccessDirection,
    kind: HandleKind,
    path: ResolutionPath,
    invoke: ErasedFn,
}

impl ResolvedHandle {
    /// Erase a raw handle's calling shape.
    ///
    /// The returned handle takes its arguments as a slice (receiver first for
    /// instance handles, value last for setters); setters return `Null`.
    pub fn generic(direction: AccessDirection, raw: RawHandle, path: ResolutionPath) -> Self {
        let kind = raw.kind();
        let invoke: ErasedFn = match raw {
            RawHandle::Getter(f) => Arc::new(move |args: &[Value]| match args {
                [receiver] => f(receiver),
                _ => Err(arity_mismatch(kind, args.len())),
            }),
            RawHandle::Setter(f) => Arc::new(move |args: &[Value]| match args {
                [receiver, value] => f(receiver, value.clone()).map(|()| Value::Null),
                _ => Err(arity_mismatch(kind, args.len())),
            }),
            RawHandle::StaticGetter(f) => Arc::new(move |args: &[Value]| match args {
                [] => f(),
                _ => Err(arity_mismatch(kind, args.len())),
            }),
            RawHandle::StaticSetter(f) => Arc::new(move |args: &[Value]| match args {
                [value] => f(value.clone()).map(|()| Value::Null),
                _ => Err(arity_mismatch(kind, args.len())),
            }),
        };

        Self {
            direction,
            kind,
            path,
            invoke,
        }
    }

    /// Call the handle
    pub fn invoke(&self, args: &[Value]) -> Result<Value, HandleError> {
        (self.invoke)(args)
    }

    /// Direction this handle was resolved for
    pub fn direction(&self) -> AccessDirection {
        self.direction
    }

    /// Underlying handle family
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Path taken by the resolver
    pub fn path(&self) -> ResolutionPath {
        self.path
    }
}

impl fmt::Debug for ResolvedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandle")
            .field("direction", &self.direction)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish()
    }
}

fn arity_mismatch(kind: HandleKind, got: usize) -> HandleError {
    HandleError::Arity { kind, got }
}
