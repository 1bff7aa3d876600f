//! Value and type model shared by the engine and runtime implementations.
//!
//! Values are what flow through resolved handles. Instances are opaque to
//! the engine: a runtime hands out [`ObjectRef`]s and downcasts them again
//! inside the handles it builds.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An instance owned by a runtime
pub trait ManagedObject: Any + Send + Sync + fmt::Debug {
    /// Name of the class this object was instantiated from
    fn class_name(&self) -> &str;

    /// Upcast for downcasting back to the runtime's concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to a managed instance
pub type ObjectRef = Arc<dyn ManagedObject>;

/// Runtime value passed to and returned from field handles
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent reference
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Reference to a managed instance
    Object(ObjectRef),
    /// Reserved receiver meaning "no instance, treat as static access".
    ///
    /// Passing it as the source of a non-static field is a caller error and
    /// is reported as [`AccessError::IllegalUsage`](crate::AccessError::IllegalUsage).
    StaticMarker,
}

impl Value {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check for the static marker
    pub fn is_static_marker(&self) -> bool {
        matches!(self, Value::StaticMarker)
    }

    /// Get the managed object, if this is a reference to one
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short description of the value's runtime type, for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Long(_) => "long".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Object(obj) => obj.class_name().to_string(),
            Value::StaticMarker => "<static>".to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            // Identity, not structural equality
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::StaticMarker, Value::StaticMarker) => true,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

/// Conversion out of a [`Value`] for typed reads
pub trait FromValue: Sized {
    /// Convert, or `None` when the value has a different shape
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Long(l) => Some(l),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(d),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.to_string()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `double`
    Double,
    /// `string` (nullable)
    Str,
    /// Reference to a named class (nullable)
    Class(String),
    /// The field's real type could not be determined.
    ///
    /// Distinct from "field not found": no handle can ever be built for it.
    Unknown,
}

impl TypeRef {
    /// Create a class reference type
    pub fn class(name: &str) -> Self {
        TypeRef::Class(name.to_string())
    }

    /// Check for the unknown-type sentinel
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeRef::Unknown)
    }

    /// Whether `null` is a legal value of this type
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Str | TypeRef::Class(_))
    }

    /// Initial value of a freshly allocated slot of this type
    pub fn default_value(&self) -> Value {
        match self {
            TypeRef::Bool => Value::Bool(false),
            TypeRef::Int => Value::Int(0),
            TypeRef::Long => Value::Long(0),
            TypeRef::Double => Value::Double(0.0),
            TypeRef::Str | TypeRef::Class(_) | TypeRef::Unknown => Value::Null,
        }
    }

    /// Check whether a value may be stored in a slot of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeRef::Unknown, _) => false,
            (t, Value::Null) => t.is_reference(),
            (TypeRef::Bool, Value::Bool(_)) => true,
            (TypeRef::Int, Value::Int(_)) => true,
            (TypeRef::Long, Value::Long(_)) => true,
            (TypeRef::Double, Value::Double(_)) => true,
            (TypeRef::Str, Value::Str(_)) => true,
            (TypeRef::Class(name), Value::Object(obj)) => obj.class_name() == name,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::Int => write!(f, "int"),
            TypeRef::Long => write!(f, "long"),
            TypeRef::Double => write!(f, "double"),
            TypeRef::Str => write!(f, "string"),
            TypeRef::Class(name) => write!(f, "{}", name),
            TypeRef::Unknown => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy;

    impl ManagedObject for Dummy {
        fn class_name(&self) -> &str {
            "Dummy"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_accepts_null_only_for_references() {
        assert!(TypeRef::Str.accepts(&Value::Null));
        assert!(TypeRef::class("Dummy").accepts(&Value::Null));
        assert!(!TypeRef::Int.accepts(&Value::Null));
        assert!(!TypeRef::Bool.accepts(&Value::Null));
    }

    #[test]
    fn test_accepts_objects_by_class_name() {
        let obj: ObjectRef = Arc::new(Dummy);
        assert!(TypeRef::class("Dummy").accepts(&Value::Object(obj.clone())));
        assert!(!TypeRef::class("Other").accepts(&Value::Object(obj)));
    }

    #[test]
    fn test_unknown_accepts_nothing() {
        assert!(!TypeRef::Unknown.accepts(&Value::Null));
        assert!(!TypeRef::Unknown.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a: ObjectRef = Arc::new(Dummy);
        let b: ObjectRef = Arc::new(Dummy);
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_default_is_null() {
        assert_eq!(Value::default(), Value::Null);
        assert_eq!(TypeRef::Str.default_value(), Value::Null);
    }

    #[test]
    fn test_from_value_option() {
        assert_eq!(Option::<String>::from_value(Value::Null), Some(None));
        assert_eq!(
            Option::<String>::from_value(Value::str("hi")),
            Some(Some("hi".to_string()))
        );
        assert_eq!(i32::from_value(Value::Long(1)), None);
    }
}
