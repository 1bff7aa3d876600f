//! Invocation of resolved handles and error normalization

use crate::descriptor::FieldDescriptor;
use crate::error::{AccessError, AccessResult, HandleError};
use crate::handle::AccessDirection;
use crate::value::Value;

/// Performs reads and writes through a descriptor's handles.
///
/// Every failure leaving this type is an [`AccessError`]: type mismatches and
/// null receivers keep their category, a static marker passed for an
/// instance field becomes [`AccessError::IllegalUsage`], and anything else is
/// wrapped into [`AccessError::Failed`].
pub struct AccessInvoker<'a> {
    field: &'a FieldDescriptor,
}

impl<'a> AccessInvoker<'a> {
    /// Invoker for one descriptor
    pub fn new(field: &'a FieldDescriptor) -> Self {
        Self { field }
    }

    /// Read through the getter
    pub fn read(&self, source: &Value) -> AccessResult<Value> {
        self.check_type()?;
        let handle = self.field.handle(AccessDirection::Getter)?;

        let result = if self.field.is_static() {
            handle.invoke(&[])
        } else {
            handle.invoke(std::slice::from_ref(source))
        };
        result.map_err(|err| self.normalize(err, source))
    }

    /// Write through the setter
    pub fn write(&self, source: &Value, value: Value) -> AccessResult<()> {
        self.check_type()?;
        let handle = self.field.handle(AccessDirection::Setter)?;

        let result = if self.field.is_static() {
            handle.invoke(&[value])
        } else {
            handle.invoke(&[source.clone(), value])
        };
        result.map(|_| ()).map_err(|err| self.normalize(err, source))
    }

    // Checked on every call: an unknown type never produces a handle.
    fn check_type(&self) -> AccessResult<()> {
        if self.field.declared_type().is_unknown() {
            return Err(AccessError::TypeUnresolved {
                owner: self.field.owner().to_string(),
                field: self.field.name().to_string(),
            });
        }
        Ok(())
    }

    fn normalize(&self, err: HandleError, source: &Value) -> AccessError {
        match err {
            HandleError::TypeMismatch(_) if source.is_static_marker() && !self.field.is_static() => {
                AccessError::IllegalUsage {
                    owner: self.field.owner().to_string(),
                    field: self.field.name().to_string(),
                }
            }
            HandleError::TypeMismatch(message) => AccessError::TypeMismatch(message),
            HandleError::NullReceiver => AccessError::NullReceiver {
                owner: self.field.owner().to_string(),
                field: self.field.name().to_string(),
            },
            err @ HandleError::Arity { .. } => AccessError::failed(err),
            HandleError::Other(source) => AccessError::Failed { source },
        }
    }
}
