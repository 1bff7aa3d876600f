//! Handle construction for heap classes
//!
//! [`HeapLookup`] is the runtime's [`Lookup`] capability. The fast path only
//! binds public fields whose name, type, and static-ness match exactly; the
//! reflective path binds any field that is public or was forced accessible.
//! Under [`LookupPolicy::Intercepting`] every fast lookup fails, as it does
//! on runtimes that redirect name-based lookups through their own layer.

use std::sync::Arc;

use fieldlink_engine::{
    AccessDirection, FieldRef, HandleError, HandleKind, Lookup, LookupError, RawHandle,
    RuntimeClass, TypeRef, Value,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::class::{Class, FieldDef};
use crate::object::Instance;

/// How fast-path lookups behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Resolve by name and type
    #[default]
    Standard,
    /// Reject every fast lookup
    Intercepting,
}

/// [`Lookup`] over [`Class`]es of the managed heap
#[derive(Debug, Default)]
pub struct HeapLookup {
    policy: LookupPolicy,
}

impl HeapLookup {
    /// Create a lookup with a policy
    pub fn new(policy: LookupPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }
}

impl Lookup for HeapLookup {
    fn find_handle(
        &self,
        class: &Arc<dyn RuntimeClass>,
        name: &str,
        ty: &TypeRef,
        kind: HandleKind,
    ) -> Result<RawHandle, LookupError> {
        if self.policy == LookupPolicy::Intercepting {
            return Err(LookupError::Intercepted {
                owner: class.name().to_string(),
                name: name.to_string(),
            });
        }

        let heap_class = downcast(class)?;
        let wants_static = matches!(kind, HandleKind::StaticGetter | HandleKind::StaticSetter);
        let def = heap_class
            .field(name)
            .filter(|def| &def.ty == ty && def.is_static() == wants_static)
            .ok_or_else(|| LookupError::NoSuchField {
                owner: heap_class.name().to_string(),
                name: name.to_string(),
                ty: ty.clone(),
            })?;

        if !def.is_public() {
            return Err(LookupError::IllegalAccess {
                owner: heap_class.name().to_string(),
                name: name.to_string(),
                reason: "field is private".to_string(),
            });
        }

        trace!(owner = heap_class.name(), field = name, ?kind, "bound field handle");
        Ok(bind(&heap_class, def, kind))
    }

    fn unreflect(
        &self,
        class: &Arc<dyn RuntimeClass>,
        field: &FieldRef,
        direction: AccessDirection,
    ) -> Result<RawHandle, LookupError> {
        let heap_class = downcast(class)?;
        let def = heap_class
            .field_for(field)
            .ok_or_else(|| LookupError::NoSuchField {
                owner: field.owner.clone(),
                name: field.name.clone(),
                ty: field.ty.clone(),
            })?;

        if !def.is_accessible() {
            return Err(LookupError::IllegalAccess {
                owner: heap_class.name().to_string(),
                name: def.name.clone(),
                reason: "field is private and not accessible".to_string(),
            });
        }

        let kind = HandleKind::of(direction, def.is_static());
        trace!(owner = heap_class.name(), field = %def.name, ?kind, "unreflected field handle");
        Ok(bind(&heap_class, def, kind))
    }
}

fn downcast(class: &Arc<dyn RuntimeClass>) -> Result<Arc<Class>, LookupError> {
    let name = class.name().to_string();
    class
        .clone()
        .as_any_arc()
        .downcast::<Class>()
        .map_err(|_| LookupError::Other(format!("{} is not a heap class", name)))
}

fn bind(class: &Arc<Class>, def: &FieldDef, kind: HandleKind) -> RawHandle {
    let slot = def.slot;
    let class = class.clone();

    match kind {
        HandleKind::Getter => RawHandle::getter(move |receiver| {
            let instance = receiver_of(&class, receiver)?;
            instance.read(slot).ok_or_else(|| missing_slot(&class, slot))
        }),
        HandleKind::Setter => {
            let ty = def.ty.clone();
            let field = def.name.clone();
            RawHandle::setter(move |receiver, value| {
                let instance = receiver_of(&class, receiver)?;
                check_value(&class, &field, &ty, &value)?;
                if instance.write(slot, value) {
                    Ok(())
                } else {
                    Err(missing_slot(&class, slot))
                }
            })
        }
        HandleKind::StaticGetter => RawHandle::static_getter(move || {
            class.read_static(slot).ok_or_else(|| missing_slot(&class, slot))
        }),
        HandleKind::StaticSetter => {
            let ty = def.ty.clone();
            let field = def.name.clone();
            RawHandle::static_setter(move |value| {
                check_value(&class, &field, &ty, &value)?;
                if class.write_static(slot, value) {
                    Ok(())
                } else {
                    Err(missing_slot(&class, slot))
                }
            })
        }
    }
}

fn receiver_of<'v>(class: &Arc<Class>, receiver: &'v Value) -> Result<&'v Instance, HandleError> {
    match receiver {
        Value::Null => Err(HandleError::NullReceiver),
        Value::Object(obj) => obj
            .as_any()
            .downcast_ref::<Instance>()
            .filter(|instance| Arc::ptr_eq(instance.class(), class))
            .ok_or_else(|| wrong_receiver(class, receiver)),
        other => Err(wrong_receiver(class, other)),
    }
}

fn wrong_receiver(class: &Class, receiver: &Value) -> HandleError {
    HandleError::TypeMismatch(format!(
        "expected receiver of type {}, got {}",
        class.name(),
        receiver.type_name()
    ))
}

fn check_value(class: &Class, field: &str, ty: &TypeRef, value: &Value) -> Result<(), HandleError> {
    if ty.accepts(value) {
        Ok(())
    } else {
        Err(HandleError::TypeMismatch(format!(
            "cannot store {} in {}.{} of type {}",
            value.type_name(),
            class.name(),
            field,
            ty
        )))
    }
}

fn missing_slot(class: &Class, slot: usize) -> HandleError {
    HandleError::Other(format!("{} has no slot {}", class.name(), slot).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassBuilder, Modifiers};
    use crate::object::allocate;

    fn account() -> Arc<Class> {
        Arc::new(
            ClassBuilder::new("Account")
                .field("balance", TypeRef::Long)
                .with_field("pin", TypeRef::Int, Modifiers::PRIVATE)
                .static_field("opened", TypeRef::Int)
                .build()
                .unwrap(),
        )
    }

    fn as_runtime_class(class: &Arc<Class>) -> Arc<dyn RuntimeClass> {
        class.clone()
    }

    #[test]
    fn test_fast_lookup_binds_public_field() {
        let class = account();
        let lookup = HeapLookup::default();
        let obj = allocate(&class);

        let getter = lookup
            .find_handle(&as_runtime_class(&class), "balance", &TypeRef::Long, HandleKind::Getter)
            .unwrap();
        let setter = lookup
            .find_handle(&as_runtime_class(&class), "balance", &TypeRef::Long, HandleKind::Setter)
            .unwrap();

        match (getter, setter) {
            (RawHandle::Getter(get), RawHandle::Setter(set)) => {
                set(&obj, Value::Long(i64::MAX)).unwrap();
                assert_eq!(get(&obj).unwrap(), Value::Long(i64::MAX));
            }
            other => panic!("unexpected handles: {:?}", other),
        }
    }

    #[test]
    fn test_fast_lookup_rejects_wrong_type_and_staticness() {
        let class = account();
        let lookup = HeapLookup::default();
        let rc = as_runtime_class(&class);

        assert!(matches!(
            lookup.find_handle(&rc, "balance", &TypeRef::Int, HandleKind::Getter),
            Err(LookupError::NoSuchField { .. })
        ));
        assert!(matches!(
            lookup.find_handle(&rc, "balance", &TypeRef::Long, HandleKind::StaticGetter),
            Err(LookupError::NoSuchField { .. })
        ));
    }

    #[test]
    fn test_fast_lookup_rejects_private() {
        let class = account();
        let lookup = HeapLookup::default();

        assert!(matches!(
            lookup.find_handle(&as_runtime_class(&class), "pin", &TypeRef::Int, HandleKind::Getter),
            Err(LookupError::IllegalAccess { .. })
        ));
    }

    #[test]
    fn test_intercepting_policy() {
        let class = account();
        let lookup = HeapLookup::new(LookupPolicy::Intercepting);

        assert!(matches!(
            lookup.find_handle(&as_runtime_class(&class), "balance", &TypeRef::Long, HandleKind::Getter),
            Err(LookupError::Intercepted { .. })
        ));
    }

    #[test]
    fn test_unreflect_requires_accessibility() {
        let class = account();
        let rc = as_runtime_class(&class);
        let lookup = HeapLookup::default();
        let pin = rc.find_field("pin").unwrap();

        assert!(lookup.unreflect(&rc, &pin, AccessDirection::Getter).is_err());
        rc.force_accessible(&pin).unwrap();
        assert!(lookup.unreflect(&rc, &pin, AccessDirection::Getter).is_ok());
    }

    #[test]
    fn test_receiver_and_value_checks() {
        let class = account();
        let other = Arc::new(ClassBuilder::new("Other").build().unwrap());
        let lookup = HeapLookup::default();
        let rc = as_runtime_class(&class);

        let RawHandle::Setter(set) = lookup
            .find_handle(&rc, "balance", &TypeRef::Long, HandleKind::Setter)
            .unwrap()
        else {
            panic!("expected setter");
        };

        let obj = allocate(&class);
        assert!(matches!(set(&Value::Null, Value::Long(1)), Err(HandleError::NullReceiver)));
        assert!(matches!(
            set(&allocate(&other), Value::Long(1)),
            Err(HandleError::TypeMismatch(_))
        ));
        assert!(matches!(set(&obj, Value::Int(1)), Err(HandleError::TypeMismatch(_))));
        assert!(matches!(set(&obj, Value::Null), Err(HandleError::TypeMismatch(_))));
    }

    #[test]
    fn test_static_handles() {
        let class = account();
        let rc = as_runtime_class(&class);
        let lookup = HeapLookup::default();
        let opened = rc.find_field("opened").unwrap();

        let RawHandle::StaticSetter(set) = lookup.unreflect(&rc, &opened, AccessDirection::Setter).unwrap() else {
            panic!("expected static setter");
        };
        set(Value::Int(3)).unwrap();
        assert_eq!(class.read_static(0), Some(Value::Int(3)));
    }
}
