//! Classes of the managed heap
//!
//! A class declares its fields in order. Instance fields occupy slots in
//! each [`Instance`](crate::Instance); static fields live in the class.
//! Every field carries an `accessible` flag that reflection can force on;
//! once forced it is never cleared.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fieldlink_engine::{FieldRef, LookupError, RuntimeClass, TypeRef, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::RuntimeError;

/// Modifier flags for a declared field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Static member
    pub is_static: bool,
    /// Private visibility
    pub is_private: bool,
}

impl Modifiers {
    /// Public instance field
    pub const INSTANCE: Self = Self {
        is_static: false,
        is_private: false,
    };
    /// Public static field
    pub const STATIC: Self = Self {
        is_static: true,
        is_private: false,
    };
    /// Private instance field
    pub const PRIVATE: Self = Self {
        is_static: false,
        is_private: true,
    };
    /// Private static field
    pub const PRIVATE_STATIC: Self = Self {
        is_static: true,
        is_private: true,
    };
}

/// A declared field
#[derive(Debug)]
pub struct FieldDef {
    /// Field name as known to this runtime
    pub name: String,
    /// Field type
    pub ty: TypeRef,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Instance slot, or static slot for static fields
    pub slot: usize,
    accessible: AtomicBool,
}

impl FieldDef {
    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    /// Whether the field is public
    pub fn is_public(&self) -> bool {
        !self.modifiers.is_private
    }

    /// Public, or forced accessible through reflection
    pub fn is_accessible(&self) -> bool {
        self.is_public() || self.accessible.load(Ordering::Acquire)
    }
}

/// Builder for [`Class`]
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    fields: Vec<(String, TypeRef, Modifiers)>,
}

impl ClassBuilder {
    /// Start a class
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a public instance field
    pub fn field(self, name: &str, ty: TypeRef) -> Self {
        self.with_field(name, ty, Modifiers::INSTANCE)
    }

    /// Declare a public static field
    pub fn static_field(self, name: &str, ty: TypeRef) -> Self {
        self.with_field(name, ty, Modifiers::STATIC)
    }

    /// Declare a field with explicit modifiers
    pub fn with_field(mut self, name: &str, ty: TypeRef, modifiers: Modifiers) -> Self {
        self.fields.push((name.to_string(), ty, modifiers));
        self
    }

    /// Rename declared fields; `rename` returns the runtime name for a
    /// logical one, or `None` to keep it.
    pub(crate) fn rename_fields(mut self, rename: impl Fn(&str) -> Option<String>) -> Self {
        for (name, _, _) in &mut self.fields {
            if let Some(renamed) = rename(name) {
                debug!(class = %self.name, from = %name, to = %renamed, "remapped field");
                *name = renamed;
            }
        }
        self
    }

    /// Lay out slots and build the class
    pub fn build(self) -> Result<Class, RuntimeError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut field_index = FxHashMap::default();
        let mut instance_types = Vec::new();
        let mut statics = Vec::new();

        for (name, ty, modifiers) in self.fields {
            if field_index.contains_key(&name) {
                return Err(RuntimeError::DuplicateField {
                    class: self.name,
                    field: name,
                });
            }

            let slot = if modifiers.is_static {
                statics.push(ty.default_value());
                statics.len() - 1
            } else {
                instance_types.push(ty.clone());
                instance_types.len() - 1
            };

            field_index.insert(name.clone(), fields.len());
            fields.push(FieldDef {
                name,
                ty,
                modifiers,
                slot,
                accessible: AtomicBool::new(false),
            });
        }

        Ok(Class {
            name: self.name,
            fields,
            field_index,
            instance_types,
            statics: RwLock::new(statics),
        })
    }
}

/// A loaded class
#[derive(Debug)]
pub struct Class {
    name: String,
    fields: Vec<FieldDef>,
    field_index: FxHashMap<String, usize>,
    instance_types: Vec<TypeRef>,
    statics: RwLock<Vec<Value>>,
}

impl Class {
    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field by runtime name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Field a reflected reference points at
    pub fn field_for(&self, field: &FieldRef) -> Option<&FieldDef> {
        if field.owner != self.name {
            return None;
        }
        self.fields
            .iter()
            .find(|def| def.slot == field.slot && def.is_static() == field.is_static)
    }

    /// Initial slot values for a new instance
    pub fn instance_defaults(&self) -> Vec<Value> {
        self.instance_types.iter().map(TypeRef::default_value).collect()
    }

    /// Number of instance slots
    pub fn instance_slot_count(&self) -> usize {
        self.instance_types.len()
    }

    /// Read a static slot
    pub fn read_static(&self, slot: usize) -> Option<Value> {
        self.statics.read().get(slot).cloned()
    }

    /// Write a static slot; returns false when the slot does not exist
    pub fn write_static(&self, slot: usize, value: Value) -> bool {
        match self.statics.write().get_mut(slot) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    fn field_ref(&self, def: &FieldDef) -> FieldRef {
        FieldRef {
            owner: self.name.clone(),
            name: def.name.clone(),
            ty: def.ty.clone(),
            is_static: def.is_static(),
            slot: def.slot,
        }
    }
}

impl RuntimeClass for Class {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_field(&self, name: &str) -> Option<FieldRef> {
        self.field(name).map(|def| self.field_ref(def))
    }

    fn declared_fields(&self) -> Vec<FieldRef> {
        self.fields.iter().map(|def| self.field_ref(def)).collect()
    }

    fn force_accessible(&self, field: &FieldRef) -> Result<(), LookupError> {
        let def = self
            .field_for(field)
            .ok_or_else(|| LookupError::NoSuchField {
                owner: self.name.clone(),
                name: field.name.clone(),
                ty: field.ty.clone(),
            })?;
        if !def.accessible.swap(true, Ordering::AcqRel) && !def.is_public() {
            debug!(class = %self.name, field = %def.name, "forced private field accessible");
        }
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Class {
        ClassBuilder::new("Player")
            .field("name", TypeRef::Str)
            .static_field("count", TypeRef::Int)
            .with_field("health", TypeRef::Int, Modifiers::PRIVATE)
            .build()
            .unwrap()
    }

    #[test]
    fn test_slot_layout() {
        let class = player();

        assert_eq!(class.field("name").unwrap().slot, 0);
        assert_eq!(class.field("count").unwrap().slot, 0);
        assert_eq!(class.field("health").unwrap().slot, 1);
        assert_eq!(class.instance_slot_count(), 2);
        assert_eq!(class.instance_defaults(), vec![Value::Null, Value::Int(0)]);
        assert_eq!(class.read_static(0), Some(Value::Int(0)));
    }

    #[test]
    fn test_declared_fields_keep_order() {
        let names: Vec<_> = player()
            .declared_fields()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["name", "count", "health"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ClassBuilder::new("Twice")
            .field("x", TypeRef::Int)
            .static_field("x", TypeRef::Int)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateField { .. }));
    }

    #[test]
    fn test_force_accessible_is_permanent() {
        let class = player();
        let health = class.find_field("health").unwrap();

        assert!(!class.field("health").unwrap().is_accessible());
        class.force_accessible(&health).unwrap();
        assert!(class.field("health").unwrap().is_accessible());
        class.force_accessible(&health).unwrap();
        assert!(class.field("health").unwrap().is_accessible());
    }

    #[test]
    fn test_force_accessible_foreign_field() {
        let class = player();
        let foreign = FieldRef {
            owner: "Enemy".to_string(),
            name: "health".to_string(),
            ty: TypeRef::Int,
            is_static: false,
            slot: 1,
        };
        assert!(class.force_accessible(&foreign).is_err());
    }

    #[test]
    fn test_rename_fields() {
        let class = ClassBuilder::new("Player")
            .field("health", TypeRef::Int)
            .rename_fields(|name| (name == "health").then(|| "f_1021".to_string()))
            .build()
            .unwrap();

        assert!(class.field("health").is_none());
        assert!(class.field("f_1021").is_some());
    }
}
