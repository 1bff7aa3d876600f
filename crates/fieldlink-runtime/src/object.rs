//! Heap instances

use std::any::Any;
use std::sync::Arc;

use fieldlink_engine::{ManagedObject, Value};
use parking_lot::RwLock;

use crate::class::Class;

/// An instance of a [`Class`]
#[derive(Debug)]
pub struct Instance {
    class: Arc<Class>,
    slots: RwLock<Vec<Value>>,
}

impl Instance {
    /// Allocate an instance with default slot values
    pub fn new(class: Arc<Class>) -> Self {
        let slots = class.instance_defaults();
        Self {
            class,
            slots: RwLock::new(slots),
        }
    }

    /// The instance's class
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Read a slot
    pub fn read(&self, slot: usize) -> Option<Value> {
        self.slots.read().get(slot).cloned()
    }

    /// Write a slot; returns false when the slot does not exist
    pub fn write(&self, slot: usize, value: Value) -> bool {
        match self.slots.write().get_mut(slot) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

impl ManagedObject for Instance {
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Allocate an instance and wrap it as a [`Value`]
pub fn allocate(class: &Arc<Class>) -> Value {
    Value::Object(Arc::new(Instance::new(class.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use fieldlink_engine::TypeRef;

    #[test]
    fn test_instance_slots() {
        let class = Arc::new(
            ClassBuilder::new("Point")
                .field("x", TypeRef::Double)
                .field("y", TypeRef::Double)
                .build()
                .unwrap(),
        );
        let point = Instance::new(class);

        assert_eq!(point.read(1), Some(Value::Double(0.0)));
        assert!(point.write(1, Value::Double(2.5)));
        assert_eq!(point.read(1), Some(Value::Double(2.5)));
        assert!(!point.write(2, Value::Double(1.0)));
        assert_eq!(point.class_name(), "Point");
    }
}
