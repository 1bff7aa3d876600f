//! Concurrent first use of shared field descriptors

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use fieldlink_engine::{
    AccessDirection, FieldRef, HandleKind, Lookup, LookupError, RawHandle, RuntimeClass, TypeRef,
    Value,
};
use fieldlink_runtime::{ClassBuilder, HeapLookup, LookupPolicy, Runtime, RuntimeConfig};

const THREADS: usize = 8;

struct CountingLookup {
    inner: HeapLookup,
    built: AtomicUsize,
}

impl Lookup for CountingLookup {
    fn find_handle(
        &self,
        class: &Arc<dyn RuntimeClass>,
        name: &str,
        ty: &TypeRef,
        kind: HandleKind,
    ) -> Result<RawHandle, LookupError> {
        let handle = self.inner.find_handle(class, name, ty, kind)?;
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    fn unreflect(
        &self,
        class: &Arc<dyn RuntimeClass>,
        field: &FieldRef,
        direction: AccessDirection,
    ) -> Result<RawHandle, LookupError> {
        let handle = self.inner.unreflect(class, field, direction)?;
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }
}

fn setup(policy: LookupPolicy) -> (Runtime, Arc<CountingLookup>) {
    let lookup = Arc::new(CountingLookup {
        inner: HeapLookup::new(policy),
        built: AtomicUsize::new(0),
    });
    let runtime = Runtime::with_lookup(RuntimeConfig::default(), lookup.clone()).unwrap();
    runtime
        .define_class(
            ClassBuilder::new("Sensor")
                .field("reading", TypeRef::Long)
                .static_field("calibration", TypeRef::Double),
        )
        .unwrap();
    (runtime, lookup)
}

#[test]
fn test_racing_first_use_converges() {
    for policy in [LookupPolicy::Standard, LookupPolicy::Intercepting] {
        let (runtime, lookup) = setup(policy);
        let reading = runtime.field("Sensor", "reading", TypeRef::Long, false);
        let barrier = Barrier::new(THREADS);

        thread::scope(|s| {
            for t in 0..THREADS {
                let sensor = runtime.instantiate("Sensor").unwrap();
                let reading = &reading;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    for i in 0..200i64 {
                        let value = (t as i64) * 1_000 + i;
                        reading.set(&sensor, value).unwrap();
                        assert_eq!(reading.get(&sensor).unwrap(), Value::Long(value));
                    }
                });
            }
        });

        assert_eq!(lookup.built.load(Ordering::SeqCst), 2, "policy {:?}", policy);
    }
}

#[test]
fn test_shared_static_field() {
    let (runtime, lookup) = setup(LookupPolicy::Standard);
    let calibration = runtime.field("Sensor", "calibration", TypeRef::Double, true);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                calibration.set(&Value::Null, 1.5).unwrap();
                assert_eq!(calibration.get(&Value::Null).unwrap(), Value::Double(1.5));
            });
        }
    });

    assert_eq!(lookup.built.load(Ordering::SeqCst), 2);
}
