use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use pgtype_registry::{Oid, SharedPgTypeRegistry};
use pgtype_registry_test::{array, attribute, composite, registry};

#[test]
fn it_resolves_from_many_threads() -> anyhow::Result<()> {
    let shared = SharedPgTypeRegistry::new(registry());

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let shared = shared.clone();

            thread::spawn(move || -> anyhow::Result<_> {
                if n == 0 {
                    shared.ingest(
                        [composite(100, "tree", 100), array(101, "_tree", 100)],
                        [attribute(100, 1, "children", 101)],
                        [],
                    )?;
                }

                Ok(shared.lookup(Oid(23))?)
            })
        })
        .collect();

    let mut int4 = Vec::new();

    for handle in handles {
        let ty = handle
            .join()
            .map_err(|_| anyhow::anyhow!("lookup thread panicked"))??;
        int4.push(ty.ok_or_else(|| anyhow::anyhow!("int4 is a bootstrap type"))?);
    }

    assert!(int4.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

    let tree = shared
        .lookup(Oid(100))?
        .ok_or_else(|| anyhow::anyhow!("tree resolved"))?;
    let element = shared.with(|registry| {
        registry
            .get(Oid(101))
            .and_then(|trees| trees.element())
            .map(|element| element.as_arc().clone())
    });

    assert!(element.is_some_and(|element| Arc::ptr_eq(&element, &tree)));

    Ok(())
}

#[test]
fn it_stays_usable_after_a_panic_under_the_lock() -> anyhow::Result<()> {
    let shared = SharedPgTypeRegistry::from(registry());

    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        shared.with(|registry| {
            registry.clear();
            panic!("owner panicked while holding the registry");
        })
    }));
    assert!(caught.is_err());

    let int4 = shared.lookup(Oid(23))?;
    assert_eq!(int4.map(|ty| ty.name().to_owned()).as_deref(), Some("int4"));
    assert_eq!(shared.with(|registry| registry.len()), 10);

    Ok(())
}
