#![allow(dead_code)]

use std::error::Error;

use sovran_hetero::{HVec, HetError, HeteroValue};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Document {
    title: String,
    pages: u32,
}

/// Owns an OS resource, so it must never be duplicated
#[derive(Debug)]
struct Lease {
    id: u64,
}

/// Demonstrates which values follow a store when it is copied or moved
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sovran_hetero=debug".parse()?),
        )
        .init();

    let mut library = HVec::new();
    library.push_back(Document {
        title: "Manual".to_string(),
        pages: 120,
    })?;
    library.push_back(Document {
        title: "Errata".to_string(),
        pages: 2,
    })?;

    // Cloneable content copies freely
    let mut backup = library.try_clone()?;
    backup.at_mut::<Document>(1)?.pages = 3;
    println!(
        "original errata: {} pages, backup errata: {} pages",
        library.at::<Document>(1)?.pages,
        backup.at::<Document>(1)?.pages
    );

    // Move-only content blocks copies
    let mut session = HeteroValue::new();
    session.add(String::from("alice"))?;
    session.add_unique(Lease { id: 42 })?;
    match session.try_clone() {
        Ok(_) => println!("unexpected copy"),
        Err(HetError::NotCloneable(name)) => println!("cannot copy session: {} is move-only", name),
        Err(e) => return Err(e.into()),
    }

    // ...but can be moved into another store
    let mut handed_over = HeteroValue::new();
    handed_over.assign_from(&mut session)?;
    println!(
        "new session holds lease {} for {}",
        handed_over.value::<Lease>()?.id,
        handed_over.value::<String>()?
    );
    println!("old session still has: {:?}", session.type_names());

    Ok(())
}
