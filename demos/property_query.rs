use std::error::Error;

use sovran_hetero::query::{clause, find_all, find_first, find_next, query_first, query_last};
use sovran_hetero::HVec;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
struct Property {
    name: String,
    value: String,
}

/// Demonstrates positional searches over one type of a sequence store
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rows = [
        ("R0", "apple"),
        ("R1", "orange"),
        ("R2", "melon"),
        ("R3", "thistle"),
        ("R4", "trefoil"),
        ("R0", "apple"),
        ("R1", "orange"),
        ("R2", "melon"),
        ("R3", "thistle"),
        ("R4", "trefoil"),
        ("R0", "orange"),
        ("R1", "apple"),
        ("R2", "thistle"),
        ("R3", "melon"),
        ("R4", "trefoil"),
    ];

    let mut hc = HVec::new();
    for (name, value) in rows {
        hc.push_back(Property {
            name: name.to_string(),
            value: value.to_string(),
        })?;
    }

    let by_name = |name: &'static str| clause(|p: &Property| &p.name, name);
    let by_value = |value: &'static str| clause(|p: &Property| &p.value, value);

    if let Some((pos, p)) = query_first(&hc, (by_name("R0"), by_value("orange"))) {
        println!("first R0=orange at {}: {:?}", pos, p);
    }
    if let Some((pos, p)) = query_last(&hc, (by_name("R2"), by_value("melon"))) {
        println!("last R2=melon at {}: {:?}", pos, p);
    }

    // walk every thistle
    let is_thistle = |p: &Property| p.value == "thistle";
    let mut cursor = find_first(&hc, is_thistle);
    while let Some((pos, p)) = cursor {
        println!("thistle in {} at {}", p.name, pos);
        cursor = find_next(&hc, pos, is_thistle);
    }

    let mut numbers = HVec::new();
    for v in [2, 1, 1, 3, 1, 1, 1, 1, 5] {
        numbers.push_back(v)?;
    }
    let mut small = Vec::new();
    find_all(&numbers, &mut small, |v: &i32| *v == 1 || *v == 2);
    println!("ones and twos: {:?}", small);

    Ok(())
}
