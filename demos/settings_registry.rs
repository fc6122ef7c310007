#![allow(dead_code)]

use std::error::Error;

use sovran_hetero::{DropPolicy, HeteroKeyValue, HeteroValue, Matcher, VisitorReturn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
struct Timeout(u64);

#[derive(Debug, Clone, PartialEq)]
struct Retries(u32);

#[derive(Debug, Clone, PartialEq)]
enum LogLevel {
    Quiet,
    Verbose,
}

/// Demonstrates typed settings: one global value per type, plus per-service overrides
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sovran_hetero=trace".parse()?),
        )
        .with_target(true)
        .init();

    // Global defaults, one per type
    let mut defaults = HeteroValue::builder().type_capacity(8).build();
    defaults.add_values((Timeout(30), Retries(3), LogLevel::Quiet))?;

    // Per-service overrides keyed by service name
    let mut overrides = HeteroKeyValue::builder()
        .drop_policy(DropPolicy::MayDropItems)
        .build();
    overrides.add("billing", Timeout(120))?;
    overrides.add("billing", LogLevel::Verbose)?;
    overrides.add("search", Retries(5))?;

    for service in ["billing", "search", "mail"] {
        let timeout = overrides
            .get::<Timeout, _>(&service)
            .unwrap_or(defaults.value::<Timeout>()?);
        let retries = overrides
            .get::<Retries, _>(&service)
            .unwrap_or(defaults.value::<Retries>()?);
        let level = overrides
            .get::<LogLevel, _>(&service)
            .unwrap_or(defaults.value::<LogLevel>()?);
        println!("{service}: {timeout:?} {retries:?} {level:?}");
    }

    // List the timeout overrides
    overrides
        .visit::<&'static str, (Timeout,)>()
        .call(&mut |service: &&'static str, value: &Timeout| {
            println!("override {service} -> {value:?}");
            VisitorReturn::Continue
        });

    let mut m = Matcher::for_entries()
        .on_entry(|service: &&'static str, level: &LogLevel| {
            println!("log level for {service}: {level:?}");
        })
        .otherwise_entry(|service: &&'static str, _| println!("other override for {service}"));
    overrides
        .match_types::<&'static str, (LogLevel, Retries)>()
        .call(&mut m);

    println!("{} overrides in total", overrides.size()?);
    Ok(())
}
