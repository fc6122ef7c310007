use std::cell::RefCell;
use std::error::Error;

use sovran_hetero::{Case, HVec, Matcher};
use tracing_subscriber::EnvFilter;

/// Demonstrates dispatching stored values to handlers by type
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sovran_hetero=trace".parse()?),
        )
        .init();

    let mut hc = HVec::new();
    hc.push_back("a string view")?;
    hc.push_back((1i32, 2.0f32))?;
    hc.push_back(String::from("an owned string"))?;
    hc.push_back(1.0f64)?;

    let out = RefCell::new(String::new());
    let mut m = Matcher::new()
        // exact type
        .on::<(i32, f32)>(|pair| {
            println!("pair: {:?}", pair);
            out.borrow_mut().push('1');
        })
        // anything that borrows as str
        .case(
            Case::converting(|s: &str| {
                println!("text: {}", s);
                out.borrow_mut().push('2');
            })
            .from::<&'static str>()
            .from::<String>(),
        )
        .otherwise(|_| {
            println!("something else");
            out.borrow_mut().push_str("default");
        });

    let all_present = hc
        .match_types::<(&'static str, (i32, f32), f64, String, *const i32)>()
        .call(&mut m);
    drop(m);

    println!("output: {}", out.borrow());
    println!("all types present: {}", all_present);
    Ok(())
}
