use std::any::Any;
use std::cell::RefCell;

use sovran_hetero::{Case, HVec, HetError, HeteroKeyValue, HeteroValue, Matcher};

#[test]
fn test_match_output_order() -> Result<(), HetError> {
    let mut hc = HVec::new();
    hc.push_back("view")?;
    hc.push_back((1i32, 2.0f32))?;
    hc.push_back(String::from("owned"))?;
    hc.push_back(1.0f64)?;

    let out = RefCell::new(String::new());
    let mut m = Matcher::new()
        .on::<(i32, f32)>(|_| out.borrow_mut().push('1'))
        .case(
            Case::converting(|_: &str| out.borrow_mut().push('2'))
                .from::<&'static str>()
                .from::<String>(),
        )
        .otherwise(|_| out.borrow_mut().push_str("default"));

    // the pointer type was never stored
    let all_present = hc
        .match_types::<(&'static str, (i32, f32), f64, String, *const i32)>()
        .call(&mut m);
    drop(m);

    assert!(!all_present);
    assert_eq!(out.into_inner(), "21default2");
    Ok(())
}

#[test]
fn test_match_every_element_once() -> Result<(), HetError> {
    let mut hc = HVec::new();
    for v in [1u8, 2, 3] {
        hc.push_back(v)?;
    }
    hc.push_back('z')?;

    let mut bytes = Vec::new();
    let mut rest = 0;
    let mut m = Matcher::new()
        .on::<u8>(|v| bytes.push(*v))
        .otherwise(|_| rest += 1);
    assert!(hc.match_types::<(u8, char)>().call(&mut m));
    drop(m);

    assert_eq!(bytes, vec![1, 2, 3]);
    assert_eq!(rest, 1);
    Ok(())
}

#[test]
fn test_exact_case_wins_over_earlier_conversion() -> Result<(), HetError> {
    let hv = HeteroValue::with_values((String::from("text"),))?;

    let picked = RefCell::new(Vec::new());
    let mut m = Matcher::new()
        .case(Case::converting(|_: &str| picked.borrow_mut().push("converting")).from::<String>())
        .on::<String>(|_| picked.borrow_mut().push("exact"))
        .otherwise(|_| picked.borrow_mut().push("otherwise"));
    assert!(hv.match_types::<(String,)>().call(&mut m));
    drop(m);

    assert_eq!(picked.into_inner(), vec!["exact"]);
    Ok(())
}

#[test]
fn test_first_conversion_wins() -> Result<(), HetError> {
    let hv = HeteroValue::with_values((String::from("text"),))?;

    let picked = RefCell::new(Vec::new());
    let mut m = Matcher::new()
        .case(Case::converting(|s: &str| picked.borrow_mut().push(format!("str:{s}"))).from::<String>())
        .case(
            Case::converting(|b: &[u8]| picked.borrow_mut().push(format!("bytes:{}", b.len())))
                .from::<Vec<u8>>(),
        )
        .otherwise(|_| picked.borrow_mut().push(String::from("otherwise")));
    hv.match_each(&mut m);
    drop(m);

    assert_eq!(picked.into_inner(), vec!["str:text"]);
    Ok(())
}

#[test]
fn test_otherwise_sees_value() -> Result<(), HetError> {
    let hv = HeteroValue::with_values((7u16, 'q'))?;

    let mut seen = Vec::new();
    let mut m = Matcher::new().otherwise(|value: &dyn Any| {
        if let Some(n) = value.downcast_ref::<u16>() {
            seen.push(format!("u16 {n}"));
        } else if let Some(c) = value.downcast_ref::<char>() {
            seen.push(format!("char {c}"));
        }
    });
    hv.match_each(&mut m);
    drop(m);

    // registration order
    assert_eq!(seen, vec!["u16 7", "char q"]);
    Ok(())
}

#[test]
fn test_absent_type_does_not_stop_dispatch() -> Result<(), HetError> {
    let hv = HeteroValue::with_values((1i64,))?;

    let mut hits = 0;
    let mut m = Matcher::new().on::<i64>(|_| hits += 1).otherwise(|_| {});
    assert!(!hv.match_types::<(bool, i64)>().call(&mut m));
    drop(m);

    assert_eq!(hits, 1);
    Ok(())
}

#[test]
fn test_entry_match_with_conversion() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::new();
    kv.add(1u32, String::from("one"))?;
    kv.add(2u32, vec![1u8, 2, 3])?;
    kv.add(3u32, 3.5f32)?;

    let seen = RefCell::new(Vec::new());
    let mut m = Matcher::for_entries()
        .case(
            Case::converting_entry(|k: &u32, s: &str| seen.borrow_mut().push(format!("{k}:{s}")))
                .from::<String>(),
        )
        .case(
            Case::converting_entry(|k: &u32, b: &[u8]| {
                seen.borrow_mut().push(format!("{k}:{} bytes", b.len()))
            })
            .from::<Vec<u8>>(),
        )
        .otherwise_entry(|k: &u32, _| seen.borrow_mut().push(format!("{k}:?")));
    assert!(kv.match_types::<u32, (String, Vec<u8>, f32)>().call(&mut m));
    drop(m);

    assert_eq!(seen.into_inner(), vec!["1:one", "2:3 bytes", "3:?"]);
    Ok(())
}

#[test]
fn test_case_debug() {
    let case: Case<'_, str> = Case::converting(|_: &str| {}).from::<String>().from::<String>();
    let debug = format!("{case:?}");
    assert!(debug.contains("conversions: 1"));
}
