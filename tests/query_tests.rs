use sovran_hetero::query::{
    clause, find_all, find_first, find_last, find_next, find_prev, query_first, query_last,
};
use sovran_hetero::{HDeque, HVec, HetError};

#[derive(Debug, Clone, PartialEq)]
struct Property {
    name: String,
    value: String,
}

impl Property {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

fn properties() -> Result<HVec, HetError> {
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
        hc.push_back(Property::new(name, value))?;
    }
    // noise of other types must not disturb positions
    hc.push_back(42i32)?;
    hc.push_back(String::from("R0"))?;
    Ok(hc)
}

#[test]
fn test_query_first_and_last_over_properties() -> Result<(), HetError> {
    let hc = properties()?;

    let (first_pos, first) = query_first(
        &hc,
        (
            clause(|p: &Property| &p.name, "R0"),
            clause(|p: &Property| &p.value, "orange"),
        ),
    )
    .expect("R0 orange is stored");
    assert_eq!(first_pos, 10);
    assert_eq!(first, &Property::new("R0", "orange"));

    let (last_pos, last) = query_last(
        &hc,
        (
            clause(|p: &Property| &p.name, "R2"),
            clause(|p: &Property| &p.value, "melon"),
        ),
    )
    .expect("R2 melon is stored");
    assert_eq!(last_pos, 7);
    assert_eq!(last, &Property::new("R2", "melon"));

    // the distance between the hits counts the elements in between
    assert_eq!(first_pos - last_pos - 1, 2);
    Ok(())
}

#[test]
fn test_query_without_match() -> Result<(), HetError> {
    let hc = properties()?;

    let found = query_first(
        &hc,
        (
            clause(|p: &Property| &p.name, "R4"),
            clause(|p: &Property| &p.value, "apple"),
        ),
    );
    assert!(found.is_none());

    // a single clause needs no tuple
    let found = query_last(&hc, clause(|p: &Property| &p.value, "trefoil"));
    assert_eq!(found.map(|(pos, _)| pos), Some(14));
    Ok(())
}

#[test]
fn test_find_all_keeps_forward_order() -> Result<(), HetError> {
    let mut hc = HVec::new();
    for v in [2, 1, 1, 3, 1, 1, 1, 1, 5] {
        hc.push_back(v)?;
    }

    let mut out = Vec::new();
    assert!(find_all(&hc, &mut out, |v: &i32| *v == 1 || *v == 2));
    assert_eq!(out, vec![2, 1, 1, 1, 1, 1, 1]);

    let mut none: Vec<i32> = Vec::new();
    assert!(!find_all(&hc, &mut none, |v: &i32| *v > 10));
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn test_find_walks_forward_and_backward() -> Result<(), HetError> {
    let mut hc = HVec::new();
    for v in [3, 1, 4, 1, 5, 9, 2, 6] {
        hc.push_back(v)?;
    }
    let is_one = |v: &i32| *v == 1;

    assert_eq!(find_first(&hc, is_one), Some((1, &1)));
    assert_eq!(find_next(&hc, 1, is_one), Some((3, &1)));
    assert_eq!(find_next(&hc, 3, is_one), None);

    assert_eq!(find_last(&hc, is_one), Some((3, &1)));
    assert_eq!(find_prev(&hc, 3, is_one), Some((1, &1)));
    assert_eq!(find_prev(&hc, 1, is_one), None);

    // the element at position 0 is reachable backwards
    assert_eq!(find_prev(&hc, 2, |v: &i32| *v == 3), Some((0, &3)));
    Ok(())
}

#[test]
fn test_find_on_absent_type() {
    let hc = HVec::new();
    assert_eq!(find_first(&hc, |_: &u64| true), None);
    assert_eq!(find_last(&hc, |_: &u64| true), None);
    assert_eq!(find_next(&hc, usize::MAX, |_: &u64| true), None);
    assert_eq!(find_prev(&hc, usize::MAX, |_: &u64| true), None);

    let mut sink: Vec<u64> = Vec::new();
    assert!(!find_all(&hc, &mut sink, |_: &u64| true));
}

#[test]
fn test_find_on_deque() -> Result<(), HetError> {
    let mut hd = HDeque::new();
    hd.push_back('b')?;
    hd.push_front('a')?;
    hd.push_back('c')?;

    assert_eq!(find_first(&hd, |c: &char| *c != 'a'), Some((1, &'b')));
    assert_eq!(find_last(&hd, |c: &char| *c != 'c'), Some((1, &'b')));
    Ok(())
}

#[test]
fn test_contains_any_clause() -> Result<(), HetError> {
    let hc = properties()?;
    let unknown_name = clause(|p: &Property| &p.name, "R9");
    let known_value = clause(|p: &Property| &p.value, "thistle");
    assert!(hc.contains_any((unknown_name, known_value)));
    assert!(!hc.contains_any(clause(|p: &Property| &p.value, "fig")));
    Ok(())
}
