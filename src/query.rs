//! Read-only searches over one payload type of a sequence store.
//!
//! Every function returns the position within the fraction together with the element, or
//! `None` when nothing matches (including when the type is not stored at all).
//!
//! Clauses compare a projected field with `==`. For any other per-field comparison, pass
//! a closure to the `find_*` functions instead.
//!
//! # Examples
//!
//! ```
//! use sovran_hetero::query::{clause, find_next, query_first};
//! use sovran_hetero::HVec;
//!
//! #[derive(Clone)]
//! struct Reading {
//!     sensor: String,
//!     value: i32,
//! }
//!
//! let mut hc = HVec::new();
//! for (sensor, value) in [("a", 1), ("b", 2), ("a", 3)] {
//!     hc.push_back(Reading { sensor: sensor.into(), value })?;
//! }
//!
//! let (pos, first) =
//!     query_first(&hc, clause(|r: &Reading| &r.sensor, "a")).expect("a reading from a");
//! assert_eq!((pos, first.value), (0, 1));
//!
//! let (pos, next) = find_next(&hc, pos, |r: &Reading| r.sensor == "a").expect("another");
//! assert_eq!((pos, next.value), (2, 3));
//! # Ok::<(), sovran_hetero::HetError>(())
//! ```

use std::marker::PhantomData;

use crate::sequence::SequenceKind;
use crate::HeteroContainer;

/// First element satisfying `pred`
pub fn find_first<T, K, P>(hc: &HeteroContainer<K>, mut pred: P) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    P: FnMut(&T) -> bool,
{
    hc.iter::<T>().enumerate().find(|(_, item)| pred(item))
}

/// First element after `pos` satisfying `pred`
pub fn find_next<T, K, P>(hc: &HeteroContainer<K>, pos: usize, mut pred: P) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    P: FnMut(&T) -> bool,
{
    hc.iter::<T>()
        .enumerate()
        .skip(pos.saturating_add(1))
        .find(|(_, item)| pred(item))
}

/// Last element satisfying `pred`
pub fn find_last<T, K, P>(hc: &HeteroContainer<K>, mut pred: P) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    P: FnMut(&T) -> bool,
{
    hc.iter::<T>().enumerate().rev().find(|(_, item)| pred(item))
}

/// Last element before `pos` satisfying `pred`
pub fn find_prev<T, K, P>(hc: &HeteroContainer<K>, pos: usize, mut pred: P) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    P: FnMut(&T) -> bool,
{
    hc.iter::<T>()
        .enumerate()
        .take(pos)
        .rev()
        .find(|(_, item)| pred(item))
}

/// Clones every element satisfying `pred` into `sink`, in storage order.
///
/// Returns whether anything was found.
pub fn find_all<T, K, E, P>(hc: &HeteroContainer<K>, sink: &mut E, mut pred: P) -> bool
where
    T: Clone + 'static,
    K: SequenceKind,
    E: Extend<T>,
    P: FnMut(&T) -> bool,
{
    let mut found = false;
    for item in hc.iter::<T>().filter(|item| pred(item)) {
        sink.extend(std::iter::once(item.clone()));
        found = true;
    }
    found
}

/// First element satisfying every clause
pub fn query_first<T, K, C>(hc: &HeteroContainer<K>, clauses: C) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    C: Clauses<T>,
{
    find_first(hc, |item: &T| clauses.all(item))
}

/// Last element satisfying every clause
pub fn query_last<T, K, C>(hc: &HeteroContainer<K>, clauses: C) -> Option<(usize, &T)>
where
    T: 'static,
    K: SequenceKind,
    C: Clauses<T>,
{
    find_last(hc, |item: &T| clauses.all(item))
}

/// A condition on elements of type `T`: a single [`Clause`] or a tuple of them
pub trait Clauses<T: ?Sized> {
    /// True when every clause holds
    fn all(&self, item: &T) -> bool;

    /// True when at least one clause holds
    fn any(&self, item: &T) -> bool;
}

/// Holds when the projected field equals the expected value. Built with [`clause`].
pub struct Clause<T: ?Sized, R: ?Sized, P, E> {
    projection: P,
    expected: E,
    _types: PhantomData<fn(&T) -> &R>,
}

/// Builds a [`Clause`] comparing `projection(item)` with `expected`
pub fn clause<T, R, P, E>(projection: P, expected: E) -> Clause<T, R, P, E>
where
    T: ?Sized,
    R: ?Sized + PartialEq<E>,
    P: Fn(&T) -> &R,
{
    Clause {
        projection,
        expected,
        _types: PhantomData,
    }
}

impl<T, R, P, E> Clause<T, R, P, E>
where
    T: ?Sized,
    R: ?Sized + PartialEq<E>,
    P: Fn(&T) -> &R,
{
    pub fn matches(&self, item: &T) -> bool {
        *(self.projection)(item) == self.expected
    }
}

impl<T, R, P, E> Clauses<T> for Clause<T, R, P, E>
where
    T: ?Sized,
    R: ?Sized + PartialEq<E>,
    P: Fn(&T) -> &R,
{
    fn all(&self, item: &T) -> bool {
        self.matches(item)
    }

    fn any(&self, item: &T) -> bool {
        self.matches(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HVec;

    fn numbers() -> Result<HVec, crate::HetError> {
        let mut hc = HVec::new();
        hc.push_values((2i32, 1i32, 1i32, 3i32, 1i32, 1i32, 1i32, 1i32, 5i32))?;
        hc.push_back('x')?;
        Ok(hc)
    }

    #[test]
    fn test_find_prev_reaches_front() -> Result<(), crate::HetError> {
        let hc = numbers()?;
        assert_eq!(find_prev(&hc, 1, |v: &i32| *v == 2), Some((0, &2)));
        assert_eq!(find_prev(&hc, 0, |_: &i32| true), None);
        Ok(())
    }

    #[test]
    fn test_find_next_from_last_position() -> Result<(), crate::HetError> {
        let hc = numbers()?;
        assert_eq!(find_next(&hc, 8, |_: &i32| true), None);
        assert_eq!(find_next(&hc, usize::MAX, |_: &i32| true), None);
        assert_eq!(find_next(&hc, 3, |v: &i32| *v == 1), Some((4, &1)));
        Ok(())
    }

    #[test]
    fn test_absent_type_finds_nothing() -> Result<(), crate::HetError> {
        let hc = numbers()?;
        assert_eq!(find_first(&hc, |_: &u64| true), None);
        assert_eq!(find_last(&hc, |_: &u64| true), None);
        let mut sink: Vec<u64> = Vec::new();
        assert!(!find_all(&hc, &mut sink, |_: &u64| true));
        Ok(())
    }

    #[test]
    fn test_clause_on_string_field() {
        let c = clause(|s: &(String, u8)| &s.0, "a");
        assert!(c.matches(&("a".to_string(), 1)));
        assert!(!c.any(&("b".to_string(), 1)));
    }
}
