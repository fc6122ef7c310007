//! Pattern dispatch over stored types.
//!
//! A [`Matcher`] collects [`Case`]s in order. Closing it with
//! [`otherwise`](Matcher::otherwise) yields a [`Match`], the only thing a store accepts, so
//! every match carries a catch-all by construction.
//!
//! For each stored type `S` the handler is selected once:
//!
//! 1. the first case whose exact type is `S`,
//! 2. else the first case declaring a conversion from `S` (see [`Case::from`]),
//! 3. else the catch-all.
//!
//! The selected handler then sees every element of `S`.

use std::any::{type_name, Any, TypeId};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use crate::slot::ErasedSlot;

type Conversion<T> = for<'v> fn(&'v dyn Any) -> Option<&'v T>;

fn convert<S, T>(value: &dyn Any) -> Option<&T>
where
    S: Borrow<T> + 'static,
    T: ?Sized,
{
    value.downcast_ref::<S>().map(Borrow::borrow)
}

/// One handler of a [`Matcher`], accepting values viewed as `T`.
///
/// `K` is the key type for key-value stores and `()` for the others.
///
/// # Examples
///
/// ```
/// use sovran_hetero::{Case, HVec, Matcher};
///
/// let mut hc = HVec::new();
/// hc.push_back(String::from("owned"))?;
/// hc.push_back("borrowed")?;
/// hc.push_back(7u64)?;
///
/// let mut texts = Vec::new();
/// let mut others = 0;
/// let mut m = Matcher::new()
///     .case(
///         Case::converting(|s: &str| texts.push(s.to_string()))
///             .from::<String>()
///             .from::<&'static str>(),
///     )
///     .otherwise(|_| others += 1);
///
/// assert!(hc.match_types::<(String, &'static str, u64)>().call(&mut m));
/// drop(m);
/// assert_eq!(texts, vec!["owned", "borrowed"]);
/// assert_eq!(others, 1);
/// # Ok::<(), sovran_hetero::HetError>(())
/// ```
pub struct Case<'a, T: ?Sized + 'static, K = ()> {
    exact: Option<TypeId>,
    conversions: Vec<(TypeId, Conversion<T>)>,
    handler: Box<dyn FnMut(&K, &T) + 'a>,
}

impl<'a, T: 'static> Case<'a, T, ()> {
    /// Handles values whose stored type is exactly `T`
    pub fn exact(mut handler: impl FnMut(&T) + 'a) -> Self {
        Self::exact_entry(move |_: &(), value: &T| handler(value))
    }
}

impl<'a, T: ?Sized + 'static> Case<'a, T, ()> {
    /// Handles values of the types later declared with [`from`](Case::from), viewed as `T`
    pub fn converting(mut handler: impl FnMut(&T) + 'a) -> Self {
        Self::converting_entry(move |_: &(), value: &T| handler(value))
    }
}

impl<'a, T: 'static, K> Case<'a, T, K> {
    /// Handles `(key, value)` entries whose stored value type is exactly `T`
    pub fn exact_entry(handler: impl FnMut(&K, &T) + 'a) -> Self {
        Self {
            exact: Some(TypeId::of::<T>()),
            conversions: vec![(TypeId::of::<T>(), convert::<T, T> as Conversion<T>)],
            handler: Box::new(handler),
        }
    }
}

impl<'a, T: ?Sized + 'static, K> Case<'a, T, K> {
    /// Handles `(key, value)` entries of the types later declared with
    /// [`from`](Case::from), viewed as `T`
    pub fn converting_entry(handler: impl FnMut(&K, &T) + 'a) -> Self {
        Self {
            exact: None,
            conversions: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Also accepts stored values of type `S`, viewed as `T` through [`Borrow`]
    #[must_use]
    pub fn from<S: Borrow<T> + 'static>(mut self) -> Self {
        let source = TypeId::of::<S>();
        if !self.conversions.iter().any(|(id, _)| *id == source) {
            self.conversions.push((source, convert::<S, T> as Conversion<T>));
        }
        self
    }
}

impl<T: ?Sized + 'static, K> fmt::Debug for Case<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("view", &type_name::<T>())
            .field("exact", &self.exact.is_some())
            .field("conversions", &self.conversions.len())
            .finish()
    }
}

/// A case with its view type erased
struct Arm<'a, K> {
    exact: Option<TypeId>,
    sources: Vec<TypeId>,
    handler: Box<dyn FnMut(TypeId, &K, &dyn Any) + 'a>,
}

impl<'a, K: 'a> Arm<'a, K> {
    fn new<T: ?Sized + 'static>(case: Case<'a, T, K>) -> Self {
        let Case {
            exact,
            conversions,
            mut handler,
        } = case;
        let sources = conversions.iter().map(|(id, _)| *id).collect();
        Self {
            exact,
            sources,
            handler: Box::new(move |stored: TypeId, key: &K, value: &dyn Any| {
                let view = conversions
                    .iter()
                    .find(|(id, _)| *id == stored)
                    .and_then(|(_, convert)| convert(value));
                if let Some(view) = view {
                    handler(key, view);
                }
            }),
        }
    }
}

/// An ordered list of cases still missing its catch-all.
///
/// Stores only accept a [`Match`], produced by [`otherwise`](Matcher::otherwise) or
/// [`otherwise_entry`](Matcher::otherwise_entry).
#[must_use = "a matcher must be closed with `otherwise` before use"]
pub struct Matcher<'a, K = ()> {
    arms: Vec<Arm<'a, K>>,
}

impl<'a> Matcher<'a, ()> {
    pub fn new() -> Self {
        Self { arms: Vec::new() }
    }

    /// Adds an exact case for `T`
    pub fn on<T: 'static>(self, handler: impl FnMut(&T) + 'a) -> Self {
        self.case(Case::exact(handler))
    }

    /// Closes the matcher with the handler for every type no case selects
    pub fn otherwise(self, mut handler: impl FnMut(&dyn Any) + 'a) -> Match<'a, ()> {
        self.otherwise_entry(move |_: &(), value: &dyn Any| handler(value))
    }
}

impl Default for Matcher<'_, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: 'static> Matcher<'a, K> {
    /// Starts a matcher over `(key, value)` entries keyed by `K`
    pub fn for_entries() -> Self {
        Self { arms: Vec::new() }
    }

    /// Appends `case`; earlier cases win ties
    pub fn case<T: ?Sized + 'static>(mut self, case: Case<'a, T, K>) -> Self {
        self.arms.push(Arm::new(case));
        self
    }

    /// Adds an exact entry case for `T`
    pub fn on_entry<T: 'static>(self, handler: impl FnMut(&K, &T) + 'a) -> Self {
        self.case(Case::exact_entry(handler))
    }

    /// Closes the matcher with the entry handler for every type no case selects
    pub fn otherwise_entry(self, handler: impl FnMut(&K, &dyn Any) + 'a) -> Match<'a, K> {
        Match {
            arms: self.arms,
            otherwise: Box::new(handler),
            _key: PhantomData,
        }
    }
}

/// A complete handler set: ordered cases plus a catch-all
pub struct Match<'a, K = ()> {
    arms: Vec<Arm<'a, K>>,
    otherwise: Box<dyn FnMut(&K, &dyn Any) + 'a>,
    _key: PhantomData<fn(&K)>,
}

impl<'a, K: 'static> Match<'a, K> {
    /// Index of the arm handling the stored type, `None` for the catch-all
    fn select(&self, stored: TypeId) -> Option<usize> {
        self.arms
            .iter()
            .position(|arm| arm.exact == Some(stored))
            .or_else(|| {
                self.arms
                    .iter()
                    .position(|arm| arm.sources.contains(&stored))
            })
    }

    /// Applies the selected handler to every element of a slot holding `stored` values
    pub(crate) fn dispatch(&mut self, stored: TypeId, slot: &dyn ErasedSlot) {
        let selected = self.select(stored);
        let arms = &mut self.arms;
        let otherwise = &mut self.otherwise;
        slot.for_each_erased(&mut |key: &dyn Any, value: &dyn Any| {
            let Some(key) = key.downcast_ref::<K>() else {
                return;
            };
            match selected.and_then(|index| arms.get_mut(index)) {
                Some(arm) => (arm.handler)(stored, key, value),
                None => otherwise(key, value),
            }
        });
    }
}

impl<K> fmt::Debug for Match<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("cases", &self.arms.len())
            .finish_non_exhaustive()
    }
}

/// A match bound to a store and a list of types, see
/// [`HeteroValue::match_types`](crate::HeteroValue::match_types)
#[must_use = "a match does nothing until `call` is invoked"]
pub struct MatchTypes<'s, K = ()> {
    slots: Vec<(TypeId, Option<&'s dyn ErasedSlot>)>,
    _key: PhantomData<fn(&K)>,
}

impl<'s, K: 'static> MatchTypes<'s, K> {
    pub(crate) fn new(slots: Vec<(TypeId, Option<&'s dyn ErasedSlot>)>) -> Self {
        Self {
            slots,
            _key: PhantomData,
        }
    }

    /// Dispatches every listed type that is present.
    ///
    /// Returns true only if all listed types are present. An absent type does not stop the
    /// remaining types from being dispatched.
    pub fn call(self, matcher: &mut Match<'_, K>) -> bool {
        let mut all_present = true;
        for (stored, slot) in self.slots {
            match slot {
                Some(slot) => matcher.dispatch(stored, slot),
                None => all_present = false,
            }
        }
        all_present
    }
}
