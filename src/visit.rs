use std::any::Any;
use std::marker::PhantomData;

use crate::keyvalue::MapKey;
use crate::tuple::{EqualTypes, VisitEntryTypes, VisitTypes};
use crate::{HeteroKeyValue, HeteroValue};

/// Tells a visit whether to keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitorReturn {
    /// Stop the whole visit immediately
    Break,
    /// Proceed with the next element
    Continue,
}

impl VisitorReturn {
    pub fn is_break(self) -> bool {
        self == VisitorReturn::Break
    }
}

/// Something that can be shown elements of type `T`.
///
/// Closures `FnMut(&T) -> VisitorReturn` are visitors for their argument type. To visit
/// several types with one visitor, implement `Visitor<T>` for each `T` on a struct, or wrap
/// a type-erased closure in an [`ErasedVisitor`].
///
/// # Examples
///
/// ```
/// use sovran_hetero::{HVec, Visitor, VisitorReturn};
///
/// #[derive(Default)]
/// struct Summary {
///     numbers: i64,
///     text: String,
/// }
///
/// impl Visitor<i32> for Summary {
///     fn visit(&mut self, value: &i32) -> VisitorReturn {
///         self.numbers += i64::from(*value);
///         VisitorReturn::Continue
///     }
/// }
///
/// impl Visitor<String> for Summary {
///     fn visit(&mut self, value: &String) -> VisitorReturn {
///         self.text.push_str(value);
///         VisitorReturn::Continue
///     }
/// }
///
/// let mut hc = HVec::new();
/// hc.push_back(1i32)?;
/// hc.push_back(String::from("a"))?;
/// hc.push_back(2i32)?;
///
/// let mut summary = Summary::default();
/// hc.visit::<(i32, String)>().call(&mut summary);
/// assert_eq!(summary.numbers, 3);
/// assert_eq!(summary.text, "a");
/// # Ok::<(), sovran_hetero::HetError>(())
/// ```
pub trait Visitor<T: ?Sized> {
    fn visit(&mut self, value: &T) -> VisitorReturn;
}

impl<T: ?Sized, F> Visitor<T> for F
where
    F: FnMut(&T) -> VisitorReturn,
{
    fn visit(&mut self, value: &T) -> VisitorReturn {
        self(value)
    }
}

/// Visits elements of any type through `&dyn Any`
///
/// ```
/// use std::any::Any;
///
/// use sovran_hetero::{ErasedVisitor, HeteroValue, VisitorReturn};
///
/// let hv = HeteroValue::with_values((1u8, 'x'))?;
/// let mut seen = 0;
/// hv.visit::<(u8, char)>()
///     .call(&mut ErasedVisitor(|_: &dyn Any| {
///         seen += 1;
///         VisitorReturn::Continue
///     }));
/// assert_eq!(seen, 2);
/// # Ok::<(), sovran_hetero::HetError>(())
/// ```
pub struct ErasedVisitor<F>(pub F);

impl<T: Any, F> Visitor<T> for ErasedVisitor<F>
where
    F: FnMut(&dyn Any) -> VisitorReturn,
{
    fn visit(&mut self, value: &T) -> VisitorReturn {
        (self.0)(value)
    }
}

/// Something that can be shown `(key, value)` entries of a key-value store
pub trait EntryVisitor<K: ?Sized, T: ?Sized> {
    fn visit(&mut self, key: &K, value: &T) -> VisitorReturn;
}

impl<K: ?Sized, T: ?Sized, F> EntryVisitor<K, T> for F
where
    F: FnMut(&K, &T) -> VisitorReturn,
{
    fn visit(&mut self, key: &K, value: &T) -> VisitorReturn {
        self(key, value)
    }
}

/// Visits entries of any value type through `&dyn Any`
pub struct ErasedEntryVisitor<F>(pub F);

impl<K, T: Any, F> EntryVisitor<K, T> for ErasedEntryVisitor<F>
where
    F: FnMut(&K, &dyn Any) -> VisitorReturn,
{
    fn visit(&mut self, key: &K, value: &T) -> VisitorReturn {
        (self.0)(key, value)
    }
}

/// Decides whether two values of type `T` are equal for [`HeteroValue::equal`]
pub trait Comparator<T: ?Sized> {
    fn compare(&mut self, left: &T, right: &T) -> bool;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: FnMut(&T, &T) -> bool,
{
    fn compare(&mut self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// Compares with [`PartialEq`] for every type
#[derive(Debug, Clone, Copy, Default)]
pub struct Equality;

impl<T: PartialEq + ?Sized> Comparator<T> for Equality {
    fn compare(&mut self, left: &T, right: &T) -> bool {
        left == right
    }
}

/// A store whose elements can be visited one payload type at a time
pub trait ElementSource {
    /// Shows every stored `T` to `visitor` in storage order. Returns `Continue` when `T` is
    /// absent.
    fn visit_type<T, V>(&self, visitor: &mut V) -> VisitorReturn
    where
        T: 'static,
        V: Visitor<T> + ?Sized;
}

/// A visit bound to a store and a list of types, see [`HeteroValue::visit`]
#[must_use = "a visit does nothing until `call` is invoked"]
pub struct Visit<'s, S: ?Sized, L> {
    source: &'s S,
    _types: PhantomData<fn() -> L>,
}

impl<'s, S: ElementSource + ?Sized, L> Visit<'s, S, L> {
    pub(crate) fn new(source: &'s S) -> Self {
        Self {
            source,
            _types: PhantomData,
        }
    }

    /// Walks the listed types in order, and each type's elements in storage order.
    ///
    /// Returns `Break` as soon as the visitor breaks, `Continue` otherwise.
    pub fn call<V>(self, visitor: &mut V) -> VisitorReturn
    where
        V: ?Sized,
        L: VisitTypes<S, V>,
    {
        L::visit_types(self.source, visitor)
    }
}

/// A key-value visit bound to a store, a key type and a list of value types
#[must_use = "a visit does nothing until `call` is invoked"]
pub struct VisitEntries<'s, K, L> {
    source: &'s HeteroKeyValue,
    _types: PhantomData<fn(&K) -> L>,
}

impl<'s, K: MapKey, L> VisitEntries<'s, K, L> {
    pub(crate) fn new(source: &'s HeteroKeyValue) -> Self {
        Self {
            source,
            _types: PhantomData,
        }
    }

    /// Walks the maps `K -> T` for each listed `T` in order. Entries within one map come
    /// in no particular order.
    pub fn call<V>(self, visitor: &mut V) -> VisitorReturn
    where
        V: ?Sized,
        L: VisitEntryTypes<K, V>,
    {
        L::visit_entries(self.source, visitor)
    }
}

/// A comparison bound to two value stores and a list of types, see [`HeteroValue::equal`]
#[must_use = "a comparison does nothing until `call` is invoked"]
pub struct Equal<'s, L> {
    left: &'s HeteroValue,
    right: &'s HeteroValue,
    _types: PhantomData<fn() -> L>,
}

impl<'s, L> Equal<'s, L> {
    pub(crate) fn new(left: &'s HeteroValue, right: &'s HeteroValue) -> Self {
        Self {
            left,
            right,
            _types: PhantomData,
        }
    }

    /// True when every listed type is present on both sides and `comparator` accepts each
    /// pair
    pub fn call<C>(self, comparator: &mut C) -> bool
    where
        C: ?Sized,
        L: EqualTypes<C>,
    {
        L::equal_types(self.left, self.right, comparator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_visitor() {
        let mut total = 0;
        let mut visitor = |v: &i32| {
            total += *v;
            if total > 3 {
                VisitorReturn::Break
            } else {
                VisitorReturn::Continue
            }
        };
        assert_eq!(Visitor::visit(&mut visitor, &2), VisitorReturn::Continue);
        assert!(Visitor::visit(&mut visitor, &2).is_break());
        assert_eq!(total, 4);
    }

    #[test]
    fn test_erased_visitor_accepts_any_type() {
        let mut names = Vec::new();
        let mut visitor = ErasedVisitor(|v: &dyn Any| {
            names.push(v.is::<u8>());
            VisitorReturn::Continue
        });
        Visitor::<u8>::visit(&mut visitor, &1);
        Visitor::<char>::visit(&mut visitor, &'a');
        assert_eq!(names, vec![true, false]);
    }

    #[test]
    fn test_equality_comparator() {
        let mut eq = Equality;
        assert!(Comparator::<str>::compare(&mut eq, "a", "a"));
        assert!(!Comparator::<i32>::compare(&mut eq, &1, &2));

        let mut loose = |a: &f64, b: &f64| (a - b).abs() < 0.5;
        assert!(Comparator::compare(&mut loose, &1.0, &1.2));
    }
}
