use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;

use crate::builder::{DropPolicy, HeteroContainerBuilder};
use crate::error::HetError;
use crate::id::ContainerId;
use crate::matching::{Match, MatchTypes};
use crate::query::Clauses;
use crate::registry::TypeRegistry;
use crate::sequence::{DequeKind, Sequence, SequenceKind, VecKind};
use crate::slot::{Copier, SequenceSlot};
use crate::tuple::{FetchTuple, SequenceSet, TypeList};
use crate::visit::{ElementSource, Visit, Visitor, VisitorReturn};

/// A heterogeneous container backed by one [`Vec`] per stored type
pub type HVec = HeteroContainer<VecKind>;

/// A heterogeneous container backed by one [`VecDeque`](std::collections::VecDeque) per
/// stored type
pub type HDeque = HeteroContainer<DequeKind>;

/// A store holding an ordered run of values for each type
///
/// Each payload type gets its own sequence (its "fraction"). Positions are per type: the
/// first `String` is at position 0 no matter how many `i32`s were pushed before it.
/// The sequence kind `K` selects the per-type sequence, see [`HVec`] and [`HDeque`].
///
/// # Examples
///
/// ```
/// use sovran_hetero::{HVec, HetError};
///
/// # fn main() -> Result<(), HetError> {
/// let mut hc = HVec::new();
/// hc.push_back(1i32)?;
/// hc.push_back(String::from("one"))?;
/// assert_eq!(hc.push_back(2i32)?, 1);
///
/// assert_eq!(hc.count_of::<i32>(), 2);
/// assert_eq!(hc.at::<String>(0)?, "one");
/// assert_eq!(hc.size()?, 3);
///
/// let doubled: Vec<i32> = hc.iter::<i32>().map(|v| v * 2).collect();
/// assert_eq!(doubled, vec![2, 4]);
/// # Ok(())
/// # }
/// ```
pub struct HeteroContainer<K: SequenceKind = VecKind> {
    registry: TypeRegistry<TypeId>,
    fraction_capacity: usize,
    _kind: PhantomData<K>,
}

type Fraction<K, T> = SequenceSlot<<K as SequenceKind>::Seq<T>, T>;

impl<K: SequenceKind> HeteroContainer<K> {
    pub fn new() -> Self {
        Self::new_inner(0, 0, DropPolicy::default())
    }

    /// Creates a builder for configuring a sequence store
    pub fn builder() -> HeteroContainerBuilder<K> {
        HeteroContainerBuilder::new()
    }

    pub(crate) fn new_inner(
        type_capacity: usize,
        fraction_capacity: usize,
        drop_policy: DropPolicy,
    ) -> Self {
        Self {
            registry: TypeRegistry::new(type_capacity, drop_policy),
            fraction_capacity,
            _kind: PhantomData,
        }
    }

    /// Creates a container with each element of the tuple pushed to the back, in order
    pub fn with_values<L: SequenceSet>(values: L) -> Result<Self, HetError> {
        let mut hc = Self::new();
        values.push_to(&mut hc)?;
        Ok(hc)
    }

    pub fn id(&self) -> ContainerId {
        self.registry.id()
    }

    pub fn drop_policy(&self) -> DropPolicy {
        self.registry.drop_policy()
    }

    fn slot<T: 'static>(&self) -> Option<&Fraction<K, T>> {
        self.registry.get::<Fraction<K, T>>(&TypeId::of::<T>())
    }

    fn slot_mut<T: 'static>(&mut self) -> Option<&mut Fraction<K, T>> {
        self.registry.get_mut::<Fraction<K, T>>(&TypeId::of::<T>())
    }

    /// The fraction for `T`, registered on first use, with room for one more element
    fn slot_for_insert<T: 'static>(
        &mut self,
        copier: Copier<T>,
    ) -> Result<&mut Fraction<K, T>, HetError> {
        let capacity = self.fraction_capacity;
        let slot = self
            .registry
            .register(TypeId::of::<T>(), || Fraction::<K, T>::try_new(capacity, copier))?;
        slot.items.try_reserve(1)?;
        if copier.is_some() {
            slot.copier = copier;
        }
        Ok(slot)
    }

    fn push_back_inner<T: 'static>(&mut self, value: T, copier: Copier<T>) -> Result<usize, HetError> {
        let slot = self.slot_for_insert(copier)?;
        slot.items.push_back(value);
        Ok(slot.items.len() - 1)
    }

    fn push_front_inner<T: 'static>(&mut self, value: T, copier: Copier<T>) -> Result<usize, HetError> {
        let slot = self.slot_for_insert(copier)?;
        slot.items.push_front(value);
        Ok(0)
    }

    fn out_of_range<T: 'static>(&self, index: usize) -> HetError {
        HetError::IndexOutOfRange {
            type_name: type_name::<T>(),
            index,
            len: self.count_of::<T>(),
        }
    }

    /// Appends `value` to the fraction of its type. Returns its position in that fraction.
    ///
    /// # Errors
    ///
    /// Returns `HetError::OutOfMemory` if the fraction cannot grow.
    pub fn push_back<T: Clone + 'static>(&mut self, value: T) -> Result<usize, HetError> {
        self.push_back_inner(value, Some(T::clone as fn(&T) -> T))
    }

    /// Prepends `value` to the fraction of its type. Returns its position, always 0.
    pub fn push_front<T: Clone + 'static>(&mut self, value: T) -> Result<usize, HetError> {
        self.push_front_inner(value, Some(T::clone as fn(&T) -> T))
    }

    /// Appends a value that cannot be cloned
    pub fn push_back_unique<T: 'static>(&mut self, value: T) -> Result<usize, HetError> {
        self.push_back_inner(value, None)
    }

    /// Prepends a value that cannot be cloned
    pub fn push_front_unique<T: 'static>(&mut self, value: T) -> Result<usize, HetError> {
        self.push_front_inner(value, None)
    }

    /// Appends each element of the tuple, in order
    ///
    /// ```
    /// use sovran_hetero::HVec;
    ///
    /// let mut hc = HVec::new();
    /// hc.push_values((1u8, 'a', 2u8))?;
    /// assert_eq!(hc.fraction::<u8>()?, &vec![1, 2]);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn push_values<L: SequenceSet>(&mut self, values: L) -> Result<(), HetError> {
        values.push_to(self)
    }

    /// Inserts `value` before position `index` of its fraction. Returns `index`.
    ///
    /// # Errors
    ///
    /// Returns `HetError::IndexOutOfRange` if `index` is greater than the fraction length.
    pub fn insert<T: Clone + 'static>(&mut self, index: usize, value: T) -> Result<usize, HetError> {
        if index > self.count_of::<T>() {
            return Err(self.out_of_range::<T>(index));
        }
        let slot = self.slot_for_insert(Some(T::clone as fn(&T) -> T))?;
        slot.items.insert(index, value);
        Ok(index)
    }

    /// Inserts the value built by `f` before position `index` and returns it
    ///
    /// # Errors
    ///
    /// Returns `HetError::IndexOutOfRange` if `index` is greater than the fraction length.
    /// `f` is not called in that case.
    pub fn emplace<T, F>(&mut self, index: usize, f: F) -> Result<&mut T, HetError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        if index > self.count_of::<T>() {
            return Err(self.out_of_range::<T>(index));
        }
        let slot = self.slot_for_insert(Some(T::clone as fn(&T) -> T))?;
        slot.items.insert(index, f());
        let len = slot.items.len();
        slot.items.get_mut(index).ok_or(HetError::IndexOutOfRange {
            type_name: type_name::<T>(),
            index,
            len,
        })
    }

    /// Appends the value built by `f` and returns it
    ///
    /// ```
    /// use sovran_hetero::HDeque;
    ///
    /// let mut hd = HDeque::new();
    /// hd.emplace_back(|| String::from("tail"))?.push('!');
    /// hd.emplace_front(|| String::from("head"))?;
    /// assert_eq!(hd.iter::<String>().cloned().collect::<Vec<_>>(), ["head", "tail!"]);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn emplace_back<T, F>(&mut self, f: F) -> Result<&mut T, HetError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let index = self.count_of::<T>();
        self.emplace(index, f)
    }

    /// Prepends the value built by `f` and returns it
    pub fn emplace_front<T, F>(&mut self, f: F) -> Result<&mut T, HetError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        self.emplace(0, f)
    }

    /// The element at `index` of the fraction of `T`
    ///
    /// # Errors
    ///
    /// - Returns `HetError::ValueNotFound` if no `T` was ever stored
    /// - Returns `HetError::IndexOutOfRange` if `index` is past the end of the fraction
    pub fn at<T: 'static>(&self, index: usize) -> Result<&T, HetError> {
        self.fraction::<T>()?
            .get(index)
            .ok_or_else(|| self.out_of_range::<T>(index))
    }

    /// Mutable access to the element at `index` of the fraction of `T`
    ///
    /// # Errors
    ///
    /// Same as [`at`](Self::at).
    pub fn at_mut<T: 'static>(&mut self, index: usize) -> Result<&mut T, HetError> {
        if !self.contains::<T>() {
            return Err(HetError::ValueNotFound(type_name::<T>()));
        }
        if index >= self.count_of::<T>() {
            return Err(self.out_of_range::<T>(index));
        }
        self.get_mut::<T>(index)
            .ok_or(HetError::ValueNotFound(type_name::<T>()))
    }

    /// The element at `index` of the fraction of `T`, if any
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.slot::<T>()?.items.get(index)
    }

    pub fn get_mut<T: 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.slot_mut::<T>()?.items.get_mut(index)
    }

    /// The whole fraction of `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no `T` was ever stored.
    pub fn fraction<T: 'static>(&self) -> Result<&K::Seq<T>, HetError> {
        self.slot::<T>()
            .map(|slot| &slot.items)
            .ok_or(HetError::ValueNotFound(type_name::<T>()))
    }

    /// Mutable access to the whole fraction of `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no `T` was ever stored.
    pub fn fraction_mut<T: 'static>(&mut self) -> Result<&mut K::Seq<T>, HetError> {
        self.slot_mut::<T>()
            .map(|slot| &mut slot.items)
            .ok_or(HetError::ValueNotFound(type_name::<T>()))
    }

    /// Iterates the fraction of `T` front to back. Empty if no `T` is stored.
    pub fn iter<T: 'static>(
        &self,
    ) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        MaybeIter(self.slot::<T>().map(|slot| slot.items.iter()))
    }

    /// Number of stored `T`
    pub fn count_of<T: 'static>(&self) -> usize {
        self.slot::<T>().map_or(0, |slot| slot.items.len())
    }

    /// Whether `T` has a fraction, even an empty one
    pub fn contains<T: 'static>(&self) -> bool {
        self.registry.contains(&TypeId::of::<T>())
    }

    /// Whether some stored `T` satisfies at least one of the clauses
    ///
    /// ```
    /// use sovran_hetero::query::clause;
    /// use sovran_hetero::HVec;
    ///
    /// let mut hc = HVec::new();
    /// hc.push_back((String::from("k"), 1u8))?;
    /// let by_name = clause(|e: &(String, u8)| &e.0, "nope");
    /// let by_num = clause(|e: &(String, u8)| &e.1, 1u8);
    /// assert!(hc.contains_any((by_name, by_num)));
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn contains_any<T, C>(&self, clauses: C) -> bool
    where
        T: 'static,
        C: Clauses<T>,
    {
        self.iter::<T>().any(|item| clauses.any(item))
    }

    /// Removes and returns the element at `index` of the fraction of `T`
    ///
    /// # Errors
    ///
    /// - Returns `HetError::ValueNotFound` if no `T` was ever stored
    /// - Returns `HetError::IndexOutOfRange` if `index` is past the end of the fraction
    pub fn erase<T: 'static>(&mut self, index: usize) -> Result<T, HetError> {
        let len = self.count_of::<T>();
        self.fraction_mut::<T>()?
            .remove(index)
            .ok_or(HetError::IndexOutOfRange {
                type_name: type_name::<T>(),
                index,
                len,
            })
    }

    /// Removes the first element equal to `value`. Returns whether one was found.
    pub fn erase_value<T: PartialEq + 'static>(&mut self, value: &T) -> bool {
        let Some(index) = self.iter::<T>().position(|item| item == value) else {
            return false;
        };
        self.slot_mut::<T>()
            .and_then(|slot| slot.items.remove(index))
            .is_some()
    }

    pub fn pop_front<T: 'static>(&mut self) -> Option<T> {
        self.slot_mut::<T>()?.items.pop_front()
    }

    pub fn pop_back<T: 'static>(&mut self) -> Option<T> {
        self.slot_mut::<T>()?.items.pop_back()
    }

    /// Drops the fraction of `T` and unregisters the type. Returns whether it existed.
    pub fn erase_fraction<T: 'static>(&mut self) -> bool {
        self.registry.remove(&TypeId::of::<T>()).is_some()
    }

    /// Total number of elements over all types
    ///
    /// # Errors
    ///
    /// Returns `HetError::Overflow` if the sum does not fit in `usize`.
    pub fn size(&self) -> Result<usize, HetError> {
        self.registry.total_len()
    }

    /// True when no type holds any element
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.registry.type_names()
    }

    /// Removes every element and unregisters every type
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Binds a visit over the listed types, see [`Visitor`]
    pub fn visit<L>(&self) -> Visit<'_, Self, L> {
        Visit::new(self)
    }

    /// Binds a match over the listed types, see [`Matcher`](crate::Matcher)
    pub fn match_types<L: TypeList>(&self) -> MatchTypes<'_> {
        MatchTypes::new(
            L::type_ids()
                .into_iter()
                .map(|type_id| (type_id, self.registry.get_erased(&type_id)))
                .collect(),
        )
    }

    /// Dispatches every stored type, in the order they were first stored
    pub fn match_each(&self, matcher: &mut Match<'_>) {
        for (type_id, slot) in self.registry.iter() {
            matcher.dispatch(*type_id, slot);
        }
    }

    /// References to one element per listed type.
    ///
    /// A type listed several times takes successive elements of its fraction.
    ///
    /// # Errors
    ///
    /// Returns `HetError::UnboundedValue` if the fractions are too short.
    ///
    /// ```
    /// use sovran_hetero::HVec;
    ///
    /// let hc = HVec::with_values((1i32, 'a', 2i32))?;
    /// let (x, c, y) = hc.to_tuple::<(i32, char, i32)>()?;
    /// assert_eq!((*x, *c, *y), (1, 'a', 2));
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn to_tuple<L: FetchTuple>(&self) -> Result<L::Refs<'_>, HetError> {
        L::from_elements(self)
    }

    /// Creates an independent copy with a new identity
    ///
    /// # Errors
    ///
    /// Returns `HetError::NotCloneable` if any element was stored with a `*_unique` method.
    pub fn try_clone(&self) -> Result<Self, HetError> {
        Ok(Self {
            registry: self.registry.try_clone()?,
            fraction_capacity: self.fraction_capacity,
            _kind: PhantomData,
        })
    }

    /// Replaces the content of `self` with a copy of `other`. On error `self` is left
    /// unchanged.
    pub fn assign(&mut self, other: &Self) -> Result<(), HetError> {
        let slots = other.registry.duplicate_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }

    /// Replaces the content of `self` with the content of `other`, copying cloneable
    /// fractions and moving move-only fractions out of `other`
    pub fn assign_from(&mut self, other: &mut Self) -> Result<(), HetError> {
        let slots = other.registry.absorb_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }
}

impl<K: SequenceKind> Default for HeteroContainer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SequenceKind> fmt::Debug for HeteroContainer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeteroContainer")
            .field("id", &self.id())
            .field("types", &self.type_names())
            .field("size", &self.size().ok())
            .finish()
    }
}

impl<K: SequenceKind> ElementSource for HeteroContainer<K> {
    fn visit_type<T, V>(&self, visitor: &mut V) -> VisitorReturn
    where
        T: 'static,
        V: Visitor<T> + ?Sized,
    {
        for item in self.iter::<T>() {
            if visitor.visit(item).is_break() {
                return VisitorReturn::Break;
            }
        }
        VisitorReturn::Continue
    }
}

/// An iterator that may have nothing to iterate
struct MaybeIter<I>(Option<I>);

impl<I: Iterator> Iterator for MaybeIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.as_ref().map_or((0, Some(0)), Iterator::size_hint)
    }
}

impl<I: DoubleEndedIterator> DoubleEndedIterator for MaybeIter<I> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.as_mut()?.next_back()
    }
}

impl<I: ExactSizeIterator> ExactSizeIterator for MaybeIter<I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::SaturatedSlot;

    #[test]
    fn test_size_reports_overflow() -> Result<(), HetError> {
        let mut hc = HVec::new();
        hc.push_back(1u8)?;
        hc.registry.register(TypeId::of::<u16>(), || Ok(SaturatedSlot))?;
        assert_eq!(hc.size(), Err(HetError::Overflow));
        assert_eq!(hc.size().unwrap_err().category(), crate::ErrorCategory::System);
        assert!(!hc.is_empty());
        Ok(())
    }

    #[test]
    fn test_positions_are_per_type() -> Result<(), HetError> {
        let mut hc = HVec::new();
        assert_eq!(hc.push_back(1i32)?, 0);
        assert_eq!(hc.push_back('a')?, 0);
        assert_eq!(hc.push_back(2i32)?, 1);
        assert_eq!(hc.push_front(0i32)?, 0);
        assert_eq!(hc.fraction::<i32>()?, &vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_insert_bounds() -> Result<(), HetError> {
        let mut hd = HDeque::new();
        assert_eq!(hd.insert(0, 'b')?, 0);
        assert_eq!(hd.insert(1, 'c')?, 1);
        assert_eq!(hd.insert(0, 'a')?, 0);
        assert_eq!(
            hd.insert(5, 'z'),
            Err(HetError::IndexOutOfRange {
                type_name: "char",
                index: 5,
                len: 3
            })
        );
        assert!(hd.insert(1, 1u8).is_err());
        assert!(!hd.contains::<u8>());
        assert_eq!(hd.iter::<char>().collect::<String>(), "abc");
        Ok(())
    }

    #[test]
    fn test_emplace_does_not_call_builder_when_out_of_range() {
        let mut hc = HVec::new();
        let mut called = false;
        let result = hc.emplace(3, || {
            called = true;
            0u16
        });
        assert!(result.is_err());
        assert!(!called);
    }

    #[test]
    fn test_at_errors() -> Result<(), HetError> {
        let mut hc = HVec::new();
        assert_eq!(hc.at::<u8>(0), Err(HetError::ValueNotFound("u8")));
        hc.push_back(1u8)?;
        assert!(matches!(
            hc.at::<u8>(1),
            Err(HetError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
        *hc.at_mut::<u8>(0)? = 9;
        assert_eq!(*hc.at::<u8>(0)?, 9);
        Ok(())
    }

    #[test]
    fn test_iter_over_absent_type_is_empty() {
        let hc = HDeque::new();
        let mut it = hc.iter::<String>();
        assert_eq!(it.len(), 0);
        assert!(it.next().is_none());
        assert!(it.next_back().is_none());
    }

    #[test]
    fn test_unique_elements_move_on_assign_from() -> Result<(), HetError> {
        let mut source = HVec::new();
        source.push_back_unique(Box::new(1u8))?;
        source.push_back(5i64)?;

        let mut target = HVec::new();
        target.push_back('x')?;
        target.assign_from(&mut source)?;

        assert_eq!(target.type_names().len(), 2);
        assert_eq!(**target.at::<Box<u8>>(0)?, 1);
        assert!(!target.contains::<char>());
        assert!(!source.contains::<Box<u8>>());
        assert_eq!(source.count_of::<i64>(), 1);
        Ok(())
    }
}
