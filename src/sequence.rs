use std::collections::{vec_deque, TryReserveError, VecDeque};
use std::slice;

/// Ordered, index-addressable storage for the elements of one payload type.
///
/// This is the inner container of a [`HeteroContainer`](crate::HeteroContainer): each
/// stored type gets one `Sequence` (its "fraction"). Implemented for [`Vec`] and
/// [`VecDeque`].
pub trait Sequence<T: 'static>: Default + 'static {
    /// Front-to-back iterator over shared references
    type Iter<'a>: DoubleEndedIterator<Item = &'a T> + ExactSizeIterator
    where
        Self: 'a;

    /// Front-to-back iterator over mutable references
    type IterMut<'a>: DoubleEndedIterator<Item = &'a mut T> + ExactSizeIterator
    where
        Self: 'a;

    fn with_capacity(capacity: usize) -> Self;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn get(&self, index: usize) -> Option<&T>;
    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Inserts `value` before `index`. Callers guarantee `index <= len`.
    fn insert(&mut self, index: usize, value: T);
    fn remove(&mut self, index: usize) -> Option<T>;
    fn push_back(&mut self, value: T);
    fn push_front(&mut self, value: T);
    fn pop_back(&mut self) -> Option<T>;
    fn pop_front(&mut self) -> Option<T>;
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError>;
    fn iter(&self) -> Self::Iter<'_>;
    fn iter_mut(&mut self) -> Self::IterMut<'_>;
}

impl<T: 'static> Sequence<T> for Vec<T> {
    type Iter<'a> = slice::Iter<'a, T>;
    type IterMut<'a> = slice::IterMut<'a, T>;

    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        <[T]>::get_mut(self, index)
    }

    fn insert(&mut self, index: usize, value: T) {
        Vec::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }

    fn push_back(&mut self, value: T) {
        self.push(value);
    }

    fn push_front(&mut self, value: T) {
        Vec::insert(self, 0, value);
    }

    fn pop_back(&mut self) -> Option<T> {
        self.pop()
    }

    fn pop_front(&mut self) -> Option<T> {
        Sequence::remove(self, 0)
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        Vec::try_reserve(self, additional)
    }

    fn iter(&self) -> Self::Iter<'_> {
        <[T]>::iter(self)
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        <[T]>::iter_mut(self)
    }
}

impl<T: 'static> Sequence<T> for VecDeque<T> {
    type Iter<'a> = vec_deque::Iter<'a, T>;
    type IterMut<'a> = vec_deque::IterMut<'a, T>;

    fn with_capacity(capacity: usize) -> Self {
        VecDeque::with_capacity(capacity)
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        VecDeque::get_mut(self, index)
    }

    fn insert(&mut self, index: usize, value: T) {
        VecDeque::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        VecDeque::remove(self, index)
    }

    fn push_back(&mut self, value: T) {
        VecDeque::push_back(self, value);
    }

    fn push_front(&mut self, value: T) {
        VecDeque::push_front(self, value);
    }

    fn pop_back(&mut self) -> Option<T> {
        VecDeque::pop_back(self)
    }

    fn pop_front(&mut self) -> Option<T> {
        VecDeque::pop_front(self)
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        VecDeque::try_reserve(self, additional)
    }

    fn iter(&self) -> Self::Iter<'_> {
        VecDeque::iter(self)
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        VecDeque::iter_mut(self)
    }
}

/// Selects the [`Sequence`] used for every fraction of a container.
///
/// ```
/// use sovran_hetero::{HDeque, HVec};
///
/// let mut vectors = HVec::new();
/// vectors.push_back(1u8)?;
/// let mut deques = HDeque::new();
/// deques.push_front(1u8)?;
/// # Ok::<(), sovran_hetero::HetError>(())
/// ```
pub trait SequenceKind: 'static {
    /// The sequence holding elements of type `T`
    type Seq<T: 'static>: Sequence<T>;
}

/// Fractions backed by [`Vec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VecKind;

impl SequenceKind for VecKind {
    type Seq<T: 'static> = Vec<T>;
}

/// Fractions backed by [`VecDeque`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DequeKind;

impl SequenceKind for DequeKind {
    type Seq<T: 'static> = VecDeque<T>;
}
