use std::marker::PhantomData;

use crate::sequence::SequenceKind;
use crate::{HeteroContainer, HeteroKeyValue, HeteroValue};

/// Determines item dropping behavior when a container is dropped.
///
/// By default, a container drops its items when it is dropped.
///
/// # Examples
///
/// ```
/// use sovran_hetero::{DropPolicy, HeteroValue};
///
/// // The drop policy is set at container creation time.
/// let mut hv = HeteroValue::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// hv.add(42i32)?;
/// // Dropping `hv` now would panic, so empty it first.
/// hv.clear();
/// # Ok::<(), sovran_hetero::HetError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The container drops its items when it is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The container panics if it still holds items when it is dropped.
    ///
    /// Useful when items carry obligations that must be discharged explicitly (for example
    /// handles that must be closed) and silently dropping them would be a bug.
    MustNotDropItems,
}

/// Builder for creating an instance of [`HeteroValue`].
///
/// # Examples
///
/// ```
/// use sovran_hetero::HeteroValue;
///
/// let hv = HeteroValue::builder().type_capacity(8).build();
/// assert!(hv.is_empty());
/// ```
#[derive(Debug)]
#[must_use]
pub struct HeteroValueBuilder {
    type_capacity: usize,
    drop_policy: DropPolicy,
}

impl HeteroValueBuilder {
    pub(crate) fn new() -> Self {
        Self {
            type_capacity: 0,
            drop_policy: DropPolicy::default(),
        }
    }

    /// Pre-sizes the type table for `capacity` distinct types
    pub fn type_capacity(mut self, capacity: usize) -> Self {
        self.type_capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the container
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the value store with the specified configuration
    #[must_use]
    pub fn build(self) -> HeteroValue {
        HeteroValue::new_inner(self.type_capacity, self.drop_policy)
    }
}

/// Builder for creating an instance of [`HeteroContainer`].
///
/// # Examples
///
/// ```
/// use sovran_hetero::{HDeque, HVec};
///
/// let vectors = HVec::builder().fraction_capacity(64).build();
/// let deques = HDeque::builder().type_capacity(4).build();
/// assert!(vectors.is_empty() && deques.is_empty());
/// ```
#[derive(Debug)]
#[must_use]
pub struct HeteroContainerBuilder<K> {
    type_capacity: usize,
    fraction_capacity: usize,
    drop_policy: DropPolicy,
    _kind: PhantomData<K>,
}

impl<K: SequenceKind> HeteroContainerBuilder<K> {
    pub(crate) fn new() -> Self {
        Self {
            type_capacity: 0,
            fraction_capacity: 0,
            drop_policy: DropPolicy::default(),
            _kind: PhantomData,
        }
    }

    /// Pre-sizes the type table for `capacity` distinct types
    pub fn type_capacity(mut self, capacity: usize) -> Self {
        self.type_capacity = capacity;
        self
    }

    /// Initial capacity of the sequence created for each newly stored type
    pub fn fraction_capacity(mut self, capacity: usize) -> Self {
        self.fraction_capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the container
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the sequence store with the specified configuration
    #[must_use]
    pub fn build(self) -> HeteroContainer<K> {
        HeteroContainer::new_inner(self.type_capacity, self.fraction_capacity, self.drop_policy)
    }
}

/// Builder for creating an instance of [`HeteroKeyValue`].
#[derive(Debug)]
#[must_use]
pub struct HeteroKeyValueBuilder {
    type_capacity: usize,
    drop_policy: DropPolicy,
}

impl HeteroKeyValueBuilder {
    pub(crate) fn new() -> Self {
        Self {
            type_capacity: 0,
            drop_policy: DropPolicy::default(),
        }
    }

    /// Pre-sizes the table for `capacity` distinct (key, value) type pairs
    pub fn type_capacity(mut self, capacity: usize) -> Self {
        self.type_capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the container
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the key-value store with the specified configuration
    #[must_use]
    pub fn build(self) -> HeteroKeyValue {
        HeteroKeyValue::new_inner(self.type_capacity, self.drop_policy)
    }
}
