use std::any::{type_name, TypeId};
use std::fmt;

use crate::builder::{DropPolicy, HeteroValueBuilder};
use crate::error::HetError;
use crate::id::ContainerId;
use crate::matching::{Match, MatchTypes};
use crate::registry::TypeRegistry;
use crate::slot::{Copier, ScalarSlot};
use crate::tuple::{FetchTuple, TypeList, ValueSet};
use crate::visit::{ElementSource, Equal, Visit, Visitor, VisitorReturn};

/// A store holding at most one value of each type
///
/// `HeteroValue` maps each payload type to a single value. Storing a value of a type
/// already present replaces it. Values can be of any `'static` type; cloneable values are
/// stored with [`add`](Self::add) and can later be copied along with the store, move-only
/// values are stored with [`add_unique`](Self::add_unique).
///
/// # Examples
///
/// ```
/// use sovran_hetero::{HeteroValue, HetError};
///
/// # fn main() -> Result<(), HetError> {
/// let mut hv = HeteroValue::new();
///
/// hv.add(42i32)?;
/// hv.add(String::from("hello"))?;
///
/// assert_eq!(*hv.value::<i32>()?, 42);
/// assert_eq!(hv.value::<String>()?, "hello");
///
/// // Values of a type not stored are reported as errors
/// assert!(matches!(hv.value::<f64>(), Err(HetError::ValueNotFound(_))));
///
/// // Storing the same type again overwrites
/// hv.add(7i32)?;
/// assert_eq!(*hv.value::<i32>()?, 7);
/// assert_eq!(hv.arity(), 2);
/// # Ok(())
/// # }
/// ```
pub struct HeteroValue {
    registry: TypeRegistry<TypeId>,
}

impl HeteroValue {
    /// Creates a new, empty value store
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let hv = HeteroValue::new();
    /// assert!(hv.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::new_inner(0, DropPolicy::default())
    }

    /// Creates a builder for configuring a value store
    pub fn builder() -> HeteroValueBuilder {
        HeteroValueBuilder::new()
    }

    pub(crate) fn new_inner(type_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            registry: TypeRegistry::new(type_capacity, drop_policy),
        }
    }

    /// Creates a value store holding each element of the tuple
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let hv = HeteroValue::with_values((1u8, 'c', String::from("s")))?;
    /// assert_eq!(hv.arity(), 3);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn with_values<L: ValueSet>(values: L) -> Result<Self, HetError> {
        let mut hv = Self::new();
        values.add_to(&mut hv)?;
        Ok(hv)
    }

    /// Identity of this store, stable for its whole life
    pub fn id(&self) -> ContainerId {
        self.registry.id()
    }

    pub fn drop_policy(&self) -> DropPolicy {
        self.registry.drop_policy()
    }

    fn insert<T: 'static>(&mut self, value: T, copier: Copier<T>) -> Result<(), HetError> {
        let type_id = TypeId::of::<T>();
        if let Some(slot) = self.registry.get_mut::<ScalarSlot<T>>(&type_id) {
            slot.value = Some(value);
            if copier.is_some() {
                slot.copier = copier;
            }
            return Ok(());
        }
        self.registry
            .register(type_id, || Ok(ScalarSlot::new(value, copier)))?;
        Ok(())
    }

    /// Stores a value, replacing any value of the same type
    ///
    /// # Errors
    ///
    /// Returns `HetError::OutOfMemory` if the type table cannot grow.
    pub fn add<T: Clone + 'static>(&mut self, value: T) -> Result<(), HetError> {
        self.insert(value, Some(T::clone as fn(&T) -> T))
    }

    /// Stores a value that cannot be cloned.
    ///
    /// Stores holding move-only values can't be copied with [`try_clone`](Self::try_clone)
    /// or [`assign`](Self::assign); [`assign_from`](Self::assign_from) moves such values
    /// instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_hetero::{HeteroValue, HetError};
    ///
    /// struct Handle(u32);
    ///
    /// let mut hv = HeteroValue::new();
    /// hv.add_unique(Handle(3))?;
    /// assert_eq!(hv.value::<Handle>()?.0, 3);
    /// assert!(matches!(hv.try_clone(), Err(HetError::NotCloneable(_))));
    /// # Ok::<(), HetError>(())
    /// ```
    pub fn add_unique<T: 'static>(&mut self, value: T) -> Result<(), HetError> {
        self.insert(value, None)
    }

    /// Stores the value produced by `f`, replacing any value of the same type
    pub fn add_with<T, F>(&mut self, f: F) -> Result<(), HetError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        self.add(f())
    }

    /// Stores each element of the tuple
    pub fn add_values<L: ValueSet>(&mut self, values: L) -> Result<(), HetError> {
        values.add_to(self)
    }

    /// Replaces the whole content with the elements of the tuple
    pub fn assign_values<L: ValueSet>(&mut self, values: L) -> Result<(), HetError> {
        self.clear();
        values.add_to(self)
    }

    /// Retrieves a reference to the value of type `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no value of type `T` is stored.
    pub fn value<T: 'static>(&self) -> Result<&T, HetError> {
        self.get::<T>()
            .ok_or(HetError::ValueNotFound(type_name::<T>()))
    }

    /// Retrieves a mutable reference to the value of type `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no value of type `T` is stored.
    pub fn value_mut<T: 'static>(&mut self) -> Result<&mut T, HetError> {
        self.get_mut::<T>()
            .ok_or(HetError::ValueNotFound(type_name::<T>()))
    }

    /// The value of type `T`, if stored
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.registry
            .get::<ScalarSlot<T>>(&TypeId::of::<T>())?
            .value
            .as_ref()
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.registry
            .get_mut::<ScalarSlot<T>>(&TypeId::of::<T>())?
            .value
            .as_mut()
    }

    /// The value of type `T`, storing `default` first if none is present
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let mut hv = HeteroValue::new();
    /// *hv.value_or_add(0u32)? += 5;
    /// *hv.value_or_add(100u32)? += 5;
    /// assert_eq!(*hv.value::<u32>()?, 10);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn value_or_add<T: Clone + 'static>(&mut self, default: T) -> Result<&mut T, HetError> {
        if !self.contains::<T>() {
            self.add(default)?;
        }
        self.value_mut::<T>()
    }

    /// The value of type `T`, storing `T::default()` first if none is present
    pub fn value_or_default<T: Clone + Default + 'static>(&mut self) -> Result<&mut T, HetError> {
        if !self.contains::<T>() {
            self.add(T::default())?;
        }
        self.value_mut::<T>()
    }

    /// Calls `f` with a reference to the value of type `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no value of type `T` is stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let hv = HeteroValue::with_values((vec![1, 2, 3],))?;
    /// let total = hv.with(|v: &Vec<i32>| v.iter().sum::<i32>())?;
    /// assert_eq!(total, 6);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn with<T, F, R>(&self, f: F) -> Result<R, HetError>
    where
        T: 'static,
        F: FnOnce(&T) -> R,
    {
        self.value::<T>().map(f)
    }

    /// Calls `f` with a mutable reference to the value of type `T`
    ///
    /// # Errors
    ///
    /// Returns `HetError::ValueNotFound` if no value of type `T` is stored.
    pub fn with_mut<T, F, R>(&mut self, f: F) -> Result<R, HetError>
    where
        T: 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.value_mut::<T>().map(f)
    }

    /// Removes the value of type `T`. Returns whether one was stored.
    pub fn erase<T: 'static>(&mut self) -> bool {
        self.registry.remove(&TypeId::of::<T>()).is_some()
    }

    /// Removes the values of every listed type. Returns how many were stored.
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let mut hv = HeteroValue::with_values((1u8, 2u16, 3u32))?;
    /// assert_eq!(hv.erase_values::<(u8, u32, u64)>(), 2);
    /// assert_eq!(hv.arity(), 1);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn erase_values<L: TypeList>(&mut self) -> usize {
        L::type_ids()
            .iter()
            .filter(|type_id| self.registry.remove(type_id).is_some())
            .count()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.registry.contains(&TypeId::of::<T>())
    }

    /// Number of distinct types stored
    pub fn arity(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Names of the stored types, in the order they were first stored
    pub fn type_names(&self) -> Vec<&'static str> {
        self.registry.type_names()
    }

    /// Removes every value
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Binds a visit over the listed types.
    ///
    /// Types not stored are skipped. See [`Visitor`] for how to write visitors.
    ///
    /// ```
    /// use sovran_hetero::{HeteroValue, VisitorReturn};
    ///
    /// let hv = HeteroValue::with_values((5i32, 2.5f64))?;
    /// let mut seen = None;
    /// let flow = hv.visit::<(i32,)>().call(&mut |v: &i32| {
    ///     seen = Some(*v);
    ///     VisitorReturn::Continue
    /// });
    /// assert_eq!(flow, VisitorReturn::Continue);
    /// assert_eq!(seen, Some(5));
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
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

    /// Binds a comparison of the listed types between `self` and `other`
    ///
    /// ```
    /// use sovran_hetero::{Equality, HeteroValue};
    ///
    /// let a = HeteroValue::with_values((1i32, String::from("x"), 0.5f32))?;
    /// let b = HeteroValue::with_values((1i32, String::from("x"), 9.5f32))?;
    /// assert!(a.equal::<(i32, String)>(&b).call(&mut Equality));
    /// assert!(!a.equal::<(i32, f32)>(&b).call(&mut Equality));
    /// assert!(!a.equal::<(u8,)>(&b).call(&mut Equality));
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn equal<'s, L>(&'s self, other: &'s HeteroValue) -> Equal<'s, L> {
        Equal::new(self, other)
    }

    /// References to the values of all listed types
    ///
    /// # Errors
    ///
    /// Returns `HetError::UnboundedValue` naming the first missing type if any listed type
    /// is not stored.
    ///
    /// ```
    /// use sovran_hetero::HeteroValue;
    ///
    /// let hv = HeteroValue::with_values((1u8, 'z'))?;
    /// let (n, c) = hv.to_tuple::<(u8, char)>()?;
    /// assert_eq!((*n, *c), (1, 'z'));
    /// assert!(hv.to_tuple::<(u8, bool)>().is_err());
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn to_tuple<L: FetchTuple>(&self) -> Result<L::Refs<'_>, HetError> {
        L::from_values(self)
    }

    /// Creates an independent copy with a new identity
    ///
    /// # Errors
    ///
    /// Returns `HetError::NotCloneable` if any value was stored with
    /// [`add_unique`](Self::add_unique).
    pub fn try_clone(&self) -> Result<Self, HetError> {
        Ok(Self {
            registry: self.registry.try_clone()?,
        })
    }

    /// Replaces the content of `self` with a copy of `other`.
    ///
    /// On error `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `HetError::NotCloneable` if `other` holds a move-only value.
    pub fn assign(&mut self, other: &HeteroValue) -> Result<(), HetError> {
        let slots = other.registry.duplicate_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }

    /// Replaces the content of `self` with the content of `other`, copying cloneable
    /// values and moving move-only ones out of `other`.
    pub fn assign_from(&mut self, other: &mut HeteroValue) -> Result<(), HetError> {
        let slots = other.registry.absorb_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }
}

impl Default for HeteroValue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeteroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeteroValue")
            .field("id", &self.id())
            .field("types", &self.type_names())
            .finish()
    }
}

impl ElementSource for HeteroValue {
    fn visit_type<T, V>(&self, visitor: &mut V) -> VisitorReturn
    where
        T: 'static,
        V: Visitor<T> + ?Sized,
    {
        match self.get::<T>() {
            Some(value) => visitor.visit(value),
            None => VisitorReturn::Continue,
        }
    }
}
