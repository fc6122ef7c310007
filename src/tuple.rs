//! Tuple implementations that let the stores take lists of types and values.
//!
//! Rust has no variadic generics, so every operation that works on "several types at
//! once" is expressed as a trait implemented for tuples of arity 1 through 12 (1 through 8
//! for key-value pairs and query clauses).

use std::any::{type_name, Any, TypeId};

use crate::error::HetError;
use crate::keyvalue::MapKey;
use crate::query::Clauses;
use crate::sequence::SequenceKind;
use crate::visit::{Comparator, ElementSource, EntryVisitor, Visitor, VisitorReturn};
use crate::{HeteroContainer, HeteroKeyValue, HeteroValue};

/// A list of payload types, written as a tuple: `(i32, String, f64)`
pub trait TypeList: 'static {
    /// Number of types in the list
    const LEN: usize;

    fn type_ids() -> Vec<TypeId>;
    fn type_names() -> Vec<&'static str>;
}

/// Visits each type of the list with a visitor implementing [`Visitor`] for all of them
pub trait VisitTypes<S: ?Sized, V: ?Sized>: TypeList {
    fn visit_types(source: &S, visitor: &mut V) -> VisitorReturn;
}

/// Visits the `K -> T` map of each type `T` of the list
pub trait VisitEntryTypes<K, V: ?Sized>: TypeList {
    fn visit_entries(source: &HeteroKeyValue, visitor: &mut V) -> VisitorReturn;
}

/// Compares each type of the list across two value stores
pub trait EqualTypes<C: ?Sized>: TypeList {
    fn equal_types(left: &HeteroValue, right: &HeteroValue, comparator: &mut C) -> bool;
}

/// Borrowed views of a list of types pulled out of a store in one go.
///
/// Every element is looked up before anything is returned, so a missing one fails the
/// whole call with [`HetError::UnboundedValue`].
pub trait FetchTuple: TypeList {
    /// `(&T1, &T2, ..)`
    type Refs<'a>;

    fn from_values(source: &HeteroValue) -> Result<Self::Refs<'_>, HetError>;

    /// Repeated types take successive elements of their fraction
    fn from_elements<K: SequenceKind>(
        source: &HeteroContainer<K>,
    ) -> Result<Self::Refs<'_>, HetError>;

    fn from_entries<'a, K: MapKey>(
        source: &'a HeteroKeyValue,
        key: &K,
    ) -> Result<Self::Refs<'a>, HetError>;
}

/// A tuple of cloneable values added to a value store in order
pub trait ValueSet {
    fn add_to(self, target: &mut HeteroValue) -> Result<(), HetError>;
}

/// A tuple of cloneable values pushed to the back of a sequence store in order
pub trait SequenceSet {
    fn push_to<K: SequenceKind>(self, target: &mut HeteroContainer<K>) -> Result<(), HetError>;
}

/// A tuple of `(key, value)` pairs added to a key-value store in order
pub trait EntrySet {
    fn add_to(self, target: &mut HeteroKeyValue) -> Result<(), HetError>;
}

fn unbounded<T: Any>() -> HetError {
    HetError::UnboundedValue(type_name::<T>())
}

macro_rules! impl_type_lists {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(impl_type_lists!(@one $($name),+);)+
    };
    (@one $($name:ident),+) => {
        impl<$($name: 'static),+> TypeList for ($($name,)+) {
            const LEN: usize = [$(stringify!($name)),+].len();

            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$name>()),+]
            }
        }

        impl<Src, Vis, $($name: 'static),+> VisitTypes<Src, Vis> for ($($name,)+)
        where
            Src: ElementSource + ?Sized,
            Vis: ?Sized $(+ Visitor<$name>)+,
        {
            fn visit_types(source: &Src, visitor: &mut Vis) -> VisitorReturn {
                $(
                    if source.visit_type::<$name, Vis>(visitor).is_break() {
                        return VisitorReturn::Break;
                    }
                )+
                VisitorReturn::Continue
            }
        }

        impl<Key, Vis, $($name: 'static),+> VisitEntryTypes<Key, Vis> for ($($name,)+)
        where
            Key: MapKey,
            Vis: ?Sized $(+ EntryVisitor<Key, $name>)+,
        {
            fn visit_entries(source: &HeteroKeyValue, visitor: &mut Vis) -> VisitorReturn {
                $(
                    if source.visit_entries_of::<Key, $name, Vis>(visitor).is_break() {
                        return VisitorReturn::Break;
                    }
                )+
                VisitorReturn::Continue
            }
        }

        impl<Cmp, $($name: 'static),+> EqualTypes<Cmp> for ($($name,)+)
        where
            Cmp: ?Sized $(+ Comparator<$name>)+,
        {
            fn equal_types(left: &HeteroValue, right: &HeteroValue, comparator: &mut Cmp) -> bool {
                $(
                    let (Some(l), Some(r)) = (left.get::<$name>(), right.get::<$name>()) else {
                        return false;
                    };
                    if !Comparator::<$name>::compare(comparator, l, r) {
                        return false;
                    }
                )+
                true
            }
        }

        impl<$($name: 'static),+> FetchTuple for ($($name,)+) {
            type Refs<'a> = ($(&'a $name,)+);

            fn from_values(source: &HeteroValue) -> Result<Self::Refs<'_>, HetError> {
                Ok(($(source.get::<$name>().ok_or_else(unbounded::<$name>)?,)+))
            }

            fn from_elements<Kind: SequenceKind>(
                source: &HeteroContainer<Kind>,
            ) -> Result<Self::Refs<'_>, HetError> {
                // Each element takes the position after the earlier elements of its type
                let ids = [$(TypeId::of::<$name>()),+];
                let mut positions = ids.map(|_| 0usize);
                for (slot, id) in ids.iter().enumerate() {
                    positions[slot] = ids[..slot].iter().filter(|earlier| *earlier == id).count();
                }
                let mut positions = positions.into_iter();
                Ok(($(
                    source
                        .get::<$name>(positions.next().unwrap_or_default())
                        .ok_or_else(unbounded::<$name>)?,
                )+))
            }

            fn from_entries<'a, Key: MapKey>(
                source: &'a HeteroKeyValue,
                key: &Key,
            ) -> Result<Self::Refs<'a>, HetError> {
                Ok(($(source.get::<$name, Key>(key).ok_or_else(unbounded::<$name>)?,)+))
            }
        }

        impl<$($name: Clone + 'static),+> ValueSet for ($($name,)+) {
            #[allow(non_snake_case)]
            fn add_to(self, target: &mut HeteroValue) -> Result<(), HetError> {
                let ($($name,)+) = self;
                $(target.add($name)?;)+
                Ok(())
            }
        }

        impl<$($name: Clone + 'static),+> SequenceSet for ($($name,)+) {
            #[allow(non_snake_case)]
            fn push_to<Kind: SequenceKind>(
                self,
                target: &mut HeteroContainer<Kind>,
            ) -> Result<(), HetError> {
                let ($($name,)+) = self;
                $(target.push_back($name)?;)+
                Ok(())
            }
        }
    };
}

impl_type_lists!(
    (T1),
    (T1, T2),
    (T1, T2, T3),
    (T1, T2, T3, T4),
    (T1, T2, T3, T4, T5),
    (T1, T2, T3, T4, T5, T6),
    (T1, T2, T3, T4, T5, T6, T7),
    (T1, T2, T3, T4, T5, T6, T7, T8),
    (T1, T2, T3, T4, T5, T6, T7, T8, T9),
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10),
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11),
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12),
);

macro_rules! impl_entry_sets {
    ($(($(($key:ident, $value:ident)),+)),+ $(,)?) => {
        $(
            impl<$($key: MapKey, $value: Clone + 'static),+> EntrySet for ($(($key, $value),)+) {
                #[allow(non_snake_case)]
                fn add_to(self, target: &mut HeteroKeyValue) -> Result<(), HetError> {
                    let ($(($key, $value),)+) = self;
                    $(target.add($key, $value)?;)+
                    Ok(())
                }
            }
        )+
    };
}

impl_entry_sets!(
    ((K1, V1)),
    ((K1, V1), (K2, V2)),
    ((K1, V1), (K2, V2), (K3, V3)),
    ((K1, V1), (K2, V2), (K3, V3), (K4, V4)),
    ((K1, V1), (K2, V2), (K3, V3), (K4, V4), (K5, V5)),
    ((K1, V1), (K2, V2), (K3, V3), (K4, V4), (K5, V5), (K6, V6)),
    ((K1, V1), (K2, V2), (K3, V3), (K4, V4), (K5, V5), (K6, V6), (K7, V7)),
    ((K1, V1), (K2, V2), (K3, V3), (K4, V4), (K5, V5), (K6, V6), (K7, V7), (K8, V8)),
);

macro_rules! impl_clause_lists {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(
            impl<Item: ?Sized, $($name: Clauses<Item>),+> Clauses<Item> for ($($name,)+) {
                #[allow(non_snake_case)]
                fn all(&self, item: &Item) -> bool {
                    let ($($name,)+) = self;
                    $($name.all(item))&&+
                }

                #[allow(non_snake_case)]
                fn any(&self, item: &Item) -> bool {
                    let ($($name,)+) = self;
                    $($name.any(item))||+
                }
            }
        )+
    };
}

impl_clause_lists!(
    (C1),
    (C1, C2),
    (C1, C2, C3),
    (C1, C2, C3, C4),
    (C1, C2, C3, C4, C5),
    (C1, C2, C3, C4, C5, C6),
    (C1, C2, C3, C4, C5, C6, C7),
    (C1, C2, C3, C4, C5, C6, C7, C8),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_list_metadata() {
        assert_eq!(<(i32,) as TypeList>::LEN, 1);
        assert_eq!(<(i32, String, f64) as TypeList>::LEN, 3);
        assert_eq!(
            <(u8, char) as TypeList>::type_ids(),
            vec![TypeId::of::<u8>(), TypeId::of::<char>()]
        );
        assert_eq!(<(u8, char) as TypeList>::type_names(), vec!["u8", "char"]);
    }

    #[test]
    fn test_repeated_types_take_successive_elements() -> Result<(), HetError> {
        let mut hc = crate::HVec::new();
        hc.push_values((1i32, 2i32, 'a'))?;
        let (first, c, second) = <(i32, char, i32)>::from_elements(&hc)?;
        assert_eq!((*first, *c, *second), (1, 'a', 2));

        assert_eq!(
            <(i32, i32, i32)>::from_elements(&hc).err(),
            Some(HetError::UnboundedValue("i32"))
        );
        Ok(())
    }
}
