//! # sovran-hetero
//!
//! Heterogeneous containers indexed by type.
//!
//! `sovran-hetero` stores values of many unrelated types in one logical collection,
//! without a shared base trait and without a per-element type tag. Values are retrieved,
//! iterated, searched and dispatched by their static type.
//!
//! ## Key Features
//!
//! - **Three stores**: [`HeteroValue`] (one value per type), [`HeteroContainer`] (an
//!   ordered run of values per type, as [`HVec`] or [`HDeque`]) and [`HeteroKeyValue`]
//!   (a key-to-value map per key type and value type)
//! - **Independent instances**: each store owns its type table; nothing is shared
//!   between instances
//! - **Dispatch**: visit several types with one [`Visitor`], pattern match with a
//!   [`Matcher`], compare value stores type by type with [`Equality`] or any closure
//! - **Search**: [`query`] holds positional searches and projection clauses over
//!   sequence stores
//! - **Copy control**: cloneable values copy with the store, move-only values are stored
//!   with the `*_unique` methods and move instead
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_hetero::{HeteroValue, HetError};
//!
//! fn main() -> Result<(), HetError> {
//!     let mut settings = HeteroValue::new();
//!
//!     // Store values of different types
//!     settings.add(8080u16)?;
//!     settings.add(String::from("localhost"))?;
//!     settings.add(vec!["gzip", "br"])?;
//!
//!     // Retrieve values in a type-safe way
//!     let port = settings.value::<u16>()?;
//!     let host = settings.value::<String>()?;
//!     println!("Listening on {}:{}", host, port);
//!
//!     // Handle errors properly
//!     match settings.value::<bool>() {
//!         Ok(flag) => println!("Flag: {}", flag),
//!         Err(HetError::ValueNotFound(name)) => println!("No {} configured", name),
//!         Err(e) => println!("Other error: {}", e),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Sequences Per Type
//!
//! ```rust
//! use sovran_hetero::{HVec, HetError};
//!
//! fn main() -> Result<(), HetError> {
//!     let mut events = HVec::new();
//!     events.push_back(String::from("started"))?;
//!     events.push_back(200u16)?;
//!     events.push_back(String::from("stopped"))?;
//!
//!     // Each type keeps its own order
//!     let messages: Vec<&String> = events.iter::<String>().collect();
//!     assert_eq!(messages, ["started", "stopped"]);
//!     assert_eq!(events.size()?, 3);
//!
//!     // Remove by position within the type
//!     assert_eq!(events.erase::<String>(0)?, "started");
//!     Ok(())
//! }
//! ```
//!
//! ### Pattern Matching
//!
//! ```rust
//! use sovran_hetero::{Case, HVec, HetError, Matcher};
//!
//! fn main() -> Result<(), HetError> {
//!     let hc = HVec::with_values((1i32, String::from("text"), 2.5f64))?;
//!
//!     let mut ints = Vec::new();
//!     let mut texts = Vec::new();
//!     let mut others = 0;
//!     let mut m = Matcher::new()
//!         .on::<i32>(|v| ints.push(*v))
//!         .case(Case::converting(|s: &str| texts.push(s.to_string())).from::<String>())
//!         .otherwise(|_| others += 1);
//!
//!     // true: every listed type is stored
//!     assert!(hc.match_types::<(i32, String, f64)>().call(&mut m));
//!     drop(m);
//!     assert_eq!(ints, [1]);
//!     assert_eq!(texts, ["text"]);
//!     assert_eq!(others, 1);
//!     Ok(())
//! }
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_hetero::{ErrorCategory, HVec, HetError};
//!
//! let mut hc = HVec::new();
//! if let Err(e) = hc.push_back(1u8) {
//!     eprintln!("Failed to store: {}", e);
//!     return;
//! }
//!
//! match hc.at::<u8>(3) {
//!     Ok(value) => println!("Value: {}", value),
//!     Err(e @ HetError::IndexOutOfRange { .. }) => {
//!         assert_eq!(e.category(), ErrorCategory::Access);
//!         println!("{}", e);
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Thread safety
//!
//! The stores are neither [`Send`] nor [`Sync`]: payload types are unconstrained, so
//! sharing a store across threads requires wrapping it in your own synchronization.

mod builder;
mod container;
mod error;
mod id;
mod keyvalue;
mod matching;
pub mod query;
mod registry;
mod sequence;
mod slot;
mod tuple;
mod value;
mod visit;


pub use builder::{DropPolicy, HeteroContainerBuilder, HeteroKeyValueBuilder, HeteroValueBuilder};
pub use container::{HDeque, HVec, HeteroContainer};
pub use error::{ErrorCategory, HetError};
pub use id::ContainerId;
pub use keyvalue::{HeteroKeyValue, MapKey};
pub use matching::{Case, Match, MatchTypes, Matcher};
pub use sequence::{DequeKind, Sequence, SequenceKind, VecKind};
pub use tuple::{
    EntrySet, EqualTypes, FetchTuple, SequenceSet, TypeList, ValueSet, VisitEntryTypes,
    VisitTypes,
};
pub use value::HeteroValue;
pub use visit::{
    Comparator, ElementSource, EntryVisitor, Equal, Equality, ErasedEntryVisitor, ErasedVisitor,
    Visit, VisitEntries, Visitor, VisitorReturn,
};
