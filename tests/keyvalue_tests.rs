use sovran_hetero::{
    EntryVisitor, ErasedEntryVisitor, HetError, HeteroKeyValue, VisitorReturn,
};
use static_assertions::assert_not_impl_any;
use std::any::Any;

assert_not_impl_any!(HeteroKeyValue: Send, Sync, Clone);

#[derive(Debug, Clone, PartialEq)]
struct Endpoint {
    host: String,
    port: u16,
}

#[test]
fn test_basic_operations() {
    let mut kv = HeteroKeyValue::new();

    kv.add("api".to_string(), Endpoint {
        host: "localhost".to_string(),
        port: 8080,
    })
    .unwrap();
    kv.add("api".to_string(), 30u32).unwrap();

    // Same key, different value types are separate entries
    assert_eq!(kv.value::<Endpoint, _>(&"api".to_string()).unwrap().port, 8080);
    assert_eq!(*kv.value::<u32, _>(&"api".to_string()).unwrap(), 30);
    assert_eq!(kv.size().unwrap(), 2);

    // Overwrite
    kv.add("api".to_string(), 60u32).unwrap();
    assert_eq!(*kv.value::<u32, _>(&"api".to_string()).unwrap(), 60);
    assert_eq!(kv.size().unwrap(), 2);

    // Update in place
    kv.with_mut(&"api".to_string(), |e: &mut Endpoint| e.port = 9090)
        .unwrap();
    let port = kv.with(&"api".to_string(), |e: &Endpoint| e.port).unwrap();
    assert_eq!(port, 9090);

    // Remove one entry
    assert!(kv.erase_value::<u32, _>(&"api".to_string()));
    assert!(!kv.contains_key::<u32, _>(&"api".to_string()));
    assert!(kv.contains_key::<Endpoint, _>(&"api".to_string()));
}

#[test]
fn test_key_types_are_separate() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::new();
    kv.add(1u8, 'a')?;
    kv.add(1u16, 'b')?;

    assert_eq!(*kv.value::<char, _>(&1u8)?, 'a');
    assert_eq!(*kv.value::<char, _>(&1u16)?, 'b');
    assert!(kv.contains::<u8, char>());
    assert!(!kv.contains::<u32, char>());
    Ok(())
}

#[test]
fn test_missing_map_and_missing_key() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::new();
    // no i32 -> String map yet
    assert!(matches!(
        kv.value::<String, _>(&1i32),
        Err(HetError::ValueNotFound(_))
    ));

    kv.add(1i32, String::from("one"))?;
    let err = kv.value::<String, _>(&2i32).unwrap_err();
    assert_eq!(err, HetError::KeyNotFound("2".to_string()));
    assert!(kv.get::<String, _>(&2i32).is_none());
    assert!(kv.value_mut::<String, _>(&2i32).is_err());
    Ok(())
}

#[test]
fn test_value_or_add_counts_words() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::new();
    for word in "the cat and the hat and the bat".split(' ') {
        *kv.value_or_add(word.to_string(), 0usize)? += 1;
    }

    assert_eq!(*kv.value::<usize, _>(&"the".to_string())?, 3);
    assert_eq!(*kv.value::<usize, _>(&"and".to_string())?, 2);
    assert_eq!(kv.size()?, 5);

    let mut keys: Vec<&String> = kv.keys::<String, usize>().collect();
    keys.sort();
    assert_eq!(keys, ["and", "bat", "cat", "hat", "the"]);
    Ok(())
}

#[test]
fn test_entries_and_tuples() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::with_entries(((1u8, 'a'), (1u8, 10u32), (2u8, 'b')))?;
    kv.add_entries(((1u8, String::from("one")),))?;

    let (c, n, s) = kv.to_tuple::<(char, u32, String), _>(&1u8)?;
    assert_eq!((*c, *n, s.as_str()), ('a', 10, "one"));
    assert_eq!(
        kv.to_tuple::<(char, u32), _>(&2u8).err(),
        Some(HetError::UnboundedValue("u32"))
    );

    assert_eq!(kv.to_vector::<char, _>(&[2u8, 1u8])?, vec![&'b', &'a']);

    kv.assign_entries(((9i64, true),))?;
    assert_eq!(kv.size()?, 1);
    assert!(!kv.contains::<u8, char>());
    Ok(())
}

#[test]
fn test_erase_map_and_clear() -> Result<(), HetError> {
    let mut kv = HeteroKeyValue::new();
    kv.add(1i32, 'x')?;
    kv.add(2i32, 'y')?;
    kv.add(1i32, 0.5f64)?;

    assert!(kv.erase_map::<i32, char>());
    assert!(!kv.erase_map::<i32, char>());
    assert_eq!(kv.size()?, 1);

    kv.clear();
    assert!(kv.is_empty());
    assert_eq!(kv.size()?, 0);
    assert_eq!(kv.keys::<i32, f64>().count(), 0);
    Ok(())
}

struct Collect {
    lines: Vec<String>,
    stop_at: Option<usize>,
}

impl EntryVisitor<u8, char> for Collect {
    fn visit(&mut self, key: &u8, value: &char) -> VisitorReturn {
        self.lines.push(format!("{key}:{value}"));
        self.flow()
    }
}

impl EntryVisitor<u8, bool> for Collect {
    fn visit(&mut self, key: &u8, value: &bool) -> VisitorReturn {
        self.lines.push(format!("{key}:{value}"));
        self.flow()
    }
}

impl Collect {
    fn flow(&self) -> VisitorReturn {
        match self.stop_at {
            Some(n) if self.lines.len() >= n => VisitorReturn::Break,
            _ => VisitorReturn::Continue,
        }
    }
}

#[test]
fn test_visit_entries_by_value_type() -> Result<(), HetError> {
    let kv = HeteroKeyValue::with_entries(((1u8, 'a'), (2u8, true), (3u16, 'z')))?;

    let mut all = Collect {
        lines: Vec::new(),
        stop_at: None,
    };
    let flow = kv.visit::<u8, (char, bool)>().call(&mut all);
    assert_eq!(flow, VisitorReturn::Continue);
    // the char map comes first, the u16-keyed char is not visited
    assert_eq!(all.lines, vec!["1:a", "2:true"]);

    let mut first = Collect {
        lines: Vec::new(),
        stop_at: Some(1),
    };
    assert!(kv.visit::<u8, (char, bool)>().call(&mut first).is_break());
    assert_eq!(first.lines, vec!["1:a"]);
    Ok(())
}

#[test]
fn test_erased_entry_visitor() -> Result<(), HetError> {
    let kv = HeteroKeyValue::with_entries(((5i32, 1.5f32), (5i32, 'c')))?;

    let mut count = 0;
    kv.visit::<i32, (f32, char, u8)>()
        .call(&mut ErasedEntryVisitor(|key: &i32, value: &dyn Any| {
            assert_eq!(*key, 5);
            assert!(value.is::<f32>() || value.is::<char>());
            count += 1;
            VisitorReturn::Continue
        }));
    assert_eq!(count, 2);
    Ok(())
}

#[test]
fn test_unique_values_under_keys() -> Result<(), HetError> {
    struct Connection {
        open: bool,
    }

    let mut kv = HeteroKeyValue::new();
    kv.add_unique("db", Connection { open: true })?;
    assert!(kv.value::<Connection, _>(&"db")?.open);
    assert!(matches!(kv.try_clone(), Err(HetError::NotCloneable(_))));
    Ok(())
}
