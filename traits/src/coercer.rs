use std::{
  any::{Any, TypeId},
  borrow::Cow,
  collections::HashMap,
  fmt::{self, Debug},
  num::Wrapping,
  sync::atomic::{
    AtomicBool, AtomicI8, AtomicI16, AtomicI32, AtomicI64, AtomicIsize, AtomicU8, AtomicU16,
    AtomicU32, AtomicU64, AtomicUsize,
  },
};

use crate::{
  Array, BigDecimal, BigInt, Binary, JsonString, Native, Number, Object, ToJson, Value,
  indexmap::IndexMap,
};

/// An item of unknown type which may be coerced to a [`Value`].
///
/// This is implemented for every `'static` type which is `Debug`, `Send` and `Sync`.
pub trait Loose: Any + Debug + Send + Sync {
  /// This item as `Any`, to be downcast.
  fn as_any(&self) -> &dyn Any;
}
impl<T: Any + Debug + Send + Sync> Loose for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

type Adapter = Box<dyn Send + Sync + Fn(&dyn Any, &Coercer) -> Value>;

/// A registry of conversions for items only known at runtime.
///
/// Coercion never fails. An item whose type has no adapter registered is converted to the string
/// of its `Debug` rendering.
pub struct Coercer {
  adapters: HashMap<TypeId, Adapter>,
}

macro_rules! register_to_json {
  ($coercer: ident, $($kind: ty),* $(,)?) => {
    $( $coercer.register_to_json::<$kind>(); )*
  };
}

impl Coercer {
  /// A registry without any adapters.
  #[must_use]
  pub fn empty() -> Self {
    Self { adapters: HashMap::new() }
  }

  /// A registry with adapters for the scalars, trees, and dynamic containers.
  ///
  /// `Vec<Box<dyn Loose>>`, `Option<Box<dyn Loose>>` and `IndexMap<String, Box<dyn Loose>>` have
  /// each of their items coerced by this registry.
  #[must_use]
  pub fn new() -> Self {
    let mut coercer = Self::empty();
    register_to_json!(
      coercer,
      (),
      bool,
      i8,
      i16,
      i32,
      i64,
      i128,
      isize,
      u8,
      u16,
      u32,
      u64,
      u128,
      usize,
      f32,
      f64,
      char,
      &'static str,
      String,
      Cow<'static, str>,
      BigInt,
      BigDecimal,
      Number,
      JsonString,
      Binary,
      Value,
      Array,
      Object,
      Native,
      AtomicBool,
      AtomicI8,
      AtomicI16,
      AtomicI32,
      AtomicI64,
      AtomicIsize,
      AtomicU8,
      AtomicU16,
      AtomicU32,
      AtomicU64,
      AtomicUsize,
      Wrapping<i32>,
      Wrapping<i64>,
      Wrapping<u32>,
      Wrapping<u64>,
    );

    coercer
      .register::<Option<Box<dyn Loose>>>(|item, coercer| match item {
        Some(item) => coercer.coerce(&**item),
        None => Value::Null,
      })
      .register::<Vec<Box<dyn Loose>>>(|items, coercer| {
        Value::Array(items.iter().map(|item| coercer.coerce(&**item)).collect::<Array>())
      })
      .register::<IndexMap<String, Box<dyn Loose>>>(|items, coercer| {
        Value::Object(
          items
            .iter()
            .map(|(key, item)| (key.as_str(), coercer.coerce(&**item)))
            .collect::<Object>(),
        )
      });
    coercer
  }

  /// Register an adapter for items of type `T`, replacing any existing adapter.
  ///
  /// The adapter is passed this registry so it may coerce any items it holds.
  pub fn register<T: Any>(
    &mut self,
    adapter: impl 'static + Send + Sync + Fn(&T, &Coercer) -> Value,
  ) -> &mut Self {
    self.adapters.insert(
      TypeId::of::<T>(),
      Box::new(move |item: &dyn Any, coercer: &Coercer| match item.downcast_ref::<T>() {
        Some(item) => adapter(item, coercer),
        // Unreachable as adapters are keyed by the `TypeId` they downcast to
        None => Value::Null,
      }),
    );
    self
  }

  /// Register `T`'s `ToJson` implementation as its adapter.
  pub fn register_to_json<T: Any + ToJson>(&mut self) -> &mut Self {
    self.register::<T>(|item, _| item.to_json())
  }

  /// If an adapter is registered for `T`.
  #[must_use]
  pub fn supports<T: Any>(&self) -> bool {
    self.adapters.contains_key(&TypeId::of::<T>())
  }

  /// Coerce an item to a `Value`.
  pub fn coerce(&self, item: &dyn Loose) -> Value {
    let any = item.as_any();
    match self.adapters.get(&any.type_id()) {
      Some(adapter) => adapter(any, self),
      None => Value::from(format!("{item:?}")),
    }
  }
}

impl Default for Coercer {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for Coercer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Coercer").field("adapters", &self.adapters.len()).finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use super::*;

  #[derive(Debug)]
  struct Point {
    x: i32,
    y: i32,
  }

  #[test]
  fn scalars() {
    let coercer = Coercer::new();
    assert_eq!(coercer.coerce(&5u8), Value::from(5));
    assert_eq!(coercer.coerce(&"str"), Value::from("str"));
    assert_eq!(coercer.coerce(&String::from("string")), Value::from("string"));
    assert_eq!(coercer.coerce(&()), Value::Null);
    assert_eq!(coercer.coerce(&Value::Null), Value::Null);
    assert_eq!(coercer.coerce(&0.5f64), Value::from(0.5));

    let atomic = AtomicI64::new(-3);
    assert_eq!(coercer.coerce(&atomic), Value::from(-3));
    atomic.store(4, Ordering::SeqCst);
    assert_eq!(coercer.coerce(&atomic), Value::from(4));
    assert_eq!(coercer.coerce(&AtomicBool::new(true)), Value::from(true));
    assert_eq!(coercer.coerce(&Wrapping(7u32)), Value::from(7));
  }

  #[test]
  fn falls_back_to_debug() {
    let coercer = Coercer::new();
    assert_eq!(coercer.coerce(&Point { x: 1, y: 2 }), Value::from("Point { x: 1, y: 2 }"));
    assert_eq!(Coercer::empty().coerce(&5u8), Value::from("5"));
    assert!(!Coercer::empty().supports::<u8>());
  }

  #[test]
  fn registered_adapters() {
    let mut coercer = Coercer::new();
    assert!(!coercer.supports::<Point>());
    coercer.register::<Point>(|point, coercer| {
      Value::Array([coercer.coerce(&point.x), coercer.coerce(&point.y)].into_iter().collect())
    });
    assert!(coercer.supports::<Point>());
    assert_eq!(coercer.coerce(&Point { x: 1, y: -2 }).to_json_string().unwrap(), "[1,-2]");

    coercer.register::<u8>(|_, _| Value::from("replaced"));
    assert_eq!(coercer.coerce(&5u8), Value::from("replaced"));
  }

  #[test]
  fn dynamic_containers() {
    let mut coercer = Coercer::new();
    coercer.register_to_json::<Vec<u16>>();

    let mut inner: IndexMap<String, Box<dyn Loose>> = IndexMap::new();
    inner.insert("point".to_string(), Box::new(Point { x: 0, y: 0 }));
    inner.insert("none".to_string(), Box::new(None::<Box<dyn Loose>>));
    inner.insert("some".to_string(), Box::new(Some(Box::new(true) as Box<dyn Loose>)));
    let items: Vec<Box<dyn Loose>> =
      vec![Box::new(1i32), Box::new("two"), Box::new(vec![3u16, 4]), Box::new(inner)];

    assert_eq!(
      coercer.coerce(&items).to_json_string().unwrap(),
      r#"[1,"two",[3,4],{"point":"Point { x: 0, y: 0 }","none":null,"some":true}]"#,
    );
  }
}
