use std::{rc::Rc, sync::Arc};

use crate::{FromJson, JsonError, ToJson, Value};

impl<T: ?Sized + ToJson> ToJson for &T {
  fn to_json(&self) -> Value {
    (**self).to_json()
  }
}
impl<T: ?Sized + ToJson> ToJson for Box<T> {
  fn to_json(&self) -> Value {
    (**self).to_json()
  }
}
impl<T: ?Sized + ToJson> ToJson for Rc<T> {
  fn to_json(&self) -> Value {
    (**self).to_json()
  }
}
impl<T: ?Sized + ToJson> ToJson for Arc<T> {
  fn to_json(&self) -> Value {
    (**self).to_json()
  }
}

impl<T: FromJson> FromJson for Box<T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    T::from_json(value).map(Box::new)
  }
}
impl<T: FromJson> FromJson for Arc<T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    T::from_json(value).map(Arc::new)
  }
}

#[test]
fn pointers() {
  let boxed: Box<str> = "boxed".into();
  assert_eq!(boxed.to_json(), Value::from("boxed"));
  assert_eq!(Rc::new(5).to_json(), Value::from(5));
  assert_eq!((&&7).to_json(), Value::from(7));
  assert_eq!(*Arc::<u8>::from_json(&Value::from(2)).unwrap(), 2);
  assert_eq!(*Box::<bool>::from_json(&Value::from(true)).unwrap(), true);
}
