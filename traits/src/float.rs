use core::num::FpCategory;

use crate::{FromJson, JsonError, ToJson, Value, conversion};

impl ToJson for f64 {
  /// `NaN` and the infinities are preserved, yet fail to be serialized.
  fn to_json(&self) -> Value {
    Value::from(*self)
  }
}
impl FromJson for f64 {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.to_f64()
  }
}

impl ToJson for f32 {
  fn to_json(&self) -> Value {
    Value::from(*self)
  }
}
impl FromJson for f32 {
  #[allow(clippy::cast_possible_truncation)]
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    // Rounds to the nearest `f32`, saturating to the infinities
    Ok(value.to_f64()? as f32)
  }
}

/// A JSON-compatible `f64`.
///
/// JSON does not support representing `NaN`, `inf`, but rather only well-defined values. This
/// ensures the `f64` is representable within JSON, so a tree of these always serializes.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, Debug)]
pub struct JsonF64(f64);

impl TryFrom<f64> for JsonF64 {
  type Error = FpCategory;
  fn try_from(value: f64) -> Result<Self, Self::Error> {
    let class = value.classify();
    match class {
      FpCategory::Nan | FpCategory::Infinite => Err(class)?,
      FpCategory::Zero | FpCategory::Normal | FpCategory::Subnormal => {}
    }
    Ok(Self(value))
  }
}

impl From<JsonF64> for f64 {
  fn from(value: JsonF64) -> f64 {
    value.0
  }
}

impl ToJson for JsonF64 {
  fn to_json(&self) -> Value {
    Value::from(self.0)
  }
}
impl FromJson for JsonF64 {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    let float = f64::from_json(value)?;
    JsonF64::try_from(float).map_err(|_| conversion(float, "finite f64"))
  }
}

#[test]
fn floats() {
  assert_eq!(f64::from_json(&Value::from(" 2.5 ")).unwrap(), 2.5);
  assert_eq!(f64::from_json(&Value::from(u64::MAX)).unwrap(), 18_446_744_073_709_551_615.0);
  assert_eq!(f32::from_json(&Value::from(0.1)).unwrap(), 0.1f32);
  assert_eq!(0.1f32.to_json().to_json_string().unwrap(), "0.1");
  assert!(f64::from_json(&Value::from("abc")).is_err());

  assert!(JsonF64::try_from(f64::NAN).is_err());
  assert_eq!(JsonF64::try_from(f64::NEG_INFINITY), Err(FpCategory::Infinite));
  let finite = JsonF64::try_from(-0.5).unwrap();
  assert_eq!(JsonF64::from_json(&finite.to_json()).unwrap(), finite);
  assert!(JsonF64::from_json(&Value::from("Infinity")).is_err());
  assert_eq!(f64::from(finite), -0.5);
}
