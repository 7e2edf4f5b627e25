use core::{
  num::{NonZero, Wrapping},
  sync::atomic::{self, Ordering},
};

use crate::{BigDecimal, BigInt, FromJson, JsonError, Number, ToJson, Value, conversion};

fn truncate(decimal: &BigDecimal) -> BigInt {
  decimal.with_scale(0).into_bigint_and_exponent().0
}

/// Read an integer, truncating any fractional part.
fn integer<T: TryFrom<i64> + TryFrom<BigInt>>(
  value: &Value,
  target: &'static str,
) -> Result<T, JsonError> {
  let number = value.to_number()?;
  let res = match number.to_i64_truncating() {
    Some(int) => T::try_from(int).ok(),
    None => {
      let big = match &*number {
        Number::Int(int) => Some(BigInt::from(*int)),
        Number::Long(long) => Some(BigInt::from(*long)),
        Number::BigInt(big) => Some(big.clone()),
        // The canonical rendering is exact, unlike the binary value of the `f64`
        Number::Double(_) => {
          number.to_string().parse::<BigDecimal>().ok().map(|decimal| truncate(&decimal))
        }
        Number::Decimal(decimal) => Some(truncate(decimal)),
      };
      big.and_then(|big| T::try_from(big).ok())
    }
  };
  res.ok_or_else(|| conversion(&*number, target))
}

macro_rules! integers {
  ($($int: ident),*) => {
    $(
      impl ToJson for $int {
        fn to_json(&self) -> Value {
          Value::from(*self)
        }
      }
      impl FromJson for $int {
        fn from_json(value: &Value) -> Result<Self, JsonError> {
          integer(value, stringify!($int))
        }
      }
      impl ToJson for NonZero<$int> {
        fn to_json(&self) -> Value {
          Value::from(self.get())
        }
      }
    )*
  };
}
integers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! atomics {
  ($($atomic: ident),*) => {
    $(
      impl ToJson for atomic::$atomic {
        fn to_json(&self) -> Value {
          Value::from(self.load(Ordering::SeqCst))
        }
      }
    )*
  };
}
atomics!(
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
  AtomicUsize
);

impl<T: ToJson> ToJson for Wrapping<T> {
  fn to_json(&self) -> Value {
    self.0.to_json()
  }
}

impl ToJson for bool {
  fn to_json(&self) -> Value {
    Value::Bool(*self)
  }
}
impl FromJson for bool {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.to_bool()
  }
}

impl ToJson for BigInt {
  fn to_json(&self) -> Value {
    Value::from(self.clone())
  }
}
impl FromJson for BigInt {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    integer(value, "BigInt")
  }
}

impl ToJson for BigDecimal {
  fn to_json(&self) -> Value {
    Value::from(self.clone())
  }
}
impl FromJson for BigDecimal {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    let number = value.to_number()?;
    if !number.is_finite() {
      Err(conversion(&*number, "BigDecimal"))?;
    }
    number.to_string().parse().map_err(|_| conversion(&*number, "BigDecimal"))
  }
}

impl ToJson for Number {
  fn to_json(&self) -> Value {
    Value::Number(self.clone())
  }
}
impl FromJson for Number {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    Ok(value.to_number()?.into_owned())
  }
}

#[cfg(test)]
mod tests {
  use core::sync::atomic::{AtomicBool, AtomicU64};

  use super::*;

  #[test]
  fn integers() {
    assert_eq!(u8::from_json(&Value::from(255)).unwrap(), 255);
    assert!(matches!(u8::from_json(&Value::from(256)), Err(JsonError::Conversion(_))));
    assert!(matches!(u32::from_json(&Value::from(-1)), Err(JsonError::Conversion(_))));
    assert_eq!(i16::from_json(&Value::from("-12.9")).unwrap(), -12);
    assert_eq!(u64::from_json(&Value::from(u64::MAX)).unwrap(), u64::MAX);
    assert_eq!(i128::from_json(&Value::from(i128::MIN)).unwrap(), i128::MIN);
    assert_eq!(u128::from_json(&Value::from("1e30")).unwrap(), 10u128.pow(30));
    assert!(matches!(i32::from_json(&Value::from(true)), Err(JsonError::Access(_))));
    assert!(matches!(i32::from_json(&Value::from(f64::NAN)), Err(JsonError::Conversion(_))));

    assert_eq!(NonZero::new(5u8).unwrap().to_json(), Value::from(5));
    assert_eq!(Wrapping(7i64).to_json(), Value::from(7));
    assert_eq!(AtomicU64::new(9).to_json(), Value::from(9));
    assert_eq!(AtomicBool::new(true).to_json(), Value::from(true));
  }

  #[test]
  fn big_numbers() {
    let big: BigInt = BigInt::from(u128::MAX) * 3;
    assert_eq!(BigInt::from_json(&big.to_json()).unwrap(), big);
    assert_eq!(BigInt::from_json(&Value::from(2.9)).unwrap(), BigInt::from(2));

    let decimal = "-1.000000000000000000001".parse::<BigDecimal>().unwrap();
    assert_eq!(BigDecimal::from_json(&decimal.to_json()).unwrap(), decimal);
    assert_eq!(BigDecimal::from_json(&Value::from(7)).unwrap(), BigDecimal::from(7));
    assert!(BigDecimal::from_json(&Value::from(f64::INFINITY)).is_err());
  }

  #[test]
  fn bools() {
    assert!(bool::from_json(&Value::from("True")).unwrap());
    assert!(!bool::from_json(&false.to_json()).unwrap());
    assert!(bool::from_json(&Value::from(1)).is_err());
  }
}
