use core::{
  fmt,
  hash::{Hash, Hasher},
  str::FromStr,
};

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::{ConversionError, JsonError};

/// The largest exponent magnitude accepted when parsing.
///
/// This also bounds the zeroes a rendering in plain notation may pad with.
pub(crate) const MAX_EXPONENT: i64 = 4096;

/// A number.
///
/// Integers are held within the narrowest variant which fits them. Numbers with a fractional
/// part or exponent are held as a `Double` if the `f64` exactly reproduces them, and as a
/// `Decimal` otherwise.
///
/// Equality and hashing are by value, across variants: `Int(1)`, `Long(1)`, and `Double(1.0)`
/// are all equal.
#[derive(Clone, Debug)]
pub enum Number {
  /// A 32-bit integer.
  Int(i32),
  /// A 64-bit integer which doesn't fit within 32 bits.
  Long(i64),
  /// An integer which doesn't fit within 64 bits.
  BigInt(BigInt),
  /// A binary floating-point number.
  Double(f64),
  /// A decimal a `f64` would lose precision for.
  Decimal(BigDecimal),
}

/// Why some text wasn't read as a number.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum NumberError {
  /// The text isn't shaped like a number.
  NotNumeric,
  /// The text is a number with an exponent too large to hold.
  OutOfRange,
}

/// The components of a decimal literal.
struct Parts<'a> {
  negative: bool,
  integer: &'a str,
  fraction: &'a str,
  exponent: Option<&'a str>,
}

fn all_digits(s: &str, radix: u32) -> bool {
  s.chars().all(|c| c.is_digit(radix))
}

/// Split a literal, without its sign, into its components.
fn split(negative: bool, text: &str, strict: bool) -> Option<Parts<'_>> {
  let (mantissa, exponent) = match text.find(['e', 'E']) {
    Some(e) => {
      let exponent = &text[(e + 1) ..];
      let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
      if digits.is_empty() || (!all_digits(digits, 10)) {
        None?;
      }
      (&text[.. e], Some(exponent))
    }
    None => (text, None),
  };

  let (integer, fraction) = match mantissa.split_once('.') {
    Some((integer, fraction)) => {
      if strict && fraction.is_empty() {
        None?;
      }
      (integer, fraction)
    }
    None => (mantissa, ""),
  };
  if (!all_digits(integer, 10)) || (!all_digits(fraction, 10)) {
    None?;
  }
  if integer.is_empty() && (strict || fraction.is_empty()) {
    None?;
  }
  // RFC 8259 doesn't allow leading zeroes
  if strict && (integer.len() > 1) && integer.starts_with('0') {
    None?;
  }
  Some(Parts { negative, integer, fraction, exponent })
}

impl Number {
  /// Parse a literal.
  ///
  /// With `strict`, this only accepts the RFC 8259 grammar. Otherwise, this additionally accepts
  /// a leading `+`, leading zeroes, omitted digits around the `.`, `0x`-prefixed hexadecimal,
  /// `NaN`, and `Infinity`.
  pub(crate) fn parse(text: &str, strict: bool) -> Result<Number, NumberError> {
    let (negative, unsigned) = match text.as_bytes().first() {
      Some(b'-') => (true, &text[1 ..]),
      Some(b'+') if !strict => (false, &text[1 ..]),
      _ => (false, text),
    };

    if !strict {
      match unsigned {
        "NaN" => return Ok(Number::Double(f64::NAN)),
        "Infinity" => {
          return Ok(Number::Double(if negative { f64::NEG_INFINITY } else { f64::INFINITY }));
        }
        _ => {}
      }
      if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        if hex.is_empty() || (!all_digits(hex, 16)) {
          Err(NumberError::NotNumeric)?;
        }
        return Self::integer(negative, hex, 16);
      }
    }

    let parts = split(negative, unsigned, strict).ok_or(NumberError::NotNumeric)?;
    if parts.fraction.is_empty() && parts.exponent.is_none() && (!unsigned.contains('.')) {
      return Self::integer(parts.negative, parts.integer, 10);
    }
    Self::fractional(&parts)
  }

  /// Read an integer, falling back from `i32` to `i64` to `BigInt`.
  fn integer(negative: bool, digits: &str, radix: u32) -> Result<Number, NumberError> {
    if let Ok(magnitude) = u64::from_str_radix(digits, radix) {
      let value = i128::from(magnitude);
      return Ok(Number::from(if negative { -value } else { value }));
    }
    let magnitude =
      BigInt::parse_bytes(digits.as_bytes(), radix).ok_or(NumberError::NotNumeric)?;
    Ok(Number::BigInt(if negative { -magnitude } else { magnitude }))
  }

  fn fractional(parts: &Parts<'_>) -> Result<Number, NumberError> {
    let exponent = match parts.exponent {
      Some(exponent) => {
        let exponent = exponent.parse::<i64>().map_err(|_| NumberError::OutOfRange)?;
        if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
          Err(NumberError::OutOfRange)?;
        }
        exponent
      }
      None => 0,
    };

    let mut digits = String::with_capacity(parts.integer.len() + parts.fraction.len());
    digits.push_str(parts.integer);
    digits.push_str(parts.fraction);
    let mantissa = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or(NumberError::NotNumeric)?;
    let mantissa = if parts.negative { -mantissa } else { mantissa };
    let scale = i64::try_from(parts.fraction.len()).map_err(|_| NumberError::OutOfRange)? -
      exponent;
    let decimal = BigDecimal::new(mantissa, scale);

    let normalized = format!(
      "{}{}.{}e{exponent}",
      if parts.negative { "-" } else { "" },
      if parts.integer.is_empty() { "0" } else { parts.integer },
      if parts.fraction.is_empty() { "0" } else { parts.fraction },
    );
    if let Ok(float) = normalized.parse::<f64>() {
      if float.is_finite() && (plain_f64(float) == plain_decimal(&decimal)) {
        return Ok(Number::Double(float));
      }
    }
    Ok(Number::Decimal(decimal))
  }

  /// If this number is an integer variant.
  #[must_use]
  pub fn is_integral(&self) -> bool {
    matches!(self, Number::Int(_) | Number::Long(_) | Number::BigInt(_))
  }

  /// If this number is finite. Only doubles may not be.
  #[must_use]
  pub fn is_finite(&self) -> bool {
    match self {
      Number::Double(float) => float.is_finite(),
      _ => true,
    }
  }

  /// This number as an `i32`, if it's exactly representable as one.
  #[must_use]
  pub fn as_i32(&self) -> Option<i32> {
    match self {
      Number::Int(int) => Some(*int),
      Number::Long(long) => i32::try_from(*long).ok(),
      Number::BigInt(big) => big.to_i32(),
      Number::Double(float) => (float.fract() == 0.0).then(|| float.to_i32()).flatten(),
      Number::Decimal(decimal) => {
        let integral = decimal.with_scale(0);
        (integral == *decimal).then(|| integral.to_i32()).flatten()
      }
    }
  }

  /// This number as an `i64`, if it's exactly representable as one.
  #[must_use]
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Number::Int(int) => Some(i64::from(*int)),
      Number::Long(long) => Some(*long),
      Number::BigInt(big) => big.to_i64(),
      Number::Double(float) => (float.fract() == 0.0).then(|| float.to_i64()).flatten(),
      Number::Decimal(decimal) => {
        let integral = decimal.with_scale(0);
        (integral == *decimal).then(|| integral.to_i64()).flatten()
      }
    }
  }

  /// This number as the nearest `f64`.
  ///
  /// Integers beyond 2^53, and decimals, may lose precision. Magnitudes beyond `f64::MAX`
  /// become infinite.
  #[must_use]
  pub fn as_f64(&self) -> f64 {
    match self {
      Number::Int(int) => f64::from(*int),
      Number::Long(long) => long.to_f64().unwrap_or(f64::NAN),
      Number::BigInt(big) => big.to_f64().unwrap_or(f64::NAN),
      Number::Double(float) => *float,
      Number::Decimal(decimal) => {
        decimal.to_f64().unwrap_or_else(|| plain_decimal(decimal).parse().unwrap_or(f64::NAN))
      }
    }
  }

  /// This number as an `i32`, truncating any fractional part towards zero.
  ///
  /// Returns `None` if the integral part is out of range.
  #[must_use]
  pub fn to_i32_truncating(&self) -> Option<i32> {
    match self {
      Number::Double(float) => float.trunc().to_i32(),
      Number::Decimal(decimal) => decimal.with_scale(0).to_i32(),
      _ => self.as_i32(),
    }
  }

  /// This number as an `i64`, truncating any fractional part towards zero.
  ///
  /// Returns `None` if the integral part is out of range.
  #[must_use]
  pub fn to_i64_truncating(&self) -> Option<i64> {
    match self {
      Number::Double(float) => float.trunc().to_i64(),
      Number::Decimal(decimal) => decimal.with_scale(0).to_i64(),
      _ => self.as_i64(),
    }
  }
}

/// Render a `f64` in plain notation, with the fewest digits which round-trip.
fn plain_f64(float: f64) -> String {
  if float == 0.0 {
    // Also collapses `-0.0`, as `-0` would be read back as the integer `0`
    return "0".to_owned();
  }
  // `Display` for `f64` never uses exponential notation
  format!("{float}")
}

/// Render a `BigDecimal` in plain notation, without trailing zeroes.
///
/// Plain notation needing more than `MAX_EXPONENT` padding zeroes is only reachable by decimals
/// built in code. Those render as their significant digits with an exponent instead.
fn plain_decimal(decimal: &BigDecimal) -> String {
  let (mantissa, scale) = decimal.as_bigint_and_exponent();
  if mantissa.is_zero() {
    return "0".to_owned();
  }

  let digits = mantissa.magnitude().to_string();
  let significant = digits.trim_end_matches('0');
  // The value is `significant * 10^exponent`
  let exponent = i128::try_from(digits.len() - significant.len()).unwrap_or(i128::MAX) -
    i128::from(scale);
  let significant_len = i128::try_from(significant.len()).unwrap_or(i128::MAX);
  let padding = if exponent >= 0 { exponent } else { (-exponent) - significant_len };

  let mut res = String::with_capacity(digits.len() + 2);
  if mantissa.sign() == Sign::Minus {
    res.push('-');
  }

  if padding > i128::from(MAX_EXPONENT) {
    res.push_str(significant);
    res.push('e');
    res.push_str(&exponent.to_string());
    return res;
  }

  if exponent >= 0 {
    res.push_str(significant);
    for _ in 0 .. exponent {
      res.push('0');
    }
    return res;
  }

  // `padding` bounds this
  let fraction_len = usize::try_from(-exponent).unwrap_or(usize::MAX);
  if significant.len() > fraction_len {
    let (integer, fraction) = significant.split_at(significant.len() - fraction_len);
    res.push_str(integer);
    res.push('.');
    res.push_str(fraction);
  } else {
    res.push_str("0.");
    for _ in significant.len() .. fraction_len {
      res.push('0');
    }
    res.push_str(significant);
  }
  res
}

/// The canonical rendering.
///
/// This is plain decimal notation without exponents or trailing fractional zeroes. Non-finite
/// doubles render as `NaN`, `Infinity`, and `-Infinity`, which aren't valid JSON.
impl fmt::Display for Number {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Number::Int(int) => write!(f, "{int}"),
      Number::Long(long) => write!(f, "{long}"),
      Number::BigInt(big) => write!(f, "{big}"),
      Number::Double(float) if float.is_nan() => f.write_str("NaN"),
      Number::Double(float) if float.is_infinite() => {
        f.write_str(if *float > 0.0 { "Infinity" } else { "-Infinity" })
      }
      Number::Double(float) => f.write_str(&plain_f64(*float)),
      Number::Decimal(decimal) => f.write_str(&plain_decimal(decimal)),
    }
  }
}

impl PartialEq for Number {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Number::Int(a), Number::Int(b)) => a == b,
      (Number::Long(a), Number::Long(b)) => a == b,
      (Number::Int(a), Number::Long(b)) | (Number::Long(b), Number::Int(a)) => {
        i64::from(*a) == *b
      }
      _ => self.to_string() == other.to_string(),
    }
  }
}
impl Eq for Number {}

impl Hash for Number {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.to_string().hash(state);
  }
}

/// Parse a number with the lenient grammar, ignoring surrounding whitespace.
impl FromStr for Number {
  type Err = ConversionError;
  fn from_str(text: &str) -> Result<Self, Self::Err> {
    Number::parse(text.trim(), false)
      .map_err(|_| ConversionError { value: text.to_owned(), target: "number" })
  }
}

impl From<i128> for Number {
  fn from(value: i128) -> Self {
    if let Ok(int) = i32::try_from(value) {
      Number::Int(int)
    } else if let Ok(long) = i64::try_from(value) {
      Number::Long(long)
    } else {
      Number::BigInt(BigInt::from(value))
    }
  }
}

macro_rules! from_int {
  ($($int: ty),*) => {
    $(
      impl From<$int> for Number {
        fn from(value: $int) -> Self {
          Number::from(i128::from(value))
        }
      }
    )*
  };
}
from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<isize> for Number {
  fn from(value: isize) -> Self {
    i64::try_from(value).map_or_else(|_| Number::from(BigInt::from(value)), Number::from)
  }
}

impl From<usize> for Number {
  fn from(value: usize) -> Self {
    u64::try_from(value).map_or_else(|_| Number::from(BigInt::from(value)), Number::from)
  }
}

impl From<u128> for Number {
  fn from(value: u128) -> Self {
    i128::try_from(value).map_or_else(|_| Number::BigInt(BigInt::from(value)), Number::from)
  }
}

impl From<BigInt> for Number {
  fn from(value: BigInt) -> Self {
    if let Some(int) = value.to_i32() {
      Number::Int(int)
    } else if let Some(long) = value.to_i64() {
      Number::Long(long)
    } else {
      Number::BigInt(value)
    }
  }
}

impl From<f32> for Number {
  /// The `f32`'s shortest decimal representation is kept, not its binary expansion.
  fn from(value: f32) -> Self {
    Number::Double(value.to_string().parse().unwrap_or(f64::from(value)))
  }
}

impl From<f64> for Number {
  fn from(value: f64) -> Self {
    Number::Double(value)
  }
}

impl From<BigDecimal> for Number {
  fn from(value: BigDecimal) -> Self {
    Number::Decimal(value)
  }
}

impl TryFrom<&Number> for f64 {
  type Error = JsonError;
  /// Fails if the number isn't finite as a `f64`.
  fn try_from(number: &Number) -> Result<f64, JsonError> {
    let float = number.as_f64();
    if number.is_finite() && (!float.is_finite()) {
      Err(JsonError::conversion(number, "f64"))?;
    }
    Ok(float)
  }
}

#[test]
fn integer_fallback() {
  let parse = |s: &str| Number::parse(s, true).unwrap();
  assert!(matches!(parse("2147483647"), Number::Int(i32::MAX)));
  assert!(matches!(parse("-2147483648"), Number::Int(i32::MIN)));
  assert!(matches!(parse("2147483648"), Number::Long(2147483648)));
  assert!(matches!(parse("9223372036854775807"), Number::Long(i64::MAX)));
  assert!(matches!(parse("-9223372036854775808"), Number::Long(i64::MIN)));
  let Number::BigInt(big) = parse("9223372036854775808") else { panic!("didn't fall back") };
  assert_eq!(big.to_string(), "9223372036854775808");
  let Number::BigInt(big) = parse("92233720368547758080") else { panic!("didn't fall back") };
  assert_eq!(big.to_string(), "92233720368547758080");
  let Number::BigInt(big) = parse("-18446744073709551617") else { panic!("didn't fall back") };
  assert_eq!(big.to_string(), "-18446744073709551617");
}

#[test]
fn fractional_precision() {
  let parse = |s: &str| Number::parse(s, true).unwrap();
  assert!(matches!(parse("0.1"), Number::Double(f) if f == 0.1));
  assert!(matches!(parse("-1.5e3"), Number::Double(f) if f == -1500.0));
  assert!(matches!(parse("1E2"), Number::Double(f) if f == 100.0));
  assert!(matches!(parse("1.50"), Number::Double(f) if f == 1.5));

  // `f64` would round these
  assert!(matches!(parse("0.30000000000000001"), Number::Decimal(_)));
  assert_eq!(parse("0.30000000000000001").to_string(), "0.30000000000000001");
  assert!(matches!(parse("1e400"), Number::Decimal(_)));
  assert_eq!(parse("1e400").to_string().len(), 401);
  assert!(matches!(parse("1e-400"), Number::Decimal(_)));

  assert_eq!(Number::parse("1e5000", true).unwrap_err(), NumberError::OutOfRange);
  assert_eq!(Number::parse("1e99999999999999999999", true).unwrap_err(), NumberError::OutOfRange);
}

#[test]
fn strict_grammar() {
  for invalid in ["+1", ".5", "5.", "01", "-", "", "1e", "1e+", "0x10", "NaN", "Infinity", "1.2.3"]
  {
    assert_eq!(Number::parse(invalid, true).unwrap_err(), NumberError::NotNumeric, "{invalid}");
  }
}

#[test]
fn lenient_grammar() {
  let parse = |s: &str| Number::parse(s, false).unwrap();
  assert_eq!(parse("+1"), Number::Int(1));
  assert_eq!(parse(".5"), Number::Double(0.5));
  assert_eq!(parse("5."), Number::Int(5));
  assert!(matches!(parse("5."), Number::Double(_)));
  assert_eq!(parse("007"), Number::Int(7));
  assert_eq!(parse("0x1F"), Number::Int(31));
  assert_eq!(parse("-0X10"), Number::Int(-16));
  assert!(matches!(parse("0xFFFFFFFFFFFFFFFFFF"), Number::BigInt(_)));
  assert!(matches!(parse("NaN"), Number::Double(f) if f.is_nan()));
  assert!(matches!(parse("-Infinity"), Number::Double(f) if f == f64::NEG_INFINITY));
  for invalid in ["abc", "0x", "0xG", "1a", "--1", "."] {
    assert!(Number::parse(invalid, false).is_err(), "{invalid}");
  }
}

#[test]
fn canonical_rendering() {
  assert_eq!(Number::Double(1.0).to_string(), "1");
  assert_eq!(Number::Double(-0.0).to_string(), "0");
  assert_eq!(Number::Double(0.5).to_string(), "0.5");
  assert_eq!(Number::Double(1e21).to_string(), "1000000000000000000000");
  assert_eq!(Number::Double(1e-7).to_string(), "0.0000001");
  assert_eq!(Number::Decimal(BigDecimal::new(BigInt::from(1500), 3)).to_string(), "1.5");
  assert_eq!(Number::Decimal(BigDecimal::new(BigInt::from(-15), 4)).to_string(), "-0.0015");
  assert_eq!(Number::Decimal(BigDecimal::new(BigInt::from(15), -2)).to_string(), "1500");
  assert_eq!(Number::Double(f64::NEG_INFINITY).to_string(), "-Infinity");

  assert_eq!(Number::from(BigDecimal::new(BigInt::from(1), -4096)).to_string().len(), 4097);
  let huge = Number::from(BigDecimal::new(BigInt::from(7), -1_000_000));
  assert_eq!(huge.to_string(), "7e1000000");
  assert_eq!(huge, Number::from(BigDecimal::new(BigInt::from(70), -999_999)));
  let tiny = Number::from(BigDecimal::new(BigInt::from(-70), i64::MAX));
  assert_eq!(tiny.to_string(), format!("-7e{}", 1 - i128::from(i64::MAX)));
}

#[test]
fn equality_across_variants() {
  use std::hash::{BuildHasher, RandomState};

  let state = RandomState::new();
  let equal = [
    Number::Int(1),
    Number::Long(1),
    Number::BigInt(BigInt::from(1)),
    Number::Double(1.0),
    Number::Decimal(BigDecimal::new(BigInt::from(100), 2)),
  ];
  for a in &equal {
    for b in &equal {
      assert_eq!(a, b);
      assert_eq!(state.hash_one(a), state.hash_one(b));
    }
  }
  assert_ne!(Number::Int(1), Number::Double(1.5));
  assert_eq!(Number::Double(f64::NAN), Number::Double(f64::NAN));
}

#[test]
fn accessors() {
  assert_eq!(Number::Long(1 << 40).as_i32(), None);
  assert_eq!(Number::Long(1 << 40).as_i64(), Some(1 << 40));
  assert_eq!(Number::Double(2.0).as_i32(), Some(2));
  assert_eq!(Number::Double(2.5).as_i32(), None);
  assert_eq!(Number::Double(2.5).to_i32_truncating(), Some(2));
  assert_eq!(Number::Double(-2.5).to_i64_truncating(), Some(-2));
  assert_eq!(Number::Double(1e300).to_i64_truncating(), None);
  assert_eq!(Number::parse("12.75", false).unwrap().to_i32_truncating(), Some(12));
  assert_eq!(Number::parse("9223372036854775808", true).unwrap().as_i64(), None);
  assert_eq!(Number::parse("9223372036854775808", true).unwrap().as_f64(), 9223372036854775808.0);
  assert!(f64::try_from(&Number::parse("1e400", true).unwrap()).is_err());
  assert!(f64::try_from(&Number::Double(f64::NAN)).is_ok());
}
