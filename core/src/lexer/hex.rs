/// If all four bytes are ASCII hex digits, of either case.
#[must_use]
#[inline(always)]
pub(super) fn validate_hex(bytes: [u8; 4]) -> bool {
  /*
    "Mom, can we have SIMD?"
    "We have SIMD at home."
    SIMD at home:
  */

  // We don't care for the order of these bytes within our `u32`
  let bytes = u32::from_ne_bytes(bytes);

  const HIGH_BIT: u32 = 1 << 7;
  const HIGH_BITS: u32 = (HIGH_BIT << 24) | (HIGH_BIT << 16) | (HIGH_BIT << 8) | HIGH_BIT;

  const ZERO_CHAR: u32 =
    ((b'0' as u32) << 24) | ((b'0' as u32) << 16) | ((b'0' as u32) << 8) | (b'0' as u32);
  const DISTANCE_AFTER_NINE: u32 = HIGH_BIT - ((b'9' + 1) as u32);
  const DISTANCES_AFTER_NINE: u32 = (DISTANCE_AFTER_NINE << 24) |
    (DISTANCE_AFTER_NINE << 16) |
    (DISTANCE_AFTER_NINE << 8) |
    DISTANCE_AFTER_NINE;

  const FIFTH_BIT: u32 = 1 << 5;
  const FIFTH_BITS: u32 = (FIFTH_BIT << 24) | (FIFTH_BIT << 16) | (FIFTH_BIT << 8) | FIFTH_BIT;

  const A_CHAR: u32 =
    ((b'a' as u32) << 24) | ((b'a' as u32) << 16) | ((b'a' as u32) << 8) | (b'a' as u32);
  const DISTANCE_AFTER_F: u32 = HIGH_BIT - ((b'f' + 1) as u32);
  const DISTANCES_AFTER_F: u32 = (DISTANCE_AFTER_F << 24) |
    (DISTANCE_AFTER_F << 16) |
    (DISTANCE_AFTER_F << 8) |
    DISTANCE_AFTER_F;

  /*
    With the high bit of every lane set, a subtraction which underflows a lane borrows that lane's
    high bit rather than from the neighboring lane. The high bit surviving means the lane was at
    least the constant.
  */
  let bytes_with_high_bits = bytes | HIGH_BITS;
  let gte_zero = bytes_with_high_bits.wrapping_sub(ZERO_CHAR);
  // Setting the fifth bit folds `'A' ..= 'F'` into `'a' ..= 'f'`
  let gte_a = (bytes_with_high_bits | FIFTH_BITS).wrapping_sub(A_CHAR);

  // Adding the distance to the high bit sets it only for lanes past the end of the range
  let lte_9 = bytes.wrapping_add(DISTANCES_AFTER_NINE);
  let lte_f = (bytes | FIFTH_BITS).wrapping_add(DISTANCES_AFTER_F);

  /*
    A lane is within a range if it's at least the start and not past the end. A lane can't be
    past the end without being at least the start, so XOR isolates the in-range lanes.
  */
  let number = gte_zero ^ lte_9;
  let alpha = gte_a ^ lte_f;
  let number_or_alpha = number | alpha;
  // The lanes must also have been ASCII for the above to be well-defined
  let ascii = (!bytes) & HIGH_BITS;
  (ascii & number_or_alpha) == HIGH_BITS
}

/// Read a `u16` from its big-endian hexadecimal encoding.
///
/// Returns `None` if any byte isn't a hex digit.
#[inline(always)]
pub(super) fn read_hex(hex: [u8; 4]) -> Option<u16> {
  if !validate_hex(hex) {
    None?;
  }
  #[inline(always)]
  fn hex_char(char: u8) -> u16 {
    // `validate_hex` has already bounded these to the hex digits
    u16::from(match char {
      b'0' ..= b'9' => char - b'0',
      b'a' ..= b'f' => char - b'a' + 10,
      _ => char - b'A' + 10,
    })
  }
  Some(
    (hex_char(hex[0]) << 12) | (hex_char(hex[1]) << 8) | (hex_char(hex[2]) << 4) | hex_char(hex[3]),
  )
}

#[test]
fn test_validate_hex() {
  let mut hex = [0, b'f', b'f', b'f'];
  for i in u8::MIN ..= u8::MAX {
    hex[0] = i;
    assert_eq!(validate_hex(hex), hex[0].is_ascii_hexdigit());
    hex[3] = i;
    assert_eq!(validate_hex(hex), hex[0].is_ascii_hexdigit());
    hex[3] = b'f';
  }
}

#[test]
fn test_read_hex() {
  assert_eq!(read_hex(*b"0000"), Some(0));
  assert_eq!(read_hex(*b"00e9"), Some(0xe9));
  assert_eq!(read_hex(*b"D83D"), Some(0xd83d));
  assert_eq!(read_hex(*b"fFfF"), Some(u16::MAX));
  assert_eq!(read_hex(*b"00g0"), None);
  assert_eq!(read_hex(*b"12 4"), None);
}
