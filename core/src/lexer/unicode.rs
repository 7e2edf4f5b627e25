/// Calculate the length of the non-ASCII UTF-8 codepoint from its first byte.
///
/// Returns an undefined value if the codepoint is ASCII. For any other byte, the result is within
/// `2 ..= 4`, even if the byte can't begin a codepoint.
#[inline(always)]
pub(super) fn non_ascii_utf8_codepoint_len(b: u8) -> usize {
  // The amount of zeroes in a `u8` will be positive and fit within a `usize`
  ((!(b | 0b0100_0000)) | 0b1111).leading_zeros() as usize
}

/// Convert a UTF-8 codepoint to a `char`, if it's well-formed.
///
/// Overlong encodings, surrogates, and malformed continuation bytes are all rejected.
#[inline(always)]
pub(super) fn utf8_codepoint_to_char(c: &[u8]) -> Option<char> {
  let mut chars = core::str::from_utf8(c).ok()?.chars();
  let char = chars.next()?;
  chars.next().is_none().then_some(char)
}

#[test]
fn test_non_ascii_utf8_codepoint_len() {
  for c in ['é', 'ß', '€', '\u{2028}', '😀', '\u{10ffff}'] {
    let mut buf = [0; 4];
    let encoded = c.encode_utf8(&mut buf);
    assert_eq!(non_ascii_utf8_codepoint_len(encoded.as_bytes()[0]), c.len_utf8());
  }
  for b in 0x80 ..= u8::MAX {
    assert!((2 ..= 4).contains(&non_ascii_utf8_codepoint_len(b)));
  }
}

#[test]
fn test_utf8_codepoint_to_char() {
  assert_eq!(utf8_codepoint_to_char("é".as_bytes()), Some('é'));
  assert_eq!(utf8_codepoint_to_char("😀".as_bytes()), Some('😀'));
  // Overlong encoding of `/`
  assert_eq!(utf8_codepoint_to_char(&[0xc0, 0xaf]), None);
  // Encoded surrogate
  assert_eq!(utf8_codepoint_to_char(&[0xed, 0xa0, 0x80]), None);
  // Missing continuation byte
  assert_eq!(utf8_codepoint_to_char(&[0xe2, 0x82, b'a']), None);
}
