use json_tree_traits::{FromJson, JsonF64, Object, ToJson, Tri, Value};
use json_tree_derive::{FromJson, ToJson};

#[derive(Clone, Debug, Default, FromJson, ToJson)]
pub(crate) struct MyStruct<T: 'static + core::fmt::Debug + Default + FromJson + ToJson> {
  pub abc: u64,
  de: u8,
  pub(crate) ghij: Vec<u8>,
  klmo: Vec<T>,
  missing: Option<u64>,
  float: JsonF64,
  #[json(skip)]
  skipped: Option<u64>,
}

impl<T: 'static + core::fmt::Debug + Default + FromJson + ToJson> PartialEq for MyStruct<T>
where
  T: PartialEq,
{
  fn eq(&self, other: &Self) -> bool {
    (self.abc == other.abc) &&
      (self.de == other.de) &&
      (self.ghij == other.ghij) &&
      (self.klmo == other.klmo) &&
      (self.missing == other.missing) &&
      (self.float == other.float)
  }
}

#[derive(Clone, PartialEq, Debug, Default, FromJson, ToJson)]
pub struct WithoutT {
  /// A renamed field.
  #[json(key("xyza"))]
  abc: i64,
  de: u8,
  ghij: Vec<u8>,
  hash: [u8; 4],
}

#[derive(Clone, PartialEq, Debug, Default, FromJson, ToJson)]
struct Patch {
  name: Tri<String>,
  #[json(skip)]
  r#type: u8,
  big: json_tree_traits::BigInt,
}

#[derive(Clone, PartialEq, Debug, Default, FromJson, ToJson)]
struct Empty {}

fn example() -> MyStruct<WithoutT> {
  MyStruct {
    abc: 0x707bc37ed42c062d,
    de: 0xdd,
    ghij: vec![0xee, 0x90, 0x65, 0x00, 0x52],
    klmo: vec![WithoutT {
      abc: -0x3b4443c3b3494a61,
      de: 0x2f,
      ghij: vec![0x90, 0xba, 0xaa],
      hash: [0x32, 0xa8, 0xa1, 0xb9],
    }],
    missing: None,
    float: JsonF64::try_from(-123.456).unwrap(),
    skipped: None,
  }
}

#[test]
fn test_derive() {
  let serialized = r#"
    {
      "abc": 8105286903876290093,
      "de": 221,
      "ghij": [238, 144, 101, 0, 82],
      "klmo": [
        {
          "xyza": -4270612854459681377,
          "de": 47,
          "ghij": [144, 186, 170],
          "hash": [50, 168, 161, 185],
          "unknown": "ignored"
        }
      ],
      "missing": null,
      "float": -123.456,
      "skipped": 10
    }
  "#;

  let res = example();
  let deserialized = MyStruct::<WithoutT>::from_json_str(serialized).unwrap();
  assert!(deserialized.skipped.is_none(), "`skipped` was `Some` despite `skip` attribute");
  assert_eq!(deserialized, res);

  let mut res = res;
  res.skipped = Some(10);
  let serialization = res.to_json().to_json_string().unwrap();
  assert!(!serialization.contains("skipped"), "`skipped` was serialized despite `skip` attribute");
  assert!(serialization.contains(r#""xyza":"#), "`key` attribute wasn't respected");
  assert!(serialization.contains(r#""missing":null"#), "`None` wasn't written as `null`");
  assert_eq!(MyStruct::<WithoutT>::from_json_str(&serialization).unwrap(), res);

  assert_eq!(
    <[MyStruct<WithoutT>; 1]>::from_json_str(format!("[{serialized}]")).unwrap(),
    [example()],
  );
}

#[test]
fn field_order() {
  let object = Object::from_json(&example().to_json()).unwrap();
  assert_eq!(
    object.keys().collect::<Vec<_>>(),
    ["abc", "de", "ghij", "klmo", "missing", "float"],
  );
}

#[test]
fn tri_fields() {
  let absent = Patch::default();
  assert_eq!(absent.to_json().to_json_string().unwrap(), r#"{"big":0}"#);

  let null = Patch { name: Tri::Null, ..Patch::default() };
  assert_eq!(null.to_json().to_json_string().unwrap(), r#"{"name":null,"big":0}"#);

  let present = Patch { name: Tri::Some("x".to_string()), ..Patch::default() };
  assert_eq!(present.to_json().to_json_string().unwrap(), r#"{"name":"x","big":0}"#);

  for patch in [absent, null, present] {
    let read = Patch::from_json(&patch.to_json()).unwrap();
    assert_eq!(read, patch);
  }

  let big = Patch::from_json_str(r#"{"big": 123456789012345678901234567890, "type": 5}"#).unwrap();
  assert_eq!(big.big.to_string(), "123456789012345678901234567890");
  assert_eq!(big.r#type, 0);
}

#[test]
fn lenient_fields() {
  let read =
    WithoutT::from_json_str("{xyza: '-5', de: 7.9, ghij: [], hash: [1, 2, 3, 4]}").unwrap();
  assert_eq!(read, WithoutT { abc: -5, de: 7, ghij: vec![], hash: [1, 2, 3, 4] });
}

#[test]
fn errors_name_the_field() {
  let error = WithoutT::from_json_str(r#"{"de": "abc"}"#).unwrap_err();
  assert!(matches!(error, json_tree_traits::JsonError::Conversion(_)));

  let error = WithoutT::from_json_str(r#"{"ghij": {}}"#).unwrap_err();
  let json_tree_traits::JsonError::Access(error) = error else { panic!("not an access error") };
  assert_eq!(error.key, json_tree_traits::Key::Field("ghij".to_string()));

  let error = WithoutT::from_json_str(r#"{"ghij": [1, true]}"#).unwrap_err();
  let json_tree_traits::JsonError::Access(error) = error else { panic!("not an access error") };
  assert_eq!(error.key, json_tree_traits::Key::Index(1));

  assert!(WithoutT::from_json(&Value::from(5)).is_err());
  assert_eq!(Empty::from_json_str("{}").unwrap(), Empty {});
  assert_eq!(Empty {}.to_json().to_json_string().unwrap(), "{}");
}
