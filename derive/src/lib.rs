#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::{borrow::Borrow, iter::Peekable, str::FromStr};

extern crate proc_macro;
use proc_macro::{Delimiter, Group, Spacing, Punct, TokenTree, TokenStream};

// `<` will not open a group, so we use this to take all items within a `< ... >` expression.
fn take_angle_expression(
  iter: &mut Peekable<impl Iterator<Item: Borrow<TokenTree>>>,
) -> TokenStream {
  {
    let Some(peeked) = iter.peek() else { return TokenStream::default() };
    let TokenTree::Punct(punct) = peeked.borrow() else { return TokenStream::default() };
    if punct.as_char() != '<' {
      return TokenStream::default();
    }
  }

  let mut result = vec![];
  let mut count = 0;
  loop {
    let item = iter.next().expect("`TokenTree` unexpectedly terminated when taking `< ... >`");
    result.push(item.borrow().clone());
    if let TokenTree::Punct(punct) = item.borrow() {
      let punct = punct.as_char();
      if punct == '<' {
        count += 1;
      }
      // `->` within a bound isn't a closing bracket
      if (punct == '>') && (punct_before(&result) != Some('-')) {
        count -= 1;
      }
      if count == 0 {
        break;
      }
    }
  }
  TokenStream::from_iter(result)
}

fn punct_before(items: &[TokenTree]) -> Option<char> {
  match items.len().checked_sub(2).map(|i| &items[i]) {
    Some(TokenTree::Punct(punct)) if punct.spacing() == Spacing::Joint => Some(punct.as_char()),
    _ => None,
  }
}

// Advance the iterator past the next `,` on this depth, if there is one.
fn skip_comma_delimited(iter: &mut Peekable<impl Iterator<Item: Borrow<TokenTree>>>) {
  loop {
    take_angle_expression(iter);
    let Some(item) = iter.next() else { return };
    if let TokenTree::Punct(punct) = item.borrow() {
      if punct.as_char() == ',' {
        return;
      }
    }
  }
}

struct Field {
  name: String,
  key: String,
}

struct Struct {
  generic_bounds: String,
  generics: String,
  name: String,
  fields: Vec<Field>,
}

// Read the options within a `#[json(...)]` attribute, returning the key it renames the field to.
fn parse_json_attribute(group: &Group, skip: &mut bool) -> Option<String> {
  let mut key = None;
  let mut options = group.stream().into_iter().peekable();
  while let Some(option) = options.next() {
    let TokenTree::Ident(option) = option else { continue };
    match option.to_string().as_str() {
      "skip" => *skip = true,
      "key" => {
        let Some(TokenTree::Group(group)) = options.next() else {
          panic!("`key` option not followed with `(...)`")
        };
        assert_eq!(
          group.delimiter(),
          Delimiter::Parenthesis,
          "`key` option with a non-parentheses group"
        );
        let mut literal = group.stream().into_iter();
        let Some(TokenTree::Literal(literal)) = literal.next() else {
          panic!("`key` option with a non-literal argument")
        };
        let literal = literal.to_string();
        assert!(
          literal.starts_with('"') && literal.ends_with('"') && (literal.len() >= 2),
          "`key` option's argument wasn't a string literal"
        );
        key = Some(literal[1 .. (literal.len() - 1)].to_string());
      }
      option => panic!("unknown `json` option `{option}`"),
    }
    skip_comma_delimited(&mut options);
  }
  key
}

// This is somewhat comparable to `syn::Generics`, especially its `split_for_impl` method.
fn parse_struct(object: TokenStream) -> Struct {
  let mut object = object.into_iter().peekable();

  // Skip the attributes and visibility preceding `struct`
  let name = loop {
    match object.next() {
      Some(TokenTree::Ident(ident)) if ident.to_string() == "struct" => match object.next() {
        Some(TokenTree::Ident(ident)) => break ident.to_string(),
        _ => panic!("derivation wasn't applied to a `struct` with a name"),
      },
      Some(TokenTree::Ident(ident)) if ["enum", "union"].contains(&ident.to_string().as_str()) => {
        panic!("derivation wasn't applied to a `struct`")
      }
      Some(_) => {}
      None => panic!("derivation wasn't applied to a `struct`"),
    }
  };

  let generic_bounds_tree = take_angle_expression(&mut object);

  let mut generics_tree = vec![];
  {
    let mut iter = generic_bounds_tree.clone().into_iter().peekable();
    while let Some(component) = iter.next() {
      // Take until the next colon, used to mark trait bounds
      if let TokenTree::Punct(punct) = &component {
        if punct.as_char() == ':' {
          // Skip the actual bounds
          skip_comma_delimited(&mut iter);
          // Add our own comma delimiter and move to the next item
          generics_tree.push(TokenTree::Punct(Punct::new(',', Spacing::Alone)));
          continue;
        }
      }
      // Push this component as it isn't part of the bounds
      generics_tree.push(component);
    }
  }
  // Ensure this is terminated, which it won't be if the last item had bounds yet didn't have a
  // trailing comma
  if let Some(last) = generics_tree.last() {
    match last {
      TokenTree::Punct(punct) if punct.as_char() == '>' => {}
      _ => generics_tree.push(TokenTree::Punct(Punct::new('>', Spacing::Alone))),
    }
  }

  let generic_bounds = generic_bounds_tree.to_string();
  let generics = TokenStream::from_iter(generics_tree).to_string();

  // This means we don't support `struct`s defined with `where` bounds
  let Some(TokenTree::Group(struct_body)) = object.next() else {
    panic!("`struct`'s name was not followed by its body");
  };
  if struct_body.delimiter() != Delimiter::Brace {
    panic!("derivation applied to `struct` without named fields");
  }

  let mut fields = vec![];

  let mut struct_body = struct_body.stream().into_iter().peekable();
  // Read each field within this `struct`'s body
  while struct_body.peek().is_some() {
    let mut key = None;
    let mut name = None;
    let mut skip = false;
    for item in &mut struct_body {
      // Handle the `json` attribute
      if let TokenTree::Group(group) = &item {
        if group.delimiter() == Delimiter::Bracket {
          let mut iter = group.stream().into_iter();
          if matches!(iter.next(), Some(TokenTree::Ident(ident)) if ident.to_string() == "json") {
            let Some(TokenTree::Group(options)) = iter.next() else {
              panic!("`json` attribute not followed with `(...)`")
            };
            key = parse_json_attribute(&options, &mut skip).or(key);
          }
        }
      }

      if let TokenTree::Ident(ident) = item {
        let ident = ident.to_string();
        // Skip the access modifier
        if ident == "pub" {
          continue;
        }
        // Use the field's actual name as its key, if not renamed
        key = key.or_else(|| Some(ident.trim_start_matches("r#").to_string()));
        name = Some(ident);
        break;
      }
    }
    let name = name.expect("couldn't find the name of the field within the `struct`");
    let key = key.expect("field name but no key?");

    if !skip {
      fields.push(Field { name, key });
    }

    // Advance to the next field
    skip_comma_delimited(&mut struct_body);
  }

  Struct { generic_bounds, generics, name, fields }
}

/// Derive an implementation of the `ToJson` trait, converting a `struct` to an object.
///
/// Each field is wrapped with `Tri::from`, so fields which are `Tri::None` are omitted and fields
/// which are `Tri::Null` are written as `null`. `Option::None` is always written as `null`.
///
/// Fields may be written with a distinct key using `#[json(key("key"))]`, and omitted with
/// `#[json(skip)]`.
///
/// As a procedural macro, this will panic causing a compile-time error on any unexpected input.
#[proc_macro_derive(ToJson, attributes(json))]
pub fn derive_to_json(object: TokenStream) -> TokenStream {
  let Struct { generic_bounds, generics, name, fields } = parse_struct(object);

  let mut fields_conversion = String::new();
  for Field { name, key } in &fields {
    fields_conversion.push_str(&format!(
      r#"
      match json_tree_traits::Tri::from(&self.{name}) {{
        json_tree_traits::Tri::Some(value) => {{
          object.insert("{key}", json_tree_traits::ToJson::to_json(value));
        }}
        json_tree_traits::Tri::Null => {{
          object.insert("{key}", json_tree_traits::Value::Null);
        }}
        json_tree_traits::Tri::None => {{}}
      }}
      "#
    ));
  }

  TokenStream::from_str(&format!(
    r#"
    impl{generic_bounds} json_tree_traits::ToJson for {name}{generics} {{
      fn to_json(&self) -> json_tree_traits::Value {{
        #[allow(unused_mut)]
        let mut object = json_tree_traits::Object::with_capacity({});
        {fields_conversion}
        json_tree_traits::Value::Object(object)
      }}
    }}
    "#,
    fields.len(),
  ))
  .expect("typo in implementation of `ToJson`")
}

/// Derive an implementation of the `FromJson` trait, reading a `struct` from an object.
///
/// This _requires_ the `struct` derived for implement `Default`. Fields which aren't present in
/// the object will be left to their `Default` initialization. If you wish to detect if a field was
/// omitted, please wrap it in `Tri`. Errors converting a field are attributed to its key.
///
/// Fields may be read from a distinct key using `#[json(key("key"))]`, and omitted with
/// `#[json(skip)]`.
///
/// As a procedural macro, this will panic causing a compile-time error on any unexpected input.
#[proc_macro_derive(FromJson, attributes(json))]
pub fn derive_from_json(object: TokenStream) -> TokenStream {
  let Struct { generic_bounds, generics, name, fields } = parse_struct(object);

  let mut fields_conversion = String::new();
  for Field { name, key } in &fields {
    fields_conversion.push_str(&format!(
      r#"
      if let Some(value) = json_tree_traits::Container::opt(object, "{key}") {{
        result.{name} = json_tree_traits::FromJson::from_json(value).map_err(|e| e.at("{key}"))?;
      }}
      "#
    ));
  }

  TokenStream::from_str(&format!(
    r#"
    impl{generic_bounds} json_tree_traits::FromJson for {name}{generics}
      where Self: core::default::Default {{
      fn from_json(
        value: &json_tree_traits::Value,
      ) -> Result<Self, json_tree_traits::JsonError> {{
        #[allow(unused_variables)]
        let Some(object) = value.as_object() else {{
          return Err(json_tree_traits::JsonError::Access(json_tree_traits::AccessError {{
            key: json_tree_traits::Key::Root,
            kind: json_tree_traits::AccessErrorKind::WrongType {{
              expected: "object",
              found: value.kind(),
            }},
          }}));
        }};

        #[allow(unused_mut)]
        let mut result = <Self as core::default::Default>::default();
        {fields_conversion}
        Ok(result)
      }}
    }}
    "#
  ))
  .expect("typo in implementation of `FromJson`")
}
