//! Custom serde Serializer that flattens a parsed document into dotted
//! key-value pairs of raw choice values.
//!
//! Every scalar becomes a string (`19` → `"19"`, `1.0` → `"1.0"`, `true` →
//! `"true"`, null → `""`). Sequences of scalars become [`Value::List`]. Mappings recurse, joining
//! keys with dots. A sequence that holds a mapping or another sequence cannot
//! be represented as a raw value and is rejected.
//!
//! Only the shapes YAML, TOML and JSON values produce are handled. Tuples,
//! enum variants with data and byte strings are refused.

use serde::ser::{self, Serialize};

use crate::value::Value;

/// Flatten any `Serialize` document into dotted key-value pairs.
///
/// `{database: {url: "pg://"}, files: [a, b]}` →
/// `[("database.url", String("pg://")), ("files", List(["a", "b"]))]`
pub fn flatten<S: Serialize + ?Sized>(source: &S) -> Result<Vec<(String, Value)>, FlattenError> {
    let mut out = Vec::new();
    let serializer = FlattenSerializer {
        prefix: String::new(),
        out: &mut out,
    };
    source.serialize(serializer)?;
    Ok(out)
}

#[derive(Debug)]
pub struct FlattenError(String);

impl std::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for FlattenError {}

impl ser::Error for FlattenError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        FlattenError(msg.to_string())
    }
}

fn top_level_scalar() -> FlattenError {
    FlattenError("expected a mapping of names to values at the top level".into())
}

fn unsupported(what: &str) -> FlattenError {
    FlattenError(format!("{what} are not supported"))
}

// Debug keeps the fraction of integral floats: `1.0`, not `1`.
fn float_text(v: f64) -> String {
    format!("{v:?}")
}

// toml's Datetime serializes as a one-field struct under this private name.
const TOML_DATETIME_FIELD: &str = "$__toml_private_datetime";

struct FlattenSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Value)>,
}

impl FlattenSerializer<'_> {
    fn emit(self, text: String) -> Result<(), FlattenError> {
        if self.prefix.is_empty() {
            return Err(top_level_scalar());
        }
        self.out.push((self.prefix, Value::String(text)));
        Ok(())
    }
}

impl<'a> ser::Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;
    type SerializeSeq = FlattenSeqSerializer<'a>;
    type SerializeTuple = ser::Impossible<(), FlattenError>;
    type SerializeTupleStruct = ser::Impossible<(), FlattenError>;
    type SerializeTupleVariant = ser::Impossible<(), FlattenError>;
    type SerializeMap = FlattenMapSerializer<'a>;
    type SerializeStruct = FlattenStructSerializer<'a>;
    type SerializeStructVariant = ser::Impossible<(), FlattenError>;

    fn serialize_bool(self, v: bool) -> Result<(), Self::Error> {
        self.emit(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<(), Self::Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<(), Self::Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<(), Self::Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<(), Self::Error> {
        self.emit(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<(), Self::Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<(), Self::Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<(), Self::Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<(), Self::Error> {
        self.emit(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        self.emit(format!("{v:?}"))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        self.emit(float_text(v))
    }

    fn serialize_char(self, v: char) -> Result<(), Self::Error> {
        self.emit(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<(), Self::Error> {
        self.emit(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Self::Error> {
        Err(unsupported("binary values"))
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        // An empty document (`---` alone) is an empty set of choices.
        if self.prefix.is_empty() {
            return Ok(());
        }
        self.emit(String::new())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        self.serialize_none()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Err(unsupported("enum variants"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        if self.prefix.is_empty() {
            return Err(top_level_scalar());
        }
        Ok(FlattenSeqSerializer {
            prefix: self.prefix,
            out: self.out,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(unsupported("tuples"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(unsupported("tuples"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(unsupported("enum variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(FlattenMapSerializer {
            prefix: self.prefix,
            out: self.out,
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(FlattenStructSerializer {
            prefix: self.prefix,
            out: self.out,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(unsupported("enum variants"))
    }
}

fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

// --- SerializeStruct ---

struct FlattenStructSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Value)>,
}

impl ser::SerializeStruct for FlattenStructSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let prefix = if key == TOML_DATETIME_FIELD {
            self.prefix.clone()
        } else {
            dotted(&self.prefix, key)
        };
        value.serialize(FlattenSerializer {
            prefix,
            out: self.out,
        })
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// --- SerializeMap ---

struct FlattenMapSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Value)>,
    current_key: Option<String>,
}

impl ser::SerializeMap for FlattenMapSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.current_key = Some(key.serialize(ScalarSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| FlattenError("map value without a key".into()))?;
        value.serialize(FlattenSerializer {
            prefix: dotted(&self.prefix, &key),
            out: self.out,
        })
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// --- SerializeSeq (lists of scalars) ---

struct FlattenSeqSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Value)>,
    items: Vec<String>,
}

impl ser::SerializeSeq for FlattenSeqSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let item = value.serialize(ScalarSerializer).map_err(|_| {
            FlattenError(format!(
                "'{}' holds a list with nested collections, which is not supported",
                self.prefix
            ))
        })?;
        self.items.push(item);
        Ok(())
    }

    fn end(self) -> Result<(), Self::Error> {
        self.out.push((self.prefix, Value::List(self.items)));
        Ok(())
    }
}

// --- Scalar serializer (map keys and list elements) ---

struct ScalarSerializer;

fn not_scalar() -> FlattenError {
    FlattenError("expected a single value".into())
}

impl ser::Serializer for ScalarSerializer {
    type Ok = String;
    type Error = FlattenError;
    type SerializeSeq = ser::Impossible<String, FlattenError>;
    type SerializeTuple = ser::Impossible<String, FlattenError>;
    type SerializeTupleStruct = ser::Impossible<String, FlattenError>;
    type SerializeTupleVariant = ser::Impossible<String, FlattenError>;
    type SerializeMap = ser::Impossible<String, FlattenError>;
    type SerializeStruct = ScalarStructSerializer;
    type SerializeStructVariant = ser::Impossible<String, FlattenError>;

    fn serialize_bool(self, v: bool) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_i8(self, v: i8) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_i16(self, v: i16) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_i32(self, v: i32) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_i64(self, v: i64) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_u8(self, v: u8) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_u16(self, v: u16) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_u32(self, v: u32) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_u64(self, v: u64) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_f32(self, v: f32) -> Result<String, Self::Error> {
        Ok(format!("{v:?}"))
    }
    fn serialize_f64(self, v: f64) -> Result<String, Self::Error> {
        Ok(float_text(v))
    }
    fn serialize_char(self, v: char) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_str(self, v: &str) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_none(self) -> Result<String, Self::Error> {
        Ok(String::new())
    }
    fn serialize_some<T: Serialize + ?Sized>(self, v: &T) -> Result<String, Self::Error> {
        v.serialize(self)
    }
    fn serialize_unit(self) -> Result<String, Self::Error> {
        Ok(String::new())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<String, Self::Error> {
        Ok(String::new())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        v: &'static str,
    ) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        v: &T,
    ) -> Result<String, Self::Error> {
        v.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(ScalarStructSerializer { text: None })
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_scalar())
    }
}

/// Accepts only the datetime wrapper toml uses inside arrays.
struct ScalarStructSerializer {
    text: Option<String>,
}

impl ser::SerializeStruct for ScalarStructSerializer {
    type Ok = String;
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        if key != TOML_DATETIME_FIELD {
            return Err(not_scalar());
        }
        self.text = Some(value.serialize(ScalarSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<String, Self::Error> {
        self.text.ok_or_else(not_scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn yaml(text: &str) -> Vec<(String, Value)> {
        let doc: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
        flatten(&doc).unwrap()
    }

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn scalars_become_strings() {
        let pairs = yaml("connections: 19\nssh: true\nname: box\nrate: 1.5\n");
        assert_eq!(
            pairs,
            vec![
                ("connections".into(), s("19")),
                ("ssh".into(), s("true")),
                ("name".into(), s("box")),
                ("rate".into(), s("1.5")),
            ]
        );
    }

    #[test]
    fn integral_floats_keep_their_fraction() {
        let pairs = yaml("version: 1.0\nratio: 2.50\nversions: [1.0, 2.0]\n");
        assert_eq!(
            pairs,
            vec![
                ("version".into(), s("1.0")),
                ("ratio".into(), s("2.5")),
                ("versions".into(), Value::List(vec!["1.0".into(), "2.0".into()])),
            ]
        );
    }

    #[test]
    fn toml_integral_float_keeps_its_fraction() {
        let table: toml::Table = toml::from_str("version = 1.0\n").unwrap();
        assert_eq!(flatten(&table).unwrap(), vec![("version".into(), s("1.0"))]);
    }

    #[test]
    fn tuples_rejected() {
        let mut map = BTreeMap::new();
        map.insert("pair", (1, 2));
        assert!(flatten(&map).is_err());
    }

    #[test]
    fn lists_keep_elements_as_strings() {
        let pairs = yaml("files:\n  - one\n  - 2\n");
        assert_eq!(
            pairs,
            vec![("files".into(), Value::List(vec!["one".into(), "2".into()]))]
        );
    }

    #[test]
    fn nested_mappings_use_dotted_keys() {
        let pairs = yaml("database:\n  url: pg://\n  pool: 5\n");
        assert_eq!(
            pairs,
            vec![("database.url".into(), s("pg://")), ("database.pool".into(), s("5"))]
        );
    }

    #[test]
    fn null_becomes_empty_string() {
        let pairs = yaml("name:\n");
        assert_eq!(pairs, vec![("name".into(), s(""))]);
    }

    #[test]
    fn null_document_is_empty() {
        assert!(flatten(&serde_yaml::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let pairs = yaml("8080: web\n");
        assert_eq!(pairs, vec![("8080".into(), s("web"))]);
    }

    #[test]
    fn list_of_mappings_rejected() {
        let doc: serde_yaml::Value = serde_yaml::from_str("files:\n  - name: a\n").unwrap();
        let err = flatten(&doc).unwrap_err();
        assert!(err.to_string().contains("'files'"));
    }

    #[test]
    fn top_level_scalar_rejected() {
        let doc: serde_yaml::Value = serde_yaml::from_str("just a string").unwrap();
        assert!(flatten(&doc).is_err());
    }

    #[test]
    fn toml_datetime_flattens_to_its_text() {
        let table: toml::Table = toml::from_str("when = 1979-05-27T07:32:00Z\n").unwrap();
        let pairs = flatten(&table).unwrap();
        assert_eq!(pairs, vec![("when".into(), s("1979-05-27T07:32:00Z"))]);
    }

    #[test]
    fn plain_map_input() {
        let mut map = BTreeMap::new();
        map.insert("host".to_string(), "0.0.0.0".to_string());
        assert_eq!(flatten(&map).unwrap(), vec![("host".into(), s("0.0.0.0"))]);
    }
}
