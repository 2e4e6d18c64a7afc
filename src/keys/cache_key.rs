//! Cache Key Module
//!
//! Default key type and the serialization-based derivation strategy.

use std::fmt;

use serde::ser::{self, Impossible, Serializer};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;

// == Cache Key ==
/// Key produced by the default derivation strategy.
///
/// A single primitive argument passes through as a scalar variant. Anything
/// else is rendered to compact JSON and stored as `Serialized`, so two values
/// with the same serialized shape share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// `()` or `None`
    Null,
    Bool(bool),
    /// Number in its JSON textual form, integral floats written as integers.
    /// Non-finite floats are `NaN`, `Infinity` and `-Infinity`.
    Number(String),
    String(String),
    /// Compact JSON of a composite argument value
    Serialized(String),
}

impl CacheKey {
    // == Derive ==
    /// Derives the key for an argument value.
    ///
    /// Object keys come out sorted, so maps with equal content produce equal
    /// keys whatever their iteration order. Integral floats key like the
    /// equal integer. A single non-finite float keeps a key of its own, while
    /// inside a composite value it is written as JSON `null`. Serialization
    /// failures (such as a map keyed by a non-string type) are returned as
    /// [`MemoError::KeySerialization`](crate::MemoError::KeySerialization).
    pub fn from_args<A>(args: &A) -> Result<Self>
    where
        A: Serialize + ?Sized,
    {
        let key = match serde_json::to_value(args)? {
            Value::Null => match args.serialize(LoneFloat) {
                Ok(Some(float)) if !float.is_finite() => non_finite(float),
                _ => CacheKey::Null,
            },
            Value::Bool(b) => CacheKey::Bool(b),
            Value::Number(n) => CacheKey::Number(normalize_number(n).to_string()),
            Value::String(s) => CacheKey::String(s),
            mut composite => {
                normalize_numbers(&mut composite);
                CacheKey::Serialized(serde_json::to_string(&composite)?)
            }
        };

        Ok(key)
    }

    /// Returns true if the key is a passthrough of a single primitive.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, CacheKey::Serialized(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Null => f.write_str("null"),
            CacheKey::Bool(b) => write!(f, "{}", b),
            CacheKey::Number(n) => f.write_str(n),
            CacheKey::String(s) => write!(f, "{:?}", s),
            CacheKey::Serialized(json) => f.write_str(json),
        }
    }
}

// Largest magnitude below which every integral f64 is an exact i64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn non_finite(float: f64) -> CacheKey {
    let text = if float.is_nan() {
        "NaN"
    } else if float > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    };
    CacheKey::Number(text.to_string())
}

/// Rewrites an integral float as the equal integer, `-0.0` as `0`.
fn normalize_number(n: Number) -> Number {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            Number::from(f as i64)
        }
        _ => n,
    }
}

fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => *n = normalize_number(n.clone()),
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

// == Lone Float ==
/// Serializer that only recognizes a lone float, looking through `Some` and
/// newtype wrappers. Used once JSON has already collapsed the value to null.
struct LoneFloat;

fn not_a_float<T>() -> std::result::Result<T, serde_json::Error> {
    Err(ser::Error::custom("not a float"))
}

impl Serializer for LoneFloat {
    type Ok = Option<f64>;
    type Error = serde_json::Error;
    type SerializeSeq = Impossible<Option<f64>, serde_json::Error>;
    type SerializeTuple = Impossible<Option<f64>, serde_json::Error>;
    type SerializeTupleStruct = Impossible<Option<f64>, serde_json::Error>;
    type SerializeTupleVariant = Impossible<Option<f64>, serde_json::Error>;
    type SerializeMap = Impossible<Option<f64>, serde_json::Error>;
    type SerializeStruct = Impossible<Option<f64>, serde_json::Error>;
    type SerializeStructVariant = Impossible<Option<f64>, serde_json::Error>;

    fn serialize_f32(self, v: f32) -> std::result::Result<Option<f64>, serde_json::Error> {
        Ok(Some(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> std::result::Result<Option<f64>, serde_json::Error> {
        Ok(Some(v))
    }

    fn serialize_some<T>(self, value: &T) -> std::result::Result<Option<f64>, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> std::result::Result<Option<f64>, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_none(self) -> std::result::Result<Option<f64>, serde_json::Error> {
        Ok(None)
    }

    fn serialize_unit(self) -> std::result::Result<Option<f64>, serde_json::Error> {
        Ok(None)
    }

    fn serialize_unit_struct(
        self,
        _name: &'static str,
    ) -> std::result::Result<Option<f64>, serde_json::Error> {
        Ok(None)
    }

    fn serialize_bool(self, _v: bool) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_i8(self, _v: i8) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_i16(self, _v: i16) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_i32(self, _v: i32) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_i64(self, _v: i64) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_u8(self, _v: u8) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_u16(self, _v: u16) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_u32(self, _v: u32) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_u64(self, _v: u64) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_char(self, _v: char) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_str(self, _v: &str) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_bytes(self, _v: &[u8]) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> std::result::Result<Option<f64>, serde_json::Error> {
        not_a_float()
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> std::result::Result<Option<f64>, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        not_a_float()
    }

    fn serialize_seq(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, serde_json::Error> {
        not_a_float()
    }

    fn serialize_tuple(
        self,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTuple, serde_json::Error> {
        not_a_float()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, serde_json::Error> {
        not_a_float()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, serde_json::Error> {
        not_a_float()
    }

    fn serialize_map(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, serde_json::Error> {
        not_a_float()
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStruct, serde_json::Error> {
        not_a_float()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, serde_json::Error> {
        not_a_float()
    }
}
