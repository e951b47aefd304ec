//! Order-preserving field codecs.
//!
//! A [`Field`] encodes one typed component of a composite key or value into
//! bytes such that lexicographic comparison of the encodings matches the
//! natural order of the values (or exactly inverts it, for descending
//! variants). Composite keys are the plain concatenation of their field
//! encodings, so every codec is either fixed-width or self-delimiting.
//!
//! # Encoding design
//!
//! - **Unsigned integers** are stored big-endian at their declared width
//!   (1, 2, 4, or 8 bytes). Descending variants bit-complement the ascending
//!   encoding, which inverts the byte order relation.
//! - **Text and bytes** use null-escaped encoding: `0x00` in the data becomes
//!   `0x00 0x01`, and the sequence ends with the `0x00 0x00` terminator. This
//!   preserves lexicographic order (`"a" < "aa" < "b"`) and keeps the
//!   encoding self-delimiting inside a larger key.
//! - **Identifiers** are fixed 16-byte blobs stored verbatim.
//! - **Serialized fields** carry caller-supplied dump/load closures and are
//!   length-prefixed. They have no ordering contract and may only be used as
//!   value fields.

use std::fmt;
use std::sync::Arc;

use crate::error::CoreError;
use crate::value::Value;

/// Escape byte: `0x00` in the data is written as `0x00 0x01`.
const ESCAPE_BYTE: u8 = 0x01;
/// Terminator: end of a text/bytes field is marked by `0x00 0x00`.
const TERMINATOR: u8 = 0x00;

/// Declared width of an unsigned-integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// One byte (0..=255).
    U8,
    /// Two bytes.
    U16,
    /// Four bytes.
    U32,
    /// Eight bytes.
    U64,
}

impl IntWidth {
    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Largest representable value at this width.
    #[must_use]
    pub const fn max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX,
        }
    }
}

/// Caller-supplied encode half of a serialized field.
pub type DumpFn = Arc<dyn Fn(&Value) -> Result<Vec<u8>, CoreError> + Send + Sync>;
/// Caller-supplied decode half of a serialized field.
pub type LoadFn = Arc<dyn Fn(&[u8]) -> Result<Value, CoreError> + Send + Sync>;

/// One typed field of a composite key or value.
#[derive(Clone)]
pub enum Field {
    /// Unsigned fixed-width integer, optionally descending.
    UInt {
        /// Declared width.
        width: IntWidth,
        /// When set, the ascending encoding is bit-complemented so larger
        /// values sort first.
        descending: bool,
    },
    /// UTF-8 text, null-escaped and terminated.
    Str,
    /// Raw bytes, null-escaped and terminated.
    Bytes,
    /// Fixed-length 16-byte binary identifier.
    Id,
    /// Opaque payload with caller-supplied dump/load. No ordering contract;
    /// value fields only.
    Serialized {
        /// Encodes a payload to bytes.
        dump: DumpFn,
        /// Decodes stored bytes back into a payload.
        load: LoadFn,
    },
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt { width, descending } => {
                f.debug_struct("UInt").field("width", width).field("descending", descending).finish()
            }
            Self::Str => f.write_str("Str"),
            Self::Bytes => f.write_str("Bytes"),
            Self::Id => f.write_str("Id"),
            Self::Serialized { .. } => f.write_str("Serialized"),
        }
    }
}

impl Field {
    /// Ascending 1-byte unsigned integer.
    #[must_use]
    pub const fn u8() -> Self {
        Self::UInt { width: IntWidth::U8, descending: false }
    }

    /// Ascending 2-byte unsigned integer.
    #[must_use]
    pub const fn u16() -> Self {
        Self::UInt { width: IntWidth::U16, descending: false }
    }

    /// Ascending 4-byte unsigned integer.
    #[must_use]
    pub const fn u32() -> Self {
        Self::UInt { width: IntWidth::U32, descending: false }
    }

    /// Ascending 8-byte unsigned integer.
    #[must_use]
    pub const fn u64() -> Self {
        Self::UInt { width: IntWidth::U64, descending: false }
    }

    /// Descending 1-byte unsigned integer.
    #[must_use]
    pub const fn u8_rev() -> Self {
        Self::UInt { width: IntWidth::U8, descending: true }
    }

    /// Descending 2-byte unsigned integer.
    #[must_use]
    pub const fn u16_rev() -> Self {
        Self::UInt { width: IntWidth::U16, descending: true }
    }

    /// Descending 4-byte unsigned integer.
    #[must_use]
    pub const fn u32_rev() -> Self {
        Self::UInt { width: IntWidth::U32, descending: true }
    }

    /// Descending 8-byte unsigned integer.
    #[must_use]
    pub const fn u64_rev() -> Self {
        Self::UInt { width: IntWidth::U64, descending: true }
    }

    /// UTF-8 text field.
    #[must_use]
    pub const fn string() -> Self {
        Self::Str
    }

    /// Raw bytes field.
    #[must_use]
    pub const fn bytes() -> Self {
        Self::Bytes
    }

    /// Fixed-length 16-byte identifier field.
    #[must_use]
    pub const fn id() -> Self {
        Self::Id
    }

    /// Serialized field with caller-supplied dump/load closures.
    pub fn serialized(
        dump: impl Fn(&Value) -> Result<Vec<u8>, CoreError> + Send + Sync + 'static,
        load: impl Fn(&[u8]) -> Result<Value, CoreError> + Send + Sync + 'static,
    ) -> Self {
        Self::Serialized { dump: Arc::new(dump), load: Arc::new(load) }
    }

    /// Serialized field backed by JSON. Payloads are [`Value::Json`].
    #[must_use]
    pub fn json() -> Self {
        Self::serialized(
            |value| match value {
                Value::Json(payload) => serde_json::to_vec(payload)
                    .map_err(|e| CoreError::domain(format!("unserializable json payload: {e}"))),
                other => Err(CoreError::domain(format!(
                    "json field expects a json payload, got {}",
                    other.kind()
                ))),
            },
            |bytes| {
                serde_json::from_slice(bytes)
                    .map(Value::Json)
                    .map_err(|e| CoreError::decode(format!("invalid json payload: {e}")))
            },
        )
    }

    /// Width in bytes for fixed-width codecs, `None` for variable-width ones.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::UInt { width, .. } => Some(width.bytes()),
            Self::Id => Some(16),
            Self::Str | Self::Bytes | Self::Serialized { .. } => None,
        }
    }

    /// Whether the encoding carries an ordering contract. Serialized fields
    /// do not, and are therefore rejected as key fields.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        !matches!(self, Self::Serialized { .. })
    }

    /// Whether this field's layout matches another's, ignoring serialized
    /// closures. Used for idempotent keyspace re-registration.
    #[must_use]
    pub fn compatible_with(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::UInt { width: w1, descending: d1 },
                Self::UInt { width: w2, descending: d2 },
            ) => w1 == w2 && d1 == d2,
            (Self::Str, Self::Str)
            | (Self::Bytes, Self::Bytes)
            | (Self::Id, Self::Id)
            | (Self::Serialized { .. }, Self::Serialized { .. }) => true,
            _ => false,
        }
    }

    /// Encode one value into `buf`.
    ///
    /// Text and bytes input are accepted interchangeably for `Str` and
    /// `Bytes` fields: both normalize to the same byte form, so a caller may
    /// query with either representation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Domain`] when the value does not fit the field's
    /// type or declared range.
    pub fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        match self {
            Self::UInt { width, descending } => {
                let n = uint_of(value)?;
                if n > width.max() {
                    return Err(CoreError::domain(format!(
                        "{n} exceeds the maximum of a {}-byte field",
                        width.bytes()
                    )));
                }
                encode_uint(n, *width, *descending, buf);
                Ok(())
            }
            Self::Str | Self::Bytes => {
                encode_escaped(text_bytes_of(value)?, buf);
                Ok(())
            }
            Self::Id => {
                buf.extend_from_slice(&id_of(value)?);
                Ok(())
            }
            Self::Serialized { dump, .. } => {
                let payload = dump(value)?;
                let len = u32::try_from(payload.len())
                    .map_err(|_| CoreError::domain("serialized payload exceeds 4 GiB"))?;
                buf.extend_from_slice(&len.to_be_bytes());
                buf.extend_from_slice(&payload);
                Ok(())
            }
        }
    }

    /// Encode a value as a raw byte prefix: like [`Field::encode`] but text
    /// and bytes omit their terminator, so the result is a leading
    /// subsequence of every full encoding it prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Domain`] for out-of-range values or for
    /// serialized fields, which have no ordering to prefix-match against.
    pub fn encode_prefix(&self, value: &Value, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        match self {
            Self::Str | Self::Bytes => {
                encode_escaped_open(text_bytes_of(value)?, buf);
                Ok(())
            }
            Self::Serialized { .. } => {
                Err(CoreError::domain("serialized fields cannot be used in scan prefixes"))
            }
            _ => self.encode(value, buf),
        }
    }

    /// Decode one value from the front of `bytes`, returning it together
    /// with the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on truncated or malformed input, or
    /// when a serialized field's `load` rejects its payload.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Value, usize), CoreError> {
        match self {
            Self::UInt { width, descending } => {
                let w = width.bytes();
                if bytes.len() < w {
                    return Err(CoreError::decode("unexpected end of input reading uint"));
                }
                Ok((Value::UInt(decode_uint(&bytes[..w], *descending)), w))
            }
            Self::Str => {
                let (raw, consumed) = decode_escaped(bytes)?;
                let s = String::from_utf8(raw)
                    .map_err(|e| CoreError::decode(format!("invalid UTF-8 in text field: {e}")))?;
                Ok((Value::Str(s), consumed))
            }
            Self::Bytes => {
                let (raw, consumed) = decode_escaped(bytes)?;
                Ok((Value::Bytes(raw), consumed))
            }
            Self::Id => {
                if bytes.len() < 16 {
                    return Err(CoreError::decode("unexpected end of input reading id"));
                }
                let mut id = [0u8; 16];
                id.copy_from_slice(&bytes[..16]);
                Ok((Value::Id(id), 16))
            }
            Self::Serialized { load, .. } => {
                if bytes.len() < 4 {
                    return Err(CoreError::decode("missing length prefix on serialized field"));
                }
                let mut len_bytes = [0u8; 4];
                len_bytes.copy_from_slice(&bytes[..4]);
                let len = u32::from_be_bytes(len_bytes) as usize;
                if bytes.len() < 4 + len {
                    return Err(CoreError::decode("truncated serialized field"));
                }
                let value = load(&bytes[4..4 + len])?;
                Ok((value, 4 + len))
            }
        }
    }
}

fn uint_of(value: &Value) -> Result<u64, CoreError> {
    match value {
        Value::UInt(n) => Ok(*n),
        other => Err(CoreError::domain(format!("expected uint, got {}", other.kind()))),
    }
}

fn text_bytes_of(value: &Value) -> Result<&[u8], CoreError> {
    match value {
        Value::Str(s) => Ok(s.as_bytes()),
        Value::Bytes(b) => Ok(b),
        other => Err(CoreError::domain(format!("expected str or bytes, got {}", other.kind()))),
    }
}

fn id_of(value: &Value) -> Result<[u8; 16], CoreError> {
    match value {
        Value::Id(id) => Ok(*id),
        Value::Bytes(b) => <[u8; 16]>::try_from(b.as_slice())
            .map_err(|_| CoreError::domain(format!("id fields require 16 bytes, got {}", b.len()))),
        other => Err(CoreError::domain(format!("expected id, got {}", other.kind()))),
    }
}

fn encode_uint(n: u64, width: IntWidth, descending: bool, buf: &mut Vec<u8>) {
    let be = n.to_be_bytes();
    let start = 8 - width.bytes();
    if descending {
        buf.extend(be[start..].iter().map(|b| !b));
    } else {
        buf.extend_from_slice(&be[start..]);
    }
}

fn decode_uint(bytes: &[u8], descending: bool) -> u64 {
    let mut be = [0u8; 8];
    let start = 8 - bytes.len();
    for (dst, src) in be[start..].iter_mut().zip(bytes) {
        *dst = if descending { !*src } else { *src };
    }
    u64::from_be_bytes(be)
}

/// Null-escaped encoding without the terminator.
fn encode_escaped_open(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
}

/// Null-escaped encoding, terminated with `0x00 0x00`.
fn encode_escaped(data: &[u8], buf: &mut Vec<u8>) {
    encode_escaped_open(data, buf);
    buf.push(TERMINATOR);
    buf.push(TERMINATOR);
}

/// Decode a null-escaped sequence, returning the data and bytes consumed.
fn decode_escaped(data: &[u8]) -> Result<(Vec<u8>, usize), CoreError> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] == 0x00 {
            if i + 1 >= data.len() {
                return Err(CoreError::decode("unexpected end of escaped bytes"));
            }
            match data[i + 1] {
                TERMINATOR => return Ok((result, i + 2)),
                ESCAPE_BYTE => {
                    result.push(0x00);
                    i += 2;
                }
                other => {
                    return Err(CoreError::decode(format!(
                        "invalid escape sequence: 0x00 0x{other:02x}"
                    )));
                }
            }
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    Err(CoreError::decode("missing terminator in escaped bytes"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(field: &Field, value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        field.encode(value, &mut buf).unwrap();
        buf
    }

    // ========================================================================
    // Round-trip tests
    // ========================================================================

    #[test]
    fn roundtrip_uint_widths() {
        for field in [Field::u8(), Field::u16(), Field::u32(), Field::u64()] {
            let max = match field {
                Field::UInt { width, .. } => width.max(),
                _ => unreachable!(),
            };
            for n in [0, 1, max / 2, max] {
                let buf = encode(&field, &Value::UInt(n));
                let (decoded, consumed) = field.decode(&buf).unwrap();
                assert_eq!(decoded, Value::UInt(n));
                assert_eq!(consumed, buf.len());
            }
        }
    }

    #[test]
    fn roundtrip_uint_descending() {
        let field = Field::u16_rev();
        for n in [0u64, 1, 255, 65535] {
            let buf = encode(&field, &Value::UInt(n));
            assert_eq!(field.decode(&buf).unwrap().0, Value::UInt(n));
        }
    }

    #[test]
    fn roundtrip_str() {
        for s in ["", "a", "hello", "日本語", "with\u{0}null"] {
            let buf = encode(&Field::string(), &Value::Str(s.into()));
            let (decoded, consumed) = Field::string().decode(&buf).unwrap();
            assert_eq!(decoded, Value::Str(s.into()));
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn roundtrip_bytes() {
        for b in [vec![], vec![0u8], vec![0, 0, 0], vec![255, 0, 128]] {
            let buf = encode(&Field::bytes(), &Value::Bytes(b.clone()));
            assert_eq!(Field::bytes().decode(&buf).unwrap().0, Value::Bytes(b));
        }
    }

    #[test]
    fn roundtrip_id() {
        let id = [7u8; 16];
        let buf = encode(&Field::id(), &Value::Id(id));
        assert_eq!(buf.len(), 16);
        assert_eq!(Field::id().decode(&buf).unwrap().0, Value::Id(id));
    }

    #[test]
    fn roundtrip_json() {
        let field = Field::json();
        let payload = Value::Json(serde_json::json!({"foo": "bar", "baz": 1}));
        let buf = encode(&field, &payload);
        assert_eq!(field.decode(&buf).unwrap().0, payload);
    }

    // ========================================================================
    // Order preservation
    // ========================================================================

    #[test]
    fn uint_ascending_order() {
        let field = Field::u32();
        let values = [0u64, 1, 2, 255, 256, 65536, u32::MAX as u64];
        for pair in values.windows(2) {
            let a = encode(&field, &Value::UInt(pair[0]));
            let b = encode(&field, &Value::UInt(pair[1]));
            assert!(a < b, "{} should encode below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn uint_descending_inverts_order() {
        let field = Field::u16_rev();
        let a = encode(&field, &Value::UInt(3));
        let b = encode(&field, &Value::UInt(900));
        assert!(a > b, "descending codec must invert the byte order");
    }

    #[test]
    fn str_lexicographic_order() {
        let field = Field::string();
        let values = ["", "a", "aa", "ab", "b", "ba"];
        for pair in values.windows(2) {
            let a = encode(&field, &Value::Str(pair[0].into()));
            let b = encode(&field, &Value::Str(pair[1].into()));
            assert!(a < b, "{:?} should encode below {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn bytes_with_nulls_keep_order() {
        let field = Field::bytes();
        let values: [&[u8]; 5] = [b"", b"\x00", b"\x00\x00", b"\x00\x01", b"\x01"];
        for pair in values.windows(2) {
            let a = encode(&field, &Value::Bytes(pair[0].to_vec()));
            let b = encode(&field, &Value::Bytes(pair[1].to_vec()));
            assert!(a < b, "{:?} should encode below {:?}", pair[0], pair[1]);
        }
    }

    // ========================================================================
    // Domain and decode errors
    // ========================================================================

    #[test]
    fn uint_out_of_range_is_domain_error() {
        let mut buf = Vec::new();
        let err = Field::u8().encode(&Value::UInt(256), &mut buf).unwrap_err();
        assert!(matches!(err, CoreError::Domain(_)));
    }

    #[test]
    fn wrong_type_is_domain_error() {
        let mut buf = Vec::new();
        let err = Field::u16().encode(&Value::Str("x".into()), &mut buf).unwrap_err();
        assert!(matches!(err, CoreError::Domain(_)));
    }

    #[test]
    fn id_requires_sixteen_bytes() {
        let mut buf = Vec::new();
        let err = Field::id().encode(&Value::Bytes(vec![1, 2, 3]), &mut buf).unwrap_err();
        assert!(matches!(err, CoreError::Domain(_)));
    }

    #[test]
    fn truncated_input_is_decode_error() {
        assert!(matches!(Field::u64().decode(&[0, 0]), Err(CoreError::Decode(_))));
        assert!(matches!(Field::string().decode(b"abc"), Err(CoreError::Decode(_))));
        assert!(matches!(Field::id().decode(&[0; 8]), Err(CoreError::Decode(_))));
    }

    #[test]
    fn failing_load_is_decode_error() {
        let field = Field::json();
        // length prefix of 3, followed by bytes that are not valid JSON
        let mut buf = 3u32.to_be_bytes().to_vec();
        buf.extend_from_slice(b"\xff\xfe\xfd");
        assert!(matches!(field.decode(&buf), Err(CoreError::Decode(_))));
    }

    // ========================================================================
    // Interchangeable text/bytes input
    // ========================================================================

    #[test]
    fn str_and_bytes_input_normalize_identically() {
        let text = encode(&Field::string(), &Value::Str("hello".into()));
        let raw = encode(&Field::string(), &Value::Bytes(b"hello".to_vec()));
        assert_eq!(text, raw);

        let text = encode(&Field::bytes(), &Value::Str("hello".into()));
        let raw = encode(&Field::bytes(), &Value::Bytes(b"hello".to_vec()));
        assert_eq!(text, raw);
    }

    #[test]
    fn prefix_encoding_is_a_leading_subsequence() {
        let full = encode(&Field::string(), &Value::Str("log:123".into()));
        let mut prefix = Vec::new();
        Field::string().encode_prefix(&Value::Str("log:".into()), &mut prefix).unwrap();
        assert!(full.starts_with(&prefix));
    }

    #[test]
    fn fixed_widths() {
        assert_eq!(Field::u8().fixed_width(), Some(1));
        assert_eq!(Field::u64().fixed_width(), Some(8));
        assert_eq!(Field::id().fixed_width(), Some(16));
        assert_eq!(Field::string().fixed_width(), None);
        assert_eq!(Field::json().fixed_width(), None);
    }
}
