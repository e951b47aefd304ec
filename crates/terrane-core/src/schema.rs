//! Composite key/value schemas.
//!
//! A [`Schema`] is an ordered sequence of key fields and an ordered sequence
//! of value fields. Packing concatenates each field's encoding in declared
//! order with no separator: every codec is fixed-width or self-delimiting, so
//! byte-wise comparison of packed keys equals lexicographic comparison of the
//! field tuples (per-field direction for descending codecs).

use crate::error::CoreError;
use crate::field::Field;
use crate::value::Value;

/// The declared shape of one keyspace: its key fields and value fields.
#[derive(Debug, Clone)]
pub struct Schema {
    key: Vec<Field>,
    value: Vec<Field>,
}

impl Schema {
    /// Creates a schema from ordered key and value fields.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Domain`] when either side is empty or when a
    /// serialized field (which carries no ordering) appears in key position.
    pub fn new(key: Vec<Field>, value: Vec<Field>) -> Result<Self, CoreError> {
        if key.is_empty() {
            return Err(CoreError::domain("a schema requires at least one key field"));
        }
        if value.is_empty() {
            return Err(CoreError::domain("a schema requires at least one value field"));
        }
        if let Some(pos) = key.iter().position(|f| !f.is_orderable()) {
            return Err(CoreError::domain(format!(
                "serialized fields cannot be key fields (position {pos})"
            )));
        }
        Ok(Self { key, value })
    }

    /// Number of key fields.
    #[must_use]
    pub fn key_arity(&self) -> usize {
        self.key.len()
    }

    /// Number of value fields.
    #[must_use]
    pub fn value_arity(&self) -> usize {
        self.value.len()
    }

    /// Whether another schema has the same field layout. Serialized fields
    /// compare by kind only, so re-registering with fresh closures matches.
    #[must_use]
    pub fn compatible_with(&self, other: &Self) -> bool {
        self.key.len() == other.key.len()
            && self.value.len() == other.value.len()
            && self.key.iter().zip(&other.key).all(|(a, b)| a.compatible_with(b))
            && self.value.iter().zip(&other.value).all(|(a, b)| a.compatible_with(b))
    }

    /// Packs a full composite key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Shape`] unless exactly `key_arity()` components
    /// are supplied, and [`CoreError::Domain`] for out-of-range components.
    pub fn pack_key(&self, components: &[Value]) -> Result<Vec<u8>, CoreError> {
        if components.len() != self.key.len() {
            return Err(CoreError::key_shape(self.key.len(), components.len()));
        }
        pack(&self.key, components)
    }

    /// Packs a full composite value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Shape`] unless exactly `value_arity()` components
    /// are supplied, and [`CoreError::Domain`] for out-of-range components.
    pub fn pack_value(&self, components: &[Value]) -> Result<Vec<u8>, CoreError> {
        if components.len() != self.value.len() {
            return Err(CoreError::value_shape(self.value.len(), components.len()));
        }
        pack(&self.value, components)
    }

    /// Packs a leading subset of the key fields (1..=arity components) for
    /// use as a range bound. Each supplied component is fully encoded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Shape`] for an empty or oversized component list.
    pub fn pack_key_prefix(&self, components: &[Value]) -> Result<Vec<u8>, CoreError> {
        if components.is_empty() || components.len() > self.key.len() {
            return Err(CoreError::key_shape(self.key.len(), components.len()));
        }
        pack(&self.key[..components.len()], components)
    }

    /// Packs a cursor prefix: a leading subset of the key fields where the
    /// final supplied component is encoded without its terminator, producing
    /// a raw leading-byte subsequence of every matching packed key. The final
    /// component may therefore be a partial field value (e.g. the first few
    /// characters of a text field).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Shape`] for an empty or oversized component list.
    pub fn pack_scan_prefix(&self, components: &[Value]) -> Result<Vec<u8>, CoreError> {
        if components.is_empty() || components.len() > self.key.len() {
            return Err(CoreError::key_shape(self.key.len(), components.len()));
        }
        let mut buf = Vec::new();
        let last = components.len() - 1;
        for (field, component) in self.key[..last].iter().zip(&components[..last]) {
            field.encode(component, &mut buf)?;
        }
        self.key[last].encode_prefix(&components[last], &mut buf)?;
        Ok(buf)
    }

    /// Unpacks a stored key into its components.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on malformed, truncated, or trailing
    /// bytes.
    pub fn unpack_key(&self, bytes: &[u8]) -> Result<Vec<Value>, CoreError> {
        unpack(&self.key, bytes, "key")
    }

    /// Unpacks a stored value into its components.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on malformed, truncated, or trailing
    /// bytes, or when a serialized field's `load` fails.
    pub fn unpack_value(&self, bytes: &[u8]) -> Result<Vec<Value>, CoreError> {
        unpack(&self.value, bytes, "value")
    }
}

fn pack(fields: &[Field], components: &[Value]) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::with_capacity(fields.iter().filter_map(Field::fixed_width).sum::<usize>());
    for (field, component) in fields.iter().zip(components) {
        field.encode(component, &mut buf)?;
    }
    Ok(buf)
}

fn unpack(fields: &[Field], bytes: &[u8], what: &str) -> Result<Vec<Value>, CoreError> {
    let mut components = Vec::with_capacity(fields.len());
    let mut offset = 0;
    for field in fields {
        let (value, consumed) = field.decode(&bytes[offset..])?;
        components.push(value);
        offset += consumed;
    }
    if offset != bytes.len() {
        return Err(CoreError::decode(format!(
            "{} trailing byte(s) after the last {what} field",
            bytes.len() - offset
        )));
    }
    Ok(components)
}
