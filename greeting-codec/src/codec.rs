//! Conversion between instruction records and their byte representation.

use std::collections::BTreeMap;

use crate::{DecodingError, EncodingError};

type Result<T, E> = core::result::Result<T, E>;

/// Type of a single field of a [`Schema`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FieldType {
    /// Unsigned 8-bit integer.
    #[display("u8")]
    U8,
    /// Unsigned 64-bit integer encoded as 8 bytes in little endian.
    #[display("u64")]
    U64,
    /// UTF-8 string preceded by its byte length as 4-byte little-endian
    /// integer.
    #[display("string")]
    String,
    /// Byte array of a fixed length written verbatim.
    #[display("[u8; {_0}]")]
    Bytes(usize),
}

impl FieldType {
    /// Returns number of bytes the field occupies irrespective of its value.
    ///
    /// For strings this is just the length prefix.
    pub const fn fixed_width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U64 => 8,
            Self::String => 4,
            Self::Bytes(len) => len,
        }
    }
}

/// A named field of a [`Schema`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

/// Layout of an encoded record.
///
/// Fields are encoded in the order they are listed with no padding in between.
/// Schemas are normally `const` items generated by the [`crate::layout!`]
/// macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Returns the shortest possible encoding length, i.e. the length of an
    /// encoding in which all strings are empty.
    pub const fn min_span(&self) -> usize {
        let mut span = 0;
        let mut idx = 0;
        while idx < self.fields.len() {
            span += self.fields[idx].ty.fixed_width();
            idx += 1;
        }
        span
    }

    /// Looks up field with given name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Dynamically typed value of a field.
///
/// Integers are held in a type wider than any field so that values which
/// don’t fit are reported when encoding rather than silently truncated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, derive_more::From)]
pub enum Value {
    Int(i128),
    String(String),
    Bytes(Vec<u8>),
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self { Self::Int(value.into()) }
        }
    )*};
}

impl_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<&str> for Value {
    fn from(value: &str) -> Self { Self::String(value.into()) }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self { Self::Bytes(value.into()) }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(value: [u8; N]) -> Self { Self::Bytes(value.into()) }
}

/// Field name to value map holding one instruction.
///
/// The order in which fields are inserted is irrelevant; when encoding, the
/// order comes from the schema.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstructionRecord(BTreeMap<String, Value>);

impl InstructionRecord {
    pub fn new() -> Self { Self::default() }

    /// Sets field `name` to `value` and returns the record.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets field `name` to `value`; returns previous value of the field.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> { self.0.get(name) }

    pub fn remove(&mut self, name: &str) -> Option<Value> { self.0.remove(name) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns name of any field in the record.
    pub(crate) fn first_name(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InstructionRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Encoded instruction data.
///
/// The buffer is exactly as long as the encoding; there is no spare capacity
/// nor trailing padding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedInstruction(Vec<u8>);

impl EncodedInstruction {
    pub fn as_bytes(&self) -> &[u8] { self.0.as_slice() }
    pub fn into_vec(self) -> Vec<u8> { self.0 }
}

impl core::ops::Deref for EncodedInstruction {
    type Target = [u8];
    fn deref(&self) -> &[u8] { self.0.as_slice() }
}

impl AsRef<[u8]> for EncodedInstruction {
    fn as_ref(&self) -> &[u8] { self.0.as_slice() }
}

impl From<EncodedInstruction> for Vec<u8> {
    fn from(encoded: EncodedInstruction) -> Self { encoded.0 }
}


/// Encodes `record` according to `schema`.
///
/// The record must have a value for each field declared in the schema and no
/// other fields.  The output buffer is allocated with the exact span of the
/// encoding computed before anything is written.
pub fn encode(
    schema: &Schema,
    record: &InstructionRecord,
) -> Result<EncodedInstruction, EncodingError> {
    let chunks = prepare(schema, record)?;
    let span = chunks.iter().map(Chunk::len).sum();
    let mut buf = Vec::with_capacity(span);
    for chunk in chunks {
        chunk.write_to(&mut buf);
    }
    debug_assert_eq!(span, buf.len());
    Ok(EncodedInstruction(buf))
}

/// Returns length of the encoding of `record`.
///
/// Fails in the same situations [`encode`] would.
pub fn span(
    schema: &Schema,
    record: &InstructionRecord,
) -> Result<usize, EncodingError> {
    Ok(prepare(schema, record)?.iter().map(Chunk::len).sum())
}

/// Decodes `buffer` according to `schema`.
///
/// The whole buffer must be consumed; trailing bytes are an error.  Use
/// [`decode_prefix`] to parse data followed by unrelated bytes.
pub fn decode(
    schema: &Schema,
    buffer: &[u8],
) -> Result<InstructionRecord, DecodingError> {
    let (record, consumed) = decode_prefix(schema, buffer)?;
    match buffer.len() - consumed {
        0 => Ok(record),
        count => Err(DecodingError::TrailingBytes { schema: schema.name, count }),
    }
}

/// Decodes record from the start of `buffer` according to `schema`.
///
/// Returns the record and number of bytes it occupied.  Bytes past that point
/// are ignored.  This is what reading account data needs since accounts are
/// usually allocated larger than the record they store.
pub fn decode_prefix(
    schema: &Schema,
    buffer: &[u8],
) -> Result<(InstructionRecord, usize), DecodingError> {
    let need = schema.min_span();
    let too_short = || DecodingError::BufferTooShort {
        schema: schema.name,
        need,
        got: buffer.len(),
    };
    if buffer.len() < need {
        return Err(too_short());
    }

    let mut rest = buffer;
    let mut record = InstructionRecord::new();
    for field in schema.fields {
        let width = field.ty.fixed_width();
        let (head, tail) = rest.split_at_checked(width).ok_or_else(too_short)?;
        rest = tail;
        let value = match field.ty {
            FieldType::U8 => Value::Int(head[0].into()),
            FieldType::U64 => Value::Int(u64::from_le_bytes(le_bytes(head)).into()),
            FieldType::Bytes(_) => Value::Bytes(head.to_vec()),
            FieldType::String => {
                let len = u32::from_le_bytes(le_bytes(head));
                let (bytes, tail) = usize::try_from(len)
                    .ok()
                    .and_then(move |len| rest.split_at_checked(len))
                    .ok_or(DecodingError::TruncatedString {
                        field: field.name,
                        len,
                        remaining: rest.len(),
                    })?;
                rest = tail;
                let string = core::str::from_utf8(bytes)
                    .map_err(|_| DecodingError::InvalidUtf8 { field: field.name })?;
                Value::String(string.into())
            }
        };
        record.insert(field.name, value);
    }
    Ok((record, buffer.len() - rest.len()))
}

/// Copies fixed-size slice into an array.  Caller guarantees the length.
fn le_bytes<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut arr = [0; N];
    arr.copy_from_slice(bytes);
    arr
}


/// A validated field ready to be written.
enum Chunk<'a> {
    Byte(u8),
    Word(u64),
    Str(u32, &'a str),
    Raw(&'a [u8]),
}

impl Chunk<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Byte(_) => 1,
            Self::Word(_) => 8,
            Self::Str(_, string) => 4 + string.len(),
            Self::Raw(bytes) => bytes.len(),
        }
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Byte(byte) => buf.push(*byte),
            Self::Word(word) => buf.extend_from_slice(&word.to_le_bytes()),
            Self::Str(len, string) => {
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(string.as_bytes());
            }
            Self::Raw(bytes) => buf.extend_from_slice(bytes),
        }
    }
}

/// Checks record matches the schema and returns its fields in schema order.
fn prepare<'a>(
    schema: &Schema,
    record: &'a InstructionRecord,
) -> Result<Vec<Chunk<'a>>, EncodingError> {
    if let Some((name, _)) =
        record.iter().find(|(name, _)| schema.field(name).is_none())
    {
        return Err(EncodingError::UnknownField {
            schema: schema.name,
            field: name.into(),
        });
    }
    schema
        .fields
        .iter()
        .map(move |field| {
            let value = record.get(field.name).ok_or(
                EncodingError::MissingField {
                    schema: schema.name,
                    field: field.name,
                },
            )?;
            prepare_field(field, value)
        })
        .collect()
}

fn prepare_field<'a>(
    field: &FieldSpec,
    value: &'a Value,
) -> Result<Chunk<'a>, EncodingError> {
    let out_of_range =
        || EncodingError::ValueOutOfRange { field: field.name, ty: field.ty };
    match (field.ty, value) {
        (FieldType::U8, Value::Int(num)) => {
            u8::try_from(*num).map(Chunk::Byte).map_err(|_| out_of_range())
        }
        (FieldType::U64, Value::Int(num)) => {
            u64::try_from(*num).map(Chunk::Word).map_err(|_| out_of_range())
        }
        (FieldType::String, Value::String(string)) => {
            let len = u32::try_from(string.len()).map_err(|_| out_of_range())?;
            Ok(Chunk::Str(len, string.as_str()))
        }
        (FieldType::Bytes(expected), Value::Bytes(bytes)) => {
            if bytes.len() == expected {
                Ok(Chunk::Raw(bytes.as_slice()))
            } else {
                Err(EncodingError::LengthMismatch {
                    field: field.name,
                    expected,
                    actual: bytes.len(),
                })
            }
        }
        (expected, _) => {
            Err(EncodingError::TypeMismatch { field: field.name, expected })
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const INVOKE: Schema = Schema {
        name: "Invoke",
        fields: &[
            FieldSpec { name: "newAccountBumpSeed", ty: FieldType::U8 },
            FieldSpec { name: "space", ty: FieldType::U64 },
        ],
    };

    const CREATE: Schema = Schema {
        name: "Create",
        fields: &[
            FieldSpec { name: "id", ty: FieldType::U8 },
            FieldSpec { name: "msg", ty: FieldType::String },
        ],
    };

    const KEYED: Schema = Schema {
        name: "Keyed",
        fields: &[
            FieldSpec { name: "key", ty: FieldType::Bytes(4) },
            FieldSpec { name: "label", ty: FieldType::String },
        ],
    };

    fn create(id: u8, msg: &str) -> InstructionRecord {
        InstructionRecord::new().with("id", id).with("msg", msg)
    }

    #[test]
    fn test_encode_invoke() {
        let record = InstructionRecord::new()
            .with("space", 10u64)
            .with("newAccountBumpSeed", 7u8);
        let got = encode(&INVOKE, &record).unwrap();
        assert_eq!(&[7u8, 10, 0, 0, 0, 0, 0, 0, 0][..], got.as_bytes());
        assert_eq!(Ok(9), span(&INVOKE, &record));
    }

    #[test]
    fn test_encode_create() {
        let got = encode(&CREATE, &create(0, "123")).unwrap();
        assert_eq!(&[0u8, 3, 0, 0, 0, b'1', b'2', b'3'][..], got.as_bytes());

        let got = encode(&CREATE, &create(0, "")).unwrap();
        assert_eq!(&[0u8, 0, 0, 0, 0][..], got.as_bytes());
    }

    #[test]
    fn test_encode_exact_capacity() {
        let record = create(1, "zażółć gęślą jaźń");
        let got = encode(&CREATE, &record).unwrap().into_vec();
        assert_eq!(1 + 4 + "zażółć gęślą jaźń".len(), got.len());
        assert_eq!(got.len(), got.capacity());
        assert_eq!(Ok(got.len()), span(&CREATE, &record));
    }

    #[test]
    fn test_encode_out_of_range() {
        let check = |record: InstructionRecord, field, ty| {
            assert_eq!(
                Err(EncodingError::ValueOutOfRange { field, ty }),
                encode(&INVOKE, &record),
            );
        };
        let record = |bump: i128, space: i128| {
            InstructionRecord::new()
                .with("newAccountBumpSeed", Value::Int(bump))
                .with("space", Value::Int(space))
        };

        check(record(256, 0), "newAccountBumpSeed", FieldType::U8);
        check(record(-1, 0), "newAccountBumpSeed", FieldType::U8);
        check(record(0, -1), "space", FieldType::U64);
        check(record(0, i128::from(u64::MAX) + 1), "space", FieldType::U64);

        let got = encode(&INVOKE, &record(255, u64::MAX.into())).unwrap();
        assert_eq!(&[255u8, 255, 255, 255, 255, 255, 255, 255, 255][..], &got[..]);
    }

    #[test]
    fn test_encode_bad_record() {
        assert_eq!(
            Err(EncodingError::MissingField { schema: "Create", field: "msg" }),
            encode(&CREATE, &InstructionRecord::new().with("id", 0u8)),
        );
        assert_eq!(
            Err(EncodingError::UnknownField {
                schema: "Create",
                field: "counter".into(),
            }),
            encode(&CREATE, &create(0, "").with("counter", 1u8)),
        );
        assert_eq!(
            Err(EncodingError::TypeMismatch {
                field: "msg",
                expected: FieldType::String,
            }),
            encode(&CREATE, &InstructionRecord::new().with("id", 0u8).with("msg", 5u8)),
        );
    }

    #[test]
    fn test_bytes_field() {
        let record = InstructionRecord::new()
            .with("label", "ab")
            .with("key", [1u8, 2, 3, 4]);
        let got = encode(&KEYED, &record).unwrap();
        assert_eq!(&[1u8, 2, 3, 4, 2, 0, 0, 0, b'a', b'b'][..], &got[..]);
        assert_eq!(Ok(record), decode(&KEYED, &got));

        let record = InstructionRecord::new()
            .with("label", "")
            .with("key", &[1u8, 2, 3][..]);
        assert_eq!(
            Err(EncodingError::LengthMismatch {
                field: "key",
                expected: 4,
                actual: 3,
            }),
            encode(&KEYED, &record),
        );
    }

    #[test]
    fn test_decode() {
        let want = InstructionRecord::new()
            .with("newAccountBumpSeed", 7u8)
            .with("space", 10u64);
        assert_eq!(Ok(want), decode(&INVOKE, &[7, 10, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(Ok(create(2, "hi")), decode(&CREATE, b"\x02\x02\0\0\0hi"));
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(
            Err(DecodingError::BufferTooShort {
                schema: "Invoke",
                need: 9,
                got: 3,
            }),
            decode(&INVOKE, &[7, 10, 0]),
        );
        assert_eq!(
            Err(DecodingError::BufferTooShort {
                schema: "Create",
                need: 5,
                got: 1,
            }),
            decode(&CREATE, &[0]),
        );
    }

    #[test]
    fn test_decode_truncated_string() {
        assert_eq!(
            Err(DecodingError::TruncatedString {
                field: "msg",
                len: 3,
                remaining: 2,
            }),
            decode(&CREATE, b"\x00\x03\0\0\012"),
        );
        assert_eq!(
            Err(DecodingError::TruncatedString {
                field: "msg",
                len: u32::MAX,
                remaining: 0,
            }),
            decode(&CREATE, b"\x00\xff\xff\xff\xff"),
        );
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(
            Err(DecodingError::InvalidUtf8 { field: "msg" }),
            decode(&CREATE, b"\x00\x02\0\0\0\xc3\x28"),
        );
    }

    #[test]
    fn test_decode_trailing() {
        let data = b"\x00\x01\0\0\0abc";
        assert_eq!(
            Err(DecodingError::TrailingBytes { schema: "Create", count: 2 }),
            decode(&CREATE, data),
        );
        assert_eq!(Ok((create(0, "a"), 6)), decode_prefix(&CREATE, data));
    }

    #[test]
    fn test_canonical() {
        for data in [
            &b"\x00\0\0\0\0"[..],
            &b"\x01\x03\0\0\0123"[..],
            &b"\xff\x04\0\0\0\xe2\x82\xac!"[..],
        ] {
            let record = decode(&CREATE, data).unwrap();
            assert_eq!(data, encode(&CREATE, &record).unwrap().as_bytes());
        }

        let data = b"\x05\x80\0\0\0\0\0\0\x01\xaa\xbb";
        let (record, len) = decode_prefix(&INVOKE, data).unwrap();
        assert_eq!(9, len);
        assert_eq!(&data[..len], encode(&INVOKE, &record).unwrap().as_bytes());
    }

    #[test]
    fn test_matches_borsh() {
        #[derive(borsh::BorshSerialize)]
        struct Invoke {
            bump: u8,
            space: u64,
        }

        #[derive(borsh::BorshSerialize)]
        struct Create {
            id: u8,
            msg: String,
        }

        let record = InstructionRecord::new()
            .with("newAccountBumpSeed", 254u8)
            .with("space", 0x0102_0304_0506_0708u64);
        let want = borsh::to_vec(&Invoke { bump: 254, space: 0x0102_0304_0506_0708 })
            .unwrap();
        assert_eq!(want, encode(&INVOKE, &record).unwrap().into_vec());

        for msg in ["", "123", "Hello, world — ünïcödé"] {
            let want = borsh::to_vec(&Create { id: 1, msg: msg.into() }).unwrap();
            assert_eq!(want, encode(&CREATE, &create(1, msg)).unwrap().into_vec());
        }
    }
}
