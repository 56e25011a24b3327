use crate::FieldType;

/// Error converting an instruction record into bytes.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EncodingError {
    /// Integer value does not fit the width declared for the field.
    #[display("{field}: value out of range for {ty}")]
    ValueOutOfRange { field: &'static str, ty: FieldType },

    /// Byte array has a different length than declared for the field.
    #[display("{field}: expected {expected} bytes but got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Value’s kind doesn’t match the field type, e.g. string given for an
    /// integer field.
    #[display("{field}: expected {expected} value")]
    TypeMismatch { field: &'static str, expected: FieldType },

    /// Schema field has no value in the record.
    #[display("{schema}: missing field {field}")]
    MissingField { schema: &'static str, field: &'static str },

    /// Record has a value for a field the schema doesn’t declare.
    #[display("{schema}: unknown field {field}")]
    UnknownField { schema: &'static str, field: String },
}

/// Error parsing bytes into an instruction record.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DecodingError {
    /// Buffer is shorter than the fixed-width part of the schema.
    #[display("{schema}: need at least {need} bytes but got {got}")]
    BufferTooShort {
        schema: &'static str,
        need: usize,
        got: usize,
    },

    /// String length prefix is larger than the bytes remaining in the buffer.
    #[display("{field}: string of {len} bytes exceeds remaining {remaining}")]
    TruncatedString {
        field: &'static str,
        len: u32,
        remaining: usize,
    },

    /// String bytes aren’t valid UTF-8.
    #[display("{field}: invalid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// Buffer has bytes left after the last field.
    #[display("{schema}: {count} unexpected trailing bytes")]
    TrailingBytes { schema: &'static str, count: usize },

    /// Leading discriminant doesn’t name any known instruction.
    #[display("unknown instruction variant {tag}")]
    UnknownVariant { tag: u8 },

    /// Typed record is missing a field when converted from a dynamic record.
    #[display("{schema}: missing field {field}")]
    MissingField { schema: &'static str, field: &'static str },

    /// Dynamic record has a value for a field the typed record doesn’t have.
    #[display("{schema}: unknown field {field}")]
    UnknownField { schema: &'static str, field: String },

    /// Dynamic record value cannot be stored in the typed record’s field.
    #[display("{field}: expected {expected} value")]
    TypeMismatch { field: &'static str, expected: FieldType },
}
