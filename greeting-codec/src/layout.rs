//! Statically typed instruction records.
//!
//! The [`layout!`](crate::layout!) macro declares a structure together with
//! its [`Schema`].  Both are generated from the same field list so the order
//! and types of fields in the structure always agree with the encoded layout.
//!
//! ```
//! greeting_codec::layout! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Transfer {
//!         pub id: u8,
//!         pub amount: u64,
//!         pub memo: String,
//!     }
//! }
//!
//! use greeting_codec::Layout;
//!
//! let transfer = Transfer { id: 3, amount: 42, memo: "hi".into() };
//! let data = transfer.encode().unwrap();
//! assert_eq!(&[3u8, 42, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, b'h', b'i'][..], &data[..]);
//! assert_eq!(Ok(transfer), Transfer::decode(&data));
//! ```

use crate::codec::{self, EncodedInstruction, FieldType, InstructionRecord, Schema, Value};
use crate::{DecodingError, EncodingError};

/// Rust type which can be stored in a record field.
pub trait FieldValue: Sized {
    /// Field type used in the schema.
    const TYPE: FieldType;

    fn to_value(&self) -> Value;

    /// Converts dynamic value into the type; returns `None` if the value is of
    /// a wrong kind or out of range.
    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for u8 {
    const TYPE: FieldType = FieldType::U8;

    fn to_value(&self) -> Value { Value::Int((*self).into()) }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(num) => Self::try_from(num).ok(),
            _ => None,
        }
    }
}

impl FieldValue for u64 {
    const TYPE: FieldType = FieldType::U64;

    fn to_value(&self) -> Value { Value::Int((*self).into()) }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(num) => Self::try_from(num).ok(),
            _ => None,
        }
    }
}

impl FieldValue for String {
    const TYPE: FieldType = FieldType::String;

    fn to_value(&self) -> Value { Value::String(self.clone()) }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(string) => Some(string),
            _ => None,
        }
    }
}

impl<const N: usize> FieldValue for [u8; N] {
    const TYPE: FieldType = FieldType::Bytes(N);

    fn to_value(&self) -> Value { Value::Bytes(self.to_vec()) }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => bytes.try_into().ok(),
            _ => None,
        }
    }
}


/// Statically typed record with a fixed [`Schema`].
///
/// Implemented by types declared with [`layout!`](crate::layout!).
pub trait Layout: Sized {
    const SCHEMA: &'static Schema;

    fn to_record(&self) -> InstructionRecord;

    fn from_record(record: InstructionRecord) -> Result<Self, DecodingError>;

    /// Encodes the record; see [`crate::encode`].
    fn encode(&self) -> Result<EncodedInstruction, EncodingError> {
        codec::encode(Self::SCHEMA, &self.to_record())
    }

    /// Returns length of the encoded record.
    fn span(&self) -> Result<usize, EncodingError> {
        codec::span(Self::SCHEMA, &self.to_record())
    }

    /// Decodes the record; see [`crate::decode`].
    fn decode(buffer: &[u8]) -> Result<Self, DecodingError> {
        codec::decode(Self::SCHEMA, buffer).and_then(Self::from_record)
    }

    /// Decodes the record from prefix of the buffer; see
    /// [`crate::decode_prefix`].
    fn decode_prefix(buffer: &[u8]) -> Result<(Self, usize), DecodingError> {
        let (record, len) = codec::decode_prefix(Self::SCHEMA, buffer)?;
        Ok((Self::from_record(record)?, len))
    }
}


/// Declares structures implementing [`Layout`].
///
/// Each structure’s fields must be of types implementing [`FieldValue`].  The
/// generated schema is named after the structure and lists the fields in
/// declaration order.
#[macro_export]
macro_rules! layout {
    ($(
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$field_meta:meta])* $field_vis:vis $field:ident : $ty:ty ),*
            $(,)?
        }
    )*) => {$(
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$field_meta])* $field_vis $field: $ty, )*
        }

        impl $crate::Layout for $name {
            const SCHEMA: &'static $crate::Schema = &$crate::Schema {
                name: ::core::stringify!($name),
                fields: &[$(
                    $crate::FieldSpec {
                        name: ::core::stringify!($field),
                        ty: <$ty as $crate::FieldValue>::TYPE,
                    },
                )*],
            };

            fn to_record(&self) -> $crate::InstructionRecord {
                $crate::InstructionRecord::new()
                    $( .with(
                        ::core::stringify!($field),
                        $crate::FieldValue::to_value(&self.$field),
                    ) )*
            }

            fn from_record(
                #[allow(unused_mut)] mut record: $crate::InstructionRecord,
            ) -> ::core::result::Result<Self, $crate::DecodingError> {
                let schema = <Self as $crate::Layout>::SCHEMA;
                let this = Self {$(
                    $field: $crate::layout::__private::take_field(
                        schema,
                        &mut record,
                        ::core::stringify!($field),
                    )?,
                )*};
                $crate::layout::__private::ensure_consumed(schema, &record)?;
                Ok(this)
            }
        }
    )*};
}


#[doc(hidden)]
pub mod __private {
    use super::*;

    pub fn take_field<T: FieldValue>(
        schema: &Schema,
        record: &mut InstructionRecord,
        field: &'static str,
    ) -> Result<T, DecodingError> {
        let value = record
            .remove(field)
            .ok_or(DecodingError::MissingField { schema: schema.name, field })?;
        T::from_value(value)
            .ok_or(DecodingError::TypeMismatch { field, expected: T::TYPE })
    }

    pub fn ensure_consumed(
        schema: &Schema,
        record: &InstructionRecord,
    ) -> Result<(), DecodingError> {
        match record.first_name() {
            None => Ok(()),
            Some(name) => Err(DecodingError::UnknownField {
                schema: schema.name,
                field: name.into(),
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::FieldSpec;

    crate::layout! {
        #[derive(Clone, Debug, PartialEq, Eq)]
        struct Account {
            owner: [u8; 4],
            lamports: u64,
            /// Free-form label.
            label: String,
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Empty {}
    }

    #[test]
    fn test_schema() {
        const WANT: Schema = Schema {
            name: "Account",
            fields: &[
                FieldSpec { name: "owner", ty: FieldType::Bytes(4) },
                FieldSpec { name: "lamports", ty: FieldType::U64 },
                FieldSpec { name: "label", ty: FieldType::String },
            ],
        };
        assert_eq!(&WANT, Account::SCHEMA);
        assert_eq!(16, Account::SCHEMA.min_span());
        assert_eq!(0, Empty::SCHEMA.min_span());
    }

    #[test]
    fn test_round_trip() {
        let account = Account {
            owner: *b"abcd",
            lamports: 1_000_000,
            label: "savings".into(),
        };
        let data = account.encode().unwrap();
        assert_eq!(Ok(data.len()), account.span());
        assert_eq!(16 + 7, data.len());
        assert_eq!(Ok(account.clone()), Account::decode(&data));

        let mut long = data.into_vec();
        long.extend_from_slice(b"garbage");
        assert_eq!(Ok((account, 23)), Account::decode_prefix(&long));

        assert_eq!(Ok(Empty {}), Empty::decode(&[]));
    }

    #[test]
    fn test_from_record() {
        let record = InstructionRecord::new()
            .with("owner", *b"abcd")
            .with("lamports", 5u64);
        assert_eq!(
            Err(DecodingError::MissingField {
                schema: "Account",
                field: "label",
            }),
            Account::from_record(record.clone()),
        );

        let bad = record.clone().with("label", 7u8);
        assert_eq!(
            Err(DecodingError::TypeMismatch {
                field: "label",
                expected: FieldType::String,
            }),
            Account::from_record(bad),
        );

        let extra = record.with("label", "").with("memo", "");
        assert_eq!(
            Err(DecodingError::UnknownField {
                schema: "Account",
                field: "memo".into(),
            }),
            Account::from_record(extra),
        );
    }

    #[test]
    fn test_field_value_range() {
        assert_eq!(None, u8::from_value(Value::Int(256)));
        assert_eq!(None, u64::from_value(Value::Int(-1)));
        assert_eq!(None, <[u8; 2]>::from_value(Value::Bytes(vec![1, 2, 3])));
        assert_eq!(Some([1, 2]), <[u8; 2]>::from_value(Value::Bytes(vec![1, 2])));
    }
}
