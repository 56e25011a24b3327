// greeting-codec — fixed-layout instruction encoding for the Solana vault and
//                  greeting programs
// © 2024 by Composable Foundation
// © 2025 by Michał Nazarewicz <mina86@mina86.com>
//
// This program is free software; you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation; either version 2 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program; if not, see <https://www.gnu.org/licenses/>.

//! Schema-driven encoding of Solana instruction data.
//!
//! Solana programs receive their instruction data as an opaque slice of bytes.
//! The vault and greeting programs expect the data in a fixed layout: integers
//! are little-endian, strings are prefixed by their byte length as a 4-byte
//! little-endian integer and fields follow one another with no padding.  This
//! is the same layout Borsh uses for structures built from those types.
//!
//! The layout of each instruction is described by a [`Schema`], an ordered list
//! of named and typed fields.  [`encode`] and [`decode`] convert between
//! a dynamically typed [`InstructionRecord`] and bytes.  Statically typed
//! instruction structures are declared with the [`layout!`] macro which
//! generates the schema together with the type so the two never disagree.
//!
//! The codec never adds a discriminant on its own.  Programs which dispatch on
//! a leading tag (such as the greeting program) declare it as an explicit
//! `id: u8` field; see [`InstructionVariant`].
//!
//! With the `client` feature, the [`instruction`] module builds complete Solana
//! instructions calling the programs.
//!
//! # Features
#![doc = document_features::document_features!()]

mod codec;
mod error;
mod greeting;
pub mod layout;

#[cfg(feature = "client")]
pub mod instruction;

pub use codec::{
    decode, decode_prefix, encode, span, EncodedInstruction, FieldSpec,
    FieldType, InstructionRecord, Schema, Value,
};
pub use error::{DecodingError, EncodingError};
pub use greeting::{
    CreateInstruction, DeleteInstruction, GreetingAccount, GreetingInstruction,
    InstructionVariant, InvokeInstruction, ModifyInstruction, GREETING_SIZE,
    VAULT_SEED,
};
pub use layout::{FieldValue, Layout};
