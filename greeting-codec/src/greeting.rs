//! Instructions understood by the vault and greeting programs.

use crate::{DecodingError, EncodedInstruction, EncodingError, Layout, Schema};

/// Seed prefix of the vault PDA.  The full seeds are `[VAULT_SEED, payer]`.
pub const VAULT_SEED: &[u8] = b"vault";

/// Message used to size greeting accounts.
const GREETING_TEMPLATE: &str = "1234567890";

/// Size of a greeting account.
///
/// This is the encoded length of a [`GreetingAccount`] holding a ten-byte
/// message which is what the greeting program expects to be allocated.
pub const GREETING_SIZE: usize =
    GreetingAccount::SCHEMA.min_span() + GREETING_TEMPLATE.len();

crate::layout! {
    /// Instruction data of the vault program.
    ///
    /// Asks the program to create an account at the vault PDA with `space`
    /// bytes of data.  `new_account_bump_seed` is the bump of the PDA.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct InvokeInstruction {
        pub new_account_bump_seed: u8,
        pub space: u64,
    }

    /// Greeting program instruction storing a message in a fresh account.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CreateInstruction {
        pub id: u8,
        pub msg: String,
    }

    /// Greeting program instruction replacing the stored message.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ModifyInstruction {
        pub id: u8,
        pub msg: String,
    }

    /// Greeting program instruction closing the greeting account.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct DeleteInstruction {
        pub id: u8,
    }

    /// State of a greeting account.
    ///
    /// Not an instruction.  The greeting program stores it at the start of the
    /// account data; the rest of the account is unused.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct GreetingAccount {
        pub message: String,
    }
}

impl CreateInstruction {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { id: InstructionVariant::CREATE, msg: msg.into() }
    }
}

impl ModifyInstruction {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { id: InstructionVariant::MODIFY, msg: msg.into() }
    }
}

impl DeleteInstruction {
    pub fn new() -> Self { Self { id: InstructionVariant::DELETE } }
}

impl Default for DeleteInstruction {
    fn default() -> Self { Self::new() }
}


/// Closed set of instruction shapes.
///
/// The vault program accepts a single shape so its instruction carries no tag.
/// Greeting program instructions start with an explicit `id` byte equal to
/// [`InstructionVariant::tag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstructionVariant {
    Invoke,
    Create,
    Modify,
    Delete,
}

impl InstructionVariant {
    const CREATE: u8 = 0;
    const MODIFY: u8 = 1;
    const DELETE: u8 = 2;

    /// Returns discriminant of the instruction or `None` for untagged shapes.
    pub const fn tag(self) -> Option<u8> {
        match self {
            Self::Invoke => None,
            Self::Create => Some(Self::CREATE),
            Self::Modify => Some(Self::MODIFY),
            Self::Delete => Some(Self::DELETE),
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            Self::CREATE => Some(Self::Create),
            Self::MODIFY => Some(Self::Modify),
            Self::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns layout of the instruction.
    pub const fn schema(self) -> &'static Schema {
        match self {
            Self::Invoke => InvokeInstruction::SCHEMA,
            Self::Create => CreateInstruction::SCHEMA,
            Self::Modify => ModifyInstruction::SCHEMA,
            Self::Delete => DeleteInstruction::SCHEMA,
        }
    }
}


/// Instruction of the greeting program.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum GreetingInstruction {
    Create(CreateInstruction),
    Modify(ModifyInstruction),
    Delete(DeleteInstruction),
}

impl GreetingInstruction {
    pub fn variant(&self) -> InstructionVariant {
        match self {
            Self::Create(_) => InstructionVariant::Create,
            Self::Modify(_) => InstructionVariant::Modify,
            Self::Delete(_) => InstructionVariant::Delete,
        }
    }

    pub fn encode(&self) -> Result<EncodedInstruction, EncodingError> {
        match self {
            Self::Create(ix) => ix.encode(),
            Self::Modify(ix) => ix.encode(),
            Self::Delete(ix) => ix.encode(),
        }
    }

    /// Decodes instruction choosing its layout from the leading `id` byte.
    pub fn decode(buffer: &[u8]) -> Result<Self, DecodingError> {
        let tag = *buffer.first().ok_or(DecodingError::BufferTooShort {
            schema: "GreetingInstruction",
            need: 1,
            got: 0,
        })?;
        match InstructionVariant::from_tag(tag) {
            Some(InstructionVariant::Create) => {
                CreateInstruction::decode(buffer).map(Self::Create)
            }
            Some(InstructionVariant::Modify) => {
                ModifyInstruction::decode(buffer).map(Self::Modify)
            }
            Some(InstructionVariant::Delete) => {
                DeleteInstruction::decode(buffer).map(Self::Delete)
            }
            Some(InstructionVariant::Invoke) | None => {
                Err(DecodingError::UnknownVariant { tag })
            }
        }
    }
}
