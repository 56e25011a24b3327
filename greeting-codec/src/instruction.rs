//! Builders of Solana instructions calling the vault and greeting programs.
//!
//! Each builder encodes the instruction data and attaches the accounts the
//! program expects in the order it expects them.  Signing and submitting the
//! transaction is left to the caller.

use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::{
    CreateInstruction, DeleteInstruction, EncodingError, GreetingInstruction,
    InvokeInstruction, Layout, ModifyInstruction, GREETING_SIZE, VAULT_SEED,
};

type Result<T = (), E = EncodingError> = core::result::Result<T, E>;

/// Returns address and bump of the vault PDA owned by `payer`.
pub fn vault_address(program_id: &Pubkey, payer: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, payer.as_ref()], program_id)
}

/// Generates instruction asking the vault program to create the vault account
/// of `payer` with `space` bytes of data.
///
/// Returns the instruction and address of the vault account.
///
/// # Example
///
/// ```ignore
/// let (instruction, vault) =
///     instruction::invoke(vault_program_id, payer.pubkey(), 10)?;
/// let transaction = Transaction::new_signed_with_payer(
///     &[instruction],
///     Some(&payer.pubkey()),
///     &[&payer],
///     blockhash,
/// );
/// client.send_and_confirm_transaction(&transaction)?;
/// ```
pub fn invoke(
    program_id: Pubkey,
    payer: Pubkey,
    space: u64,
) -> Result<(Instruction, Pubkey)> {
    let (vault, bump) = vault_address(&program_id, &payer);
    let data = InvokeInstruction { new_account_bump_seed: bump, space }
        .encode()?;
    let instruction = Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(solana_system_interface::program::ID, false),
        ],
        data: data.into(),
    };
    Ok((instruction, vault))
}

/// Generates system program instruction allocating a greeting account owned
/// by `program_id`.
///
/// `lamports` should be the rent-exempt minimum for [`GREETING_SIZE`] bytes.
/// Both `payer` and `greeting` must sign the transaction.
pub fn allocate_greeting(
    program_id: &Pubkey,
    payer: &Pubkey,
    greeting: &Pubkey,
    lamports: u64,
) -> Instruction {
    solana_system_interface::instruction::create_account(
        payer,
        greeting,
        lamports,
        GREETING_SIZE as u64,
        program_id,
    )
}

/// Generates Create instruction storing `msg` in the greeting account.
pub fn create(
    program_id: Pubkey,
    greeting: Pubkey,
    msg: impl Into<String>,
) -> Result<Instruction> {
    let ix = GreetingInstruction::from(CreateInstruction::new(msg));
    greeting_instruction(program_id, ix, vec![AccountMeta::new(greeting, false)])
}

/// Generates Modify instruction replacing message in the greeting account.
pub fn modify(
    program_id: Pubkey,
    greeting: Pubkey,
    msg: impl Into<String>,
) -> Result<Instruction> {
    let ix = GreetingInstruction::from(ModifyInstruction::new(msg));
    greeting_instruction(program_id, ix, vec![AccountMeta::new(greeting, false)])
}

/// Generates Delete instruction closing the greeting account.
///
/// The greeting program requires both the payer, which receives the
/// account’s lamports, and the greeting account to sign.
pub fn delete(
    program_id: Pubkey,
    payer: Pubkey,
    greeting: Pubkey,
) -> Result<Instruction> {
    let ix = GreetingInstruction::from(DeleteInstruction::new());
    greeting_instruction(program_id, ix, vec![
        AccountMeta::new(payer, true),
        AccountMeta::new(greeting, true),
    ])
}

fn greeting_instruction(
    program_id: Pubkey,
    ix: GreetingInstruction,
    accounts: Vec<AccountMeta>,
) -> Result<Instruction> {
    Ok(Instruction { program_id, accounts, data: ix.encode()?.into() })
}
