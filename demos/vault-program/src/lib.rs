use greeting_codec::{InvokeInstruction, Layout, VAULT_SEED};
use solana_program::account_info::{next_account_info, AccountInfo};
use solana_program::program::invoke_signed;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;
use solana_program::sysvar::rent::Rent;
use solana_program::sysvar::Sysvar;

solana_program::entrypoint!(process_instruction);

fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction: &[u8],
) -> Result<(), ProgramError> {
    let ix = InvokeInstruction::decode(instruction).map_err(|err| {
        solana_program::msg!("{}", err);
        ProgramError::InvalidInstructionData
    })?;
    let bump = ix.new_account_bump_seed;

    let accounts = &mut accounts.iter();
    let payer = next_account_info(accounts)?;
    let vault = next_account_info(accounts)?;
    let system = next_account_info(accounts)?;

    if !payer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    // The vault is not a signer; the program signs for it below.
    if !payer.is_writable || !vault.is_writable || vault.is_signer {
        return Err(ProgramError::InvalidAccountData);
    }
    if !solana_system_interface::program::check_id(system.key) {
        return Err(ProgramError::IncorrectProgramId);
    }
    let seeds: &[&[u8]] = &[VAULT_SEED, payer.key.as_ref(), &[bump]];
    if Pubkey::create_program_address(seeds, program_id)? != *vault.key {
        return Err(ProgramError::InvalidSeeds);
    }

    let space = usize::try_from(ix.space)
        .map_err(|_| ProgramError::ArithmeticOverflow)?;
    let lamports = Rent::get()?.minimum_balance(space);
    solana_program::msg!("Creating vault {} with {} bytes", vault.key, space);

    invoke_signed(
        &solana_system_interface::instruction::create_account(
            payer.key,
            vault.key,
            lamports,
            ix.space,
            &solana_system_interface::program::ID,
        ),
        &[payer.clone(), vault.clone()],
        &[seeds],
    )
}
