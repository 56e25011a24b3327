use core::str::FromStr;
use std::process::ExitCode;

use greeting_codec::{instruction, DecodingError, EncodingError, GreetingAccount, Layout};
use solana_client::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::SignerError;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;


/// Hard-coded address of the vault program.
const VAULT_PROGRAM_ID: Pubkey = solana_sdk::pubkey!(
    "AxhGGBeAQc1SumsczWjgUxbbhhZR7FsTAtfoc5Ay6oaw"
);

/// RPC node used unless `SOLANA_RPC_URL` is set.
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Data size of the vault account unless given on command line.
const DEFAULT_SPACE: u64 = 10;


type Result<T = (), E = Error> = core::result::Result<T, E>;


/// `usage: greeting-client invoke [<space>]`
/// `       greeting-client greet <program-id> [<msg> [<new-msg>]]`
fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("{err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


/// Executes the program.
fn run() -> Result {
    let command = parse_args()?;
    let keypair = read_keypair()?;
    let url = std::env::var("SOLANA_RPC_URL")
        .unwrap_or_else(|_| DEFAULT_RPC_URL.into());
    eprintln!("Payer: {} ({url})", keypair.pubkey());
    let client = RpcClient::new(url);

    match command {
        Command::Invoke { space } => invoke_vault(&client, &keypair, space),
        Command::Greet { program_id, msg, new_msg } => {
            greet(&client, &keypair, program_id, msg, new_msg)
        }
    }
}


enum Command {
    /// Create the payer’s vault account.
    Invoke { space: u64 },
    /// Create, modify and delete a greeting account.
    Greet {
        program_id: Pubkey,
        msg: String,
        new_msg: String,
    },
}

/// Parses the command line arguments.
fn parse_args() -> Result<Command> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().ok_or(Error::Usage)?;
    let command = match cmd.as_str() {
        "invoke" => {
            let space = args
                .next()
                .map(|arg| u64::from_str(&arg).map_err(|_| Error::Usage))
                .transpose()?
                .unwrap_or(DEFAULT_SPACE);
            Command::Invoke { space }
        }
        "greet" => {
            let program_id = args.next().ok_or(Error::Usage)?;
            let program_id =
                Pubkey::from_str(&program_id).map_err(|_| Error::Usage)?;
            let msg = args.next().unwrap_or_else(|| "123".into());
            let new_msg = args.next().unwrap_or_else(|| "321".into());
            Command::Greet { program_id, msg, new_msg }
        }
        _ => return Err(Error::Usage),
    };
    if args.next().is_some() {
        return Err(Error::Usage);
    }
    Ok(command)
}


/// Reads keypair from `SOLANA_KEYPAIR` or the default Solana CLI location.
fn read_keypair() -> Result<Keypair> {
    let path = match std::env::var_os("SOLANA_KEYPAIR") {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let home = std::env::var_os("HOME")
                .ok_or(Error::Msg("HOME not set"))?;
            let mut path = std::path::PathBuf::from(home);
            path.push(".config/solana/id.json");
            path
        }
    };
    solana_sdk::signer::keypair::read_keypair_file(path)
        .map_err(Error::from)
}


/// Asks the vault program to create payer’s vault account.
fn invoke_vault(client: &RpcClient, payer: &Keypair, space: u64) -> Result {
    let (instruction, vault) =
        instruction::invoke(VAULT_PROGRAM_ID, payer.pubkey(), space)?;
    eprintln!("Vault account: {vault}");
    send_and_confirm(client, payer, &[], &[instruction])
}


/// Creates a greeting account, modifies its message and deletes it, printing
/// account state after each step.
fn greet(
    client: &RpcClient,
    payer: &Keypair,
    program_id: Pubkey,
    msg: String,
    new_msg: String,
) -> Result {
    let greeting = Keypair::new();
    let lamports = client
        .get_minimum_balance_for_rent_exemption(greeting_codec::GREETING_SIZE)?;

    eprintln!("Creating greeting account {}…", greeting.pubkey());
    let instructions = [
        instruction::allocate_greeting(
            &program_id,
            &payer.pubkey(),
            &greeting.pubkey(),
            lamports,
        ),
        instruction::create(program_id, greeting.pubkey(), msg)?,
    ];
    send_and_confirm(client, payer, &[&greeting], &instructions)?;
    print_greeting(client, &greeting.pubkey())?;

    eprintln!();
    eprintln!("Modifying greeting…");
    let instruction = instruction::modify(program_id, greeting.pubkey(), new_msg)?;
    send_and_confirm(client, payer, &[], &[instruction])?;
    print_greeting(client, &greeting.pubkey())?;

    eprintln!();
    eprintln!("Deleting greeting account…");
    let instruction =
        instruction::delete(program_id, payer.pubkey(), greeting.pubkey())?;
    send_and_confirm(client, payer, &[&greeting], &[instruction])?;
    match client.get_account_data(&greeting.pubkey()) {
        Ok(data) if !data.is_empty() => {
            let (account, _) = GreetingAccount::decode_prefix(&data)?;
            eprintln!("Greeting after delete: {}", account.message);
        }
        _ => eprintln!("Greeting account closed"),
    }
    Ok(())
}

/// Fetches and decodes greeting account’s data.
fn print_greeting(client: &RpcClient, greeting: &Pubkey) -> Result {
    let data = client.get_account_data(greeting)?;
    let (account, _) = GreetingAccount::decode_prefix(&data)?;
    eprintln!("Greeting: {}", account.message);
    Ok(())
}


/// Sends a transaction and logs result.
///
/// The transaction is paid for and signed by `payer` as well as by all keypairs
/// in `signers`.
fn send_and_confirm(
    client: &RpcClient,
    payer: &Keypair,
    signers: &[&Keypair],
    instructions: &[Instruction],
) -> Result {
    let blockhash = client.get_latest_blockhash()?;
    eprintln!("Latest blockhash: {blockhash}");

    for instruction in instructions {
        eprintln!(
            "Sending {} bytes to {}…",
            instruction.data.len(),
            instruction.program_id
        );
    }

    let message = Message::new_with_blockhash(
        instructions,
        Some(&payer.pubkey()),
        &blockhash,
    );
    let mut tx = Transaction::new_unsigned(message);
    let keypairs: Vec<&Keypair> =
        core::iter::once(payer).chain(signers.iter().copied()).collect();
    tx.try_sign(&keypairs, blockhash)?;

    let sig = client.send_and_confirm_transaction(&tx)?;
    eprintln!("Signature: {sig}");

    let encoding = UiTransactionEncoding::Binary;
    let resp = client.get_transaction(&sig, encoding)?;
    let (slot, tx) = (resp.slot, resp.transaction);
    eprintln!("Executed in slot: {slot}");

    // Print log messages
    let log_messages = tx
        .meta
        .map(|meta| meta.log_messages)
        .ok_or(Error::Msg("No transaction metadata"))?;
    if let OptionSerializer::Some(messages) = log_messages {
        for msg in messages {
            println!("{msg}");
        }
        Ok(())
    } else {
        Err(Error::Msg("No log message"))
    }
}


#[derive(derive_more::From, derive_more::Display)]
enum Error {
    #[display(
        "usage: greeting-client invoke [<space>]\n       greeting-client \
         greet <program-id> [<msg> [<new-msg>]]"
    )]
    #[from(ignore)]
    Usage,
    Msg(&'static str),
    #[display("encoding instruction: {_0}")]
    Encoding(EncodingError),
    #[display("decoding account: {_0}")]
    Decoding(DecodingError),
    Client(solana_client::client_error::ClientError),
    Signer(SignerError),
    Box(Box<dyn std::error::Error>),
}
