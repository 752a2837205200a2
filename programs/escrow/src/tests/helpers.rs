use {
    crate::{
        derivation::{escrow_address, vault_address},
        errors::EscrowError,
        state::Escrow,
    },
    anchor_lang::{
        prelude::{AccountMeta as AnchorAccountMeta, Pubkey},
        solana_program::program_pack::Pack,
        AccountDeserialize, InstructionData, ToAccountMetas,
    },
    anchor_spl::{associated_token, token::spl_token},
    litesvm::{types::TransactionResult, LiteSVM},
    litesvm_token::{CreateAssociatedTokenAccount, CreateMint, MintTo},
    solana_native_token::LAMPORTS_PER_SOL,
    solana_instruction::{AccountMeta, Instruction},
    solana_keypair::Keypair,
    solana_message::Message,
    solana_signer::Signer,
    solana_transaction::Transaction,
    std::path::PathBuf,
};

type SvmPubkey = solana_pubkey::Pubkey;

pub const MAKER_MINT_A: u64 = 10_000_000;
pub const TAKER_MINT_B: u64 = 10_000_000;

// ===================== Pubkey Bridging =====================

pub fn to_svm(pk: &Pubkey) -> SvmPubkey {
    SvmPubkey::from(pk.to_bytes())
}

pub fn to_anchor(pk: &SvmPubkey) -> Pubkey {
    Pubkey::new_from_array(pk.to_bytes())
}

fn convert_account_metas(metas: Vec<AnchorAccountMeta>) -> Vec<AccountMeta> {
    metas
        .into_iter()
        .map(|m| AccountMeta {
            pubkey: to_svm(&m.pubkey),
            is_signer: m.is_signer,
            is_writable: m.is_writable,
        })
        .collect()
}

// ===================== SVM Setup =====================

/// Two funded parties, two mints, maker holding Token A and taker holding Token B
pub struct Env {
    pub svm: LiteSVM,
    pub maker: Keypair,
    pub taker: Keypair,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
}

impl Env {
    pub fn maker_key(&self) -> Pubkey {
        to_anchor(&self.maker.pubkey())
    }

    pub fn taker_key(&self) -> Pubkey {
        to_anchor(&self.taker.pubkey())
    }

    pub fn escrow(&self, seed: u64) -> Pubkey {
        escrow_address(&self.maker_key(), seed).0
    }

    pub fn vault(&self, seed: u64) -> Pubkey {
        vault_address(&self.escrow(seed), &self.mint_a)
    }

    pub fn ata(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        associated_token::get_associated_token_address(owner, mint)
    }

    pub fn new_mint(&mut self) -> Pubkey {
        let mint = CreateMint::new(&mut self.svm, &self.maker)
            .decimals(6)
            .authority(&self.maker.pubkey())
            .send()
            .expect("Failed to create mint");
        to_anchor(&mint)
    }

    /// Create `owner`'s associated token account for `mint` and mint `amount` into it
    pub fn fund(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Pubkey {
        let ata = CreateAssociatedTokenAccount::new(&mut self.svm, &self.maker, &to_svm(mint))
            .owner(&to_svm(owner))
            .send()
            .expect("Failed to create associated token account");
        if amount > 0 {
            MintTo::new(&mut self.svm, &self.maker, &to_svm(mint), &ata, amount)
                .send()
                .expect("Failed to mint tokens");
        }
        to_anchor(&ata)
    }

    pub fn send_as_maker(&mut self, ix: Instruction) -> TransactionResult {
        send(&mut self.svm, ix, &self.maker)
    }

    pub fn send_as_taker(&mut self, ix: Instruction) -> TransactionResult {
        send(&mut self.svm, ix, &self.taker)
    }

    pub fn new_funded_keypair(&mut self) -> Keypair {
        let keypair = Keypair::new();
        self.svm
            .airdrop(&keypair.pubkey(), 10 * LAMPORTS_PER_SOL)
            .expect("Failed to airdrop");
        keypair
    }
}

/// Load the compiled program into a fresh LiteSVM.
///
/// Panics when `anchor build` has not produced the program yet.
pub fn setup() -> Env {
    let so_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/deploy/escrow.so");
    let program_data = std::fs::read(&so_path)
        .unwrap_or_else(|e| panic!("Failed to read program SO file {}: {e}", so_path.display()));

    let mut svm = LiteSVM::new();
    let _ = svm.add_program(to_svm(&crate::ID), &program_data);

    let maker = Keypair::new();
    let taker = Keypair::new();
    svm.airdrop(&maker.pubkey(), 100 * LAMPORTS_PER_SOL)
        .expect("Failed to airdrop to maker");
    svm.airdrop(&taker.pubkey(), 100 * LAMPORTS_PER_SOL)
        .expect("Failed to airdrop to taker");

    let mut env = Env {
        svm,
        maker,
        taker,
        mint_a: Pubkey::default(),
        mint_b: Pubkey::default(),
    };
    env.mint_a = env.new_mint();
    env.mint_b = env.new_mint();

    let (maker_key, taker_key) = (env.maker_key(), env.taker_key());
    let (mint_a, mint_b) = (env.mint_a, env.mint_b);
    env.fund(&maker_key, &mint_a, MAKER_MINT_A);
    env.fund(&taker_key, &mint_b, TAKER_MINT_B);

    env
}

// ===================== Instruction Builders =====================

pub fn make_ix(env: &Env, seed: u64, receive: u64, deposit: u64) -> Instruction {
    make_ix_with_mints(env, seed, receive, deposit, &env.mint_a, &env.mint_b)
}

pub fn make_ix_with_mints(
    env: &Env,
    seed: u64,
    receive: u64,
    deposit: u64,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
) -> Instruction {
    let maker = env.maker_key();
    let escrow = env.escrow(seed);

    Instruction {
        program_id: to_svm(&crate::ID),
        accounts: convert_account_metas(
            crate::accounts::Make {
                maker,
                escrow,
                mint_a: *mint_a,
                mint_b: *mint_b,
                maker_ata_a: env.ata(&maker, mint_a),
                vault: vault_address(&escrow, mint_a),
                associated_token_program: associated_token::ID,
                token_program: spl_token::ID,
                system_program: anchor_lang::system_program::ID,
            }
            .to_account_metas(None),
        ),
        data: crate::instruction::Make { seed, receive, deposit }.data(),
    }
}

/// Take the maker's `seed` trade, naming `maker` and both mints explicitly
pub fn take_ix_with(
    env: &Env,
    taker: &Pubkey,
    seed: u64,
    maker: &Pubkey,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
) -> Instruction {
    let escrow = env.escrow(seed);

    Instruction {
        program_id: to_svm(&crate::ID),
        accounts: convert_account_metas(
            crate::accounts::Take {
                taker: *taker,
                maker: *maker,
                escrow,
                mint_a: *mint_a,
                mint_b: *mint_b,
                vault: env.vault(seed),
                taker_ata_a: env.ata(taker, mint_a),
                taker_ata_b: env.ata(taker, mint_b),
                maker_ata_b: env.ata(maker, mint_b),
                associated_token_program: associated_token::ID,
                token_program: spl_token::ID,
                system_program: anchor_lang::system_program::ID,
            }
            .to_account_metas(None),
        ),
        data: crate::instruction::Take {}.data(),
    }
}

pub fn take_ix(env: &Env, seed: u64) -> Instruction {
    take_ix_with(env, &env.taker_key(), seed, &env.maker_key(), &env.mint_a, &env.mint_b)
}

/// Refund the maker's `seed` trade, signed by `caller`
pub fn refund_ix(env: &Env, caller: &Pubkey, seed: u64) -> Instruction {
    Instruction {
        program_id: to_svm(&crate::ID),
        accounts: convert_account_metas(
            crate::accounts::Refund {
                maker: *caller,
                escrow: env.escrow(seed),
                mint_a: env.mint_a,
                vault: env.vault(seed),
                maker_ata_a: env.ata(caller, &env.mint_a),
                associated_token_program: associated_token::ID,
                token_program: spl_token::ID,
                system_program: anchor_lang::system_program::ID,
            }
            .to_account_metas(None),
        ),
        data: crate::instruction::Refund {}.data(),
    }
}

/// Sign and send one instruction, then expire the blockhash so an identical
/// retry is a new transaction rather than a duplicate signature
pub fn send(svm: &mut LiteSVM, ix: Instruction, signer: &Keypair) -> TransactionResult {
    let message = Message::new(&[ix], Some(&signer.pubkey()));
    let transaction = Transaction::new(&[signer], message, svm.latest_blockhash());
    let result = svm.send_transaction(transaction);
    svm.expire_blockhash();
    result
}

// ===================== Inspection =====================

pub fn token_balance(svm: &LiteSVM, account: &Pubkey) -> Option<u64> {
    let account = svm.get_account(&to_svm(account))?;
    spl_token::state::Account::unpack(&account.data)
        .ok()
        .map(|token| token.amount)
}

pub fn lamports(svm: &LiteSVM, account: &Pubkey) -> u64 {
    svm.get_account(&to_svm(account))
        .map(|account| account.lamports)
        .unwrap_or(0)
}

pub fn raw_data(svm: &LiteSVM, account: &Pubkey) -> Option<Vec<u8>> {
    svm.get_account(&to_svm(account)).map(|account| account.data)
}

pub fn escrow_record(svm: &LiteSVM, escrow: &Pubkey) -> Option<Escrow> {
    let account = svm.get_account(&to_svm(escrow))?;
    Escrow::try_deserialize(&mut account.data.as_ref()).ok()
}

pub fn is_closed(svm: &LiteSVM, account: &Pubkey) -> bool {
    match svm.get_account(&to_svm(account)) {
        Some(account) => account.lamports == 0,
        None => true,
    }
}

pub fn assert_escrow_error(result: TransactionResult, expected: EscrowError) {
    let failed = result.expect_err("transaction should have failed");
    let code = format!("Error Code: {}.", expected.name());
    assert!(
        failed.meta.logs.iter().any(|line| line.contains(&code)),
        "expected {code} in logs: {:#?}",
        failed.meta.logs
    );
}
