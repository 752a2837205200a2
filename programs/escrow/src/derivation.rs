//! Deterministic addresses for escrow records and their custody vaults.
//!
//! Every participant can rebuild both addresses from public data: the record
//! from `(maker, seed)` and the vault from `(record, mint_a)`.

use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;

use crate::{errors::EscrowError, state::Escrow, ESCROW_SEED};

/// Record address and bump for a maker's trade seed
pub fn escrow_address(maker: &Pubkey, seed: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ESCROW_SEED, maker.as_ref(), &seed.to_le_bytes()], &crate::ID)
}

/// Custody vault of a record for the given mint
pub fn vault_address(escrow: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(escrow, mint)
}

/// Capability to sign as an escrow record.
///
/// Only built from freshly derived seeds (`new`, used by make) or from a
/// record whose address has been re-derived (`verify`).
pub struct EscrowSigner {
    maker: Pubkey,
    seed: [u8; 8],
    bump: [u8; 1],
}

impl EscrowSigner {
    pub fn new(maker: Pubkey, seed: u64, bump: u8) -> Self {
        Self {
            maker,
            seed: seed.to_le_bytes(),
            bump: [bump],
        }
    }

    pub fn verify(escrow: &Pubkey, record: &Escrow) -> Result<Self> {
        let signer = Self::new(record.maker, record.seed, record.bump);
        let derived = Pubkey::create_program_address(&signer.seeds(), &crate::ID)
            .map_err(|_| error!(EscrowError::TradeNotFound))?;
        require_keys_eq!(derived, *escrow, EscrowError::TradeNotFound);

        Ok(signer)
    }

    pub fn seeds(&self) -> [&[u8]; 4] {
        [ESCROW_SEED, self.maker.as_ref(), &self.seed, &self.bump]
    }
}
