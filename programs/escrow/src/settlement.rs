//! Pure validation of each transition.
//!
//! Handlers observe balances and the record, ask this module for a plan, and
//! only then issue transfers. Nothing here touches accounts, so every failure
//! happens before the first CPI.

use anchor_lang::prelude::*;

use crate::{errors::EscrowError, state::Escrow};

/// Planned maker -> vault deposit
#[derive(Debug, PartialEq, Eq)]
pub struct Deposit {
    pub amount: u64,
}

/// Planned two-sided exchange
#[derive(Debug, PartialEq, Eq)]
pub struct Swap {
    /// Token B moved from taker to maker
    pub pay_maker: u64,
    /// Token A moved from vault to taker
    pub release_to_taker: u64,
}

/// Planned vault -> maker return
#[derive(Debug, PartialEq, Eq)]
pub struct Reversal {
    pub amount: u64,
}

pub fn plan_make(
    deposit: u64,
    receive: u64,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
    maker_balance: u64,
) -> Result<Deposit> {
    require_gt!(deposit, 0, EscrowError::InvalidAmount);
    require_gt!(receive, 0, EscrowError::InvalidAmount);
    require_keys_neq!(*mint_a, *mint_b, EscrowError::IdenticalMints);
    require_gte!(maker_balance, deposit, EscrowError::InsufficientFunds);

    Ok(Deposit { amount: deposit })
}

/// The supplied maker and mints must be the ones stored on the record.
pub fn match_terms(record: &Escrow, maker: &Pubkey, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<()> {
    require_keys_eq!(*maker, record.maker, EscrowError::MakerMismatch);
    require_keys_eq!(*mint_a, record.mint_a, EscrowError::MintMismatch);
    require_keys_eq!(*mint_b, record.mint_b, EscrowError::MintMismatch);
    Ok(())
}

pub fn plan_take(record: &Escrow, vault_balance: u64, taker_balance: u64) -> Result<Swap> {
    // A live record always backs a funded vault
    require_gt!(vault_balance, 0, EscrowError::TradeNotFound);
    require_gte!(taker_balance, record.receive, EscrowError::InsufficientFunds);

    Ok(Swap {
        pay_maker: record.receive,
        release_to_taker: vault_balance,
    })
}

/// Refund is reserved to the maker of record.
pub fn authorize_refund(record: &Escrow, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, record.maker, EscrowError::Unauthorized);
    Ok(())
}

pub fn plan_refund(record: &Escrow, mint_a: &Pubkey, vault_balance: u64) -> Result<Reversal> {
    require_keys_eq!(*mint_a, record.mint_a, EscrowError::MintMismatch);
    require_gt!(vault_balance, 0, EscrowError::TradeNotFound);

    Ok(Reversal { amount: vault_balance })
}
