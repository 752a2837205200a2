use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("Invalid amount: amount must be greater than zero")]
    InvalidAmount,
    #[msg("Identical mints: the offered and requested mints must differ")]
    IdenticalMints,
    #[msg("Mint mismatch: supplied mint does not match the escrow record")]
    MintMismatch,
    #[msg("Maker mismatch: supplied maker does not match the escrow record")]
    MakerMismatch,
    #[msg("Invalid vault: account is not the custody vault of this escrow")]
    InvalidVault,
    #[msg("Unauthorized: only the maker of record can refund this escrow")]
    Unauthorized,
    #[msg("Trade not found: no live escrow at this address")]
    TradeNotFound,
    #[msg("Duplicate trade: a live escrow already exists for this maker and seed")]
    DuplicateTrade,
    #[msg("Insufficient funds: holding account cannot cover the transfer")]
    InsufficientFunds,
}

/// Broad failure classes callers can branch on without matching every variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent inputs
    Validation,
    /// Caller lacks the right to perform the transition
    Authorization,
    /// Trade is not in a state that allows the transition
    State,
    /// A holding account cannot cover a required transfer
    Resource,
}

impl EscrowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EscrowError::InvalidAmount
            | EscrowError::IdenticalMints
            | EscrowError::MintMismatch
            | EscrowError::MakerMismatch
            | EscrowError::InvalidVault => ErrorKind::Validation,
            EscrowError::Unauthorized => ErrorKind::Authorization,
            EscrowError::TradeNotFound | EscrowError::DuplicateTrade => ErrorKind::State,
            EscrowError::InsufficientFunds => ErrorKind::Resource,
        }
    }
}
