//! Events emitted on every transition, parseable from transaction logs.

use anchor_lang::prelude::*;

/// Emitted when a maker opens a trade.
#[event]
pub struct EscrowMade {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub seed: u64,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub deposit: u64,
    pub receive: u64,
}

/// Emitted when a taker fills a trade.
#[event]
pub struct EscrowTaken {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    /// Token B paid to the maker
    pub paid: u64,
    /// Token A released to the taker
    pub released: u64,
}

/// Emitted when the maker cancels a trade.
#[event]
pub struct EscrowRefunded {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub refunded: u64,
}
