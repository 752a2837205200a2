#![allow(unexpected_cfgs)]
#![allow(deprecated)]

use anchor_lang::prelude::*;

pub mod constants;
pub mod derivation;
pub mod errors;
pub mod events;
pub mod helpers;
pub mod instructions;
pub mod settlement;
pub mod state;


pub use constants::*;
pub use instructions::*;

declare_id!("22222222222222222222222222222222222222222222");

#[program]
pub mod escrow {
    use super::*;

    /// Open a trade: maker deposits Token A and sets the Token B amount it wants
    #[instruction(discriminator = 0)]
    pub fn make(ctx: Context<Make>, seed: u64, receive: u64, deposit: u64) -> Result<()> {
        instructions::make::handler(ctx, seed, receive, deposit)
    }

    /// Fill the trade: taker pays Token B to the maker and receives the vault's Token A
    #[instruction(discriminator = 1)]
    pub fn take(ctx: Context<Take>) -> Result<()> {
        instructions::take::handler(ctx)
    }

    /// Cancel the trade: maker reclaims Token A and both accounts are closed
    #[instruction(discriminator = 2)]
    pub fn refund(ctx: Context<Refund>) -> Result<()> {
        instructions::refund::handler(ctx)
    }
}
