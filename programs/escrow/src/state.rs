use anchor_lang::prelude::*;
use anchor_lang::Discriminator;

use crate::errors::EscrowError;

/// Escrow account that stores all the exchange terms
#[account(discriminator = 1)]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Escrow {
    /// Seed used for PDA derivation
    pub seed: u64,
    /// The maker's wallet address (creator of the escrow)
    pub maker: Pubkey,
    /// Token A mint address (the token maker deposits)
    pub mint_a: Pubkey,
    /// Token B mint address (the token maker wants to receive)
    pub mint_b: Pubkey,
    /// Amount of Token B the maker wants to receive
    pub receive: u64,
    /// Bump seed for PDA derivation (cached so the record can sign for its vault)
    pub bump: u8,
}

impl Escrow {
    /// Account size including the discriminator
    pub const SPACE: usize = <Escrow as Discriminator>::DISCRIMINATOR.len() + Escrow::INIT_SPACE;

    /// Load a live record from an account the program has not validated yet.
    pub fn load(info: &AccountInfo) -> Result<Self> {
        require_keys_eq!(*info.owner, crate::ID, EscrowError::TradeNotFound);

        let data = info.try_borrow_data()?;
        Self::try_deserialize(&mut &data[..]).map_err(|_| error!(EscrowError::TradeNotFound))
    }
}

/// Lifecycle of one `(maker, seed)` trade
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeState {
    Absent,
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Make,
    Take,
    Refund,
}

impl TradeState {
    /// Observe the state of a record address.
    ///
    /// Closing reclaims the account, so a closed record reads back as `Absent`
    /// once its transaction lands; `Closed` only exists as a transition result.
    pub fn of(info: &AccountInfo) -> Self {
        if info.owner != &crate::ID {
            return TradeState::Absent;
        }
        match info.try_borrow_data() {
            Ok(data) if data.starts_with(Escrow::DISCRIMINATOR) => TradeState::Open,
            _ => TradeState::Absent,
        }
    }

    pub fn apply(self, transition: Transition) -> Result<TradeState> {
        match (self, transition) {
            (TradeState::Absent, Transition::Make) => Ok(TradeState::Open),
            (TradeState::Open, Transition::Take | Transition::Refund) => Ok(TradeState::Closed),
            (TradeState::Open | TradeState::Closed, Transition::Make) => {
                err!(EscrowError::DuplicateTrade)
            }
            (TradeState::Absent | TradeState::Closed, Transition::Take | Transition::Refund) => {
                err!(EscrowError::TradeNotFound)
            }
        }
    }
}
