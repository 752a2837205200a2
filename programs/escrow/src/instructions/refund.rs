use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{close_account, transfer_checked, CloseAccount, Mint, Token, TokenAccount, TransferChecked},
};

use crate::{
    derivation::EscrowSigner,
    events::EscrowRefunded,
    helpers::{ProgramAccount, VaultAccount},
    settlement,
    state::{Escrow, TradeState, Transition},
};

#[derive(Accounts)]
pub struct Refund<'info> {
    /// The caller; must be the maker of record to refund
    #[account(mut)]
    pub maker: Signer<'info>,

    /// CHECK: escrow record; loaded, re-derived and matched against the
    /// caller by the handler (will be closed)
    #[account(mut)]
    pub escrow: UncheckedAccount<'info>,

    /// Token A mint
    pub mint_a: Account<'info, Mint>,

    /// CHECK: vault holding Token A; checked against the record by the handler
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,

    /// Maker's associated token account for Token A (receives refund)
    #[account(
        init_if_needed,
        payer = maker,
        associated_token::mint = mint_a,
        associated_token::authority = maker,
    )]
    pub maker_ata_a: Account<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Refund<'info> {
    /// Withdraw all Token A from vault back to maker and close the vault
    pub fn refund_and_close_vault(&mut self, amount: u64, signer: &EscrowSigner) -> Result<()> {
        let seeds = signer.seeds();
        let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];

        // Transfer all Token A from vault back to maker
        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.mint_a.to_account_info(),
            to: self.maker_ata_a.to_account_info(),
            authority: self.escrow.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);

        transfer_checked(cpi_ctx, amount, self.mint_a.decimals)?;

        // Close the vault account and return rent to maker
        let cpi_accounts = CloseAccount {
            account: self.vault.to_account_info(),
            destination: self.maker.to_account_info(),
            authority: self.escrow.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);

        close_account(cpi_ctx)
    }

    /// Close the escrow record and return its rent to maker
    pub fn close_escrow(&mut self) -> Result<()> {
        ProgramAccount::close(&self.escrow.to_account_info(), &self.maker.to_account_info())
    }
}

/// Handler for the refund instruction
pub fn handler(ctx: Context<Refund>) -> Result<()> {
    let accounts = ctx.accounts;

    TradeState::of(&accounts.escrow).apply(Transition::Refund)?;
    let record = Escrow::load(&accounts.escrow)?;
    let signer = EscrowSigner::verify(&accounts.escrow.key(), &record)?;

    // Caller identity is checked before anything else is read or moved
    settlement::authorize_refund(&record, &accounts.maker.key())?;

    let vault = VaultAccount::load(&accounts.vault, &accounts.escrow.key(), &record.mint_a)?;
    let reversal = settlement::plan_refund(&record, &accounts.mint_a.key(), vault.amount)?;

    // Withdraw Token A from vault back to maker and close vault
    accounts.refund_and_close_vault(reversal.amount, &signer)?;

    accounts.close_escrow()?;

    msg!("Escrow {} refunded: {} returned to maker", accounts.escrow.key(), reversal.amount);
    emit!(EscrowRefunded {
        escrow: accounts.escrow.key(),
        maker: record.maker,
        refunded: reversal.amount,
    });

    Ok(())
}
