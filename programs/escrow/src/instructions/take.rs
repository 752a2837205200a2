use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{close_account, transfer_checked, CloseAccount, Mint, Token, TokenAccount, TransferChecked},
};

use crate::{
    derivation::EscrowSigner,
    events::EscrowTaken,
    helpers::{ProgramAccount, VaultAccount},
    settlement,
    state::{Escrow, TradeState, Transition},
};

#[derive(Accounts)]
pub struct Take<'info> {
    /// The taker who accepts the exchange terms
    #[account(mut)]
    pub taker: Signer<'info>,

    /// The original maker who created the escrow
    #[account(mut)]
    pub maker: SystemAccount<'info>,

    /// CHECK: escrow record; loaded and re-derived by the handler so a
    /// settled trade fails as not found (will be closed)
    #[account(mut)]
    pub escrow: UncheckedAccount<'info>,

    /// Token A mint
    pub mint_a: Box<Account<'info, Mint>>,

    /// Token B mint
    pub mint_b: Box<Account<'info, Mint>>,

    /// CHECK: vault holding Token A; checked against the record by the handler
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,

    /// Taker's associated token account for Token A (receives Token A)
    #[account(
        init_if_needed,
        payer = taker,
        associated_token::mint = mint_a,
        associated_token::authority = taker,
    )]
    pub taker_ata_a: Box<Account<'info, TokenAccount>>,

    /// Taker's associated token account for Token B (source of Token B)
    #[account(
        mut,
        associated_token::mint = mint_b,
        associated_token::authority = taker,
    )]
    pub taker_ata_b: Box<Account<'info, TokenAccount>>,

    /// Maker's associated token account for Token B (receives Token B)
    #[account(
        init_if_needed,
        payer = taker,
        associated_token::mint = mint_b,
        associated_token::authority = maker,
    )]
    pub maker_ata_b: Box<Account<'info, TokenAccount>>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Take<'info> {
    /// Transfer Token B from taker to maker
    pub fn transfer_to_maker(&mut self, amount: u64) -> Result<()> {
        let cpi_accounts = TransferChecked {
            from: self.taker_ata_b.to_account_info(),
            mint: self.mint_b.to_account_info(),
            to: self.maker_ata_b.to_account_info(),
            authority: self.taker.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        transfer_checked(cpi_ctx, amount, self.mint_b.decimals)
    }

    /// Withdraw Token A from vault to taker, then close the vault
    pub fn withdraw_and_close_vault(&mut self, amount: u64, signer: &EscrowSigner) -> Result<()> {
        let seeds = signer.seeds();
        let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];

        // Transfer all Token A from vault to taker
        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.mint_a.to_account_info(),
            to: self.taker_ata_a.to_account_info(),
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

/// Handler for the take instruction
pub fn handler(ctx: Context<Take>) -> Result<()> {
    let accounts = ctx.accounts;

    // Every check runs before the first transfer
    TradeState::of(&accounts.escrow).apply(Transition::Take)?;
    let record = Escrow::load(&accounts.escrow)?;
    let signer = EscrowSigner::verify(&accounts.escrow.key(), &record)?;
    settlement::match_terms(
        &record,
        &accounts.maker.key(),
        &accounts.mint_a.key(),
        &accounts.mint_b.key(),
    )?;
    let vault = VaultAccount::load(&accounts.vault, &accounts.escrow.key(), &record.mint_a)?;
    let swap = settlement::plan_take(&record, vault.amount, accounts.taker_ata_b.amount)?;

    // First, transfer Token B from taker to maker
    accounts.transfer_to_maker(swap.pay_maker)?;

    // Then, withdraw Token A from vault to taker and close vault
    accounts.withdraw_and_close_vault(swap.release_to_taker, &signer)?;

    accounts.close_escrow()?;

    msg!(
        "Escrow {} taken by {}: paid {}, released {}",
        accounts.escrow.key(),
        accounts.taker.key(),
        swap.pay_maker,
        swap.release_to_taker
    );
    emit!(EscrowTaken {
        escrow: accounts.escrow.key(),
        maker: record.maker,
        taker: accounts.taker.key(),
        paid: swap.pay_maker,
        released: swap.release_to_taker,
    });

    Ok(())
}
