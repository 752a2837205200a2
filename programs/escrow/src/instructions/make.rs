use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::{self, AssociatedToken},
    token::{transfer_checked, Mint, Token, TokenAccount, TransferChecked},
};

use crate::{
    derivation::{vault_address, EscrowSigner},
    errors::EscrowError,
    events::EscrowMade,
    helpers::{ProgramAccount, VaultAccount},
    settlement,
    state::{Escrow, TradeState, Transition},
    ESCROW_SEED,
};

#[derive(Accounts)]
#[instruction(seed: u64)]
pub struct Make<'info> {
    /// The maker who sets exchange terms and deposits Token A
    #[account(mut)]
    pub maker: Signer<'info>,

    /// CHECK: escrow record PDA; must be empty and is created by the handler
    /// once the terms are validated, so a live record fails as a duplicate
    #[account(
        mut,
        seeds = [ESCROW_SEED, maker.key().as_ref(), seed.to_le_bytes().as_ref()],
        bump,
    )]
    pub escrow: UncheckedAccount<'info>,

    /// Token A mint (the token the maker will deposit)
    pub mint_a: Account<'info, Mint>,

    /// Token B mint (the token the maker wants to receive)
    pub mint_b: Account<'info, Mint>,

    /// Maker's associated token account for Token A (source of deposit)
    #[account(
        mut,
        associated_token::mint = mint_a,
        associated_token::authority = maker,
    )]
    pub maker_ata_a: Account<'info, TokenAccount>,

    /// CHECK: pinned to the escrow's associated token account for Token A,
    /// created (or adopted while empty) by the handler after the record
    #[account(
        mut,
        address = vault_address(&escrow.key(), &mint_a.key()) @ EscrowError::InvalidVault,
    )]
    pub vault: UncheckedAccount<'info>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Make<'info> {
    /// Create the escrow account and write the exchange terms
    pub fn init_escrow(&mut self, seed: u64, receive: u64, bump: u8) -> Result<()> {
        let signer = EscrowSigner::new(self.maker.key(), seed, bump);
        ProgramAccount::create(
            &self.escrow.to_account_info(),
            &self.maker.to_account_info(),
            &self.system_program.to_account_info(),
            Escrow::SPACE,
            &signer,
        )?;

        let record = Escrow {
            seed,
            maker: self.maker.key(),
            mint_a: self.mint_a.key(),
            mint_b: self.mint_b.key(),
            receive,
            bump,
        };
        let mut data = self.escrow.try_borrow_mut_data()?;
        let mut writer = &mut data[..];
        record.try_serialize(&mut writer)?;

        Ok(())
    }

    /// Create the vault as the escrow's associated token account for Token A.
    ///
    /// Anyone can open an associated token account for any owner, so the
    /// vault may already exist; it is adopted only while it is still empty.
    pub fn init_vault(&mut self) -> Result<()> {
        let cpi_accounts = associated_token::Create {
            payer: self.maker.to_account_info(),
            associated_token: self.vault.to_account_info(),
            authority: self.escrow.to_account_info(),
            mint: self.mint_a.to_account_info(),
            system_program: self.system_program.to_account_info(),
            token_program: self.token_program.to_account_info(),
        };
        let cpi_program = self.associated_token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        associated_token::create_idempotent(cpi_ctx)?;

        let vault = VaultAccount::load(&self.vault, &self.escrow.key(), &self.mint_a.key())?;
        require_eq!(vault.amount, 0, EscrowError::InvalidVault);

        Ok(())
    }

    /// Transfer Token A from maker to vault
    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        let cpi_accounts = TransferChecked {
            from: self.maker_ata_a.to_account_info(),
            mint: self.mint_a.to_account_info(),
            to: self.vault.to_account_info(),
            authority: self.maker.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        transfer_checked(cpi_ctx, amount, self.mint_a.decimals)
    }
}

/// Handler for the make instruction
pub fn handler(ctx: Context<Make>, seed: u64, receive: u64, deposit: u64) -> Result<()> {
    let accounts = ctx.accounts;

    TradeState::of(&accounts.escrow).apply(Transition::Make)?;
    let plan = settlement::plan_make(
        deposit,
        receive,
        &accounts.mint_a.key(),
        &accounts.mint_b.key(),
        accounts.maker_ata_a.amount,
    )?;

    accounts.init_escrow(seed, receive, ctx.bumps.escrow)?;
    accounts.init_vault()?;
    accounts.deposit(plan.amount)?;

    msg!(
        "Escrow {} opened: {} of {} for {} of {}",
        accounts.escrow.key(),
        plan.amount,
        accounts.mint_a.key(),
        receive,
        accounts.mint_b.key()
    );
    emit!(EscrowMade {
        escrow: accounts.escrow.key(),
        maker: accounts.maker.key(),
        seed,
        mint_a: accounts.mint_a.key(),
        mint_b: accounts.mint_b.key(),
        deposit: plan.amount,
        receive,
    });

    Ok(())
}
