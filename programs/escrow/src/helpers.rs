use anchor_lang::{
    prelude::*,
    system_program::{self, Allocate, Assign, CreateAccount, Transfer},
};
use anchor_spl::token::{self, TokenAccount};

use crate::{derivation::vault_address, derivation::EscrowSigner, errors::EscrowError};

/// Program account helper for escrow records
pub struct ProgramAccount;

impl ProgramAccount {
    /// Create a program-owned account at a PDA, signed with the record's seeds.
    ///
    /// A PDA can hold lamports before it is created (anyone may transfer to
    /// it), in which case it is topped up, allocated and assigned instead.
    pub fn create<'info>(
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &AccountInfo<'info>,
        space: usize,
        signer: &EscrowSigner,
    ) -> Result<()> {
        let seeds = signer.seeds();
        let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];
        let rent = Rent::get()?.minimum_balance(space);
        let current = account.lamports();

        if current == 0 {
            let cpi_accounts = CreateAccount {
                from: payer.clone(),
                to: account.clone(),
            };
            let cpi_ctx = CpiContext::new_with_signer(system_program.clone(), cpi_accounts, signer_seeds);
            return system_program::create_account(cpi_ctx, rent, space as u64, &crate::ID);
        }

        let top_up = rent.saturating_sub(current);
        if top_up > 0 {
            let cpi_accounts = Transfer {
                from: payer.clone(),
                to: account.clone(),
            };
            system_program::transfer(CpiContext::new(system_program.clone(), cpi_accounts), top_up)?;
        }

        let cpi_accounts = Allocate {
            account_to_allocate: account.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(system_program.clone(), cpi_accounts, signer_seeds);
        system_program::allocate(cpi_ctx, space as u64)?;

        let cpi_accounts = Assign {
            account_to_assign: account.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(system_program.clone(), cpi_accounts, signer_seeds);
        system_program::assign(cpi_ctx, &crate::ID)
    }

    /// Close a program account and move its lamports to `destination`
    pub fn close<'info>(account: &AccountInfo<'info>, destination: &AccountInfo<'info>) -> Result<()> {
        let lamports = account.lamports();
        let credited = destination
            .lamports()
            .checked_add(lamports)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        **destination.try_borrow_mut_lamports()? = credited;
        **account.try_borrow_mut_lamports()? = 0;

        // Owner can only change once the data is zeroed
        account.try_borrow_mut_data()?.fill(0);
        account.assign(&system_program::ID);
        account.resize(0)?;

        Ok(())
    }
}

/// Custody vault helper
pub struct VaultAccount;

impl VaultAccount {
    /// Load the live vault of `escrow` for `mint`.
    ///
    /// A vault that no longer exists means the trade already settled.
    pub fn load(vault: &AccountInfo, escrow: &Pubkey, mint: &Pubkey) -> Result<TokenAccount> {
        require_keys_eq!(*vault.key, vault_address(escrow, mint), EscrowError::InvalidVault);
        if vault.data_is_empty() {
            return err!(EscrowError::TradeNotFound);
        }
        require_keys_eq!(*vault.owner, token::ID, EscrowError::InvalidVault);

        let data = vault.try_borrow_data()?;
        let account = TokenAccount::try_deserialize(&mut &data[..])
            .map_err(|_| error!(EscrowError::InvalidVault))?;
        require_keys_eq!(account.owner, *escrow, EscrowError::InvalidVault);
        require_keys_eq!(account.mint, *mint, EscrowError::InvalidVault);

        Ok(account)
    }
}
