//! # In-Memory Ledgers
//!
//! Supply sources backing cross-net value. A ledger keeps account balances
//! plus the custody the router locks value into.
//!
//! On a root network value is escrowed: `lock` moves it into custody and
//! `transfer` pays it back out. On a child network the native currency is
//! issued by the parent, so `transfer` mints and `lock` burns.

use std::collections::BTreeMap;

use ipc_03_cross_msg::{SupplyError, SupplyKind, SupplySource};
use shared_types::{checked_add, checked_sub, Address, TokenAmount};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Accounts {
    balances: BTreeMap<Address, TokenAmount>,
    custody: TokenAmount,
}

impl Accounts {
    fn balance(&self, owner: &Address) -> TokenAmount {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn credit(&mut self, owner: Address, amount: TokenAmount) -> Result<(), SupplyError> {
        let balance = checked_add(self.balance(&owner), amount)?;
        self.balances.insert(owner, balance);
        Ok(())
    }

    fn debit(&mut self, owner: &Address, amount: TokenAmount) -> Result<(), SupplyError> {
        let available = self.balance(owner);
        if available < amount {
            return Err(SupplyError::InsufficientBalance {
                owner: *owner,
                required: amount,
                available,
            });
        }
        let remaining = checked_sub(available, amount)?;
        if remaining.is_zero() {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, remaining);
        }
        Ok(())
    }

    fn escrow(&mut self, from: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        let custody = checked_add(self.custody, value)?;
        self.debit(from, value)?;
        self.custody = custody;
        Ok(())
    }

    fn release(&mut self, to: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        if self.custody < value {
            return Err(SupplyError::InsufficientBalance {
                owner: Address::ZERO,
                required: value,
                available: self.custody,
            });
        }
        self.credit(*to, value)?;
        self.custody = checked_sub(self.custody, value)?;
        Ok(())
    }
}

/// Native currency of the local network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeLedger {
    accounts: Accounts,
    mintable: bool,
}

impl NativeLedger {
    /// Escrowing ledger of a root network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minting ledger of a child network.
    pub fn mintable() -> Self {
        Self {
            accounts: Accounts::default(),
            mintable: true,
        }
    }

    /// Whether transfers mint and locks burn.
    pub fn is_mintable(&self) -> bool {
        self.mintable
    }

    /// Credit `owner` outside of routing, e.g. at genesis.
    pub fn mint(&mut self, owner: Address, amount: TokenAmount) -> Result<(), SupplyError> {
        self.accounts.credit(owner, amount)
    }

    /// Value held in custody.
    pub fn custody(&self) -> TokenAmount {
        self.accounts.custody
    }
}

impl SupplySource for NativeLedger {
    fn kind(&self) -> SupplyKind {
        SupplyKind::Native
    }

    fn transfer(&mut self, to: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        if self.mintable {
            self.accounts.credit(*to, value)
        } else {
            self.accounts.release(to, value)
        }
    }

    fn lock(&mut self, from: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        if self.mintable {
            self.accounts.debit(from, value)
        } else {
            self.accounts.escrow(from, value)
        }
    }

    fn balance(&self, owner: &Address) -> TokenAmount {
        self.accounts.balance(owner)
    }
}

/// External token escrowed by the local network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLedger {
    token: Address,
    accounts: Accounts,
}

impl TokenLedger {
    /// Ledger for the token contract at `token`.
    pub fn new(token: Address) -> Self {
        Self {
            token,
            accounts: Accounts::default(),
        }
    }

    /// Token contract address.
    pub fn token(&self) -> Address {
        self.token
    }

    /// Credit `owner` outside of routing.
    pub fn mint(&mut self, owner: Address, amount: TokenAmount) -> Result<(), SupplyError> {
        self.accounts.credit(owner, amount)
    }

    /// Value held in custody.
    pub fn custody(&self) -> TokenAmount {
        self.accounts.custody
    }
}

impl SupplySource for TokenLedger {
    fn kind(&self) -> SupplyKind {
        SupplyKind::Token {
            address: self.token,
        }
    }

    fn transfer(&mut self, to: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        self.accounts.release(to, value)
    }

    fn lock(&mut self, from: &Address, value: TokenAmount) -> Result<(), SupplyError> {
        self.accounts.escrow(from, value)
    }

    fn balance(&self, owner: &Address) -> TokenAmount {
        self.accounts.balance(owner)
    }
}

/// All supply sources of the local network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledgers {
    native: NativeLedger,
    tokens: BTreeMap<Address, TokenLedger>,
}

impl Ledgers {
    /// Ledgers around a native ledger.
    pub fn new(native: NativeLedger) -> Self {
        Self {
            native,
            tokens: BTreeMap::new(),
        }
    }

    /// Native ledger.
    pub fn native(&self) -> &NativeLedger {
        &self.native
    }

    /// Mutable native ledger.
    pub fn native_mut(&mut self) -> &mut NativeLedger {
        &mut self.native
    }

    /// Ledger of `token`, if registered.
    pub fn token(&self, token: &Address) -> Option<&TokenLedger> {
        self.tokens.get(token)
    }

    /// Ledger of `token`, created on first use.
    pub fn token_mut(&mut self, token: Address) -> &mut TokenLedger {
        self.tokens
            .entry(token)
            .or_insert_with(|| TokenLedger::new(token))
    }

    /// Supply source for `kind`.
    pub fn source_mut(&mut self, kind: &SupplyKind) -> Result<&mut dyn SupplySource, SupplyError> {
        match kind {
            SupplyKind::Native => Ok(&mut self.native),
            SupplyKind::Token { address } => self
                .tokens
                .get_mut(address)
                .map(|ledger| ledger as &mut dyn SupplySource)
                .ok_or(SupplyError::UnknownSource { kind: *kind }),
        }
    }

    /// Balance of `owner` in `kind`; zero for unknown tokens.
    pub fn balance(&self, kind: &SupplyKind, owner: &Address) -> TokenAmount {
        match kind {
            SupplyKind::Native => self.native.balance(owner),
            SupplyKind::Token { address } => self
                .tokens
                .get(address)
                .map(|ledger| ledger.balance(owner))
                .unwrap_or_default(),
        }
    }
}
