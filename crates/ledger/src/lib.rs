//! Pairwise debt ledger.
//!
//! The crate keeps track of who owes whom across users, per currency, with an
//! optional group-scoped mirror of the same numbers. Expenses are the only
//! thing that moves balances: creating one applies per-participant deltas,
//! soft-deleting one reverses them from the stored shares. All writes go
//! through [`Ledger`] and commit atomically.
//!
//! Follow-up work (zero reconciliation, push notifications) is returned as
//! [`Effect`] values and runs after the commit, never inside it.

mod balances;
mod commands;
mod currency;
mod effects;
mod error;
mod expense_participants;
mod expenses;
mod group_balances;
mod group_users;
mod groups;
mod import;
mod money;
mod ops;
mod users;

pub use balances::{BalanceAmount, FriendBalances};
pub use commands::ExpenseCmd;
pub use currency::Currency;
pub use effects::{Effect, NotificationDispatcher, PushPayload};
pub use error::LedgerError;
pub use expenses::{Expense, ExpenseOutcome, Share, SplitType};
pub use group_balances::GroupBalanceEntry;
pub use groups::{Group, GroupOverview};
pub use import::{ImportSummary, SplitwiseBalanceLine, SplitwiseGroup, SplitwiseUser};
pub use money::Money;
pub use ops::{Ledger, LedgerBuilder, normalize_email};
pub use users::Profile;

type ResultLedger<T> = Result<T, LedgerError>;
