//! External (Splitwise) snapshot shapes and the import summary.
//!
//! Payloads are deserialized eagerly into these structs at the boundary; the
//! merge logic only ever sees typed rows.

use serde::{Deserialize, Serialize};

/// One friend entry of an external snapshot.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SplitwiseUser {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Outstanding balances toward the importing user, one entry per
    /// currency, amounts as decimal strings.
    #[serde(default)]
    pub balance: Vec<SplitwiseBalanceLine>,
}

impl SplitwiseUser {
    pub(crate) fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name.trim()),
            _ => self.first_name.trim().to_string(),
        }
    }
}

/// One per-currency balance line of a friend entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SplitwiseBalanceLine {
    pub currency_code: String,
    pub amount: String,
}

/// One group entry of an external snapshot.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SplitwiseGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub members: Vec<SplitwiseUser>,
}

/// Counters describing what an import run changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub users_created: u32,
    pub balances_applied: u32,
    pub balances_skipped: u32,
    pub groups_created: u32,
    pub groups_skipped: u32,
}
