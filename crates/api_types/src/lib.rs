use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an expense was split among its participants.
///
/// The split type is informational for everything except `settlement`,
/// which changes how the expense is announced to participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    #[default]
    Equal,
    Percentage,
    Exact,
    Share,
    Adjustment,
    Settlement,
}

impl SplitType {
    /// Returns the canonical split string used by the ledger/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Exact => "exact",
            Self::Share => "share",
            Self::Adjustment => "adjustment",
            Self::Settlement => "settlement",
        }
    }
}

pub mod expense {
    use super::*;

    /// One participant's share of a new expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub user_id: i32,
        /// Signed decimal amount, e.g. `"-12.50"`. Negative means the
        /// participant owes the payer.
        pub amount: String,
    }

    /// Request body for booking an expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        /// 3-letter currency code, e.g. `"EUR"`.
        pub currency: String,
        /// Decimal amount paid, e.g. `"100.00"`.
        pub amount: String,
        pub category: Option<String>,
        pub split_type: Option<SplitType>,
        /// Who paid. Defaults to the authenticated user.
        pub paid_by: Option<i32>,
        pub participants: Vec<ShareNew>,
        pub group_id: Option<i32>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        /// Defaults to the time of booking.
        pub expense_date: Option<DateTime<FixedOffset>>,
        /// Optional dedup key for safely retrying the same create request.
        pub transaction_id: Option<String>,
        /// Storage key of an attached receipt.
        pub file_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
        /// `false` when the dedup key matched an already booked expense.
        pub created: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub user_id: i32,
        /// Signed decimal amount, as stored when the expense was booked.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub name: String,
        pub currency: String,
        pub amount: String,
        pub category: String,
        pub split_type: SplitType,
        pub paid_by: i32,
        pub added_by: i32,
        pub group_id: Option<i32>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub expense_date: DateTime<FixedOffset>,
        pub transaction_id: Option<String>,
        pub file_key: Option<String>,
        pub deleted: bool,
        pub participants: Vec<ShareView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    /// An outstanding balance in one currency.
    ///
    /// Positive means the friend owes the requesting user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub currency: String,
        /// Signed decimal amount, e.g. `"-12.50"`.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendView {
        pub id: i32,
        pub name: Option<String>,
        pub email: Option<String>,
        /// One entry per currency with an outstanding balance.
        pub balances: Vec<BalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendsResponse {
        pub friends: Vec<FriendView>,
    }

    /// Response body for the balances against a single friend.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PairBalancesResponse {
        pub friend_id: i32,
        pub balances: Vec<BalanceView>,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    /// Request body for joining a group by its shareable id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupJoin {
        pub public_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: i32,
        /// Shareable id (UUID) other users join with.
        ///
        /// This is serialized as a string in JSON.
        pub public_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: i32,
        pub name: Option<String>,
        pub email: Option<String>,
    }

    /// A pairwise balance scoped to the group's expenses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupBalanceView {
        pub user_id: i32,
        pub friend_id: i32,
        pub currency: String,
        /// Signed decimal amount, e.g. `"-12.50"`.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: i32,
        pub public_id: Uuid,
        pub name: String,
        pub members: Vec<MemberView>,
        pub balances: Vec<GroupBalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }
}
