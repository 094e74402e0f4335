use sea_orm::DatabaseConnection;

use crate::{LedgerError, ResultLedger};

mod balances;
mod expenses;
mod groups;
mod import;
mod notify;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyName(label.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Lowercased, trimmed email, the identity key users are matched on.
/// `None` for blank input. Every path that stores or resolves an email
/// must go through this, or the same address can mint two user rows.
pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_required_name_trims() {
        assert_eq!(normalize_required_name("  Trip ", "group").unwrap(), "Trip");
        assert!(normalize_required_name("   ", "group").is_err());
    }

    #[test]
    fn normalize_email_lowercases() {
        assert_eq!(
            normalize_email("  Bob@Example.COM "),
            Some("bob@example.com".to_string())
        );
        // Unicode lowercasing, not just ASCII.
        assert_eq!(
            normalize_email("Özge@Müller.example"),
            Some("özge@müller.example".to_string())
        );
        assert_eq!(normalize_email("   "), None);
    }
}
