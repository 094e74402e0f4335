//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Tally:
//!
//! - `users`: identities referenced everywhere else
//! - `groups`: named circles of users
//! - `group_users`: group rosters
//! - `expenses`: monetary events, soft-deleted, never dropped
//! - `expense_participants`: stored signed shares per expense
//! - `balances`: pairwise per-currency "who owes whom" rows
//! - `group_balances`: group-scoped mirror of the pairwise rows

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    PublicId,
    Name,
    UserId,
    SplitwiseGroupId,
}

#[derive(Iden)]
enum GroupUsers {
    Table,
    GroupId,
    UserId,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    GroupId,
    PaidBy,
    AddedBy,
    Name,
    Category,
    Currency,
    Amount,
    SplitType,
    ExpenseDate,
    CreatedAt,
    TransactionId,
    FileKey,
    Imported,
    DeletedAt,
    DeletedBy,
}

#[derive(Iden)]
enum ExpenseParticipants {
    Table,
    ExpenseId,
    UserId,
    Amount,
}

#[derive(Iden)]
enum Balances {
    Table,
    UserId,
    Currency,
    FriendId,
    Amount,
    ImportedFromSplitwise,
}

#[derive(Iden)]
enum GroupBalances {
    Table,
    GroupId,
    Currency,
    UserId,
    FriendId,
    Amount,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string())
                    .col(ColumnDef::new(Users::Email).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::PublicId).string().not_null())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::UserId).integer().not_null())
                    .col(ColumnDef::new(Groups::SplitwiseGroupId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-user_id")
                            .from(Groups::Table, Groups::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-public_id-unique")
                    .table(Groups::Table)
                    .col(Groups::PublicId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-splitwise_group_id-unique")
                    .table(Groups::Table)
                    .col(Groups::SplitwiseGroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Group Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupUsers::GroupId).integer().not_null())
                    .col(ColumnDef::new(GroupUsers::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupUsers::GroupId)
                            .col(GroupUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_users-group_id")
                            .from(GroupUsers::Table, GroupUsers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_users-user_id")
                            .from(GroupUsers::Table, GroupUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_users-user_id")
                    .table(GroupUsers::Table)
                    .col(GroupUsers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::GroupId).integer())
                    .col(ColumnDef::new(Expenses::PaidBy).integer().not_null())
                    .col(ColumnDef::new(Expenses::AddedBy).integer().not_null())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::SplitType).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::ExpenseDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::TransactionId).string())
                    .col(ColumnDef::new(Expenses::FileKey).string())
                    .col(
                        ColumnDef::new(Expenses::Imported)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::DeletedAt).timestamp())
                    .col(ColumnDef::new(Expenses::DeletedBy).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(Groups::Table, Groups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-paid_by")
                            .from(Expenses::Table, Expenses::PaidBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-added_by")
                            .from(Expenses::Table, Expenses::AddedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-paid_by-expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::PaidBy)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        // Dedup key is unique among live rows only; deletion clears it so
        // the same bank transaction can be booked again. Partial indexes are
        // not expressible through the builder.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX \"idx-expenses-transaction_id-live\" \
                 ON \"expenses\" (\"transaction_id\") \
                 WHERE \"transaction_id\" IS NOT NULL AND \"deleted_at\" IS NULL",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense Participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseParticipants::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpenseParticipants::ExpenseId)
                            .col(ExpenseParticipants::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-expense_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-user_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_participants-user_id")
                    .table(ExpenseParticipants::Table)
                    .col(ExpenseParticipants::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Balances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Balances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Balances::UserId).integer().not_null())
                    .col(ColumnDef::new(Balances::Currency).string().not_null())
                    .col(ColumnDef::new(Balances::FriendId).integer().not_null())
                    .col(ColumnDef::new(Balances::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Balances::ImportedFromSplitwise)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(Balances::UserId)
                            .col(Balances::Currency)
                            .col(Balances::FriendId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balances-user_id")
                            .from(Balances::Table, Balances::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balances-friend_id")
                            .from(Balances::Table, Balances::FriendId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balances-friend_id")
                    .table(Balances::Table)
                    .col(Balances::FriendId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Group Balances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupBalances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupBalances::GroupId).integer().not_null())
                    .col(ColumnDef::new(GroupBalances::Currency).string().not_null())
                    .col(ColumnDef::new(GroupBalances::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(GroupBalances::FriendId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupBalances::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GroupBalances::GroupId)
                            .col(GroupBalances::Currency)
                            .col(GroupBalances::UserId)
                            .col(GroupBalances::FriendId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_balances-group_id")
                            .from(GroupBalances::Table, GroupBalances::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_balances-user_id")
                    .table(GroupBalances::Table)
                    .col(GroupBalances::UserId)
                    .col(GroupBalances::FriendId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(GroupBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Balances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
