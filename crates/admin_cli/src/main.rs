use std::error::Error;

use clap::{Args, Parser, Subcommand};
use ledger::Ledger;
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap users/groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    /// Email, matched case-insensitively against Splitwise imports.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    owner_id: i32,
    #[arg(long)]
    name: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let email = args.email.as_deref().and_then(ledger::normalize_email);

            if let Some(email) = &email {
                if users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .one(&db)
                    .await?
                    .is_some()
                {
                    eprintln!("email already in use: {email}");
                    std::process::exit(1);
                }
            }

            let user = users::ActiveModel {
                name: Set(Some(args.name.clone())),
                email: Set(email),
                ..Default::default()
            };
            let result = users::Entity::insert(user).exec(&db).await?;

            println!("created user: {} (id {})", args.name, result.last_insert_id);
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.owner_id)
                .one(&db)
                .await?
                .is_none()
            {
                eprintln!("user not found: {}", args.owner_id);
                std::process::exit(1);
            }

            let ledger = Ledger::builder().database(db.clone()).build().await?;
            let group = ledger.create_group(&args.name, args.owner_id).await?;
            println!("created group: {} ({})", group.name, group.public_id);
        }
    }

    Ok(())
}
