use sea_orm::Database;
use sea_orm_migration::prelude::*;

fn usage() -> ! {
    eprintln!("Usage: migration [up|down|fresh|status]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1);
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./tally.db?mode=rwc".to_string());
    let db = Database::connect(&db_url).await?;

    match command.as_deref() {
        // A bare invocation applies pending migrations, like the app does.
        None | Some("up") => migration::Migrator::up(&db, None).await?,
        Some("down") => migration::Migrator::down(&db, None).await?,
        Some("fresh") => migration::Migrator::fresh(&db).await?,
        Some("status") => migration::Migrator::status(&db).await?,
        Some(_) => usage(),
    }

    Ok(())
}
