//! Applies the Spesa schema to the database named by `DATABASE_URL`.

use std::str::FromStr;

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./spesa.db?mode=rwc";
const USAGE: &str = "Usage: migration [up|down|fresh|refresh|reset|status]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MigrateCommand {
    Up,
    Down,
    Fresh,
    Refresh,
    Reset,
    Status,
}

impl FromStr for MigrateCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "fresh" => Ok(Self::Fresh),
            "refresh" => Ok(Self::Refresh),
            "reset" => Ok(Self::Reset),
            "status" => Ok(Self::Status),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = match std::env::args().nth(1) {
        Some(raw) => match raw.parse::<MigrateCommand>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}\n{USAGE}");
                std::process::exit(2);
            }
        },
        None => MigrateCommand::Up,
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command {
        MigrateCommand::Up => migration::Migrator::up(&db, None).await?,
        MigrateCommand::Down => migration::Migrator::down(&db, Some(1)).await?,
        MigrateCommand::Fresh => migration::Migrator::fresh(&db).await?,
        MigrateCommand::Refresh => migration::Migrator::refresh(&db).await?,
        MigrateCommand::Reset => migration::Migrator::reset(&db).await?,
        MigrateCommand::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
