//! Admin tool for the session catalog

use chrono::Local;
use clap::{Parser, Subcommand};
use shift_report_bot::catalog::{SqliteCatalog, DATE_FORMAT, DEFAULT_ROLE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shift-report-catalog",
    about = "Manage the roles and daily sessions offered by the shift report bot",
    version
)]
struct Cli {
    /// Catalog database path
    #[arg(long, global = true, env = "CATALOG_DB_PATH", default_value = "bot.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Create the catalog tables
    Init,

    /// Offer a session to a role on a given day
    AddSession {
        name: String,

        #[arg(long, default_value = DEFAULT_ROLE)]
        role: String,

        /// Day as DD.MM (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Assign a role to a user
    SetRole { user_id: i64, role: String },

    /// List sessions
    List {
        /// Only this day (DD.MM)
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },
}

fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let catalog = SqliteCatalog::open(&cli.db, DEFAULT_ROLE)?;

    match cli.command {
        Commands::Init => println!("Catalog ready at {}", cli.db.display()),
        Commands::AddSession { name, role, date } => {
            let date = date.unwrap_or_else(today);
            if catalog.add_session(&name, &role, &date)? {
                println!("Added {name:?} for {role} on {date}");
            } else {
                println!("{name:?} already offered to {role} on {date}");
            }
        }
        Commands::SetRole { user_id, role } => {
            catalog.set_role(user_id, &role)?;
            println!("User {user_id} is now {role}");
        }
        Commands::List { date, json } => {
            let entries = catalog.list_sessions(date.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No sessions");
            } else {
                for entry in entries {
                    println!("{}  {:<16} {}", entry.date, entry.role, entry.name);
                }
            }
        }
    }

    Ok(())
}
