use clap::{Parser, Subcommand};
use intake_core::config::{db_path_from_env_value, fallback_medical_id_from_env_value};
use intake_core::{BotService, CallLogService, RecordStore, SampleDirectory, WebhookService};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Intake agent backend CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bot records
    Bots,
    /// Delete a bot record
    DeleteBot {
        /// Bot uid
        uid: String,
    },
    /// List call log entries
    Logs,
    /// Look up a patient the way the pre-call webhook does
    Patient {
        /// Medical id (e.g. MED1001)
        medical_id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = Arc::new(RecordStore::open(db_path_from_env_value(
        std::env::var("INTAKE_DB_PATH").ok(),
    )));

    match cli.command {
        Some(Commands::Bots) => {
            let bots = BotService::new(store).list();
            if bots.is_empty() {
                println!("No bots found.");
            } else {
                println!("{}", serde_json::to_string_pretty(&bots)?);
            }
        }
        Some(Commands::DeleteBot { uid }) => match BotService::new(store).delete(&uid) {
            Ok(0) => println!("No bot with uid: {}", uid),
            Ok(_) => println!("Deleted bot: {}", uid),
            Err(e) => eprintln!("Error deleting bot: {}", e),
        },
        Some(Commands::Logs) => {
            let logs = CallLogService::new(store).list();
            if logs.is_empty() {
                println!("No call logs found.");
            } else {
                println!("{}", serde_json::to_string_pretty(&logs)?);
            }
        }
        Some(Commands::Patient { medical_id }) => {
            let webhooks = WebhookService::new(
                Arc::new(SampleDirectory::new()),
                CallLogService::new(store),
                fallback_medical_id_from_env_value(
                    std::env::var("INTAKE_FALLBACK_MEDICAL_ID").ok(),
                ),
            );
            let res = webhooks.precall(Some(&medical_id), None);
            println!("{}", serde_json::to_string_pretty(&res.patient)?);
        }
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(())
}
