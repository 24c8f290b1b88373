use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use safari_concierge::{AgentSettings, CatalogSearch, ChatError, ChatSession, SafariAgent};
use safari_core::{PriceTables, ResponseTable, TripDraft};
use safari_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "safari")]
#[command(about = "Safari Adventures booking and chat assistant")]
struct Cli {
    /// Artificial pause before the assistant answers.
    #[arg(long, env = "SAFARI_CHAT_REPLY_DELAY_MS", default_value_t = 1000)]
    reply_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print destinations, accommodation tiers and activities.
    Tables,
    /// Price a trip.
    Quote {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = 2)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
        #[arg(long)]
        tier: Option<String>,
        #[arg(long = "activity")]
        activities: Vec<String>,
    },
    /// Search destinations, or journal posts with `--posts`.
    Search {
        /// Matched case-insensitively; empty lists everything.
        #[arg(default_value = "")]
        query: String,
        /// Exact category, or `all`.
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        posts: bool,
    },
    /// Talk to the safari assistant.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("safari_cli");
    let cli = Cli::parse();

    let settings = AgentSettings {
        reply_delay: Duration::from_millis(cli.reply_delay_ms),
        ..AgentSettings::default()
    };

    let agent = SafariAgent::new(
        PriceTables::default(),
        ResponseTable::default(),
        settings.clone(),
        AppMetrics::shared(),
    );

    match cli.command {
        Command::Tables => {
            println!("{}", serde_json::to_string_pretty(agent.price_tables())?);
        }
        Command::Quote {
            destination,
            start,
            end,
            adults,
            children,
            tier,
            activities,
        } => {
            let draft = TripDraft {
                destination_id: Some(destination),
                start_date: Some(start),
                end_date: Some(end),
                party_size: adults,
                children,
                accommodation_tier: tier,
                selected_activities: activities.into_iter().collect(),
            };

            let quote = agent.quote(&draft).context("could not price this trip")?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::Search {
            query,
            category,
            posts,
        } => {
            let search = CatalogSearch { q: query, category };
            let rendered = if posts {
                serde_json::to_string_pretty(&agent.search_posts(&search))?
            } else {
                serde_json::to_string_pretty(&agent.search_destinations(&search))?
            };
            println!("{rendered}");
        }
        Command::Chat => run_chat(settings.reply_delay).await?,
    }

    Ok(())
}

async fn run_chat(reply_delay: Duration) -> Result<()> {
    let session = ChatSession::new(Arc::new(ResponseTable::default()), reply_delay);

    for message in session.transcript() {
        println!("\n{}\n", message.text);
    }
    let suggestions = session.quick_replies();
    if !suggestions.is_empty() {
        println!("Try asking:");
        for suggestion in suggestions {
            println!("- {suggestion}");
        }
        println!();
    }
    println!("type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim_end_matches(['\r', '\n']);
        let command = message.trim();
        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            break;
        }

        let pending = match session.send(message) {
            Ok(pending) => pending,
            Err(ChatError::BlankInput) => continue,
            Err(error @ ChatError::InputTooLong { .. }) => {
                println!("\n{error}\n");
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        let reply = pending.wait().await?;
        println!("\n{}\n", reply.message.text);
    }

    session.close();
    Ok(())
}
