use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use orchid_agents::ConciergeAgent;
use orchid_core::{room_catalog, ChatInput, HotelInfo, SearchParams};
use orchid_observability::{init_tracing, AppMetrics};
use orchid_storage::MemoryStore;

#[derive(Debug, Parser)]
#[command(name = "frontdesk")]
#[command(about = "Orchid House front desk CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct StayArgs {
    #[arg(long)]
    check_in: Option<NaiveDate>,

    #[arg(long)]
    check_out: Option<NaiveDate>,

    #[arg(long, default_value_t = 2)]
    adults: u8,

    #[arg(long, default_value_t = 0)]
    children: u8,
}

impl StayArgs {
    fn into_search_params(self) -> SearchParams {
        SearchParams {
            check_in: self.check_in,
            check_out: self.check_out,
            adults: self.adults,
            children: self.children,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat with the concierge. Pass --room to chat while
    /// "viewing" a room, so a booking confirmation can quote it.
    Chat {
        #[arg(long)]
        room: Option<u32>,

        #[command(flatten)]
        stay: StayArgs,
    },
    /// List rooms that fit the requested guest counts.
    Rooms {
        #[command(flatten)]
        stay: StayArgs,
    },
    /// Compute a stay quote for one room.
    Quote {
        #[arg(long)]
        room: u32,

        #[command(flatten)]
        stay: StayArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("orchid_cli");
    let cli = Cli::parse();

    let agent = build_agent();

    match cli.command {
        Command::Chat { room, stay } => run_chat(agent, room, stay.into_search_params()).await?,
        Command::Rooms { stay } => {
            let rooms = agent.list_rooms(&stay.into_search_params());
            println!("{}", serde_json::to_string_pretty(&rooms)?);
        }
        Command::Quote { room, stay } => {
            let quote = agent.quote(room, &stay.into_search_params())?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}

async fn run_chat(
    agent: ConciergeAgent<MemoryStore>,
    room_id: Option<u32>,
    search: SearchParams,
) -> Result<()> {
    let mut session_id: Option<String> = None;

    println!("Orchid House concierge chat. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent
            .handle_chat(ChatInput {
                session_id: session_id.clone(),
                text: message.to_string(),
                room_id,
                search: search.clone(),
            })
            .await?;

        session_id = Some(reply.session_id.clone());

        println!("\n{}\n", reply.reply_text);
    }

    Ok(())
}

fn build_agent() -> ConciergeAgent<MemoryStore> {
    ConciergeAgent::new(
        room_catalog(),
        HotelInfo::default(),
        Arc::new(MemoryStore::new()),
        AppMetrics::shared(),
    )
}
