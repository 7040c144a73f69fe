use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, error, info};
use valorant_stats::server::{self, AppState};
use valorant_stats::utils::display::DisplayFormatter;
use valorant_stats::{CommandHandler, Config, StatsService};

const CONSOLE_USER: &str = "console";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valorant_stats=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    config.bot_token()?;
    if let Some(guild_id) = config.guild_id {
        info!("Commands scoped to guild {}", guild_id);
    }

    info!("Starting VALORANT stats bot");
    let stats = Arc::new(StatsService::new(&config)?);

    let addr = config.bind_addr();
    let state = AppState { stats: stats.clone() };
    tokio::spawn(async move {
        if let Err(e) = server::serve(&addr, state).await {
            error!("Web server stopped: {}", e);
        }
    });

    let handler = CommandHandler::new(stats);
    let display = DisplayFormatter::new();

    println!("=== VALORANT Stats Bot ===");
    println!("Type /help for the command list, exit to quit.");

    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        io::stdout().flush()?;
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let command = input.trim();
        match command {
            "" => continue,
            "exit" => {
                debug!("Received exit command");
                break;
            }
            line => {
                let reply = handler.handle(CONSOLE_USER, line).await;
                println!("{}", display.format_reply(&reply));
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
