//! Crypto Chat - a terminal chat client with live market prices.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use crypto_chat::app::App;
use crypto_chat::backend::HttpChatBackend;
use crypto_chat::config::Config;
use crypto_chat::market::{CoinGeckoClient, MarketDataProbe};
use crypto_chat::orchestrator::ChatOrchestrator;
use crypto_chat::{input, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let (config, config_problem) = Config::load_reporting();

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {}", e);
    }
    info!(backend = %config.backend.url, market = config.market.enabled, "starting");

    let backend = Arc::new(HttpChatBackend::new(config.backend.clone()));
    let probe = if config.market.enabled {
        MarketDataProbe::new(Arc::new(CoinGeckoClient::new(config.market.clone())))
    } else {
        MarketDataProbe::disabled()
    };
    let orchestrator = Arc::new(ChatOrchestrator::from_config(backend, probe, &config));

    // Create app
    let mut app = App::new(orchestrator, &config);
    if let Some(problem) = config_problem {
        app.toasts.warning(problem);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = input::run_app(&mut terminal, &mut app, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    info!("exiting");
    Ok(())
}
