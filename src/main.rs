//! # Delve Main Entry Point
//!
//! Builds a session from the command line, then reads tile selections from
//! stdin and prints the floor after every action.

use clap::Parser;
use delve::{
    describe_event, render_ascii, render_messages, render_statistics, render_status, DelveError,
    DelveResult,
    GameConfig, ImmediatePresenter, InputHandler, JsonDataProvider, MessageLog, Phase,
    PlayerInput, TurnController,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "A turn-based, tile-revealing dungeon crawler")]
#[command(version)]
struct Args {
    /// Random seed for the session
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid width in tiles, walls included
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in tiles, walls included
    #[arg(long)]
    height: Option<u32>,

    /// Dungeon theme id
    #[arg(short, long)]
    theme: Option<String>,

    /// JSON configuration file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with themes.json, units.json and items.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;
    log::info!("Starting Delve v{}", delve::VERSION);

    let config = build_config(&args)?;
    let data = match &args.data_dir {
        Some(dir) => JsonDataProvider::from_dir(dir)?,
        None => JsonDataProvider::builtin()?,
    };

    let mut game = TurnController::new(config, Box::new(data), ImmediatePresenter)?;
    game.start()?;
    run_game_loop(&mut game)
}

/// Merges the optional config file with command line overrides.
fn build_config(args: &Args) -> DelveResult<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(theme) = &args.theme {
        config.theme_id = theme.clone();
    }

    config.validate()?;
    log::info!("Session seed {}", config.seed);
    Ok(config)
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> DelveResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init()
            .map_err(|e| DelveError::InvalidState(format!("logging: {}", e)))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .try_init()
            .map_err(|e| DelveError::InvalidState(format!("logging: {}", e)))?;
    }

    Ok(())
}

/// Main game loop over stdin.
fn run_game_loop(game: &mut TurnController<ImmediatePresenter>) -> DelveResult<()> {
    let input_handler = InputHandler::new();
    let mut messages = MessageLog::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    messages.add_message("Welcome to Delve! Type `help` for commands.".to_string());
    print_view(game, &messages);

    for line in stdin.lock().lines() {
        let line = line?;
        let input = match input_handler.parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match input {
            PlayerInput::Quit => {
                log::info!("Player quit the game");
                break;
            }
            PlayerInput::Help => println!("{}", InputHandler::help_text()),
            PlayerInput::Status => {
                println!("{}", render_status(game.player(), game.depth()));
                println!("{}", render_statistics(game.statistics()));
            }
            PlayerInput::Select(_) => {
                if input_handler.input_to_action(input, game)?.is_none() {
                    println!("Nothing to do there.");
                }
                for event in game.drain_events() {
                    messages.add_message(describe_event(&event));
                }
                print_view(game, &messages);
            }
        }

        if game.phase() == Phase::PlayerDefeated {
            println!("{}", render_statistics(game.statistics()));
            break;
        }

        print!("> ");
        stdout.flush()?;
    }

    log::info!("Game loop ended after {} messages", messages.messages().len());
    Ok(())
}

/// Recent messages shown under the map.
const VISIBLE_MESSAGES: usize = 5;

fn print_view(game: &TurnController<ImmediatePresenter>, messages: &MessageLog) {
    print!("{}", render_ascii(game.map()));
    println!("{}", render_status(game.player(), game.depth()));
    print!("{}", render_messages(messages, VISIBLE_MESSAGES));
}
