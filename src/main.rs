//! Hexfront - console front-end
//!
//! Runs one game in the terminal. The console stands in for the speech
//! device: the game's lines are printed with an `S>` prefix and whatever you
//! type while it is listening is taken as what you said. Without a usable
//! device the game runs AI-only.

use std::path::PathBuf;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use hexfront::board::{field_name, BoardHandle, FieldSnapshot};
use hexfront::core::config::GameConfig;
use hexfront::core::error::Result;
use hexfront::core::types::Position;
use hexfront::director::{Director, DirectorStatus, GameOutcome, USER_FACTION};
use hexfront::nlu::Nlu;
use hexfront::unit::Archetype;
use hexfront::voice::{ConsoleSpeech, VoiceHandle};

/// Hexfront - conquer the hex board by voice (or keyboard)
#[derive(Parser, Debug)]
#[command(name = "hexfront")]
#[command(about = "Play a turn-based hex strategy game against AI empires")]
struct Args {
    /// TOML config file; command line flags override its values
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Random seed for deterministic games
    #[arg(long)]
    seed: Option<u64>,

    /// Number of AI opponents (1-3)
    #[arg(long)]
    ai_empires: Option<u8>,

    /// Stop after this many rounds
    #[arg(long)]
    max_turns: Option<u32>,

    /// Rasa-compatible parse endpoint; the keyword classifier is used without one
    #[arg(long)]
    nlu_url: Option<String>,

    /// Seconds to wait for input before asking again
    #[arg(long)]
    listen_timeout: Option<f32>,

    /// Let the AI empires play without you
    #[arg(long)]
    no_voice: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexfront=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = build_config(&args)?;
    tracing::info!(
        seed = config.seed,
        ai_empires = config.ai_empires,
        "Hexfront starting..."
    );

    let rt = Runtime::new()?;
    let outcome = rt.block_on(play(config, !args.no_voice))?;

    println!();
    match outcome {
        GameOutcome::Won => println!("=== VICTORY ==="),
        GameOutcome::Lost => println!("=== DEFEAT ==="),
        GameOutcome::Abandoned { turns } => println!("=== STOPPED AFTER {} TURNS ===", turns),
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n) = args.ai_empires {
        config.ai_empires = n;
    }
    if args.max_turns.is_some() {
        config.max_turns = args.max_turns;
    }
    if args.nlu_url.is_some() {
        config.nlu_url = args.nlu_url.clone();
    }
    if let Some(secs) = args.listen_timeout {
        config.listen_timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

async fn play(config: GameConfig, with_voice: bool) -> Result<GameOutcome> {
    let voice = if with_voice {
        match VoiceHandle::start(Box::new(ConsoleSpeech::new()), config.listen_timeout()).await {
            Ok(voice) => Some(voice),
            Err(e) => {
                tracing::warn!("no speech device, running AI-only: {}", e);
                None
            }
        }
    } else {
        None
    };

    if voice.is_some() {
        println!("\n=== HEXFRONT ===");
        println!("You are empire 1 (capital letters). Type what you would say, e.g.:");
        println!("  move the archer to B3    attack D4 with the horseman");
        println!("  produce a spearman       what can my archer do");
        println!("  which turn is it         skip");
        println!();
    }

    let nlu = Nlu::from_config(&config);
    let (width, height) = (config.board_width, config.board_height);
    let director = Director::new(config, voice, nlu);
    let board = director.board();
    let mut status = director.subscribe();

    // Redraw the board whenever the user's turn begins
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let DirectorStatus { turn, current } = *status.borrow_and_update();
            if current != Some(USER_FACTION) {
                continue;
            }
            if let Err(e) = print_board(&board, turn, width, height).await {
                tracing::debug!("board display stopped: {}", e);
                break;
            }
        }
    });

    director.run().await
}

async fn print_board(board: &BoardHandle, turn: u32, width: u32, height: u32) -> Result<()> {
    let fields = board.snapshot().await?;
    println!("\n--- Turn {} ---", turn);
    print!("{}", render_board(&fields, width, height));
    Ok(())
}

/// ASCII board: one cell per field, archetype letter plus owning empire
fn render_board(fields: &[FieldSnapshot], width: u32, height: u32) -> String {
    let mut out = String::from("    ");
    for x in 0..width as i32 {
        let column = field_name(Position::new(x, 0))
            .and_then(|name| name.chars().next())
            .unwrap_or('?');
        out.push_str(&format!(" {:<2}", column));
    }
    out.push('\n');

    for y in 0..height as i32 {
        out.push_str(&format!("{:>3} ", y + 1));
        for x in 0..width as i32 {
            let cell = fields
                .iter()
                .find(|f| f.position == Position::new(x, y))
                .map(|f| {
                    let letter = symbol(f.archetype);
                    let letter = if f.faction == USER_FACTION {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    };
                    format!("{}{}", letter, f.faction.0)
                })
                .unwrap_or_else(|| " .".to_string());
            out.push_str(&format!(" {:<2}", cell));
        }
        out.push('\n');
    }
    out
}

fn symbol(archetype: Archetype) -> char {
    match archetype {
        Archetype::Archer => 'a',
        Archetype::Horseman => 'h',
        Archetype::Spearman => 's',
        Archetype::Worker => 'w',
        Archetype::Base => 'b',
    }
}
