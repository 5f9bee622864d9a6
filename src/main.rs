//! Terminal Blockchain Breakout runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `breakout-term`.
//!
//! Environment:
//! - `BREAKOUT_CONFIG`: path to a JSON game config (overrides the first argument)
//! - `BREAKOUT_SEED`: RNG seed, overrides the config
//! - `BREAKOUT_LOG`: log file path; logging is off when unset (`RUST_LOG` sets the level)

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::info;

use blockchain_breakout::core::{dispatch, Game, GameConfig};
use blockchain_breakout::input::{map_key, should_quit, toggle_fast_drop};
use blockchain_breakout::term::{FrameBuffer, GameView, StatusLine, TerminalRenderer, Viewport};
use blockchain_breakout::types::TICK_MS;

fn main() -> Result<()> {
    init_logging()?;
    let config = load_config()?;

    let mut term = TerminalRenderer::new();
    term.enter("Blockchain Breakout")?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("BREAKOUT_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("create log file {:?}", path))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config() -> Result<GameConfig> {
    let path = std::env::var("BREAKOUT_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1));

    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("read config {}", path))?;
            GameConfig::from_json_str(&raw).with_context(|| format!("load config {}", path))?
        }
        None => GameConfig::default(),
    };

    if let Ok(seed) = std::env::var("BREAKOUT_SEED") {
        config.seed = seed
            .trim()
            .parse()
            .with_context(|| format!("BREAKOUT_SEED must be a u32, got {:?}", seed))?;
    }
    Ok(config)
}

fn run(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    info!("[Main] seed {}", config.seed);
    let mut game = Game::with_config(config);
    game.start();

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut status = StatusLine::new();
    let releases = term.reports_key_releases();

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into_with_status(&game.snapshot(), Some(&status), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = map_key(key)
                        .and_then(|a| toggle_fast_drop(a, key.kind, releases, game.fast_drop()))
                    {
                        game.apply_action(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
            game.tick(ms);
            status.tick(ms);

            dispatch(&game.drain_events(), &mut status);
        }
    }
}

