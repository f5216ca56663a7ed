//! Headless driver: builds a world session from TOML config, streams chunks
//! around a moving view for a number of ticks, and optionally saves.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use tessera_blocks::BlockCatalog;
use tessera_chunk::Layer;
use tessera_runtime::{SessionConfig, SessionError, StreamEvent, WorldSession, load_session_config_from_path};
use tessera_world::TilePos;

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Chunked 2D world generation and lighting")]
struct Args {
    /// World, lighting and streaming config
    #[arg(long, default_value = "assets/world.toml")]
    config: PathBuf,

    /// Block catalog; the built-in one when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Overrides the config seed (ignored when a save is loaded)
    #[arg(long)]
    seed: Option<i64>,

    /// Save directory to continue from and write back to
    #[arg(long)]
    save_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// View start; the world center when omitted
    #[arg(long)]
    x: Option<i32>,
    #[arg(long)]
    y: Option<i32>,

    /// Tiles the view moves right each tick
    #[arg(long, default_value_t = 0)]
    pan: i32,

    /// Reload the [lighting] table when the config file changes
    #[arg(long)]
    watch: bool,

    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level).parse_default_env().init();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &Path) -> Result<SessionConfig, SessionError> {
    if path.exists() {
        load_session_config_from_path(path)
    } else {
        log::warn!("config {} not found, using defaults", path.display());
        Ok(SessionConfig::default())
    }
}

/// Sends a unit on every change to `path`.
fn spawn_config_watcher(path: PathBuf) -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel::<()>();
    std::thread::spawn(move || {
        use notify::{EventKind, RecursiveMode, Watcher};
        match notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => {
                        let _ = tx.send(());
                    }
                    _ => {}
                }
            }
        }) {
            Ok(mut watcher) => {
                if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
                    log::warn!("cannot watch {}: {e}", path.display());
                    return;
                }
                loop {
                    std::thread::sleep(std::time::Duration::from_secs(3600));
                }
            }
            Err(e) => log::warn!("config watcher unavailable: {e}"),
        }
    });
    rx
}

fn reload_lighting(session: &mut WorldSession, path: &Path) {
    match load_session_config_from_path(path).and_then(|cfg| session.set_lighting_config(cfg.lighting)) {
        Ok(()) => log::info!("lighting config reloaded"),
        Err(e) => log::warn!("keeping previous lighting config: {e}"),
    }
}

fn run(args: &Args) -> Result<(), SessionError> {
    let mut config = load_config(&args.config)?;
    if args.seed.is_some() {
        config.worldgen.world.seed = args.seed;
    }
    let catalog = match &args.catalog {
        Some(path) => BlockCatalog::load_from_path(path)?,
        None => BlockCatalog::builtin()?,
    };
    let mut session = match &args.save_dir {
        Some(dir) => WorldSession::from_save(config, catalog, dir)?,
        None => WorldSession::new(config, catalog)?,
    };

    let start = session.view();
    let mut view = TilePos::new(args.x.unwrap_or(start.x), args.y.unwrap_or(start.y));
    let reloads = args.watch.then(|| spawn_config_watcher(args.config.clone()));

    let (mut loaded, mut unloaded) = (0usize, 0usize);
    for _ in 0..args.ticks {
        if let Some(rx) = &reloads {
            if rx.try_iter().count() > 0 {
                reload_lighting(&mut session, &args.config);
            }
        }
        session.set_view(view);
        session.tick(args.dt);
        for event in session.drain_events() {
            match event {
                StreamEvent::ChunkLoaded(_) => loaded += 1,
                StreamEvent::ChunkUnloaded(_) => unloaded += 1,
            }
        }
        view.x += args.pan;
    }
    session.settle();

    let surface = TilePos::new(view.x, session.profile().surface_height(view.x));
    log::info!(
        "{} ticks: {} chunks live, {} loaded, {} unloaded, {} lights, {} stored",
        args.ticks,
        session.chunks().len(),
        loaded,
        unloaded,
        session.lights().registry().len(),
        session.store().len()
    );
    log::info!(
        "surface at ({}, {}) is {:?} lit {:?}; structure complete: {}",
        surface.x,
        surface.y,
        session.tile_type(surface, Layer::Front),
        session.display_color(surface, Layer::Front),
        session.structure_complete()
    );

    if let Some(dir) = &args.save_dir {
        session.save(dir)?;
    }
    Ok(())
}
