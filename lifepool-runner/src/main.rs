use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use hdrhistogram::Histogram;
use lifepool_config::load_config;
use lifepool_core::FrameClock;
use lifepool_simulation::{ShellCommand, World};
use lifepool_transport::{FrameSnapshot, TransportController};
use log::{debug, info, warn};

use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Stop after this many frames instead of running until interrupted
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for the world RNG, overriding the config file
    #[arg(short, long)]
    seed: Option<u64>,
}

/// A line typed on stdin
#[derive(Debug)]
enum Input {
    Command(ShellCommand),
    Stats,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "" => None,
        "stats" => Some(Input::Stats),
        "quit" | "exit" => Some(Input::Quit),
        other => match other.parse::<ShellCommand>() {
            Ok(command) => Some(Input::Command(command)),
            Err(e) => {
                warn!("Ignoring input {:?}: {}", other, e);
                None
            }
        },
    }
}

/// Read commands from stdin on a background thread
fn spawn_input_reader() -> Receiver<Input> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(input) = parse_input(&line) {
                if tx.send(input).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    info!("Using configuration from {}", args.config.display());

    let mut transport = TransportController::from_config(&config.transport)?;
    let transport_settings = config.transport.clone();
    let framerate = config.framerate;
    let mut clock = FrameClock::new(framerate);

    let mut world = World::new(config);
    world.populate();
    info!("Spawned {} agents", world.population());

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    let input = spawn_input_reader();
    let mut frame_times = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3)?;
    let started = Instant::now();

    info!("Running simulation at {} FPS...", framerate);

    while running.load(Ordering::SeqCst) {
        if args.frames.map_or(false, |limit| clock.frame() >= limit) {
            break;
        }
        let elapsed = clock.begin_frame();

        loop {
            match input.try_recv() {
                Ok(Input::Command(command)) => {
                    let outcome = world.apply(&command);
                    info!("{:?} -> {:?}", command, outcome);
                }
                Ok(Input::Stats) => info!("{:?}", world.stats()),
                Ok(Input::Quit) => running.store(false, Ordering::SeqCst),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let summary = world.tick(elapsed);
        if summary.births > 0 || summary.deaths > 0 {
            debug!("Frame {}: {} births, {} deaths", world.frame(), summary.births, summary.deaths);
        }

        if transport.advance_frame() {
            let snapshot = FrameSnapshot::capture(
                &world,
                started.elapsed().as_secs_f64(),
                transport_settings.parallel_threshold,
                transport_settings.include_scene,
            );
            if let Err(e) = transport.send_frame(&snapshot) {
                warn!("Failed to send frame {}: {}", world.frame(), e);
            }
        }

        if world.frame() % 300 == 0 {
            debug!("{:?}", world.stats());
        }

        let work = clock.end_frame();
        frame_times.saturating_record(work.as_micros() as u64);
    }

    transport.flush()?;
    info!("Stopped after {} frames; final {:?}", world.frame(), world.stats());
    info!(
        "Frame time (us): p50 {} p99 {} max {}; {} frames sent",
        frame_times.value_at_quantile(0.5),
        frame_times.value_at_quantile(0.99),
        frame_times.max(),
        transport.frames_sent()
    );
    Ok(())
}
