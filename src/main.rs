mod host;

use anyhow::Context;
use clap::Parser;
use eprom_core::prelude::*;
use host::TcpTransport;
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    name = "eprom-emulator",
    about = "Serve an emulated EPROM on a simulated bus and accept new images over TCP."
)]
struct Args {
    /// Directory standing in for the removable card; absent means no card.
    #[arg(long, value_name = "DIR", default_value = "./sd")]
    removable_dir: PathBuf,

    /// Directory standing in for on-board flash; created on first write.
    #[arg(long, value_name = "DIR", default_value = "./flash")]
    flash_dir: PathBuf,

    /// Address the image link listens on.
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:7654")]
    listen: String,

    /// Idle window that ends a bank during a load.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    read_timeout_ms: u64,

    /// Largest single read from the link during a load.
    #[arg(long, value_name = "BYTES", default_value_t = 1024)]
    chunk_len: usize,

    /// Stop after this many bus cycles (runs forever when omitted).
    #[arg(long, value_name = "N")]
    iterations: Option<u64>,

    /// Bus cycles between status lines.
    #[arg(long, value_name = "N", default_value_t = 50_000_000)]
    report_every: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let card = DirStorage::removable(&args.removable_dir);
    let flash = DirStorage::fixed(&args.flash_dir);
    info!(
        "Media: card at {}, flash at {}",
        card.root().display(),
        flash.root().display()
    );
    let storage = StorageSelector::new(Box::new(card), Box::new(flash));
    let config = LoadConfig {
        chunk_len: args.chunk_len,
        read_timeout: Duration::from_millis(args.read_timeout_ms),
    };
    let mut eprom = Eprom::boot(storage, config);

    let mut link = TcpTransport::bind(&args.listen)
        .with_context(|| format!("failed to listen on {}", args.listen))?;

    let mut chip = eprom.settings().chip;
    let mut bus = SimBus::sweep(chip.size());
    let report_every = args.report_every.max(1);
    let started = Instant::now();
    eprom.park(&mut bus);

    while eprom.run_state == RunState::Running {
        let batch = match args.iterations {
            Some(limit) if eprom.iterations >= limit => break,
            Some(limit) => report_every.min(limit - eprom.iterations),
            None => report_every,
        };
        eprom.run(&mut bus, &mut link, Some(batch));

        // A load may have switched chips; sweep the new address space.
        if eprom.settings().chip != chip {
            chip = eprom.settings().chip;
            bus = SimBus::sweep(chip.size());
        }

        let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
        info!(
            "{} cycles ({:.1} M/s), {} loads, {} on {}, last byte {:02X}",
            eprom.iterations,
            eprom.iterations as f64 / elapsed / 1e6,
            eprom.loads,
            chip,
            eprom.storage_kind(),
            bus.last_byte()
        );
    }

    trace_dump!();
    Ok(())
}
