mod image;
mod lnx;

use anyhow::{Context, bail};
use clap::Parser;
use eprom_core::prelude::StorageKind;
use image::{MAX_CHIP_ID, Payload};
use log::{info, warn};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::PathBuf;
use std::time::Duration;

const ACK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(
    name = "eprom-send",
    about = "Send a binary image to the EPROM emulator"
)]
struct Args {
    /// Address of the emulator's image link.
    #[arg(short, long, value_name = "ADDR", default_value = "127.0.0.1:7654")]
    port: String,

    /// EPROM type: 1=2708 2=2716 3=2732 4=2764 5=27128 6=27256 7=27512
    /// 8=27010 9=27020 10=27040 11=27080.
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value_t = 10,
          value_parser = clap::value_parser!(u8).range(1..=MAX_CHIP_ID as i64))]
    chip: u8,

    /// Skip N bytes at the start of the file.
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    skip: usize,

    /// Atari Lynx dev cart mode (interconnect wiring).
    #[arg(short, long, default_value_t = false)]
    lynx: bool,

    /// Send the image bytes only, without the type/mode header.
    #[arg(long, default_value_t = false)]
    no_header: bool,

    /// File to send; `.lnx` carts are detected by their header.
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Reading {}", args.file.display());
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let payload = if lnx::is_lnx(&raw) {
        let (header, payload) = Payload::from_lnx(&raw)?;
        info!(
            "LNX cart '{}' by '{}', {} byte pages",
            header.cart_name, header.manufacturer, header.page_size_bank0
        );
        payload
    } else {
        Payload::from_raw(&raw, args.chip, args.skip, args.lynx)?
    };

    if payload.bytes.is_empty() {
        bail!("nothing to send after skipping {} bytes", args.skip);
    }
    send(&args.port, &payload, !args.no_header)?;
    info!("Done!");
    Ok(())
}

fn send(addr: &str, payload: &Payload, with_header: bool) -> anyhow::Result<()> {
    info!("Connecting to {}", addr);
    let mut link =
        TcpStream::connect(addr).with_context(|| format!("failed to connect to {}", addr))?;

    if with_header {
        let [chip, flag] = payload.header();
        info!("Sending type {}, Lynx {}", chip, flag != 0);
        link.write_all(&payload.header())?;
        link.flush()?;

        link.set_read_timeout(Some(ACK_TIMEOUT))?;
        let mut ack = [0u8; 1];
        link.read_exact(&mut ack)
            .context("emulator did not acknowledge the header")?;
        match StorageKind::try_from(ack[0]) {
            Ok(kind) => info!("Image will be saved to {}", kind),
            Err(other) => warn!("Unknown storage acknowledgement {:#04X}", other),
        }
    }

    info!("Sending {} bytes", payload.bytes.len());
    link.write_all(&payload.bytes)?;
    link.flush()?;
    link.shutdown(Shutdown::Write)?;
    Ok(())
}
