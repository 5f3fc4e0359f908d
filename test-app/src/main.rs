// catlink test application -- CLI tool for exercising the catlink backends
// against real hardware, a network serial bridge, or a mock transport.
//
// Usage:
//   catlink-test-app list
//   catlink-test-app --model IC-7800 --port /dev/ttyUSB0 info
//   catlink-test-app --model FT-840 --port /dev/ttyUSB0 freq get --vfo A
//   catlink-test-app --model FT-DX101D --host 192.168.1.20:4532 mode set USB
//   catlink-test-app --model IC-7800 --port /dev/ttyUSB0 level get SWR
//   catlink-test-app --model IC-7800 --port COM3 clock set 2024-06-01T13:45+0100
//
// Set RUST_LOG=catlink=trace to see every frame on the wire.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use catlink::types::{ClockTime, Level, LevelValue, Mode, Passband, Region, Vfo};
use catlink::{CapabilityDescriptor, Parity, Rig, RigBuilder, SessionConfig, format_freq_mhz};
use catlink_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// catlink test application -- drive a rig from the command line.
#[derive(Parser)]
#[command(name = "catlink-test-app", version, about)]
struct Cli {
    /// Rig model name (e.g. FT-840, IC-7800, TM-D710).
    /// Required for every command except `list`.
    #[arg(long)]
    model: Option<String>,

    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    #[arg(long, conflicts_with = "host")]
    port: Option<String>,

    /// Override the model's baud rate.
    #[arg(long)]
    baud: Option<u32>,

    /// Serial bridge address as host:port.
    #[arg(long)]
    host: Option<String>,

    /// Use a mock transport that answers nothing. Useful for checking
    /// argument parsing and capability checks without hardware.
    #[arg(long, conflicts_with_all = ["port", "host"])]
    mock: bool,

    /// ITU region selecting the frequency range tables.
    #[arg(long, value_enum, default_value = "1")]
    region: RegionArg,

    /// Override the CI-V address (hex, e.g. 0x6a). Icom only.
    #[arg(long, value_parser = parse_hex_u8)]
    civ_addr: Option<u8>,

    /// Leave the rig as the session left it instead of restoring its
    /// settings on close.
    #[arg(long)]
    no_restore: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RegionArg {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl From<RegionArg> for Region {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::One => Region::One,
            RegionArg::Two => Region::Two,
        }
    }
}

/// Parse a hex string like "0x6a" or "6a" into a u8.
fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

#[derive(Subcommand)]
enum Command {
    /// List all supported rig models.
    List,

    /// Print the model's capabilities.
    Info,

    /// Frequency operations.
    Freq {
        #[command(subcommand)]
        action: FreqAction,
    },

    /// Mode operations.
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },

    /// VFO selection.
    Vfo {
        #[command(subcommand)]
        action: VfoAction,
    },

    /// PTT operations.
    Ptt {
        #[command(subcommand)]
        action: SwitchAction,
    },

    /// RIT offset.
    Rit {
        #[command(subcommand)]
        action: RitAction,
    },

    /// Levels and meters.
    Level {
        #[command(subcommand)]
        action: LevelAction,
    },

    /// Memory channel.
    Mem {
        #[command(subcommand)]
        action: MemAction,
    },

    /// Rig clock.
    Clock {
        #[command(subcommand)]
        action: ClockAction,
    },
}

#[derive(Subcommand)]
enum FreqAction {
    Get {
        #[arg(long, default_value = "curr")]
        vfo: Vfo,
    },
    /// Set the frequency in hertz.
    Set {
        freq_hz: u64,
        #[arg(long, default_value = "curr")]
        vfo: Vfo,
    },
}

#[derive(Subcommand)]
enum ModeAction {
    Get {
        #[arg(long, default_value = "curr")]
        vfo: Vfo,
    },
    /// Set the mode (USB, LSB, CW, CWR, AM, FM, RTTY, RTTYR, DATA-USB, ...).
    Set {
        mode: Mode,
        /// Filter width in hertz; the model's normal width when omitted.
        #[arg(long)]
        passband: Option<u32>,
        #[arg(long, default_value = "curr")]
        vfo: Vfo,
    },
}

#[derive(Subcommand)]
enum VfoAction {
    Get,
    /// Select a VFO (A, B, Main, Sub, Mem).
    Set { vfo: Vfo },
}

#[derive(Subcommand)]
enum SwitchAction {
    Get,
    On,
    Off,
}

#[derive(Subcommand)]
enum RitAction {
    Get,
    /// Set the offset in hertz; 0 clears it.
    Set {
        #[arg(allow_negative_numbers = true)]
        offset_hz: i32,
    },
}

#[derive(Subcommand)]
enum LevelAction {
    /// Read a level (PREAMP, ATT, RFPOWER, RAWSTR, STRENGTH, SWR, ALC, ...).
    Get { level: Level },
    /// Write a level. Decibel levels take integers, RFPOWER 0.0 to 1.0.
    Set { level: Level, value: String },
}

#[derive(Subcommand)]
enum MemAction {
    Get,
    Set { channel: u32 },
}

#[derive(Subcommand)]
enum ClockAction {
    Get,
    /// Set from YYYY-MM-DDTHH:MM[:SS][+HHMM|-HHMM].
    Set { time: String },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_level_value(level: Level, raw: &str) -> Result<LevelValue> {
    if level.is_float() {
        let v: f32 = raw
            .parse()
            .with_context(|| format!("{level} takes a decimal value, got {raw:?}"))?;
        Ok(LevelValue::Float(v))
    } else {
        let v: i32 = raw
            .parse()
            .with_context(|| format!("{level} takes an integer value, got {raw:?}"))?;
        Ok(LevelValue::Int(v))
    }
}

fn parse_clock(text: &str) -> Result<ClockTime> {
    let bad = || anyhow!("expected YYYY-MM-DDTHH:MM[:SS][+HHMM], got {text:?}");
    let (date, rest) = text.split_once('T').ok_or_else(bad)?;
    let mut d = date.split('-');
    let year: u16 = d.next().ok_or_else(bad)?.parse()?;
    let month: u8 = d.next().ok_or_else(bad)?.parse()?;
    let day: u8 = d.next().ok_or_else(bad)?.parse()?;

    let (time, utc_offset) = match rest.find(['+', '-']) {
        Some(i) => {
            let (t, offset) = rest.split_at(i);
            (t, offset.parse::<i16>()?)
        }
        None => (rest, 0),
    };
    let mut t = time.split(':');
    let hour: u8 = t.next().ok_or_else(bad)?.parse()?;
    let minute: u8 = t.next().ok_or_else(bad)?.parse()?;
    let second = t.next().map(str::parse::<u8>).transpose()?.unwrap_or(0);
    if d.next().is_some() || t.next().is_some() {
        return Err(bad());
    }
    Ok(ClockTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
        utc_offset,
    })
}

fn parity_letter(parity: Parity) -> char {
    match parity {
        Parity::None => 'N',
        Parity::Odd => 'O',
        Parity::Even => 'E',
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_list() {
    println!("{:>6}  {:<10} {:<10}", "ID", "MFR", "MODEL");
    for desc in catlink::supported_rigs() {
        println!(
            "{:>6}  {:<10} {:<10}",
            desc.model_id, desc.manufacturer, desc.model_name
        );
    }
}

fn cmd_info(desc: &CapabilityDescriptor, region: Region) {
    println!("Model:        {} {} (id {})", desc.manufacturer, desc.model_name, desc.model_id);
    let vfos: Vec<String> = desc.vfos.iter().map(|v| v.to_string()).collect();
    println!("VFOs:         {}", vfos.join(", "));
    println!("Receive:");
    for range in desc.rx_ranges(region) {
        println!("  {range}");
    }
    println!("Transmit:");
    for range in desc.tx_ranges(region) {
        println!("  {range}");
    }
    let levels: Vec<String> = desc.has_get_level.iter().map(|l| l.to_string()).collect();
    if !levels.is_empty() {
        println!("Levels:       {}", levels.join(", "));
    }
    if let Some(channels) = &desc.memory_channels {
        println!("Memories:     {}..={}", channels.start(), channels.end());
    }
    if desc.max_rit > 0 {
        println!("RIT:          ±{} Hz", desc.max_rit);
    }
    let t = &desc.transport;
    println!(
        "Serial:       {}-{} baud, {}{}{}, timeout {} ms, {} attempt(s)",
        t.baud_min,
        t.baud_max,
        t.data_bits,
        parity_letter(t.parity),
        t.stop_bits,
        t.timeout.as_millis(),
        t.retry
    );
    if let Some(addr) = desc.default_address {
        println!("CI-V address: 0x{addr:02X}");
    }
}

async fn run(rig: &dyn Rig, command: Command) -> Result<()> {
    match command {
        Command::List | Command::Info => bail!("list and info do not need a rig connection"),
        Command::Freq { action } => match action {
            FreqAction::Get { vfo } => {
                let hz = rig.get_frequency(vfo).await.context("reading frequency")?;
                println!("{vfo}: {} ({hz} Hz)", format_freq_mhz(hz));
            }
            FreqAction::Set { freq_hz, vfo } => {
                rig.set_frequency(vfo, freq_hz)
                    .await
                    .context("setting frequency")?;
                println!("{vfo}: set to {}", format_freq_mhz(freq_hz));
            }
        },
        Command::Mode { action } => match action {
            ModeAction::Get { vfo } => {
                let (mode, passband) = rig.get_mode(vfo).await.context("reading mode")?;
                match passband {
                    Some(width) => println!("{vfo}: {mode} {width}"),
                    None => println!("{vfo}: {mode}"),
                }
            }
            ModeAction::Set {
                mode,
                passband,
                vfo,
            } => {
                rig.set_mode(vfo, mode, passband.map(Passband::from_hz))
                    .await
                    .context("setting mode")?;
                println!("{vfo}: mode set to {mode}");
            }
        },
        Command::Vfo { action } => match action {
            VfoAction::Get => println!("{}", rig.get_vfo().await.context("reading VFO")?),
            VfoAction::Set { vfo } => {
                rig.set_vfo(vfo).await.context("selecting VFO")?;
                println!("selected {vfo}");
            }
        },
        Command::Ptt { action } => match action {
            SwitchAction::Get => {
                let on = rig.get_ptt(Vfo::Current).await.context("reading PTT")?;
                println!("PTT {}", yes_no(on));
            }
            SwitchAction::On | SwitchAction::Off => {
                let on = matches!(action, SwitchAction::On);
                rig.set_ptt(Vfo::Current, on).await.context("setting PTT")?;
                println!("PTT {}", yes_no(on));
            }
        },
        Command::Rit { action } => match action {
            RitAction::Get => {
                let offset = rig.get_rit(Vfo::Current).await.context("reading RIT")?;
                println!("RIT {offset:+} Hz");
            }
            RitAction::Set { offset_hz } => {
                rig.set_rit(Vfo::Current, offset_hz)
                    .await
                    .context("setting RIT")?;
                println!("RIT set to {offset_hz:+} Hz");
            }
        },
        Command::Level { action } => match action {
            LevelAction::Get { level } => {
                let value = rig
                    .get_level(Vfo::Current, level)
                    .await
                    .with_context(|| format!("reading {level}"))?;
                println!("{level}: {value}");
            }
            LevelAction::Set { level, value } => {
                let value = parse_level_value(level, &value)?;
                rig.set_level(Vfo::Current, level, value)
                    .await
                    .with_context(|| format!("setting {level}"))?;
                println!("{level} set to {value}");
            }
        },
        Command::Mem { action } => match action {
            MemAction::Get => {
                let channel = rig.get_mem(Vfo::Current).await.context("reading memory")?;
                println!("memory channel {channel}");
            }
            MemAction::Set { channel } => {
                rig.set_mem(Vfo::Current, channel)
                    .await
                    .context("selecting memory")?;
                println!("memory channel {channel} selected");
            }
        },
        Command::Clock { action } => match action {
            ClockAction::Get => println!("{}", rig.get_clock().await.context("reading clock")?),
            ClockAction::Set { time } => {
                let time = parse_clock(&time)?;
                rig.set_clock(&time).await.context("setting clock")?;
                println!("clock set to {time}");
            }
        },
    }
    Ok(())
}

fn session_config(cli: &Cli) -> SessionConfig {
    let mut config = SessionConfig::default()
        .with_region(Region::from(cli.region))
        .with_restore_on_close(!cli.no_restore);
    if let Some(addr) = cli.civ_addr {
        config = config.with_address(addr);
    }
    config
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let region = Region::from(cli.region);

    if let Command::List = cli.command {
        cmd_list();
        return Ok(());
    }

    let model = cli
        .model
        .as_deref()
        .context("--model is required (see `catlink-test-app list`)")?;
    let mut builder = RigBuilder::by_name(model)?;

    if let Command::Info = cli.command {
        let entry = catlink::find_by_name(model).context("model vanished from registry")?;
        cmd_info(&entry.descriptor, region);
        return Ok(());
    }

    builder = builder.config(session_config(&cli));

    let rig = if cli.mock {
        builder
            .build_with_transport(Box::new(MockTransport::new()))
            .await?
    } else {
        if let Some(port) = &cli.port {
            builder = builder.serial_port(port);
        } else if let Some(host) = &cli.host {
            builder = builder.tcp_address(host);
        } else {
            bail!("one of --port, --host or --mock is required");
        }
        if let Some(baud) = cli.baud {
            builder = builder.baud_rate(baud);
        }
        builder.build().await.context("opening rig")?
    };

    let result = run(rig.as_ref(), cli.command).await;
    if let Err(e) = rig.close().await {
        tracing::warn!(error = %e, "close failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_argument() {
        let t = parse_clock("2024-06-01T13:45+0100").unwrap();
        assert_eq!((t.year, t.month, t.day), (2024, 6, 1));
        assert_eq!((t.hour, t.minute, t.second), (13, 45, 0));
        assert_eq!(t.utc_offset, 100);

        let t = parse_clock("2024-12-31T23:59:30-0500").unwrap();
        assert_eq!(t.second, 30);
        assert_eq!(t.utc_offset, -500);

        assert!(parse_clock("2024-06-01").is_err());
        assert!(parse_clock("2024-06-01T13").is_err());
    }

    #[test]
    fn level_argument() {
        assert_eq!(
            parse_level_value(Level::Attenuator, "12").unwrap(),
            LevelValue::Int(12)
        );
        assert_eq!(
            parse_level_value(Level::RfPower, "0.5").unwrap(),
            LevelValue::Float(0.5)
        );
        assert!(parse_level_value(Level::Preamp, "1.5").is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "catlink-test-app",
            "--model",
            "IC-7800",
            "--mock",
            "--region",
            "2",
            "freq",
            "set",
            "14074000",
            "--vfo",
            "sub",
        ])
        .unwrap();
        assert!(matches!(cli.region, RegionArg::Two));
        assert!(matches!(
            cli.command,
            Command::Freq {
                action: FreqAction::Set {
                    freq_hz: 14_074_000,
                    vfo: Vfo::Sub
                }
            }
        ));
        assert!(Cli::try_parse_from(["catlink-test-app", "--mock", "--port", "x", "info"]).is_err());
    }

    #[test]
    fn restore_on_close_unless_disabled() {
        let cli = Cli::try_parse_from(["catlink-test-app", "--model", "FT-DX101D", "vfo", "get"]).unwrap();
        assert!(session_config(&cli).restore_on_close);

        let cli = Cli::try_parse_from([
            "catlink-test-app",
            "--model",
            "FT-DX101D",
            "--no-restore",
            "--civ-addr",
            "0x42",
            "vfo",
            "get",
        ])
        .unwrap();
        let config = session_config(&cli);
        assert!(!config.restore_on_close);
        assert_eq!(config.address, Some(0x42));
    }
}
