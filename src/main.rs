use clap::{Parser, Subcommand};
use serial_core::config::{self, ConfigLoader};
use serial_core::{EventMask, EventSet, OpenMode, Port, PortRegistry};
use std::io::Write;
use std::path::PathBuf;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-core",
    version,
    about = "Inspect and talk to serial ports.",
    long_about = "Lists serial ports, shows their identity, reads and writes raw bytes, and waits for readiness on one or more ports."
)]
struct Args {
    /// Settings file (overrides SERIAL_CORE_CONFIG and the default locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available ports
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show everything known about one port
    Info {
        port: String,
        #[arg(long)]
        json: bool,
    },
    /// Read bytes and write them to stdout
    Read {
        port: String,
        /// Stop after this many bytes
        #[arg(short = 'n', long, default_value_t = 64)]
        count: usize,
        /// Give up after this long; 0 waits forever
        #[arg(short, long, default_value_t = 1000)]
        timeout_ms: u32,
        #[arg(short, long)]
        baud: Option<u32>,
    },
    /// Write a string to a port
    Send {
        port: String,
        data: String,
        #[arg(short, long)]
        baud: Option<u32>,
        /// Give up after this long; 0 waits forever
        #[arg(short, long, default_value_t = 1000)]
        timeout_ms: u32,
    },
    /// Wait until any of the ports is ready
    Wait {
        #[arg(required = true)]
        ports: Vec<String>,
        /// Comma-separated: readable, writable, error
        #[arg(short, long, default_value = "readable")]
        events: String,
        /// Negative waits forever
        #[arg(short, long, default_value_t = 1000, allow_hyphen_values = true)]
        timeout_ms: i32,
    },
    /// Print package and library versions
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.config {
        // Must happen before the first settings lookup.
        std::env::set_var("SERIAL_CORE_CONFIG", path);
        ConfigLoader::load_from(path)?;
    }

    let mut logging = config::global().logging.clone();
    match args.verbose {
        0 => {}
        1 => logging.level = "info".to_string(),
        2 => logging.level = "debug".to_string(),
        _ => logging.level = "trace".to_string(),
    }
    serial_core::logging::init(&logging);

    let registry = PortRegistry::native();
    match args.command {
        Command::List { json } => list(&registry, json),
        Command::Info { port, json } => info(&registry, &port, json),
        Command::Read {
            port,
            count,
            timeout_ms,
            baud,
        } => read(&registry, &port, count, timeout_ms, baud),
        Command::Send {
            port,
            data,
            baud,
            timeout_ms,
        } => send(&registry, &port, data.as_bytes(), baud, timeout_ms),
        Command::Wait {
            ports,
            events,
            timeout_ms,
        } => wait(&registry, &ports, &events, timeout_ms),
        Command::Version => {
            println!(
                "serial-core {} (library interface {})",
                serial_core::version::package_version_string(),
                serial_core::version::lib_version_string()
            );
            Ok(())
        }
    }
}

fn list(registry: &PortRegistry, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ports = registry.enumerate()?;
    if json {
        let infos: Vec<_> = ports.iter().map(Port::info).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in &ports {
        println!("{:<24} {:<10} {}", port.name(), port.transport(), port.description());
    }
    Ok(())
}

fn info(registry: &PortRegistry, name: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let port = registry.by_name(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(port.info())?);
        return Ok(());
    }
    println!("Name:        {}", port.name());
    println!("Description: {}", port.description());
    println!("Transport:   {}", port.transport());
    if let Ok((vid, pid)) = port.usb_vid_pid() {
        println!("USB ID:      {vid:04x}:{pid:04x}");
    }
    if let Some(manufacturer) = port.usb_manufacturer() {
        println!("Maker:       {manufacturer}");
    }
    if let Some(product) = port.usb_product() {
        println!("Product:     {product}");
    }
    if let Some(serial) = port.usb_serial() {
        println!("Serial:      {serial}");
    }
    if let Ok((bus, address)) = port.usb_bus_address() {
        println!("Bus/address: {bus}/{address}");
    }
    Ok(())
}

fn open(
    registry: &PortRegistry,
    name: &str,
    mode: OpenMode,
    baud: Option<u32>,
) -> Result<Port, Box<dyn std::error::Error>> {
    let port = registry.by_name(name)?;
    port.open(mode)?;
    if let Some(baud) = baud {
        port.set_baud_rate(baud)?;
    }
    Ok(port)
}

fn read(
    registry: &PortRegistry,
    name: &str,
    count: usize,
    timeout_ms: u32,
    baud: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = open(registry, name, OpenMode::READ, baud)?;
    let mut buffer = vec![0u8; count];
    let n = port.blocking_read(&mut buffer, timeout_ms)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&buffer[..n])?;
    stdout.flush()?;
    port.close()?;
    if n < count {
        eprintln!("read {n} of {count} bytes before the timeout");
    }
    Ok(())
}

fn send(
    registry: &PortRegistry,
    name: &str,
    data: &[u8],
    baud: Option<u32>,
    timeout_ms: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = open(registry, name, OpenMode::WRITE, baud)?;
    let n = port.blocking_write(data, timeout_ms)?;
    port.drain()?;
    port.close()?;
    println!("wrote {n} of {} bytes", data.len());
    Ok(())
}

fn parse_events(list: &str) -> Result<EventMask, Box<dyn std::error::Error>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .try_fold(EventMask::empty(), |mask, name| {
            let bit = match name {
                "readable" => EventMask::READABLE,
                "writable" => EventMask::WRITABLE,
                "error" => EventMask::ERROR,
                other => return Err(format!("unknown event '{other}'").into()),
            };
            Ok(mask | bit)
        })
}

fn wait(
    registry: &PortRegistry,
    names: &[String],
    events: &str,
    timeout_ms: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mask = parse_events(events)?;
    let ports = names
        .iter()
        .map(|name| open(registry, name, OpenMode::READ_WRITE, None))
        .collect::<Result<Vec<_>, _>>()?;

    let mut set = EventSet::new();
    for port in &ports {
        set.add_port_events(port, mask.bits())?;
    }
    if set.wait(timeout_ms)? {
        println!("ready");
    } else {
        println!("timed out");
    }
    Ok(())
}
