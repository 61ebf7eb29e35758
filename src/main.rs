//! ussd-pager - USSD menu session simulator
//!
//! Plays the part of the USSD gateway: reads one input per line from stdin,
//! feeds it to a menu session and prints each page with its character
//! count against the channel limit.
//!
//! # Quick Start
//!
//! ```text
//! ussd-pager                       # Built-in demo menu
//! ussd-pager -t menu.toml          # Your own menu tree
//! ussd-pager --limit 120 -p 3      # Tighter channel
//! ussd-pager -s name=Amina         # Session data for {name} placeholders
//! ```
//!
//! # Inputs
//!
//! | Input | Action |
//! |-------|--------|
//! | 1-9.. | Pick an option on screen |
//! | 00 | Next page |
//! | # | Back |
//! | 0 | Exit |

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ussd_pager::config::Config;
use ussd_pager::menu::MenuTree;
use ussd_pager::session::{Reply, Session};

/// Menu used when no tree file is configured
const DEMO_TREE: &str = include_str!("../demos/menu.toml");

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line options
#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    tree: Option<PathBuf>,
    address: Option<String>,
    limit: Option<usize>,
    page_size: Option<usize>,
    no_exit: bool,
    data: Vec<(String, String)>,
    write_config: bool,
}

fn print_version() {
    eprintln!("ussd-pager {}", VERSION);
}

fn print_help() {
    eprintln!("ussd-pager {} - USSD menu session simulator", VERSION);
    eprintln!();
    eprintln!("Usage: ussd-pager [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>   Config file (default: ~/.ussd-pager/config.toml)");
    eprintln!("  -t, --tree <FILE>     Menu tree file (default: built-in demo)");
    eprintln!("  -a, --address <ADDR>  Session address (default: 256700000001)");
    eprintln!("  -l, --limit <N>       Channel character limit");
    eprintln!("  -p, --page-size <N>   Default items per page");
    eprintln!("      --no-exit         Hide the 0.Exit line");
    eprintln!("  -s, --set <KEY=VAL>   Session data value (repeatable)");
    eprintln!("      --write-config    Save the effective config (to -c FILE if given) and quit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Inputs: option number, 00 = more, # = back, 0 = exit");
    eprintln!();
    eprintln!("Logs: ~/.ussd-pager/ussd-pager.log (RUST_LOG overrides the level)");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("Missing value for {}", flag))
    }

    fn number(text: &str, flag: &str) -> Result<usize, String> {
        text.parse()
            .map_err(|_| format!("Invalid number for {}: {}", flag, text))
    }

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            flag @ ("-c" | "--config") => {
                i += 1;
                parsed.config = Some(PathBuf::from(value(&args, i, flag)?));
            }
            flag @ ("-t" | "--tree") => {
                i += 1;
                parsed.tree = Some(PathBuf::from(value(&args, i, flag)?));
            }
            flag @ ("-a" | "--address") => {
                i += 1;
                parsed.address = Some(value(&args, i, flag)?.to_string());
            }
            flag @ ("-l" | "--limit") => {
                i += 1;
                parsed.limit = Some(number(value(&args, i, flag)?, flag)?);
            }
            flag @ ("-p" | "--page-size") => {
                i += 1;
                parsed.page_size = Some(number(value(&args, i, flag)?, flag)?);
            }
            "--no-exit" => {
                parsed.no_exit = true;
            }
            flag @ ("-s" | "--set") => {
                i += 1;
                let pair = value(&args, i, flag)?;
                let (key, val) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("Expected KEY=VALUE for {}: {}", flag, pair))?;
                parsed.data.push((key.to_string(), val.to_string()));
            }
            "--write-config" => {
                parsed.write_config = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Turn a `--set` value into a typed session value
fn session_value(text: &str) -> toml::Value {
    if let Ok(b) = text.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(n) = text.parse::<i64>() {
        toml::Value::Integer(n)
    } else {
        toml::Value::String(text.to_string())
    }
}

fn init_logging(config: &Config) {
    let log_path = config
        .log
        .file
        .clone()
        .or_else(|| Config::data_dir().map(|dir| dir.join("ussd-pager.log")))
        .unwrap_or_else(|| PathBuf::from("ussd-pager.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(),
    };

    // Command line overrides the config file
    if let Some(tree) = args.tree {
        config.tree = Some(tree);
    }
    if let Some(limit) = args.limit {
        config.channel.char_limit = limit;
    }
    if let Some(size) = args.page_size {
        config.channel.page_size = size;
    }
    if args.no_exit {
        config.channel.enable_exit = false;
    }

    if args.write_config {
        match args.config {
            Some(ref path) => config
                .save_to(path)
                .with_context(|| format!("saving config {}", path.display()))?,
            None => config.save().context("saving config")?,
        }
        eprintln!("Config saved");
        return Ok(());
    }

    init_logging(&config);
    info!("ussd-pager {} starting...", VERSION);

    let tree = match config.tree {
        Some(ref path) => MenuTree::load(path)
            .with_context(|| format!("loading menu tree {}", path.display()))?,
        None => MenuTree::from_toml_str(DEMO_TREE).context("parsing built-in demo tree")?,
    };
    info!("Menu tree: {} nodes, root '{}'", tree.node_count(), tree.root_name());
    info!("Channel: {:?}", config.channel);

    let address = args.address.unwrap_or_else(|| "256700000001".to_string());
    let limit = config.channel.char_limit;
    let mut session = Session::with_tree(address, Arc::new(tree), config.channel);
    for (key, val) in &args.data {
        session.data_mut().insert(key.clone(), session_value(val));
    }

    run_session(&mut session, limit)
}

/// Drive a session from stdin until it ends or input runs out
fn run_session(session: &mut Session, limit: usize) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut reply = session.start();
    let mut lines = stdin.lock().lines();

    loop {
        print_reply(&mut stdout, &reply, limit)?;
        if reply.is_end() {
            info!("Session ended");
            return Ok(());
        }

        write!(stdout, "> ")?;
        stdout.flush()?;

        let input = match lines.next() {
            Some(line) => line?,
            None => {
                warn!("Input closed before the session ended");
                writeln!(stdout)?;
                return Ok(());
            }
        };
        reply = session.respond(&input);
    }
}

fn print_reply(out: &mut impl Write, reply: &Reply, limit: usize) -> io::Result<()> {
    let len = reply.text().chars().count();
    let marker = if len > limit { " OVER LIMIT" } else { "" };
    writeln!(out, "---- {}/{} chars{} ----", len, limit, marker)?;
    writeln!(out, "{}", reply.text())?;
    if reply.is_end() {
        writeln!(out, "---- session ended ----")?;
    } else {
        writeln!(out, "----")?;
    }
    Ok(())
}
