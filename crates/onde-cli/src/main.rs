//! `onde` — CLI principal d'Onde
//!
//! Bienvenue dans le binaire ! Ici on fait uniquement : parsing d'arguments,
//! initialisation du logger, et délégation aux crates du workspace
//! (chargeur, machine de réduction, codec, transport).

#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use onde_core::codec;
use onde_eval::{Env, Machine, NoTransport, Transport};
use onde_net::Client;
use onde_parser::{parse_expr, Program};

// ──────────────────────────── CLI (clap) ────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "onde", version, about = "Onde CLI — évaluer, moduler, démoduler", long_about = None)]
struct Opt {
    /// Augmente la verbosité (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Mode silencieux (casse la verbosité)
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Sous-commandes
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Charger un programme et réduire son expression d'entrée
    Run {
        /// Fichier programme (lignes `nom = jetons…`)
        #[arg(short = 'i', long = "in")]
        input: PathBuf,
        /// Expression d'entrée (jetons)
        #[arg(long, default_value = "main")]
        expr: String,
        /// Tracer chaque réduction d'application
        #[arg(long)]
        trace: bool,
        /// Point d'échange distant pour la primitive `send`
        #[arg(long, default_value = onde_net::DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Clé d'API ; sans elle, `send` est refusé
        #[arg(long = "apikey")]
        api_key: Option<String>,
    },

    /// Réduire une expression close et afficher sa forme binaire
    Mod {
        /// Jetons de l'expression (ex. `ap ap cons 1 nil`)
        expr: String,
    },

    /// Démoduler une chaîne de bits et afficher le terme
    Dem {
        /// Bits `0`/`1`
        bits: String,
    },
}

// ──────────────────────────── Logger / Verbosité ────────────────────────────

fn init_telemetry(verbose: u8, quiet: bool, trace_reductions: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let mut filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_owned());
    if trace_reductions {
        filter.push_str(",onde_eval=trace");
    }
    env_logger::Builder::new().parse_filters(&filter).init();
}

// ──────────────────────────── Sous-commandes ────────────────────────────

fn cmd_run(
    input: &PathBuf,
    expr: &str,
    endpoint: String,
    api_key: Option<String>,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let program = Program::parse(&source)
        .with_context(|| format!("cannot load {}", input.display()))?;
    log::info!("loaded {} definitions from {}", program.defs().len(), input.display());

    let entry = program
        .entry(expr)
        .with_context(|| format!("cannot parse entry expression {expr:?}"))?;
    log::info!("   {entry}");

    let env = Env::from_defs(program.into_defs());
    let transport: Box<dyn Transport> = match api_key {
        Some(key) => Box::new(Client::new(endpoint, key)),
        None => Box::new(NoTransport),
    };
    let value = Machine::new(&env, transport.as_ref())
        .evaluate(&entry)
        .context("evaluation failed")?;
    println!("{value}");
    Ok(())
}

fn cmd_mod(expr: &str) -> Result<()> {
    let term = parse_expr(expr, &HashSet::new())
        .with_context(|| format!("cannot parse {expr:?}"))?;
    let env = Env::new();
    let value = Machine::new(&env, &NoTransport)
        .evaluate(&term)
        .context("evaluation failed")?;
    let bits = codec::modulate(&value)
        .with_context(|| format!("`{value}` has no wire form"))?;
    println!("{bits}");
    Ok(())
}

fn cmd_dem(bits: &str) -> Result<()> {
    let term = codec::demodulate_all(bits.trim()).context("cannot demodulate")?;
    println!("{term}");
    Ok(())
}

// ──────────────────────────── main ────────────────────────────

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> Result<()> {
    let opt = Opt::parse();

    let trace_reductions = matches!(&opt.cmd, Command::Run { trace: true, .. });
    init_telemetry(opt.verbose, opt.quiet, trace_reductions);

    match opt.cmd {
        Command::Run { input, expr, trace: _, endpoint, api_key } => {
            cmd_run(&input, &expr, endpoint, api_key)
        }
        Command::Mod { expr } => cmd_mod(&expr),
        Command::Dem { bits } => cmd_dem(&bits),
    }
}
