//! Reference runner CLI: parses, checks, and evaluates a script file
//! against a filesystem-backed host, enforcing the entry contract (§6)
//! before handing control to the evaluator.

use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::{Parser as ClapParser, Subcommand};
use glyph_cli::{entry::check_entry_shape, host::LocalHost, natives, storage};
use glyph_compiler::compile;
use glyph_eval::{new_fault_cell, Evaluator};
use glyph_runtime::bridge::to_host;

#[derive(ClapParser)]
#[command(name = "glyphc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reference runner for the Glyph script language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, check and run a .glyph script
    Run {
        /// Input .glyph source file
        input: PathBuf,

        /// Directory storage blobs are read from and written to
        #[arg(long, default_value = "glyph_storage")]
        storage_dir: PathBuf,

        /// Signing account addresses (hex-encoded), one per `main` parameter
        #[arg(long = "account", value_name = "HEX")]
        accounts: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { input, storage_dir, accounts } => run(&input, &storage_dir, &accounts),
    }
}

fn run(input: &std::path::Path, storage_dir: &std::path::Path, accounts: &[String]) {
    let source = match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", input.display());
            process::exit(1);
        }
    };

    let checked = match compile(&source, input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let addresses: Vec<Vec<u8>> = match accounts.iter().map(|a| hex::decode(a)).collect() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: invalid --account hex value: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = check_entry_shape(&checked, addresses.len()) {
        eprintln!("{e}");
        process::exit(1);
    }

    let host = Rc::new(LocalHost::new(storage_dir.to_path_buf(), addresses.clone()));
    let fault = new_fault_cell();
    let natives = natives::build(host.clone(), fault.clone());
    let evaluator = Evaluator::new(&checked, natives, fault);

    let args = match addresses
        .iter()
        .map(|addr| storage::load_account(host.as_ref(), addr))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    match evaluator.call_function("main", args.clone()) {
        Ok(result) => {
            for (addr, account) in addresses.iter().zip(args.iter()) {
                if let Err(e) = storage::save_account(host.as_ref(), addr, account) {
                    eprintln!("{e}");
                    process::exit(1);
                }
            }
            match to_host(&result) {
                Ok(host_value) => println!("{host_value:?}"),
                Err(_) => println!("{result:?}"),
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
