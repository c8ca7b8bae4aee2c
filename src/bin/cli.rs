//! PicoDB - interactive shell

use std::env;
use std::io;

use anyhow::{bail, Context};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use picodb::database::MEMORY_DB_NAME;
use picodb::shell::{LineOutcome, Shell};
use picodb::Config;

/// Command line arguments
struct Args {
    config: Option<String>,
    database: String,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        database: MEMORY_DB_NAME.to_string(),
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config requires a file argument")?;
                args.config = Some(path);
            }
            "--help" | "-h" => {
                println!("Usage: picodb [--config <file>] [database]");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            _ => args.database = arg,
        }
    }
    Ok(args)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PICODB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path))?,
        None => Config::default(),
    };

    let mut shell = Shell::new(config, io::stdout(), io::stderr());
    shell.print_banner()?;
    shell
        .open(&args.database)
        .with_context(|| format!("Cannot open database '{}'", args.database))?;
    shell.print_opened()?;

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(shell.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if shell.handle_line(&line)? == LineOutcome::Exit {
                    break;
                }
            }
            // Ctrl-C discards the statement being typed.
            Err(ReadlineError::Interrupted) => shell.reset_statement(),
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    shell.close();
    println!("\nGoodbye.");
    Ok(())
}
