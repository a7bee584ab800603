use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use twopl::shell::{self, ShellCommand, HELP_TEXT};
use twopl::{LockManager, LockManagerConfig};

const HISTORY_FILE: &str = ".twopl_history";

/// Two readers share A while one of them writes B.
const SHARED_COMPATIBILITY_DEMO: &str = "\
begin 1
begin 2
lock 1 A S
lock 2 A S
lock 2 B X
table
commit 1
commit 2";

/// T1 holds A and wants B, T2 holds B and wants A. Nothing breaks the
/// cycle until a caller aborts one of them.
const CIRCULAR_WAIT_DEMO: &str = "\
begin 1
begin 2
lock 1 A X
lock 2 B X
lock 1 B X
lock 2 A X
table
txn 1
txn 2";

#[derive(Parser)]
#[command(author, version, about = "twopl - drive a 2PL lock manager from the command line")]
struct Cli {
    /// Use basic 2PL, allowing unlock before commit
    #[arg(long)]
    basic: bool,

    /// Print the final lock table and statistics as JSON
    #[arg(long)]
    json: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell,

    /// Execute a script of shell commands
    Run {
        /// Script file, one command per line
        script: PathBuf,
    },

    /// Run the built-in demonstration scenarios
    Demo,
}

fn new_manager(basic: bool) -> LockManager {
    let config = if basic {
        LockManagerConfig::basic()
    } else {
        LockManagerConfig::strict()
    };
    LockManager::new(config)
}

fn print_report(manager: &LockManager, json: bool) -> Result<()> {
    if json {
        let report = serde_json::json!({
            "config": manager.config(),
            "lock_table": manager.lock_table(),
            "statistics": manager.statistics(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", manager.lock_table());
        println!("{}", manager.statistics());
    }
    Ok(())
}

fn run_demo(basic: bool, json: bool) -> Result<()> {
    let scenarios = [
        ("SHARED LOCK COMPATIBILITY", SHARED_COMPATIBILITY_DEMO),
        ("CIRCULAR WAIT", CIRCULAR_WAIT_DEMO),
    ];
    for (title, script) in scenarios {
        let manager = new_manager(basic);
        println!("=== {} ===", title);
        println!("{}", shell::run_script(&manager, script));
        print_report(&manager, json)?;
        println!();
    }
    Ok(())
}

fn run_file(manager: &LockManager, path: &Path, json: bool) -> Result<()> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let output = shell::run_script(manager, &script);
    if !output.is_empty() {
        println!("{}", output);
    }
    if json {
        print_report(manager, json)?;
    }
    Ok(())
}

fn run_shell(manager: &LockManager) -> Result<()> {
    let mode = if manager.is_strict() { "Strict 2PL" } else { "basic 2PL" };
    println!("twopl shell ({}). Type 'help' for assistance or 'exit' to quit.", mode);

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            println!("Error loading history: {}", err);
        }
    }

    loop {
        match rl.readline("twopl> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                match ShellCommand::parse(&line) {
                    Ok(None) => continue,
                    Ok(Some(ShellCommand::Exit)) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(Some(ShellCommand::Help)) => println!("{}", HELP_TEXT),
                    Ok(Some(command)) => match shell::execute(manager, &command) {
                        Ok(output) => println!("{}", output),
                        Err(err) => println!("Error: {}", err),
                    },
                    Err(err) => println!("Error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Demo) => run_demo(cli.basic, cli.json),
        Some(Commands::Run { script }) => {
            let manager = new_manager(cli.basic);
            run_file(&manager, &script, cli.json)
        }
        Some(Commands::Shell) | None => {
            let manager = new_manager(cli.basic);
            run_shell(&manager)
        }
    }
}
