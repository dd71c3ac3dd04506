use anyhow::{Context, Result};
use batchname_core::{BatchError, Config, OutputFormatter, VersionResult};
use clap::{CommandFactory, Parser};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod cli;
mod preview;
mod rename;
mod wizard;

use cli::{Cli, Commands, OutputFormat};

fn main() {
    // Set up signal handler for graceful shutdown (both SIGINT and SIGTERM)
    let interrupted = Arc::new(AtomicBool::new(false));

    // Handle SIGINT (Ctrl-C)
    let interrupted_clone = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        eprintln!("\nReceived SIGINT. Finishing the current batch...");
        interrupted_clone.store(true, Ordering::SeqCst);
    })
    .expect("Error setting SIGINT handler");

    // Handle SIGTERM
    let interrupted_clone = Arc::clone(&interrupted);
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, move || {
            eprintln!("\nReceived SIGTERM. Finishing the current batch...");
            interrupted_clone.store(true, Ordering::SeqCst);
        })
        .expect("Error setting SIGTERM handler");
    }

    let cli = Cli::parse();

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e:#}");
                process::exit(2);
            });
    }

    // Load config to get defaults
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {e:#}. Using default settings.");
        Config::default()
    });

    let use_color = !cli.no_color
        && config.defaults.use_color.unwrap_or(true)
        && io::stdout().is_terminal();
    let log_path = activity_log_path(&cli, &config);

    let result = match cli.command {
        Commands::Preview {
            directory,
            pipeline,
            fixed_table_width,
            output,
        } => preview::handle_preview(
            &directory,
            &pipeline.resolve(&config.pipeline),
            OutputFormat::resolve(output, &config.defaults.output_format),
            fixed_table_width,
            use_color,
        ),

        Commands::Rename {
            directory,
            pipeline,
            review,
            output,
        } => rename::handle_rename(
            &directory,
            &pipeline.resolve(&config.pipeline),
            log_path.as_deref(),
            review && !cli.yes,
            OutputFormat::resolve(output, &config.defaults.output_format),
            use_color,
            &interrupted,
        ),

        Commands::Wizard => wizard::handle_wizard(&config.pipeline, log_path.as_deref()),

        Commands::Completions { shell, out_dir } => {
            let mut cmd = Cli::command();
            generate_completions(shell, &mut cmd, "batchname", &out_dir)
        },

        Commands::Version { output } => handle_version(output),
    };

    // Check if we were interrupted during execution
    if interrupted.load(Ordering::SeqCst) {
        eprintln!("Operation interrupted.");
        process::exit(130);
    }

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code_for(&e));
        },
    }
}

/// 2 for problems with the requested directory, 3 for everything else
fn exit_code_for(error: &anyhow::Error) -> i32 {
    let directory_error = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<BatchError>())
        .any(BatchError::is_directory_error);
    if directory_error {
        2
    } else {
        3
    }
}

fn activity_log_path(cli: &Cli, config: &Config) -> Option<PathBuf> {
    if cli.no_log {
        return None;
    }
    match &cli.log_file {
        Some(path) => Some(path.clone()),
        None if config.defaults.activity_log => Some(config.defaults.log_path.clone()),
        None => None,
    }
}

// Generate shell completions
pub fn generate_completions<G: clap_complete::Generator>(
    gen: G,
    cmd: &mut clap::Command,
    name: &str,
    out_dir: &std::path::Path,
) -> Result<()> {
    use clap_complete::generate_to;
    use std::fs;

    fs::create_dir_all(out_dir)?;
    let path = generate_to(gen, cmd, name, out_dir)?;
    println!("Generated completion file: {}", path.display());
    Ok(())
}

fn handle_version(output: OutputFormat) -> Result<()> {
    let version_result = VersionResult {
        name: "batchname".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
    Ok(())
}
