//! CLI for the Game of Life search compiler

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use game_of_life_search::{
    config::{CliOverrides, OutputFormat, Settings},
    utils::{write_file_checked, ColorOutput},
    SearchRunner,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "game_of_life_search")]
#[command(about = "Compiles Game of Life search problems to CNF and solves them")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search, run the SAT solver, and show the result
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Grid width (overrides config)
        #[arg(long)]
        width: Option<i32>,

        /// Grid height (overrides config)
        #[arg(long)]
        height: Option<i32>,

        /// Number of generations (overrides config)
        #[arg(short, long)]
        generations: Option<i32>,

        /// Temporal symmetry period (overrides config)
        #[arg(short, long)]
        period: Option<i32>,

        /// Seed RLE file fixing generation 0 (overrides config)
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Solver executable name (overrides config)
        #[arg(short, long)]
        solver: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile a search and write the DIMACS instance without solving
    Encode {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Output DIMACS file
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },

    /// Create an example configuration and seed patterns
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            width,
            height,
            generations,
            period,
            seed,
            solver,
            verbose,
        } => {
            let overrides = CliOverrides {
                width,
                height,
                generations,
                period,
                seed_file: seed,
                solver,
                cnf_file: None,
            };
            solve_command(config, overrides, verbose)
        }
        Commands::Encode {
            config,
            output,
            force,
        } => encode_command(config, output, force),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Ok(Settings::default())
    }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Compiling search problem..."));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);

    if verbose {
        println!("Configuration:");
        println!(
            "  Grid: {}x{}, generations 0..={}",
            settings.search.width, settings.search.height, settings.search.generations
        );
        println!(
            "  Symmetry: translate ({}, {}) over period {}",
            settings.search.translate_x, settings.search.translate_y, settings.search.period
        );
        println!("  Solver: {}", settings.solver.name);
        println!();
    }

    let format = settings.output.format.clone();
    let start = Instant::now();
    let mut runner = SearchRunner::new(settings).context("failed to build search problem")?;

    if verbose {
        println!("{}", runner.problem().render_variable_grid());
    }

    println!("{}", ColorOutput::info("Calling SAT solver..."));
    let outcome = runner.run().context("search failed")?;
    let total_time = start.elapsed();

    if outcome.is_satisfiable() {
        println!(
            "{}",
            ColorOutput::success(&format!(
                "SATISFIABLE ({:.3}s total)",
                total_time.as_secs_f64()
            ))
        );
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "UNSATISFIABLE ({:.3}s total)",
                total_time.as_secs_f64()
            ))
        );
    }

    match format {
        OutputFormat::Text => println!("\n{}", outcome.render_text()),
        OutputFormat::Json => println!("{}", outcome.to_json()?),
    }

    Ok(())
}

fn encode_command(config_path: PathBuf, output: PathBuf, force: bool) -> Result<()> {
    let settings = load_settings(&config_path)?;
    let runner = SearchRunner::new(settings).context("failed to build search problem")?;

    let dimacs = runner.dimacs();
    write_file_checked(&output, &dimacs, force)?;

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Wrote {} variables, {} clauses to {}",
            runner.problem().num_variables(),
            dimacs.lines().count() - 1,
            output.display()
        ))
    );
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let seed_dir = directory.join("input/seeds");
    for dir in [&config_dir, &seed_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    // A few classic seed patterns
    let seeds = [
        ("glider.rle", "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n"),
        ("blinker.rle", "x = 3, y = 1, rule = B3/S23\n3o!\n"),
        ("block.rle", "x = 2, y = 2, rule = B3/S23\n2o$2o!\n"),
        ("boat.rle", "x = 3, y = 3, rule = B3/S23\n2o$obo$bo!\n"),
    ];
    for (name, rle) in seeds {
        let path = seed_dir.join(name);
        if !path.exists() || force {
            std::fs::write(&path, rle)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }
    println!("Created example seeds in: {}", seed_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete"));
    println!("\nNext steps:");
    println!("1. Edit {} to describe your search", config_path.display());
    println!("2. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}
