//! Algorun CLI - run algorithm jobs and regenerate their scripts

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use algorun::{
    AlgoError, AlgorithmHandle, ExecutionOutcome, FixSuggestion, Framework, FrameworkConfig,
    HistoryView, Job, ScriptBuilder, VersionPolicy,
};

#[derive(Parser)]
#[command(name = "algorun")]
#[command(about = "Algorun - algorithm execution and provenance framework")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job file and print its replay script
    Run {
        /// Path to the job YAML file
        file: PathBuf,

        /// Framework config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run on the calling thread instead of the worker pool
        #[arg(long)]
        sync: bool,

        /// Expand every child algorithm in the script
        #[arg(long)]
        unroll_all: bool,

        /// Add Version= to every call in the script
        #[arg(long)]
        versions: bool,

        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Also write the history log as JSON
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Check a job file without running it
    Validate {
        /// Path to the job YAML file
        file: PathBuf,
    },

    /// List registered algorithms
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the properties of one algorithm
    Describe {
        name: String,

        #[arg(short, long)]
        version: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays a clean script
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            file,
            config,
            sync,
            unroll_all,
            versions,
            script,
            history,
        } => {
            let options = RunOptions {
                sync,
                unroll_all,
                versions,
                script,
                history,
            };
            run_job(&file, config.as_deref(), options).await
        }
        Commands::Validate { file } => validate_job(&file),
        Commands::List { json } => list_algorithms(json),
        Commands::Describe { name, version } => describe_algorithm(&name, version),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let AlgoError::UnknownAlgorithm { suggestions, .. } = &e {
            if !suggestions.is_empty() {
                eprintln!("  {} {}", "Did you mean:".yellow(), suggestions.join(", "));
            }
        }
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

struct RunOptions {
    sync: bool,
    unroll_all: bool,
    versions: bool,
    script: Option<PathBuf>,
    history: Option<PathBuf>,
}

fn framework(config: Option<&Path>) -> Result<Framework, AlgoError> {
    let config = match config {
        Some(path) => FrameworkConfig::load(path)?,
        None => FrameworkConfig::default(),
    };
    Framework::with_builtins(config.apply_env()?)
}

async fn run_job(file: &Path, config: Option<&Path>, options: RunOptions) -> Result<(), AlgoError> {
    let yaml = tokio::fs::read_to_string(file).await?;
    let job = Job::from_yaml(&yaml)?;
    let fw = framework(config)?;

    eprintln!(
        "{} Running {} ({} steps)",
        "→".cyan(),
        job.display_name().cyan().bold(),
        job.steps.len()
    );

    for (i, step) in job.steps.iter().enumerate() {
        let handle = step.prepare(&fw)?;
        let clock = Instant::now();
        let outcome = if options.sync {
            handle.execute()
        } else {
            run_in_background(&handle).await?
        };

        match outcome {
            ExecutionOutcome::Success => eprintln!(
                "  {} {} v{} ({:.2}s)",
                "✓".green(),
                handle.name(),
                handle.version(),
                clock.elapsed().as_secs_f64()
            ),
            ExecutionOutcome::Failed(message) => {
                eprintln!("  {} {}", "✗".red(), handle.name());
                return Err(AlgoError::execution(format!(
                    "step {} ({}) failed: {message}",
                    i + 1,
                    handle.name()
                )));
            }
            ExecutionOutcome::Cancelled => {
                eprintln!("  {} {} cancelled", "✗".yellow(), handle.name());
                return Err(AlgoError::Cancelled);
            }
        }
    }

    let mut view = HistoryView::from_log(fw.history());
    if options.unroll_all {
        view.unroll_all();
    }
    let policy = if options.versions {
        VersionPolicy::Always
    } else {
        VersionPolicy::Never
    };
    let script = ScriptBuilder::new(&view).with_versions(policy).build();

    match &options.script {
        Some(path) => {
            tokio::fs::write(path, &script).await?;
            eprintln!("{} Script written to {}", "✓".green(), path.display());
        }
        None => print!("{script}"),
    }

    if let Some(path) = &options.history {
        let json = serde_json::to_string_pretty(&fw.history().to_json())
            .map_err(|e| AlgoError::Config(format!("cannot serialize history: {e}")))?;
        tokio::fs::write(path, json).await?;
    }
    Ok(())
}

/// Await a pool run, cancelling it on ctrl-c
async fn run_in_background(handle: &AlgorithmHandle) -> Result<ExecutionOutcome, AlgoError> {
    let mut future = handle.execute_async()?;
    tokio::select! {
        result = &mut future => result,
        _ = tokio::signal::ctrl_c() => {
            debug!(algorithm = handle.name(), "interrupt received, cancelling");
            handle.cancel();
            future.await
        }
    }
}

fn validate_job(file: &Path) -> Result<(), AlgoError> {
    let job = Job::load(file)?;
    let fw = framework(None)?;

    for step in &job.steps {
        let mut unit = fw.create_unmanaged(&step.algorithm, step.version)?;
        unit.initialize()?;
        for (name, _) in step.property_texts()? {
            unit.properties().property(&name)?;
        }
    }

    println!("{} Job '{}' is valid", "✓".green(), file.display());
    println!("  Name: {}", job.display_name());
    println!("  Steps: {}", job.steps.len());
    Ok(())
}

fn list_algorithms(json: bool) -> Result<(), AlgoError> {
    let fw = framework(None)?;
    let descriptors = fw.factory().descriptors();

    if json {
        let out = serde_json::to_string_pretty(&descriptors)
            .map_err(|e| AlgoError::Config(format!("cannot serialize algorithms: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    for category in fw.factory().categories() {
        println!("{}", category.cyan().bold());
        for d in descriptors.iter().filter(|d| d.category == category) {
            println!("  {:<16} v{}  {}", d.name, d.version, d.summary);
        }
    }
    Ok(())
}

fn describe_algorithm(name: &str, version: Option<u32>) -> Result<(), AlgoError> {
    let fw = framework(None)?;
    let mut unit = fw.create_unmanaged(name, version)?;
    unit.initialize()?;

    println!("{} v{}", unit.name().cyan().bold(), unit.version());
    println!("  Category: {}", unit.category());
    if !unit.summary().is_empty() {
        println!("  {}", unit.summary());
    }
    println!();
    for p in unit.properties().iter() {
        let default = p.default_value().to_text();
        let default = if default.is_empty() {
            String::new()
        } else {
            format!(" = {default}")
        };
        println!(
            "  {} {:<7} {}{}",
            format!("{:<16}", p.name()).bold(),
            p.direction().to_string(),
            p.kind(),
            default
        );
        if let Some(validator) = p.validator() {
            let allowed = validator.allowed_values();
            if !allowed.is_empty() {
                println!("  {:<16} allowed: {}", "", allowed.join(", "));
            }
        }
        if !p.doc().is_empty() {
            println!("  {:<16} {}", "", p.doc().dimmed());
        }
    }
    Ok(())
}
