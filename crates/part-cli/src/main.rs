//! partgen: turn part descriptions into solids from the primitive library.
//!
//! Logging goes to stderr and follows `RUST_LOG` when set, otherwise the
//! `-v` count (`-v` info, `-vv` debug, `-vvv` trace).

use std::io::Read;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use part_ai::{
    BuildReport, DEFAULT_ENDPOINT, DEFAULT_MODEL, GenerationConfig, GenerationResult, OllamaClient,
    PartAssistant, PartError, Pipeline, build_with_sdf,
};
use part_core::SdfKernel;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "partgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the primitive library
    Primitives,

    /// Print the system prompt sent to the generator
    Prompt,

    /// Classify generator output without executing it
    Classify {
        /// Raw generator output, or `-` for stdin
        text: String,
    },

    /// Classify, sanitize and execute generator output on the SDF kernel
    Build {
        /// Raw generator output, or `-` for stdin
        text: String,

        /// Grid resolution for the volume estimate
        #[arg(long, default_value_t = part_ai::DEFAULT_VOLUME_RESOLUTION)]
        resolution: usize,
    },

    /// Ask a local Ollama model for a part and build it
    Generate {
        /// Free-text part description
        description: String,

        #[arg(long, env = "PARTGEN_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        #[arg(long, env = "PARTGEN_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Generations to try for failures the model can correct
        #[arg(long, default_value_t = 3)]
        max_attempts: usize,

        #[arg(long, default_value_t = 0.2)]
        temperature: f64,

        #[arg(long, default_value_t = part_ai::DEFAULT_VOLUME_RESOLUTION)]
        resolution: usize,
    },
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "part_ai=info,part_dsl=info,part_core=info",
            2 => "part_ai=debug,part_dsl=debug,part_core=debug,part_library=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pipeline = Pipeline::default();
    match &cli.command {
        Commands::Primitives => list_primitives(&pipeline, cli.json),
        Commands::Prompt => {
            print!("{}", pipeline.system_prompt());
            Ok(())
        }
        Commands::Classify { text } => run_classify(&pipeline, &read_text(text)?, cli.json),
        Commands::Build { text, resolution } => {
            let report = build_with_sdf(&pipeline, &read_text(text)?, *resolution)
                .map_err(describe_failure)?;
            print_report(&report, cli.json)
        }
        Commands::Generate {
            description,
            model,
            endpoint,
            max_attempts,
            temperature,
            resolution,
        } => {
            let config = GenerationConfig {
                model: model.clone(),
                endpoint: endpoint.clone(),
                max_attempts: *max_attempts,
                temperature: *temperature,
            };
            run_generate(pipeline, config, description, *resolution, cli.json)
        }
    }
}

fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read generator output from stdin")?;
    Ok(text)
}

fn list_primitives(pipeline: &Pipeline, json: bool) -> Result<()> {
    let registry = pipeline.registry();
    if json {
        let specs: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }
    for spec in registry.iter() {
        println!("{}", spec.signature());
        println!("    {}", spec.summary);
    }
    Ok(())
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn run_classify(pipeline: &Pipeline, raw: &str, json: bool) -> Result<()> {
    let result = pipeline.classify(raw);
    let output = match &result {
        GenerationResult::Ready { code } => ClassifyOutput {
            outcome: result.label(),
            code: Some(code),
            message: None,
        },
        GenerationResult::Ambiguous { message } | GenerationResult::Unsupported { message } => {
            ClassifyOutput {
                outcome: result.label(),
                code: None,
                message: Some(message.clone()),
            }
        }
        GenerationResult::Malformed { error, .. } => ClassifyOutput {
            outcome: result.label(),
            code: None,
            message: Some(error.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.outcome);
        if let Some(code) = output.code {
            println!("{code}");
        }
        if let Some(message) = output.message {
            println!("{message}");
        }
    }
    Ok(())
}

fn run_generate(
    pipeline: Pipeline,
    config: GenerationConfig,
    description: &str,
    resolution: usize,
    json: bool,
) -> Result<()> {
    debug!(model = %config.model, endpoint = %config.endpoint, "using ollama");
    let client = OllamaClient::new(config.clone());
    let mut assistant = PartAssistant::new(client, &config).with_pipeline(pipeline);
    let mut kernel = SdfKernel::new();
    let mut shown = None;

    let assisted = assistant
        .request(description, &mut kernel, |solid| shown = Some(solid))
        .map_err(|err| {
            describe_failure(err.error).context(format!("gave up after {} attempt(s)", err.attempts))
        })?;
    let Some(solid) = shown else {
        bail!("no solid was displayed");
    };
    let report = BuildReport::new(assisted.build, &solid, resolution);
    print_report(&report, json)
}

fn print_report(report: &BuildReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let size = report.bounds.size();
    println!("{}", report.code);
    println!(
        "bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        report.bounds.min[0],
        report.bounds.min[1],
        report.bounds.min[2],
        report.bounds.max[0],
        report.bounds.max[1],
        report.bounds.max[2]
    );
    println!("size: {:.3} x {:.3} x {:.3} mm", size[0], size[1], size[2]);
    println!("volume: ~{:.1} mm^3", report.volume);
    Ok(())
}

fn describe_failure(error: PartError) -> anyhow::Error {
    match error.user_message() {
        Some(message) => anyhow::anyhow!("{}: {message}", error.kind().as_str()),
        None => anyhow::Error::new(error),
    }
}
