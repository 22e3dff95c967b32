use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apishape_core::config::{self, ApishapeConfig, CONFIG_FILE_NAME, OutputFormat};
use apishape_core::parse::{self, spec::OpenApiSpec};
use apishape_core::{ShapedApi, shape_document, transform};

#[derive(Parser)]
#[command(
    name = "apishape",
    about = "Group, order and annotate OpenAPI operations for code generators",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape an OpenAPI description and write the result
    Shape {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file; `-` writes to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a compact summary of the shaped description
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: Format,
    },

    /// Initialize a new apishape configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Shape {
            input,
            output,
            format,
        } => cmd_shape(input, output, format),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apishape", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApishapeConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("invalid {CONFIG_FILE_NAME}"))?;
    if cfg.is_none() {
        log::debug!("no {CONFIG_FILE_NAME} found, using defaults");
    }
    Ok(cfg)
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

fn shape_spec(path: &Path, cfg: &ApishapeConfig) -> Result<ShapedApi> {
    let parsed = load_spec(path)?;
    let shaped = shape_document(&parsed, &cfg.generator)
        .with_context(|| format!("failed to shape {}", path.display()))?;
    for diagnostic in &shaped.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(shaped)
}

fn render<T: serde::Serialize>(value: &T, format: Format) -> Result<String> {
    Ok(match format {
        Format::Yaml => serde_yaml_ng::to_string(value)?,
        Format::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}

fn cmd_shape(input: Option<PathBuf>, output: Option<PathBuf>, format: Option<Format>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let format = format.unwrap_or_else(|| cfg.format.into());

    let shaped = shape_spec(&input, &cfg)?;
    let rendered = render(&shaped, format)?;

    if output.as_os_str() == "-" {
        print!("{rendered}");
        return Ok(());
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(&output, rendered).with_context(|| format!("failed to write {}", output.display()))?;

    eprintln!(
        "Shaped {} operations into {} groups → {}",
        shaped.operations.len(),
        shaped.groups.len(),
        output.display()
    );
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let parsed = load_spec(&input)?;

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    // Also validate that it lowers and shapes with the default settings
    let ir = transform::transform(&parsed)?;
    eprintln!("  Operations: {}", ir.operations.len());
    let shaped = apishape_core::shape(ir, &config::ShapeOptions::default())?;
    let aliases = shaped.models.values().filter(|m| m.is_alias).count();
    eprintln!("  Models: {} ({aliases} aliases)", shaped.models.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: Format) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let shaped = shape_spec(&input, &cfg)?;

    let summary = build_inspect_summary(&shaped);
    print!("{}", render(&summary, format)?);
    Ok(())
}

fn build_inspect_summary(shaped: &ShapedApi) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = shaped
        .groups
        .values()
        .map(|group| {
            let operations: Vec<serde_json::Value> = shaped
                .group_operations(group)
                .map(|op| {
                    serde_json::json!({
                        "id": op.operation_id,
                        "method": op.method.as_str(),
                        "path": op.path,
                        "consumes": op
                            .prioritized_consumes
                            .iter()
                            .map(|mt| mt.media_type.as_str())
                            .collect::<Vec<_>>(),
                        "capabilities": op.capabilities.tags(),
                    })
                })
                .collect();
            serde_json::json!({
                "key": group.key,
                "api_name": group.api_name,
                "operations": operations,
            })
        })
        .collect();

    let models: Vec<serde_json::Value> = shaped
        .models
        .values()
        .map(|m| {
            serde_json::json!({
                "name": m.name.pascal_case,
                "alias": m.is_alias,
                "capabilities": m.capabilities.tags(),
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": shaped.info.title,
            "version": shaped.info.version,
            "short_name": shaped.short_app_name,
        },
        "library": shaped.options.library.as_str(),
        "groups": groups,
        "models": models,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
