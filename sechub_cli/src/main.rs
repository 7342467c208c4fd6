//! # Security Hub Codec CLI
//!
//! Runs the expand/flatten codecs over JSON files so configuration trees can
//! be checked without an API call.

use clap::{Parser, Subcommand, ValueEnum};
use sechub_codec::logging::codes;
use sechub_codec::prelude::*;
use sechub_codec::{
    expand_control_parameter_set, expand_custom_parameter, flatten_control_parameter_set,
    flatten_custom_parameter, ConfigError, FieldRegistry,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "sechub",
    version,
    about = "Expand and flatten Security Hub filters, rules and control parameters"
)]
struct Cli {
    /// TOML file with a [codec] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use permissive legacy decoding
    #[arg(long, global = true)]
    legacy: bool,

    /// Log codec decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a configuration tree into its API request shape
    Expand {
        kind: Kind,
        /// JSON input file, `-` for stdin
        file: PathBuf,
    },
    /// Convert an API response shape back into a configuration tree
    Flatten {
        kind: Kind,
        /// JSON input file, `-` for stdin
        file: PathBuf,
    },
    /// List the filterable fields of a vocabulary
    Fields { vocabulary: VocabularyArg },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    InsightFilters,
    AutomationCriteria,
    Parameter,
    ControlParameters,
    Policy,
    Insight,
    AutomationRule,
    ControlAssociation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VocabularyArg {
    Insight,
    AutomationRule,
}

impl From<VocabularyArg> for Vocabulary {
    fn from(arg: VocabularyArg) -> Self {
        match arg {
            VocabularyArg::Insight => Vocabulary::Insight,
            VocabularyArg::AutomationRule => Vocabulary::AutomationRule,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Codec(_) => 1,
            Self::Io { .. } | Self::Json { .. } | Self::Config(_) => 2,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(CliError::Codec(err)) => {
            eprintln!("{}", render_codec_error(&err));
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let options = load_options(cli.config.as_deref(), cli.legacy)?;
    log::debug!("Codec options: mode={}", options.mode);

    let output = match &cli.command {
        Commands::Expand { kind, file } => {
            let tree = read_json(file)?;
            expand(*kind, &tree, &options)?
        }
        Commands::Flatten { kind, file } => {
            let wire = read_json(file)?;
            flatten(*kind, &wire)?
        }
        Commands::Fields { vocabulary } => {
            return Ok(render_fields(Vocabulary::from(*vocabulary).registry()));
        }
    };

    Ok(render(&output, cli.pretty))
}

fn load_options(config: Option<&Path>, legacy: bool) -> Result<CodecOptions, CliError> {
    let options = match config {
        Some(path) => CodecOptions::from_toml_file(path)?,
        None => CodecOptions::default(),
    };

    if legacy {
        return Ok(options.with_mode(CodecMode::Legacy));
    }
    Ok(options)
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let mut content = String::new();
    let read = if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut content).map(|_| ())
    } else {
        std::fs::read_to_string(path).map(|text| content = text)
    };
    read.map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn render(value: &Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

fn render_codec_error(err: &CodecError) -> String {
    let mut rendered = match err.metadata() {
        Some(metadata) => format!(
            "error[{}] ({}): {}\n  = help: {}",
            err.code(),
            metadata.severity.as_str(),
            err.user_message(),
            metadata.recommended_action
        ),
        None => format!("error[{}]: {}", err.code(), err.user_message()),
    };
    for issue in err.issues() {
        if let Some(metadata) = codes::get_metadata(issue.kind.code().as_str()) {
            let help = format!("\n  = help: {}: {}", issue.path, metadata.recommended_action);
            rendered.push_str(&help);
        }
    }
    rendered
}

fn render_fields(registry: &FieldRegistry) -> String {
    registry
        .fields()
        .iter()
        .map(|spec| format!("{:<52} {:<58} {}", spec.name, spec.wire_key, spec.kind))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// DISPATCH
// ============================================================================

fn expand(kind: Kind, tree: &Value, options: &CodecOptions) -> Result<Value, CodecError> {
    let wire = match kind {
        Kind::InsightFilters => expand_filter_set(Vocabulary::Insight, tree, options)?.to_wire()?,
        Kind::AutomationCriteria => {
            expand_filter_set(Vocabulary::AutomationRule, tree, options)?.to_wire()?
        }
        Kind::Parameter => {
            let parameter = expand_custom_parameter(tree, options)?;
            let mut map = Map::new();
            map.insert(
                parameter.name,
                serde_json::to_value(&parameter.configuration)?,
            );
            Value::Object(map)
        }
        Kind::ControlParameters => {
            serde_json::to_value(expand_control_parameter_set(tree, options)?)?
        }
        Kind::Policy => serde_json::to_value(expand_configuration_policy(tree, options)?)?,
        Kind::Insight => serde_json::to_value(expand_insight(tree, options)?)?,
        Kind::AutomationRule => serde_json::to_value(expand_automation_rule(tree, options)?)?,
        Kind::ControlAssociation => {
            serde_json::to_value(expand_control_association(tree, options)?)?
        }
    };
    Ok(wire)
}

fn flatten(kind: Kind, wire: &Value) -> Result<Value, CodecError> {
    let tree = match kind {
        Kind::InsightFilters => flatten_filter_set(&FilterSet::from_wire(Vocabulary::Insight, wire)?),
        Kind::AutomationCriteria => {
            flatten_filter_set(&FilterSet::from_wire(Vocabulary::AutomationRule, wire)?)
        }
        Kind::Parameter => {
            let parameters: BTreeMap<String, ParameterConfiguration> =
                serde_json::from_value(wire.clone())?;
            Value::Array(
                parameters
                    .iter()
                    .map(|(name, configuration)| flatten_custom_parameter(name, configuration))
                    .collect(),
            )
        }
        Kind::ControlParameters => {
            flatten_control_parameter_set(&serde_json::from_value(wire.clone())?)
        }
        Kind::Policy => flatten_configuration_policy(&serde_json::from_value(wire.clone())?),
        Kind::Insight => flatten_insight(&Insight::from_wire(wire)?),
        Kind::AutomationRule => flatten_automation_rule(&AutomationRule::from_wire(wire)?),
        Kind::ControlAssociation => {
            flatten_control_association(&serde_json::from_value(wire.clone())?)
        }
    };
    Ok(tree)
}
