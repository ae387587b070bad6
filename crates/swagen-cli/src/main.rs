use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::debug;

use swagen_core::config::{self, CONFIG_FILE_NAME, GenerationConfig};
use swagen_core::options::CliOption;
use swagen_core::parse::{self, OpenApiDocument};
use swagen_core::task::{self, GenerationTask, HostProject, Language, RealFileSystem};
use swagen_core::transform::{self, ConversionOptions, ConvertedDocument};
use swagen_kotlin::{VARIANTS, Variant, find_variant, generator_for};

#[derive(Parser)]
#[command(name = "swagen", about = "OpenAPI 3.x Kotlin code generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generation tasks of a project
    Generate {
        /// Config file, relative to the project directory
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Project directory the tasks belong to
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Root project directory, defaults to the project directory
        #[arg(long)]
        root_dir: Option<PathBuf>,

        /// Compile tasks of the host build (repeatable)
        #[arg(long = "compile-task")]
        compile_tasks: Vec<String>,

        /// Run only this task
        #[arg(short, long)]
        task: Option<String>,
    },

    /// List the tasks a project would register
    Tasks {
        /// Config file, relative to the project directory
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Project directory the tasks belong to
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Compile tasks of the host build (repeatable)
        #[arg(long = "compile-task")]
        compile_tasks: Vec<String>,
    },

    /// List generator variants, their libraries and options
    List {
        /// Only show this variant
        variant: Option<String>,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the models and operation groups a variant derives from a spec
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Generator variant whose conversion policy is applied
        #[arg(long, default_value = "kotlin-client-v2")]
        variant: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new swagen configuration
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

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            project_dir,
            root_dir,
            compile_tasks,
            task,
        } => cmd_generate(&config, &project_dir, root_dir, compile_tasks, task),

        Commands::Tasks {
            config,
            project_dir,
            compile_tasks,
        } => cmd_tasks(&config, &project_dir, compile_tasks),

        Commands::List { variant } => cmd_list(variant.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Inspect {
            input,
            variant,
            format,
        } => cmd_inspect(&input, &variant, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "swagen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config. Relative source and output paths are taken
/// relative to the project directory.
fn load_project_config(config_path: &Path, project_dir: &Path) -> Result<GenerationConfig> {
    let path = project_dir.join(config_path);
    let mut cfg = config::load_config(&path)?.with_context(|| {
        format!(
            "{} not found. Run `swagen init` to create one.",
            path.display()
        )
    })?;
    if cfg.source_path.is_relative() {
        cfg.source_path = project_dir.join(&cfg.source_path);
    }
    if cfg.output_path.is_relative() {
        cfg.output_path = project_dir.join(&cfg.output_path);
    }
    Ok(cfg)
}

fn host_project(project_dir: &Path, root_dir: Option<PathBuf>, compile_tasks: Vec<String>) -> HostProject {
    let root_dir = root_dir.unwrap_or_else(|| project_dir.to_path_buf());
    compile_tasks
        .into_iter()
        .fold(HostProject::new(project_dir, root_dir), |project, name| {
            project.with_compile_task(name)
        })
}

fn cmd_generate(
    config_path: &Path,
    project_dir: &Path,
    root_dir: Option<PathBuf>,
    compile_tasks: Vec<String>,
    only: Option<String>,
) -> Result<()> {
    let cfg = load_project_config(config_path, project_dir)?;
    if cfg.configs.is_empty() {
        eprintln!("No runs configured. Add a `configs` section to your config.");
        return Ok(());
    }

    let project = host_project(project_dir, root_dir, compile_tasks);
    let mut tasks = task::register_tasks(&cfg, &project);
    let tasks_len = tasks.len();
    let selected: Vec<&mut GenerationTask> = match &only {
        Some(name) => tasks.iter_mut().filter(|t| t.name() == name.as_str()).collect(),
        // Java tasks write to the same directories as the Kotlin ones.
        None => tasks
            .iter_mut()
            .filter(|t| t.language() == Language::Kotlin)
            .collect(),
    };
    if let (Some(name), true) = (&only, selected.is_empty()) {
        anyhow::bail!("no task named `{name}`. Run `swagen tasks` to list them.");
    }
    debug!("Running {} of {} registered tasks", selected.len(), tasks_len);

    for task in selected {
        let name = task.name().to_string();
        let run = task
            .resolve()
            .with_context(|| format!("failed to resolve task {name}"))?;
        let generator = generator_for(&run.generator_name)?;
        eprintln!(
            "Generating {} with {} → {}",
            run.input_spec.display(),
            run.generator_name,
            run.output_dir.display()
        );

        let written = task
            .execute(&RealFileSystem, &generator)
            .with_context(|| format!("task {name} failed"))?;
        for path in &written {
            eprintln!("  wrote {}", path.display());
        }
        eprintln!("{name}: generated {} files", written.len());
    }
    Ok(())
}

fn cmd_tasks(config_path: &Path, project_dir: &Path, compile_tasks: Vec<String>) -> Result<()> {
    let cfg = load_project_config(config_path, project_dir)?;
    let project = host_project(project_dir, None, compile_tasks);

    for mut task in task::register_tasks(&cfg, &project) {
        println!("{}", task.name());
        if !task.hooked_to().is_empty() {
            println!("  runs before: {}", task.hooked_to().join(", "));
        }
        match (task.inputs(), task.outputs()) {
            (Ok(inputs), Ok(outputs)) => {
                for input in inputs {
                    println!("  input:  {}", input.display());
                }
                for output in outputs {
                    println!("  output: {}", output.display());
                }
            }
            (Err(e), _) | (_, Err(e)) => println!("  error: {e}"),
        }
    }
    Ok(())
}

fn cmd_list(only: Option<&str>) -> Result<()> {
    let variants: Vec<&Variant> = match only {
        Some(name) => vec![find_variant(name)?],
        None => VARIANTS.iter().collect(),
    };

    for variant in variants {
        println!("{} - {}", variant.name, variant.help);
        if !variant.libraries.is_empty() {
            println!("  libraries:");
            for library in variant.libraries {
                let marker = if variant.default_library == Some(library.name) {
                    " (default)"
                } else {
                    ""
                };
                println!("    {}{marker}: {}", library.name, library.description);
            }
        }
        println!("  options:");
        for option in variant.options {
            println!("    {}", describe_option(option));
        }
    }
    Ok(())
}

fn describe_option(option: &CliOption) -> String {
    let mut line = format!("{}: {}", option.key, option.description);
    if let Some(default) = option.default {
        line.push_str(&format!(" [default: {default}]"));
    }
    if !option.values.is_empty() {
        line.push_str(&format!(" (one of: {})", option.allowed_values()));
    }
    line
}

fn read_spec(path: &Path) -> Result<OpenApiDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse::from_path_contents(path, &content)?)
}

fn cmd_validate(input: &Path) -> Result<()> {
    let parsed = read_spec(input)?;

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());
    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    // Also validate that every reference resolves during conversion
    let doc = transform::convert_document(
        &parsed,
        &transform::VariantPolicy::MINIMAL,
        &ConversionOptions::default(),
    )?;
    eprintln!("  Models: {}", doc.models.len());
    eprintln!("  API groups: {}", doc.operation_groups.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, variant: &str, format: InspectFormat) -> Result<()> {
    let variant = find_variant(variant)?;
    let parsed = read_spec(input)?;
    let mut options = ConversionOptions::default();
    options.naming.model_name_suffix = variant.model_name_suffix.to_string();
    options.naming.api_name_suffix = variant.api_name_suffix.to_string();
    let doc = transform::convert_document(
        &parsed,
        &variant.policy_for(variant.default_library),
        &options,
    )?;

    let summary = build_inspect_summary(&doc);
    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn build_inspect_summary(doc: &ConvertedDocument) -> serde_json::Value {
    let models: Vec<serde_json::Value> = doc
        .models
        .iter()
        .map(|m| {
            let kind = if m.is_enum {
                "enum"
            } else if m.is_alias {
                "alias"
            } else if m.has_composed_members() {
                "composed"
            } else {
                "class"
            };
            serde_json::json!({
                "name": m.class_name,
                "kind": kind,
                "vars": m.all_vars.iter().map(|v| &v.name).collect::<Vec<_>>(),
            })
        })
        .collect();

    let groups: Vec<serde_json::Value> = doc
        .operation_groups
        .iter()
        .map(|g| {
            let operations: Vec<serde_json::Value> = g
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "name": op.nickname,
                        "method": op.http_method,
                        "path": op.path,
                        "multipart": op.is_multipart,
                        "returns": op.return_type,
                    })
                })
                .collect();
            serde_json::json!({
                "class": g.class_name,
                "tag": g.tag,
                "operations": operations,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": doc.title,
            "version": doc.version,
        },
        "models": models,
        "apis": groups,
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

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
