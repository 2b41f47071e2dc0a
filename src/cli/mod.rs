//! CLI module for umltex

mod args;

pub use args::{Args, Command};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::latex::{generate_document, GenerateOptions};
use crate::model::parse_model;
use crate::overrides::Overrides;
use crate::render::{export_images, inject_single_class_diagrams};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "umltex.toml";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; stdout may carry the document
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // keep an already installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))),
    }
}

fn read_model_file(file: &Path) -> Result<String> {
    if !file.exists() {
        return Err(Error::PathNotFound(file.to_path_buf()));
    }
    Ok(std::fs::read_to_string(file)?)
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            file,
            output,
            templates,
            out_images,
            no_pics,
            config,
            verbose,
        } => {
            init_logging(verbose);

            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(output, templates, out_images, no_pics);
            cfg.validate()?;

            generate(&file, &cfg)
        }

        Command::Inspect { file, config } => {
            init_logging(false);

            let cfg = load_config(config.as_deref())?;
            let source = read_model_file(&file)?;
            let model = parse_model(&source, &cfg.model)?;
            println!("{}", serde_json::to_string_pretty(&model)?);
            Ok(())
        }

        Command::Version => {
            println!("umltex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Read the model, render its images if enabled and write the document
pub fn generate(file: &Path, cfg: &Config) -> Result<()> {
    let source = read_model_file(file)?;
    let model = parse_model(&source, &cfg.model)?;
    info!(
        file = %file.display(),
        elements = model.elements.len(),
        packages = model.packages.len(),
        "parsed model"
    );

    let overrides = Overrides::load(&cfg.output.override_dir)?;

    if cfg.render.enabled {
        let augmented =
            inject_single_class_diagrams(&source, &model, &overrides.custom_width, &cfg.model)?;
        export_images(&augmented, &cfg.output.image_dir, &cfg.render)?;
    }

    let options = GenerateOptions {
        image_dir: cfg.output.image_dir.clone(),
        std_package: cfg.model.std_package.clone(),
    };
    let document = generate_document(&model, &overrides, &options)?;

    match &cfg.output.file {
        Some(path) => write_output(path, &document),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn write_output(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document)?;
    info!(output = %path.display(), "document written");
    Ok(())
}
