//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate LaTeX documentation from Umbrello UML models
#[derive(Parser, Debug)]
#[command(name = "umltex")]
#[command(about = "Generate LaTeX documentation from Umbrello UML models")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the LaTeX document for a model
    Generate {
        /// The Umbrello model file to read
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory with override files (default: template_override)
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Directory for the rendered images (default: outImages)
        #[arg(short = 'i', long = "out-images")]
        out_images: Option<PathBuf>,

        /// Do not render diagram images
        #[arg(short = 'n', long)]
        no_pics: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the parsed element graph as JSON
    Inspect {
        /// The Umbrello model file to read
        file: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
