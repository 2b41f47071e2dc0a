// Image export through the external renderer and converter

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::latex::space_ul;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Render every diagram of `xmi` into `image_dir` as PDF
///
/// Returns the number of PDF files produced. Tools that run but fail are
/// reported and skipped; a tool that cannot be started is an error.
pub fn export_images(xmi: &str, image_dir: &Path, config: &RenderConfig) -> Result<usize> {
    std::fs::create_dir_all(image_dir)?;

    let mut model_file = tempfile::Builder::new()
        .prefix("uml")
        .suffix(".xmi")
        .tempfile()?;
    model_file.write_all(xmi.as_bytes())?;
    model_file.flush()?;

    info!(renderer = %config.renderer, dir = %image_dir.display(), "rendering diagrams");
    let status = Command::new(&config.renderer)
        .arg("--directory")
        .arg(image_dir)
        .arg("--export")
        .arg("svg")
        .arg(model_file.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| Error::external_tool(&config.renderer, e.to_string()))?;
    if !status.success() {
        warn!(renderer = %config.renderer, %status, "renderer reported failure");
    }

    let svgs = rendered_svgs(image_dir)?;
    let progress = ProgressBar::new(svgs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| Error::other(e.to_string()))?
            .progress_chars("#>-"),
    );

    let mut converted = 0;
    for svg in &svgs {
        let pdf = pdf_path(svg);
        progress.set_message(svg.file_name().unwrap_or_default().to_string_lossy().to_string());

        let status = Command::new(&config.converter)
            .arg(svg)
            .arg("-f")
            .arg("pdf")
            .arg("-o")
            .arg(&pdf)
            .status()
            .map_err(|e| Error::external_tool(&config.converter, e.to_string()))?;
        if status.success() {
            debug!(pdf = %pdf.display(), "converted");
            converted += 1;
        } else {
            warn!(svg = %svg.display(), %status, "conversion failed");
        }

        std::fs::remove_file(svg)?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(converted, "diagram export complete");
    Ok(converted)
}

fn rendered_svgs(image_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.svg",
        glob::Pattern::escape(&image_dir.display().to_string())
    );
    let mut svgs = Vec::new();
    for entry in glob::glob(&pattern)? {
        svgs.push(entry.map_err(|e| Error::Io(e.into_error()))?);
    }
    Ok(svgs)
}

/// `<dir>/Class Overview.svg` becomes `<dir>/Class_Overview.pdf`
fn pdf_path(svg: &Path) -> PathBuf {
    let stem = svg
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    svg.with_file_name(format!("{}.pdf", space_ul(&stem)))
}
