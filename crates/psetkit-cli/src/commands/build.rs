//! The `pset build` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use psetkit_tex::{convert_file, write_html, ConvertOptions, RenderOptions};

use super::Workspace;

/// Outcome of converting one catalog entry.
struct Built {
    ordinal: u32,
    source: String,
    result: Result<(PathBuf, usize)>,
}

pub async fn execute(
    catalog: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    parallelism: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    let workspace = Workspace::load(catalog, config)?;
    let source_dir = workspace.source_dir(source_dir);
    let output_dir = workspace.output_dir(output);
    let parallelism = parallelism.unwrap_or(workspace.config.build.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let render = RenderOptions::from(&workspace.config.build);
    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut futures = FuturesUnordered::new();

    eprintln!(
        "Building {} problem set(s) from {} into {}",
        workspace.catalog.entries.len(),
        source_dir.display(),
        output_dir.display()
    );

    for entry in &workspace.catalog.entries {
        let ordinal = entry.ordinal;
        let source = entry.source.clone();
        let input = source_dir.join(&entry.source);
        let stem = entry.stem().map(str::to_string);
        let output_dir = output_dir.clone();
        let semaphore = Arc::clone(&semaphore);
        let options = ConvertOptions {
            set_number: None,
            render: render.clone(),
        };

        futures.push(async move {
            let result = async move {
                let stem = stem.context("source has no file stem")?;
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                let output = output_dir.join(format!("{stem}.html"));
                let built = tokio::task::spawn_blocking(move || -> Result<(PathBuf, usize)> {
                    let conversion = convert_file(&input, &options)?;
                    write_html(&conversion.html, &output)?;
                    Ok((output, conversion.problem_count()))
                })
                .await
                .context("conversion task panicked")??;
                Ok::<_, anyhow::Error>(built)
            }
            .await;
            Built {
                ordinal,
                source,
                result,
            }
        });
    }

    let total = futures.len();
    let mut built = Vec::with_capacity(total);
    let mut failed = 0usize;
    while let Some(item) = futures.next().await {
        match &item.result {
            Ok((path, _)) => tracing::debug!("built {}", path.display()),
            Err(e) => {
                tracing::error!("failed to build {}: {e:#}", item.source);
                failed += 1;
            }
        }
        built.push(item);
    }
    built.sort_by_key(|b| b.ordinal);

    print_summary(&built);
    eprintln!(
        "{} built, {failed} failed in {:.1}s",
        total - failed,
        start.elapsed().as_secs_f64()
    );

    anyhow::ensure!(failed == 0, "{failed} of {total} conversion(s) failed");
    Ok(())
}

fn print_summary(built: &[Built]) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Source", "Output", "Problems"]);

    for b in built {
        let (output, problems) = match &b.result {
            Ok((path, count)) => (path.display().to_string(), count.to_string()),
            Err(e) => (format!("FAILED: {e:#}"), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(b.ordinal),
            Cell::new(&b.source),
            Cell::new(output),
            Cell::new(problems),
        ]);
    }

    eprintln!("\n{table}");
}
