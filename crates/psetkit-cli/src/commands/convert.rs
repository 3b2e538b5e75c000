//! The `pset convert` command.

use std::path::PathBuf;

use anyhow::Result;

use psetkit_core::load_config_from;
use psetkit_tex::{convert_file, default_output_path, write_html, ConvertOptions, RenderOptions};

pub fn execute(
    input: PathBuf,
    output: Option<PathBuf>,
    set_number: Option<u32>,
    no_mathjax: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let mut render = RenderOptions::from(&config.build);
    if no_mathjax {
        render.mathjax_url = None;
    }

    let options = ConvertOptions { set_number, render };
    let conversion = convert_file(&input, &options)?;
    let output = output.unwrap_or_else(|| default_output_path(&input));
    write_html(&conversion.html, &output)?;

    println!(
        "Wrote {} ({} problems)",
        output.display(),
        conversion.problem_count()
    );
    Ok(())
}
