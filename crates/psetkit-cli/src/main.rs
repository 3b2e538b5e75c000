//! pset CLI — catalog, convert and publish problem sets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use psetkit_core::Variant;

mod commands;

#[derive(Parser)]
#[command(
    name = "pset",
    version,
    about = "Problem set catalog, LaTeX to HTML converter and Canvas uploader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the catalog as the README listing
    Catalog {
        /// Catalog file (default: from config, else catalog.toml)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Listing flavour: plain (source links only) or rendered
        #[arg(long, default_value = "rendered")]
        variant: Variant,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the catalog against its sources
    Validate {
        /// Catalog file (default: from config, else catalog.toml)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory holding the sources (default: next to the catalog)
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the catalog entries as a table
    List {
        /// Catalog file (default: from config, else catalog.toml)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert one LaTeX problem set to HTML
    Convert {
        /// Path to the .tex source
        input: PathBuf,

        /// Output .html path (default: next to the source)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Problem set number (default: first digits in the file name)
        #[arg(long)]
        set_number: Option<u32>,

        /// Leave the MathJax script tag out
        #[arg(long)]
        no_mathjax: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert every catalog entry to HTML
    Build {
        /// Catalog file (default: from config, else catalog.toml)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory holding the sources
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Output directory
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Max concurrent conversions
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replace a Canvas assignment description with a generated page
    Upload {
        /// Generated .html file
        html: PathBuf,

        /// Canvas assignment URL (default: from the matching catalog entry)
        assignment_url: Option<String>,

        /// Show what would happen without updating
        #[arg(long)]
        dry_run: bool,

        /// Catalog file used to look up the assignment URL
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and a catalog from the .tex files present
    Init {
        /// Directory to initialise
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pset=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Catalog {
            catalog,
            variant,
            output,
            config,
        } => commands::catalog::execute(catalog, variant, output, config),
        Commands::Validate {
            catalog,
            source_dir,
            config,
        } => commands::validate::execute(catalog, source_dir, config),
        Commands::List { catalog, config } => commands::list::execute(catalog, config),
        Commands::Convert {
            input,
            output,
            set_number,
            no_mathjax,
            config,
        } => commands::convert::execute(input, output, set_number, no_mathjax, config),
        Commands::Build {
            catalog,
            source_dir,
            output,
            parallelism,
            config,
        } => commands::build::execute(catalog, source_dir, output, parallelism, config).await,
        Commands::Upload {
            html,
            assignment_url,
            dry_run,
            catalog,
            config,
        } => commands::upload::execute(html, assignment_url, dry_run, catalog, config).await,
        Commands::Init { dir } => commands::init::execute(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
