use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;
use md_report::ReportBuilder;

/// Converts a Markdown document into a paginated PDF report.
///
/// Fonts must be present under `assets/fonts` next to the binary or the
/// `md_report` crate, be passed with `--fonts-dir`, or be provided via the
/// `MD_REPORT_FONTS_DIR` environment variable.
#[derive(Parser)]
#[command(author, version, about = "Render Markdown reports to PDF")]
struct Cli {
    /// Markdown file to convert.
    input: PathBuf,

    /// Destination of the generated PDF.
    output: PathBuf,

    /// Image placed in the top-right corner of every page.
    #[arg(long, value_name = "PATH")]
    logo: Option<PathBuf>,

    /// Directory holding the font family files.
    #[arg(long, value_name = "DIR")]
    fonts_dir: Option<PathBuf>,

    /// Font family name, e.g. `MapleMono` for `MapleMono-Regular.ttf`.
    #[arg(long, value_name = "NAME")]
    font_family: Option<String>,

    /// Omit the page footer.
    #[arg(long, conflicts_with = "footer")]
    no_footer: bool,

    /// Fixed footer text instead of the generated one.
    #[arg(long, value_name = "TEXT")]
    footer: Option<String>,

    /// Deepest heading level added to the PDF outline; 0 disables it.
    #[arg(long, value_name = "N", default_value_t = 2)]
    outline_depth: u8,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let markdown = fs::read_to_string(&cli.input)
        .map_err(|err| format!("Failed to read {}: {}", cli.input.display(), err))?;

    let mut builder = ReportBuilder::new().with_outline_depth(cli.outline_depth);
    if let Some(logo) = &cli.logo {
        builder = builder.with_logo(logo);
    }
    if let Some(dir) = &cli.fonts_dir {
        builder = builder.with_fonts_dir(dir);
    }
    if let Some(family) = &cli.font_family {
        builder = builder.with_font_family(family);
    }
    if cli.no_footer {
        builder = builder.without_footer();
    } else if let Some(text) = &cli.footer {
        builder = builder.with_footer(text);
    }

    builder.render_to_file(&markdown, &cli.output)?;
    println!("PDF generated: {}", display_name(&cli.output));
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
