//! docxconv - Word documents to kramdown, HTML or LaTeX

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docxconv::{ConversionReport, ConvertOptions, Converter, OutputFormat, RenderConfig};

#[derive(Parser)]
#[command(name = "docxconv")]
#[command(version, about = "Convert Word documents to kramdown, HTML or LaTeX", long_about = None)]
#[command(after_help = "EXAMPLES:
    docxconv book.docx out/                  Write kramdown chapters to out/
    docxconv book.docx out/ --format html    Also render each chapter to HTML
    docxconv book.docx --no-split --json     One file, JSON report on stdout")]
struct Cli {
    /// Input document (.docx)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory
    #[arg(value_name = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Output format: markup, html or latex
    #[arg(short, long, default_value_t = OutputFormat::Markup)]
    format: OutputFormat,

    /// Language tag used in chapter file names
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Write the whole document as a single chapter
    #[arg(long)]
    no_split: bool,

    /// Image directory, relative to the output directory
    #[arg(long, value_name = "DIR", default_value = "images")]
    image_dir: String,

    /// Prefix of image references in the markup (empty for bare names)
    #[arg(long, value_name = "PREFIX", default_value = "images")]
    image_prefix: String,

    /// Print a JSON report instead of file names
    #[arg(long)]
    json: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let render = RenderConfig::default()
        .with_format(cli.format)
        .with_language(cli.language.clone());
    let options = ConvertOptions::new(cli.output_dir.clone())
        .with_image_dirs(cli.image_dir.clone(), cli.image_prefix.clone())
        .with_split_chapters(!cli.no_split)
        .with_render(render);

    let report = Converter::new(options)
        .convert_file(&cli.input)
        .map_err(|e| e.to_string())?;

    if cli.json {
        print_json(&report)
    } else {
        for file in &report.files {
            println!("{file}");
        }
        Ok(())
    }
}

fn print_json(report: &ConversionReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
