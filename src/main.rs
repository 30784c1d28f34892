use anyhow::Context;
use clap::{Parser, ValueHint};
use std::{io, path::PathBuf};
use tabrows::pipeline;
use tabrows::sources::csv::CsvSource;
use tabrows::sources::{detect_source, SourceFormat};
use tabrows::writer::RowWriter;
use tabrows::ReadOptions;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a CSV, XLS or XLSX file, or `-` to read CSV from standard input.
    #[arg(value_hint = ValueHint::FilePath)]
    path: PathBuf,

    /// Input format. Detected from the file extension when omitted.
    #[arg(short, long, value_enum)]
    format: Option<SourceFormat>,

    /// CSV field delimiter. Guessed from the start of the input when omitted.
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Charset used to decode XLS text, e.g. `windows-1250`.
    #[arg(short, long)]
    charset: Option<String>,

    /// Zero-based index of the sheet to read.
    #[arg(short, long, default_value_t = 0)]
    sheet: usize,

    /// Accept CSV records with differing field counts.
    #[arg(long)]
    flexible: bool,

    /// Number of rows buffered between reader and writer.
    #[arg(long, default_value_t = 1024)]
    buffer: usize,
}

impl Cli {
    fn read_options(&self) -> ReadOptions {
        ReadOptions {
            format: self.format,
            delimiter: self.delimiter.clone(),
            charset: self.charset.clone(),
            sheet: self.sheet,
            flexible: self.flexible,
            ..ReadOptions::default()
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.read_options();

    let mut rows = if cli.path.as_os_str() == "-" {
        let stdin: Box<dyn io::Read + Send> = Box::new(io::stdin());
        pipeline::spawn(CsvSource::with_options(stdin, &options), cli.buffer)
    } else {
        let source = detect_source(&cli.path, &options).context("unable to open input file")?;
        pipeline::spawn(source, cli.buffer)
    };

    let written = RowWriter::new(io::stdout().lock())
        .write_all(rows.by_ref())
        .context("writing rows failed")?;
    let read = rows.finish().context("reading input file failed")?;
    tracing::debug!(read, written, "done");
    Ok(())
}
