//! flatxml: Flatten a batch of XML documents into one table
//!
//! Usage:
//!   # Every .xml file of a directory, CSV on stdout
//!   flatxml invoices/
//!
//!   # Signed invoices too, with short column labels, as JSON Lines
//!   flatxml --p7m --invoice-labels --format jsonl invoices/ -o invoices.jsonl
//!
//!   # Only the body of each document, dropping the outermost header level
//!   flatxml --starting-with FatturaElettronicaBody --offset 1 invoices/

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use flatxml::envelope::{strip_envelope_suffix, ENVELOPE_SUFFIX};
use flatxml::flatten::config::{DEFAULT_CONCAT_SYMBOL, DEFAULT_FILLER, DEFAULT_SEPARATOR};
use flatxml::{
    read_path, simplify_header, unwrap_all, DelimitedWriter, DocumentSources, EnvelopeError,
    FlattenConfig, JsonLinesWriter, LookupTable, P7mUnwrapper, Table, XmlConverter,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const XML_EXTENSION: &str = ".xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Delimited text, one header line per level
    Csv,
    /// One JSON object per document
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(name = "flatxml")]
#[command(about = "Flatten a batch of XML documents into one table", long_about = None)]
struct Args {
    /// An XML file, or a directory whose XML files are converted
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// Separator between path segments (must not occur in any document)
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    separator: String,

    /// Joins the values of sibling leaves sharing a branch
    #[arg(long, default_value = DEFAULT_CONCAT_SYMBOL)]
    concat: String,

    /// Pad segment used to give every path the same depth
    #[arg(long, default_value = DEFAULT_FILLER, conflicts_with = "no_inflate")]
    filler: String,

    /// Keep path depths as they are
    #[arg(long)]
    no_inflate: bool,

    /// Keep only paths under this top-level tag
    #[arg(long, value_name = "TAG")]
    starting_with: Option<String>,

    /// Number of leading header levels to drop
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Also convert signed .p7m envelopes
    #[arg(long)]
    p7m: bool,

    /// Relabel columns through a lookup table file (`path: label` lines)
    #[arg(long, value_name = "FILE", conflicts_with = "invoice_labels")]
    lookup: Option<PathBuf>,

    /// Relabel columns with the built-in electronic invoice labels
    #[arg(long)]
    invoice_labels: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Field delimiter for CSV output (a single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flatxml=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args);
    let sources = load_sources(&args)?;

    let converter = XmlConverter::new(sources, config)?;
    let mut table = converter.convert()?;

    if let Some(lookup) = load_lookup(&args)? {
        let filler = converter
            .config()
            .filler
            .as_deref()
            .unwrap_or(DEFAULT_FILLER);
        let simplified = simplify_header(&table, filler, &lookup);
        for (path, label) in &simplified.unmapped {
            tracing::warn!(%path, %label, "No label for column, add it to the lookup table");
        }
        table = simplified.table;
    }

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    write_table(&table, BufWriter::new(output), &args)?;

    tracing::info!(
        documents = table.len(),
        columns = table.width(),
        "Wrote table"
    );
    Ok(())
}

fn build_config(args: &Args) -> FlattenConfig {
    let mut config = FlattenConfig::default()
        .with_separator(args.separator.as_str())
        .with_concat_symbol(args.concat.as_str())
        .with_filler(args.filler.as_str())
        .with_offset(args.offset);
    if args.no_inflate {
        config = config.without_inflation();
    }
    if let Some(tag) = &args.starting_with {
        config = config.with_starting_with(tag.as_str());
    }
    config
}

/// Plain documents, plus unwrapped envelopes when `--p7m` is given
fn load_sources(args: &Args) -> Result<DocumentSources> {
    let extensions: &[&str] = if args.p7m {
        &[XML_EXTENSION, ENVELOPE_SUFFIX]
    } else {
        &[XML_EXTENSION]
    };
    let read = read_path(&args.input, extensions)?;

    let (envelopes, mut sources): (DocumentSources, DocumentSources) = read
        .into_iter()
        .partition(|(name, _)| strip_envelope_suffix(name).len() != name.len());

    if !envelopes.is_empty() {
        let mut failed = 0usize;
        let mut report = |err: &EnvelopeError, name: &str| {
            failed += 1;
            tracing::warn!(envelope = %name, error = %err, "Skipping envelope");
        };
        let unwrapped = unwrap_all(&envelopes, &P7mUnwrapper::new(), Some(&mut report))?;
        if failed > 0 {
            tracing::warn!(failed, "Some envelopes could not be unwrapped");
        }

        for (name, bytes) in unwrapped {
            if sources.contains_key(&name) {
                bail!("Document '{name}' is present both plain and enveloped");
            }
            sources.insert(name, bytes);
        }
    }

    if sources.is_empty() {
        bail!("No documents found at {}", args.input.display());
    }
    Ok(sources)
}

fn load_lookup(args: &Args) -> Result<Option<LookupTable>> {
    if let Some(path) = &args.lookup {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lookup table: {}", path.display()))?;
        let lookup = LookupTable::parse(&text)
            .with_context(|| format!("Invalid lookup table: {}", path.display()))?;
        return Ok(Some(lookup));
    }
    if args.invoice_labels {
        return Ok(Some(LookupTable::fatturapa().clone()));
    }
    Ok(None)
}

fn write_table<W: Write>(table: &Table, writer: W, args: &Args) -> Result<()> {
    match args.format {
        OutputFormat::Csv => {
            if !args.delimiter.is_ascii() {
                bail!("CSV delimiter must be an ASCII character, got '{}'", args.delimiter);
            }
            let mut writer = DelimitedWriter::new(writer).with_delimiter(args.delimiter as u8);
            writer.write_table(table)?;
            writer.flush()
        }
        OutputFormat::Jsonl => {
            let mut writer = JsonLinesWriter::new(writer);
            writer.write_table(table)?;
            writer.flush()
        }
    }
}
