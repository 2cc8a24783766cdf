use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use braille::cell::{Cell, CellSequence};
use braille::codec;
use braille::raster::Diagnostic;
use braille::segment::{classify_text, segment};
use braille::stats::TranslationStats;
use braille::translate::louis::LouService;
use braille::translate::{ServiceError, TableId, TranslationFailure, TranslationService};
use braille::{Input, MemoryService, OutputFormat, Translator, TranslatorConfig};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod contractions;
mod png_io;

/// Braille encoding, decoding, rendering and recognition
#[derive(Parser)]
#[command(name = "braille", version)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalOpts {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Translation service backing the tables
    #[arg(long, global = true, value_enum, default_value_t = ServiceKind::Builtin)]
    service: ServiceKind,
    /// Path to the lou_translate executable
    #[arg(long, global = true, default_value = "lou_translate")]
    lou_exec: PathBuf,
    /// Directory holding liblouis tables
    #[arg(long, global = true)]
    table_dir: Option<PathBuf>,
    /// Cell size in pixels
    #[arg(long, global = true)]
    cell: Option<u32>,
    /// Margin around and between cells in pixels
    #[arg(long, global = true)]
    margin: Option<u32>,
    /// Dot radius in pixels
    #[arg(long, global = true)]
    radius: Option<u32>,
    /// Gray level below which a pixel counts as ink
    #[arg(long, global = true)]
    threshold: Option<u8>,
    /// Cells per image row
    #[arg(long, global = true)]
    wrap: Option<usize>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServiceKind {
    /// Built-in English tables
    Builtin,
    /// liblouis through lou_translate
    Louis,
}

#[derive(Subcommand)]
enum Command {
    /// Translate text to braille
    Encode {
        /// Text to translate (reads stdin when omitted)
        text: Option<String>,
        /// Output format: unicode, dots, binary or json
        #[arg(short, long, default_value = "unicode")]
        format: String,
        /// Print the full report as JSON instead of the cells
        #[arg(long)]
        report: bool,
        /// Fail when any piece could not be translated
        #[arg(long)]
        strict: bool,
    },
    /// Translate braille back to text
    Decode {
        /// Braille as unicode, dots or binary (reads stdin when omitted)
        input: Option<String>,
        /// Read the input from a file; .png/.jpg/.jpeg files are images
        #[arg(long, conflicts_with = "input")]
        file: Option<PathBuf>,
        /// Input representation: auto, unicode, dots, binary, json or image
        #[arg(long, default_value = "auto")]
        from: String,
    },
    /// Render text or braille to braille.png with metadata.json
    Render {
        /// Text to encode, or braille with --from (reads stdin when omitted)
        text: Option<String>,
        /// Input representation: text, auto, unicode, dots, binary or json
        #[arg(long, default_value = "text")]
        from: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Read the cells of a braille image
    Recognize {
        /// PNG or JPEG image
        image: PathBuf,
        /// Output format: unicode, dots, binary or json
        #[arg(short, long, default_value = "unicode")]
        format: String,
    },
    /// Recover text from a braille image
    Restore {
        /// PNG or JPEG image
        image: PathBuf,
    },
    /// Show the script runs of a text as JSON
    Segments {
        /// Text to segment (reads stdin when omitted)
        text: Option<String>,
    },
    /// Encode every line of a file and print translation statistics
    Stats {
        /// UTF-8 text file, one request per line
        file: PathBuf,
    },
}

/// The service selected on the command line.
enum CliService {
    Builtin(MemoryService),
    Louis(LouService),
}

impl TranslationService for CliService {
    fn translate(&self, table: &TableId, text: &str) -> Result<CellSequence, ServiceError> {
        match self {
            CliService::Builtin(s) => s.translate(table, text),
            CliService::Louis(s) => s.translate(table, text),
        }
    }

    fn back_translate(&self, table: &TableId, cells: &[Cell]) -> Result<String, ServiceError> {
        match self {
            CliService::Builtin(s) => s.back_translate(table, cells),
            CliService::Louis(s) => s.back_translate(table, cells),
        }
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    input_text: &'a str,
    unicode: String,
    dots: String,
    binary_chunks: Vec<String>,
    image_file: &'a str,
}

#[derive(Serialize)]
struct RunOut<'a> {
    tag: &'static str,
    start: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct SegmentsOut<'a> {
    script: braille::segment::TextScript,
    runs: Vec<RunOut<'a>>,
}

#[derive(Serialize)]
struct StatsOut<'a> {
    #[serde(flatten)]
    stats: &'a TranslationStats,
    contraction_rate_percent: f64,
}

const IMAGE_FILE: &str = "braille.png";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.opts.verbose);

    match cli.command {
        Command::Encode {
            text,
            format,
            report,
            strict,
        } => cmd_encode(&cli.opts, text, &format, report, strict),
        Command::Decode { input, file, from } => cmd_decode(&cli.opts, input, file, &from),
        Command::Render { text, from, output } => cmd_render(&cli.opts, text, &from, &output),
        Command::Recognize { image, format } => cmd_recognize(&cli.opts, &image, &format),
        Command::Restore { image } => cmd_restore(&cli.opts, &image),
        Command::Segments { text } => cmd_segments(text),
        Command::Stats { file } => cmd_stats(&cli.opts, &file),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration from `--config` (or defaults) with command-line overrides.
fn load_config(opts: &GlobalOpts) -> Result<TranslatorConfig> {
    let mut config = match &opts.config {
        Some(path) => TranslatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TranslatorConfig::default(),
    };
    if let Some(cell) = opts.cell {
        config.geometry.cell = cell;
    }
    if let Some(margin) = opts.margin {
        config.geometry.margin = margin;
    }
    if let Some(radius) = opts.radius {
        config.geometry.radius = radius;
    }
    if let Some(threshold) = opts.threshold {
        config.geometry.threshold = threshold;
    }
    if let Some(wrap) = opts.wrap {
        config.wrap = wrap;
    }
    if opts.service == ServiceKind::Louis {
        if let Some(dir) = &opts.table_dir {
            config.contractions.extend(contractions::discover(dir, &config));
        }
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_translator(opts: &GlobalOpts, config: TranslatorConfig) -> Result<Translator<CliService>> {
    let service = match opts.service {
        ServiceKind::Builtin => CliService::Builtin(MemoryService::english()),
        ServiceKind::Louis => {
            let mut lou = LouService::new(&opts.lou_exec).with_timeout(config.timeout);
            if let Some(dir) = &opts.table_dir {
                lou = lou.with_table_dir(dir);
            }
            CliService::Louis(lou)
        }
    };
    Translator::new(service, config).context("building translator")
}

fn translator(opts: &GlobalOpts) -> Result<Translator<CliService>> {
    build_translator(opts, load_config(opts)?)
}

/// The argument, or all of stdin without its final newline.
fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

fn report_failures(failures: &[TranslationFailure]) {
    for f in failures {
        warn!("{f}");
    }
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        warn!("{d}");
    }
}

fn cmd_encode(
    opts: &GlobalOpts,
    text: Option<String>,
    format: &str,
    report: bool,
    strict: bool,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let text = text_or_stdin(text)?;
    let t = translator(opts)?;
    let encoded = t.encode(&text);
    report_failures(&encoded.failures);
    if strict && !encoded.is_complete() {
        bail!("{} piece(s) could not be translated", encoded.failures.len());
    }

    if report {
        println!("{}", serde_json::to_string_pretty(&encoded)?);
    } else {
        println!("{}", format.render(&encoded.cells)?);
    }
    Ok(())
}

/// Resolve the decode input to a representation.
fn decode_source(input: Option<String>, file: Option<PathBuf>, from: &str) -> Result<Input> {
    let from = from.to_ascii_lowercase();
    if let Some(path) = &file {
        if from == "image" || (from == "auto" && png_io::is_image_path(&path.to_string_lossy())) {
            return Ok(Input::Image(png_io::load_image(path)?));
        }
    } else if from == "image" {
        bail!("--from image needs --file");
    }

    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => text_or_stdin(input)?,
    };
    parse_string_input(raw.trim_end_matches(['\n', '\r']).to_string(), &from)
}

/// Tag a string with its representation. `auto` guesses; `text` is
/// plain text to encode.
fn parse_string_input(raw: String, from: &str) -> Result<Input> {
    let input = match from.to_ascii_lowercase().as_str() {
        "auto" => Input::detect(&raw),
        "text" => Input::Text(raw),
        "unicode" => Input::Unicode(raw),
        "dots" | "points" => Input::Points(raw),
        "binary" | "bits" => Input::Bits(raw),
        "json" => {
            let arrays: Vec<Vec<u8>> =
                serde_json::from_str(&raw).context("parsing JSON bit arrays")?;
            Input::Unicode(codec::cells_to_unicode(&codec::bit_arrays_to_cells(&arrays)?))
        }
        other => bail!("unsupported input format '{other}'"),
    };
    Ok(input)
}

fn cmd_decode(opts: &GlobalOpts, input: Option<String>, file: Option<PathBuf>, from: &str) -> Result<()> {
    let input = decode_source(input, file, from)?;
    debug!(kind = ?input.kind(), "decoding");
    let t = translator(opts)?;
    let report = t.decode_input(&input)?;
    report_diagnostics(&report.diagnostics);
    report_failures(&report.failures);
    println!("{}", report.text);
    Ok(())
}

/// Cells to render: text is encoded, braille representations are parsed.
fn render_cells(t: &Translator<CliService>, text: &str, from: &str) -> Result<CellSequence> {
    match parse_string_input(text.to_string(), from)? {
        Input::Text(s) => {
            let encoded = t.encode(&s);
            report_failures(&encoded.failures);
            Ok(encoded.cells)
        }
        input => match input.parse_cells() {
            Some(parsed) => Ok(parsed?),
            None => bail!("cannot render {:?} input", input.kind()),
        },
    }
}

fn cmd_render(opts: &GlobalOpts, text: Option<String>, from: &str, output: &Path) -> Result<()> {
    let text = text_or_stdin(text)?;
    let t = translator(opts)?;

    let cells = render_cells(&t, &text, from)?;
    if cells.is_empty() {
        bail!("nothing to render");
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let image_path = output.join(IMAGE_FILE);
    png_io::write_png(&t.render(&cells), &image_path)?;

    let metadata = Metadata {
        input_text: &text,
        unicode: codec::cells_to_unicode(&cells),
        dots: codec::cells_to_points(&cells),
        binary_chunks: codec::cells_to_bit_groups(&cells),
        image_file: IMAGE_FILE,
    };
    let metadata_path = output.join("metadata.json");
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)
        .with_context(|| format!("writing {}", metadata_path.display()))?;

    println!("wrote {}", image_path.display());
    println!("wrote {}", metadata_path.display());
    Ok(())
}

fn cmd_recognize(opts: &GlobalOpts, image: &Path, format: &str) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let config = load_config(opts)?;
    let img = png_io::load_image(image)?;
    let recognition = braille::raster::recognize(&img, &config.geometry)
        .with_context(|| format!("recognizing {}", image.display()))?;
    report_diagnostics(&recognition.diagnostics);
    println!("{}", format.render(&recognition.cells)?);
    Ok(())
}

fn cmd_restore(opts: &GlobalOpts, image: &Path) -> Result<()> {
    let img = png_io::load_image(image)?;
    let t = translator(opts)?;
    let report = t
        .decode_input(&Input::Image(img))
        .with_context(|| format!("restoring {}", image.display()))?;
    report_diagnostics(&report.diagnostics);
    report_failures(&report.failures);
    println!("{}", report.text);
    Ok(())
}

fn cmd_segments(text: Option<String>) -> Result<()> {
    let text = text_or_stdin(text)?;
    let out = SegmentsOut {
        script: classify_text(&text),
        runs: segment(&text)
            .into_iter()
            .map(|r| RunOut {
                tag: r.tag.name(),
                start: r.start,
                text: r.text,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_stats(opts: &GlobalOpts, file: &Path) -> Result<()> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mut config = load_config(opts)?;
    config.analyze = true;
    let t = build_translator(opts, config)?;

    let mut stats = TranslationStats::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let report = t.encode_counted(line, &mut stats);
        report_failures(&report.failures);
    }
    let out = StatsOut {
        stats: &stats,
        contraction_rate_percent: stats.contraction_rate_percent(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use braille::InputKind;

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["braille", "encode", "hi", "--wrap", "10", "-vv"]).unwrap();
        assert_eq!(cli.opts.wrap, Some(10));
        assert_eq!(cli.opts.verbose, 2);
        assert!(matches!(cli.command, Command::Encode { .. }));
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::try_parse_from(["braille", "--cell", "30", "--radius", "4", "segments", "x"])
            .unwrap();
        let config = load_config(&cli.opts).unwrap();
        assert_eq!(config.geometry.cell, 30);
        assert_eq!(config.geometry.radius, 4);
        assert_eq!(config.geometry.margin, 20);
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let cli = Cli::try_parse_from(["braille", "--radius", "30", "segments", "x"]).unwrap();
        assert!(load_config(&cli.opts).is_err());
    }

    #[test]
    fn decode_source_reads_json_bit_arrays() {
        let input = decode_source(
            Some("[[0,0,0,0,0,1],[0,0,0,0,1,1]]".into()),
            None,
            "json",
        )
        .unwrap();
        assert_eq!(input, Input::Unicode("⠁⠃".into()));
    }

    #[test]
    fn decode_source_loads_images_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.png");
        let config = TranslatorConfig::default();
        let cells = vec![Cell::from_bits_truncate(7)];
        let img = braille::raster::rasterize(&cells, config.wrap, &config.geometry);
        png_io::write_png(&img, &path).unwrap();

        let input = decode_source(None, Some(path), "auto").unwrap();
        assert_eq!(input.kind(), InputKind::Image);
    }

    #[test]
    fn render_encodes_digit_like_text_by_default() {
        let cli = Cli::try_parse_from(["braille", "render", "1 2 3"]).unwrap();
        let t = translator(&cli.opts).unwrap();
        let scheme = &t.config().markers;

        let cells = render_cells(&t, "1 2 3", "text").unwrap();
        assert_eq!(cells[0], scheme.number_sign);
        assert_eq!(cells.iter().filter(|&&c| c == scheme.number_sign).count(), 3);

        let raw = render_cells(&t, "1 2 3", "dots").unwrap();
        assert_eq!(raw, codec::points_to_cells("1 2 3").unwrap());
    }

    #[test]
    fn unknown_input_format_is_an_error() {
        assert!(decode_source(Some("⠁".into()), None, "braille-ascii").is_err());
    }
}
