use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use geotikz::options::{StyleMode, Wrap};
use geotikz::{Options, build_model, read_document};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "geotikz", version, about = "Translate GeoGebra constructions into TikZ")]
struct Args {
    /// Input file (.xml or .ggb) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Options JSON file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output wrapping
    #[arg(long, value_enum)]
    wrap: Option<WrapArg>,

    /// Fit the viewport to the visible points
    #[arg(long)]
    smart_bounds: bool,

    /// Use each element's own colors and line styles
    #[arg(long)]
    native_style: bool,

    /// Print the geometric model as JSON instead of TikZ
    #[arg(long)]
    dump_model: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum WrapArg {
    Standalone,
    Figure,
    Bare,
}

impl From<WrapArg> for Wrap {
    fn from(w: WrapArg) -> Self {
        match w {
            WrapArg::Standalone => Wrap::Standalone,
            WrapArg::Figure => Wrap::Figure,
            WrapArg::Bare => Wrap::Bare,
        }
    }
}

fn main() -> Result<()> {
    // stdout carries the TikZ, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = load_options(&args)?;
    let xml = read_input(args.input.as_deref())?;

    let output = if args.dump_model {
        let document = read_document(&xml)?;
        let model = build_model(&document);
        let mut json = serde_json::to_string_pretty(&model)?;
        json.push('\n');
        json
    } else {
        geotikz::translate(&xml, &options)?
    };
    write_output(&output, args.output.as_deref())
}

fn load_options(args: &Args) -> Result<Options> {
    let mut options = match &args.config {
        Some(path) => Options::load(path)
            .with_context(|| format!("cannot load options from {}", path.display()))?,
        None => Options::default(),
    };
    if let Some(wrap) = args.wrap {
        options.wrap = wrap.into();
    }
    if args.smart_bounds {
        options.viewport.smart = true;
    }
    if args.native_style {
        options.style_mode = StyleMode::Native;
    }
    Ok(options)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    if bytes.starts_with(b"PK\x03\x04") {
        return construction_from_archive(bytes);
    }
    String::from_utf8(bytes).context("input is not UTF-8")
}

/// `geogebra.xml` from a `.ggb` archive
fn construction_from_archive(bytes: Vec<u8>) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("invalid .ggb archive")?;
    let mut entry = match archive.by_name("geogebra.xml") {
        Ok(entry) => entry,
        Err(_) => bail!("archive has no geogebra.xml"),
    };
    let mut xml = String::new();
    entry.read_to_string(&mut xml).context("cannot unpack geogebra.xml")?;
    Ok(xml)
}

fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            Ok(())
        }
    }
}
