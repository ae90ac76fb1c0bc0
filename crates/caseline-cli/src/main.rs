use caseline_core::{CaseReport, TimelineLayoutOptions, layout_timeline};
use caseline_extract::{ExtractionClient, OcrClient};
use caseline_render::{DeckOptions, render_deck};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(caseline_core::Error),
    Render(caseline_render::Error),
    Extract(caseline_extract::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Extract(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<caseline_core::Error> for CliError {
    fn from(value: caseline_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<caseline_render::Error> for CliError {
    fn from(value: caseline_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<caseline_extract::Error> for CliError {
    fn from(value: caseline_extract::Error) -> Self {
        Self::Extract(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Layout,
    Extract,
    Ocr,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    out: Option<String>,
    max_events: Option<usize>,
    span: Option<f64>,
}

fn usage() -> &'static str {
    "caseline-cli\n\
\n\
USAGE:\n\
  caseline-cli [render] [--out <dir>] [--max-events <n>] [--span <inches>] [<case.json>|-]\n\
  caseline-cli layout [--pretty] [--max-events <n>] [--span <inches>] [<case.json>|-]\n\
  caseline-cli extract [--pretty] [<narrative.txt>|-]\n\
  caseline-cli ocr <image>\n\
\n\
NOTES:\n\
  - If the input path is omitted or '-', input is read from stdin.\n\
  - render writes one SVG per slide into --out (default ./deck) and prints the paths.\n\
  - layout prints the timeline layout JSON for the case's events.\n\
  - extract calls the LLM extraction service (needs DEEPSEEK_API_KEY).\n\
  - ocr calls the OCR service on one image (needs BAIDU_API_KEY/BAIDU_SECRET_KEY).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "extract" => args.command = Command::Extract,
            "ocr" => args.command = Command::Ocr,
            "--pretty" => args.pretty = true,
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--max-events" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let n = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
                args.max_events = Some(n);
            }
            "--span" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let w = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                args.span = Some(w);
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn timeline_options(args: &Args) -> TimelineLayoutOptions {
    let mut options = TimelineLayoutOptions::default();
    if let Some(n) = args.max_events {
        options.max_events = n;
    }
    options
}

fn load_case(args: &Args) -> Result<CaseReport, CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut report: CaseReport = serde_json::from_str(&text)?;
    report.normalize_phases();
    Ok(report)
}

fn run_layout(args: &Args) -> Result<(), CliError> {
    let report = load_case(args)?;
    let options = timeline_options(args);
    let span = args.span.unwrap_or(12.1);
    let layout = layout_timeline(&report.timeline_events, span, &options)?;
    write_json(&layout, args.pretty)
}

fn run_render(args: &Args) -> Result<(), CliError> {
    let report = load_case(args)?;
    let mut deck_options = DeckOptions::default();
    deck_options.timeline = timeline_options(args);
    if let Some(span) = args.span {
        deck_options.timeline_span = span;
    }
    let slides = render_deck(&report, &deck_options)?;

    let out_dir = PathBuf::from(args.out.as_deref().unwrap_or("deck"));
    std::fs::create_dir_all(&out_dir)?;
    for (i, slide) in slides.iter().enumerate() {
        let path = out_dir.join(format!("slide_{:02}.svg", i + 1));
        std::fs::write(&path, &slide.svg)?;
        println!("{}", path.display());
    }
    Ok(())
}

fn run_extract(args: &Args) -> Result<(), CliError> {
    let narrative = read_input(args.input.as_deref())?;
    let client = ExtractionClient::from_env()?;
    let report = client.extract(&narrative)?;
    write_json(&report, args.pretty)
}

fn run_ocr(args: &Args) -> Result<(), CliError> {
    let Some(path) = args.input.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let bytes = std::fs::read(path)?;
    let client = OcrClient::from_env()?;
    let text = client.recognize(&bytes)?;
    println!("{text}");
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Render => run_render(&args),
        Command::Layout => run_layout(&args),
        Command::Extract => run_extract(&args),
        Command::Ocr => run_ocr(&args),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
