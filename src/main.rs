use clap::{Parser, Subcommand};
use cv_forge::config::{self, BuildConfig, ConfigError};
use cv_forge::metadata;
use cv_forge::output;
use cv_forge::pdf::ChromeEngine;
use cv_forge::pipeline::{BuildError, BuildRequest, Builder, Target};
use cv_forge::templates::Templates;
use cv_forge::types::Language;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

fn version_string() -> &'static str {
    if env!("CV_FORGE_ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("CV_FORGE_GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once; clap needs a 'static str
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "cv-forge")]
#[command(about = "Build CV, cover letter and portfolio artifacts from one JSON profile")]
#[command(long_about = "\
Build CV, cover letter and portfolio artifacts from one JSON profile

Project structure:

  project/
  ├── cv-forge.toml             # Optional config (see `cv-forge gen-config`)
  ├── .env                      # Optional GEMINI_API_KEY fallback
  ├── data/
  │   ├── cv.json               # Base record + \"profiles\" (must include \"default\")
  │   └── cover_letter.json     # Needed by `letter`
  ├── static/                   # Mirrored into docs/static by `portfolio`
  └── docs/                     # Publish tree (portfolio, CV PDFs, sitemap)

Outputs:
  cv          CV_español.{html,pdf}, CV_english.{html,pdf} (+ copies in docs/)
  letter      Carta_presentación.{html,pdf}, Cover_letter.{html,pdf}
  portfolio   docs/index.html, docs/en/index.html

Non-default profiles add a label: --profile ai-engineer → CV_english_AI-Engineer.pdf

PDFs are printed with headless Chrome/Chromium (set CHROME to a binary path
if it is not found automatically). Use --html-only to skip them.")]
#[command(version = version_string())]
struct Cli {
    /// Project root; relative config paths resolve against it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/cv-forge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile variant to build
    #[arg(long, default_value = "default", global = true)]
    profile: String,

    /// Write HTML only; skip PDF generation
    #[arg(long, global = true)]
    html_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the CV (all languages unless one is given)
    Cv {
        #[arg(value_enum)]
        lang: Option<Language>,
    },
    /// Build the cover letter
    Letter {
        /// Restrict to one language
        #[arg(long, value_enum)]
        lang: Option<Language>,
    },
    /// Build the portfolio site into the publish directory
    Portfolio,
    /// Print a stock cv-forge.toml with all options documented
    GenConfig,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl CliError {
    fn remediation(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Run `cv-forge gen-config` to see every valid key."),
            CliError::Build(e) => e.remediation(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err, err.remediation());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let target = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Cv { lang } => Target::Cv { lang },
        Command::Letter { lang } => Target::Letter { lang },
        Command::Portfolio => Target::Portfolio,
    };

    let config = load_config(&cli.root, cli.config.as_deref())?;
    let api_key = config::load_api_key(&cli.root, &config.credentials.api_key_var);
    let request = BuildRequest {
        target,
        profile: cli.profile,
        html_only: cli.html_only,
    };

    let templates = Templates::new();
    let engine = ChromeEngine::new();
    let editor = metadata::default_editor();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_build_event(&event);
        }
    });
    let result = Builder::new(&config, &cli.root, &templates, &engine)
        .with_editor(editor.as_deref())
        .with_api_key(api_key)
        .with_events(tx)
        .build(&request);
    // Builder dropped its sender; the printer drains and exits
    printer.join().ok();

    output::print_report(&result?);
    Ok(())
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<BuildConfig, ConfigError> {
    match explicit {
        // An explicitly named file has to exist
        Some(file) if !file.is_file() => Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", file.display()),
        ))),
        Some(file) => config::load_config_file(file),
        None => config::load_config(root),
    }
}
