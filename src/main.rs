// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use ocrbatch::app_config::{self, Config, TranslationProvider};
use ocrbatch::credentials::{self, Credential, CREDENTIALS_ENV_VAR};
use ocrbatch::{AppError, Controller, OutputMode};

/// CLI Wrapper for OutputMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputMode {
    /// Extracted text per file
    Transcript,
    /// Extracted text and its automated translation
    Bilingual,
    /// Extracted text with instructions for translating it by hand
    Manual,
}

impl From<CliOutputMode> for OutputMode {
    fn from(cli_mode: CliOutputMode) -> Self {
        match cli_mode {
            CliOutputMode::Transcript => OutputMode::Transcript,
            CliOutputMode::Bilingual => OutputMode::Bilingual,
            CliOutputMode::Manual => OutputMode::ManualTranslation,
        }
    }
}

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract (and optionally translate) every image in a directory (default command)
    Run(RunArgs),

    /// Check that the OCR credential is set up correctly
    CheckCredentials(CredentialArgs),

    /// Generate shell completions for ocrbatch
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct CredentialArgs {
    /// Path to the OCR credential key file
    #[arg(long, env = CREDENTIALS_ENV_VAR)]
    credentials: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Directory containing the scanned images
    #[arg(value_name = "INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Report layout (and whether translation runs)
    #[arg(short, long, value_enum, default_value = "transcript")]
    mode: CliOutputMode,

    /// Report file path (defaults to the mode's file name from the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language of the documents (e.g., 'hi', 'mr', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Language to translate into (e.g., 'en', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation provider to use in bilingual mode
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name for LLM-backed translation providers
    #[arg(long)]
    model: Option<String>,

    /// Maximum images processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Retries for transient service failures
    #[arg(long)]
    retries: Option<u32>,

    #[command(flatten)]
    credential: CredentialArgs,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ocrbatch - batch digitization of scanned documents
///
/// Extracts the text of every scanned image in a directory with Google Cloud
/// Vision, optionally translates it, and writes one consolidated report.
#[derive(Parser, Debug)]
#[command(name = "ocrbatch")]
#[command(version)]
#[command(about = "Batch OCR and translation of scanned documents")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "ocrbatch extracts text from every scanned image in a directory and writes one report.

EXAMPLES:
    ocrbatch                                     # Transcribe images in the current directory
    ocrbatch scans/ -o scans.txt                 # Transcribe scans/ into scans.txt
    ocrbatch scans/ -m bilingual -s hi -t en     # Extract Hindi text and translate it to English
    ocrbatch scans/ -m manual                    # Extract text ready to paste into a translator
    ocrbatch scans/ -m bilingual -p ollama       # Translate with a local Ollama model
    ocrbatch check-credentials                   # Verify the OCR credential setup
    ocrbatch completions bash > ocrbatch.bash    # Generate bash completions

AUTHENTICATION:
    Point GOOGLE_APPLICATION_CREDENTIALS (or --credentials) at a service account
    key file, or at a JSON file holding an 'api_key' or an 'access_token'.

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created once the credential pre-flight has passed.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Colored stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // The max level is tightened once the config is known
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => write_completions(shell, &mut std::io::stdout()),
        Some(Commands::CheckCredentials(args)) => check_credentials(args),
        Some(Commands::Run(args)) => run_batch(args).await,
        None => run_batch(cli.run).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Write the completion script for `shell`; a reader that hangs up early is fine
fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<(), AppError> {
    let mut cmd = CommandLineOptions::command();
    let mut script = Vec::new();
    generate(shell, &mut cmd, "ocrbatch", &mut script);

    match out.write_all(&script).and_then(|_| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(AppError::File(format!("Failed to write completions: {}", e))),
    }
}

/// Load `config_path`, or `None` when it does not exist yet
fn load_config(config_path: &str) -> Result<Option<Config>, AppError> {
    Config::load(config_path).map_err(|e| AppError::Config(format!("{:#}", e)))
}

async fn run_batch(options: RunArgs) -> Result<(), AppError> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level((&level).into());
    }

    let config_path = &options.credential.config_path;
    let loaded = load_config(config_path)?;
    let config_missing = loaded.is_none();
    let mut config = loaded.unwrap_or_default();

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.set_model(model);
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(concurrency) = options.concurrency {
        config.batch.concurrent_requests = concurrency;
    }
    if let Some(retries) = options.retries {
        config.batch.retry_count = retries;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    config.ocr.credentials_path = credentials::resolve_credentials_path(
        options.credential.credentials.clone(),
        config.ocr.credentials_path.take(),
    );

    config.validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    if options.log_level.is_none() {
        log::set_max_level((&config.log_level).into());
    }

    let mode: OutputMode = options.mode.into();
    let output_path = options.output.clone()
        .unwrap_or_else(|| PathBuf::from(config.report.file_for(mode)));

    info!("Mode: {} - input: {} - report: {}", mode, options.input_dir.display(), output_path.display());

    let controller = Controller::from_config(config, mode)?;
    controller.preflight(mode).await?;

    // Defaults are only persisted once the credentials are known to work
    if config_missing {
        warn!("Config file not found at '{}', creating default config.", config_path);
        Config::default().save(config_path)
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    }

    controller.process(&options.input_dir, mode, &output_path).await?;

    Ok(())
}

fn check_credentials(args: CredentialArgs) -> Result<(), AppError> {
    let configured = load_config(&args.config_path)?
        .and_then(|config| config.ocr.credentials_path);
    let path = credentials::resolve_credentials_path(args.credentials, configured);

    let outcome = match &path {
        None => Credential::load(None),
        Some(path) => {
            println!("✓ Credential path set to: {}", path.display());
            if path.is_file() {
                println!("✓ Credentials file exists");
            }
            Credential::load(Some(path.as_path()))
        }
    };

    match outcome {
        Ok(credential) => {
            println!("✓ Vision API credential loaded ({})", credential.kind());
            println!("\n✓ Authentication setup is correct!");
            Ok(())
        }
        Err(e) => {
            println!("✗ {}", e);
            println!("\n✗ Please set up authentication:");
            println!("export {}='path/to/your/service-account-key.json'", CREDENTIALS_ENV_VAR);
            Err(e)
        }
    }
}
