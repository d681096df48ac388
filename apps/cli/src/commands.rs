//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wordroots_core::{
    BuildReport, DEFAULT_SAMPLE_WORDS, FixedPointReport, KnowledgeBase, ProgressReporter,
    ScanReport, SweepStats, compute_stats,
};
use wordroots_corpus::Corpus;
use wordroots_markup::Extractor;
use wordroots_shared::{
    AppConfig, ExtractConfig, PropagationConfig, Word, WordrootsError, init_config, load_config,
    load_config_from, validate_config,
};
use wordroots_storage::{
    RunManifest, load_records, manifest_path_for, read_manifest, save_records, write_manifest,
};
use wordroots_vocabulary::{VocabularyOptions, VocabularySource, load_vocabulary};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wordroots: build an etymology knowledge base from a Wiktionary dump.
#[derive(Parser)]
#[command(
    name = "wordroots",
    version,
    about = "Mine a Wiktionary dump for word origins and fill in inflected forms.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the default location.
    #[arg(long, global = true, env = "WORDROOTS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Options shared by every command that reads or writes the knowledge base.
#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct BaseArgs {
    /// Knowledge base JSON file (defaults to `defaults.output_path`).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Word list path or URL (defaults to `vocabulary.source`).
    #[arg(long)]
    pub vocabulary: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run every step: extract, derive, then inflect.
    Build {
        /// Wiktionary XML dump (plain, .bz2 or .gz).
        corpus: PathBuf,

        #[command(flatten)]
        base: BaseArgs,

        /// Upper bound on inflection sweeps.
        #[arg(long)]
        max_sweeps: Option<u32>,
    },

    /// Extract etymologies for vocabulary words.
    Extract {
        /// Wiktionary XML dump (plain, .bz2 or .gz).
        corpus: PathBuf,

        #[command(flatten)]
        base: BaseArgs,
    },

    /// Give derived terms the roots of their base word.
    Derive {
        /// Wiktionary XML dump (plain, .bz2 or .gz).
        corpus: PathBuf,

        #[command(flatten)]
        base: BaseArgs,
    },

    /// Resolve inflected forms to known stems until nothing changes.
    Inflect {
        #[command(flatten)]
        base: BaseArgs,

        /// Upper bound on inflection sweeps.
        #[arg(long)]
        max_sweeps: Option<u32>,
    },

    /// Summarize an existing knowledge base.
    Stats {
        #[command(flatten)]
        base: BaseArgs,

        /// Word to look up (repeatable). Defaults to a built-in sample.
        #[arg(long = "sample", value_name = "WORD")]
        samples: Vec<String>,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so that `stats --json` output stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wordroots=info",
        1 => "wordroots=debug",
        _ => "wordroots=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build {
            corpus,
            base,
            max_sweeps,
        } => cmd_build(config_path, &corpus, &base, max_sweeps).await,
        Command::Extract { corpus, base } => cmd_extract(config_path, &corpus, &base).await,
        Command::Derive { corpus, base } => cmd_derive(config_path, &corpus, &base).await,
        Command::Inflect { base, max_sweeps } => {
            cmd_inflect(config_path, &base, max_sweeps).await
        }
        Command::Stats {
            base,
            samples,
            json,
        } => cmd_stats(config_path, &base, &samples, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Everything a step needs: resolved config, output path and the loaded base.
struct Session {
    config: AppConfig,
    out: PathBuf,
    kb: KnowledgeBase,
}

impl Session {
    /// Resolve config, load the vocabulary and the saved base.
    ///
    /// Only steps that build from a corpus may start without a saved base;
    /// with `require_existing` a missing file is [`WordrootsError::MissingInput`].
    async fn open(
        config_path: Option<&Path>,
        base: &BaseArgs,
        require_existing: bool,
    ) -> Result<Self> {
        let config = resolve_config(config_path)?;

        let out = base
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.defaults.output_path));
        if require_existing && !out.is_file() {
            return Err(WordrootsError::missing_input(out).into());
        }
        if manifest_path_for(&out).is_file() {
            let previous = read_manifest(&out)?;
            info!(
                run_id = %previous.run_id,
                created_at = %previous.created_at,
                steps = ?previous.steps,
                entries = previous.entry_count,
                "previous run"
            );
        }
        let source = base
            .vocabulary
            .clone()
            .unwrap_or_else(|| config.vocabulary.source.clone());

        let opts = VocabularyOptions {
            timeout_secs: config.vocabulary.timeout_secs,
        };
        let vocabulary = load_vocabulary(&VocabularySource::parse(&source)?, &opts).await?;

        let records = load_records(&out)?;
        let kb = KnowledgeBase::from_records(Arc::new(vocabulary), &records)?;
        info!(
            out = %out.display(),
            entries = kb.len(),
            vocabulary = kb.vocabulary().len(),
            "knowledge base loaded"
        );

        Ok(Self { config, out, kb })
    }

    fn propagation(&self, max_sweeps: Option<u32>) -> Result<PropagationConfig> {
        let mut config = PropagationConfig::from(&self.config);
        if let Some(n) = max_sweeps {
            if n == 0 {
                return Err(eyre!("--max-sweeps must be at least 1"));
            }
            config.max_sweeps = n;
        }
        Ok(config)
    }

    /// Save the base and its manifest.
    fn save(&self, steps: &[&str]) -> Result<()> {
        let saved = save_records(&self.out, &self.kb.to_records())?;
        let manifest = RunManifest::new(
            env!("CARGO_PKG_VERSION"),
            steps,
            &saved,
            self.kb.vocabulary().len(),
        );
        let manifest_path = write_manifest(&self.out, &manifest)?;

        println!("  Saved:    {} ({} entries)", saved.path.display(), saved.entries);
        println!("  Manifest: {}", manifest_path.display());
        println!("  SHA-256:  {}", saved.sha256);
        Ok(())
    }
}

fn resolve_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    config_path: Option<&Path>,
    corpus: &Path,
    base: &BaseArgs,
    max_sweeps: Option<u32>,
) -> Result<()> {
    let corpus = Corpus::open(corpus)?;
    let mut session = Session::open(config_path, base, false).await?;
    let propagation = session.propagation(max_sweeps)?;
    let extractor = Extractor::new(&ExtractConfig::from(&session.config))?;

    info!(
        corpus = %corpus.path().display(),
        max_sweeps = propagation.max_sweeps,
        "building knowledge base"
    );

    let (kb, report) = run_blocking(session.kb, move |kb, progress| {
        wordroots_core::build(&corpus, &extractor, kb, propagation, progress)
    })
    .await?;
    session.kb = kb;

    print_build(&report);
    session.save(&["extract", "derive", "inflect"])?;
    println!();
    Ok(())
}

async fn cmd_extract(config_path: Option<&Path>, corpus: &Path, base: &BaseArgs) -> Result<()> {
    let corpus = Corpus::open(corpus)?;
    let mut session = Session::open(config_path, base, false).await?;
    let extractor = Extractor::new(&ExtractConfig::from(&session.config))?;

    let (kb, report) = run_blocking(session.kb, move |kb, progress| {
        wordroots_core::extract_etymologies(&corpus, &extractor, kb, progress)
    })
    .await?;
    session.kb = kb;

    println!();
    println!("  Etymologies extracted!");
    print_scan(&report);
    println!("  Entries:  {}", session.kb.len());
    session.save(&["extract"])?;
    println!();
    Ok(())
}

async fn cmd_derive(config_path: Option<&Path>, corpus: &Path, base: &BaseArgs) -> Result<()> {
    let corpus = Corpus::open(corpus)?;
    let mut session = Session::open(config_path, base, true).await?;
    let extractor = Extractor::new(&ExtractConfig::from(&session.config))?;

    let (kb, (scan, derivations)) = run_blocking(session.kb, move |kb, progress| {
        wordroots_core::expand_derivations(&corpus, &extractor, kb, progress)
    })
    .await?;
    session.kb = kb;

    println!();
    println!("  Derived terms propagated!");
    print_scan(&scan);
    println!("  Eligible:   {}", derivations.eligible);
    println!("  Propagated: {}", derivations.propagated);
    println!("  Entries:    {}", session.kb.len());
    session.save(&["derive"])?;
    println!();
    Ok(())
}

async fn cmd_inflect(
    config_path: Option<&Path>,
    base: &BaseArgs,
    max_sweeps: Option<u32>,
) -> Result<()> {
    let mut session = Session::open(config_path, base, true).await?;
    let propagation = session.propagation(max_sweeps)?;

    let (kb, report) = run_blocking(session.kb, move |kb, progress| {
        Ok(wordroots_core::expand_inflections(kb, propagation, progress))
    })
    .await?;
    session.kb = kb;

    println!();
    println!("  Inflected forms propagated!");
    print_fixed_point(&report);
    println!("  Entries:  {}", session.kb.len());
    session.save(&["inflect"])?;
    println!();
    Ok(())
}

async fn cmd_stats(
    config_path: Option<&Path>,
    base: &BaseArgs,
    samples: &[String],
    json: bool,
) -> Result<()> {
    let session = Session::open(config_path, base, true).await?;

    let samples: Vec<Word> = if samples.is_empty() {
        DEFAULT_SAMPLE_WORDS.iter().map(|w| Word::new(w)).collect()
    } else {
        samples.iter().map(|w| Word::new(w)).collect()
    };
    let stats = compute_stats(&session.kb, &samples);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  Entries:          {}", stats.entries);
    println!("  Vocabulary:       {}", stats.vocabulary_size);
    println!("  Coverage:         {:.2}%", stats.coverage_percent);
    println!("  Multi-etymology:  {}", stats.multi_etymology);
    println!();
    println!("  Root languages:");
    for language in &stats.languages {
        println!("    {:<20} {:>8}", language.language, language.count);
    }
    println!();
    println!("  Samples:");
    for sample in &stats.samples {
        if sample.descriptors.is_empty() {
            println!("    {:<12} (none)", sample.word);
        } else {
            println!("    {:<12} {}", sample.word, sample.descriptors.join(", "));
        }
    }
    println!();
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Run a corpus-bound step off the async runtime, handing the base back afterwards.
async fn run_blocking<T, F>(mut kb: KnowledgeBase, step: F) -> Result<(KnowledgeBase, T)>
where
    T: Send + 'static,
    F: FnOnce(&mut KnowledgeBase, &dyn ProgressReporter) -> wordroots_shared::Result<T>
        + Send
        + 'static,
{
    tokio::task::spawn_blocking(move || {
        let progress = CliProgress::new();
        let outcome = step(&mut kb, &progress);
        progress.finish();
        outcome.map(|value| (kb, value))
    })
    .await?
    .map_err(Into::into)
}

// ---------------------------------------------------------------------------
// Report printing
// ---------------------------------------------------------------------------

fn print_scan(report: &ScanReport) {
    println!(
        "  Pages:    {} scanned, {} in vocabulary",
        report.pages_scanned, report.pages_in_vocabulary
    );
    println!(
        "  Found:    {} etymologies, {} derived-term relations",
        report.words_with_etymology, report.derivation_facts
    );
}

fn print_fixed_point(report: &FixedPointReport) {
    for sweep in &report.sweeps {
        println!(
            "  Sweep {:>2}: {} candidates, {} added",
            sweep.sweep, sweep.candidates, sweep.added
        );
    }
    println!("  Added:    {}", report.added);
    if !report.converged {
        println!("  Stopped at the sweep cap before converging.");
    }
}

fn print_build(report: &BuildReport) {
    println!();
    println!("  Knowledge base built!");
    print_scan(&report.scan);
    println!("  Derived:  {} propagated", report.derivations.propagated);
    print_fixed_point(&report.inflections);
    let coverage = if report.vocabulary_size == 0 {
        0.0
    } else {
        100.0 * report.entries as f64 / report.vocabulary_size as f64
    };
    println!(
        "  Entries:  {} of {} ({coverage:.2}%)",
        report.entries, report.vocabulary_size
    );
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn pages_scanned(&self, scanned: usize, in_vocabulary: usize) {
        self.spinner.set_message(format!(
            "Scanning corpus [{scanned} pages, {in_vocabulary} in vocabulary]"
        ));
    }

    fn sweep_complete(&self, stats: &SweepStats) {
        self.spinner.set_message(format!(
            "Sweep {} added {} ({} entries)",
            stats.sweep, stats.added, stats.entries_after
        ));
    }

    fn done(&self, entries: usize) {
        self.spinner.set_message(format!("Done ({entries} entries)"));
    }
}
