//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use salesagent_core::captions::generate_captions;
use salesagent_core::ingest::{IngestConfig, IngestResult, ProgressReporter};
use salesagent_core::{AnswerResult, AnsweringService, ChatSession, OpenAiClient};
use salesagent_leads::LeadLedger;
use salesagent_shared::{AppConfig, Lead, LeadForm, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SalesAgent — catalog Q&A, lead capture, and social captions.
#[derive(Parser)]
#[command(
    name = "salesagent",
    version,
    about = "Sales & marketing support agent: catalog Q&A, lead scoring, and social captions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.salesagent/salesagent.toml.
    #[arg(long, global = true, env = "SALESAGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Embed the product and FAQ catalog into the local index.
    Ingest {
        /// Products CSV (id,title,description,category,price,tags).
        #[arg(long)]
        products: Option<PathBuf>,

        /// FAQs CSV (id,question,answer).
        #[arg(long)]
        faqs: Option<PathBuf>,

        /// Index database path.
        #[arg(long)]
        index: Option<PathBuf>,

        /// Clear the index and re-embed every document.
        #[arg(long)]
        rebuild: bool,
    },

    /// Start an interactive support chat session.
    Chat {
        /// Index database path.
        #[arg(long)]
        index: Option<PathBuf>,

        /// Lead ledger used by `/lead`.
        #[arg(long)]
        leads_file: Option<PathBuf>,
    },

    /// Ask a single product or FAQ question.
    Ask {
        /// The question.
        question: String,

        /// Index database path.
        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Capture and score a lead.
    Lead {
        #[command(subcommand)]
        action: LeadAction,
    },

    /// Inspect the lead ledger.
    Leads {
        #[command(subcommand)]
        action: LeadsAction,
    },

    /// Generate social media captions for a product.
    Captions {
        /// Product to write captions for.
        #[arg(long)]
        product: String,

        /// Target audience (e.g., photographers).
        #[arg(long, default_value = "")]
        audience: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Lead capture subcommands.
#[derive(Subcommand)]
pub(crate) enum LeadAction {
    /// Score a lead and append it to the ledger.
    Add {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        /// Interest / product.
        #[arg(long, default_value = "")]
        interest: String,

        /// Budget (optional, free text).
        #[arg(long, default_value = "")]
        budget: String,

        /// Number of chat exchanges with this prospect so far.
        #[arg(long, default_value_t = 0)]
        interactions: usize,

        /// Lead ledger path.
        #[arg(long)]
        leads_file: Option<PathBuf>,
    },
}

/// Ledger inspection subcommands.
#[derive(Subcommand)]
pub(crate) enum LeadsAction {
    /// Print every captured lead in capture order.
    List {
        /// Lead ledger path.
        #[arg(long)]
        leads_file: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so they never
/// mix with answers on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = ["salesagent", "salesagent_core", "salesagent_leads", "salesagent_storage", "salesagent_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

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
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Ingest {
            products,
            faqs,
            index,
            rebuild,
        } => cmd_ingest(&config, products, faqs, index, rebuild).await,
        Command::Chat { index, leads_file } => cmd_chat(&config, index, leads_file).await,
        Command::Ask { question, index } => cmd_ask(&config, &question, index).await,
        Command::Lead { action } => match action {
            LeadAction::Add {
                name,
                email,
                interest,
                budget,
                interactions,
                leads_file,
            } => {
                let form = LeadForm {
                    name,
                    email,
                    interest,
                    budget,
                };
                cmd_lead_add(&config, &form, interactions, leads_file)
            }
        },
        Command::Leads { action } => match action {
            LeadsAction::List { leads_file } => cmd_leads_list(&config, leads_file),
        },
        Command::Captions { product, audience } => {
            cmd_captions(&config, &product, &audience).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn index_path(config: &AppConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(&config.defaults.index_path))
}

fn ledger(config: &AppConfig, flag: Option<PathBuf>) -> LeadLedger {
    LeadLedger::new(flag.unwrap_or_else(|| PathBuf::from(&config.defaults.leads_file)))
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

async fn cmd_ingest(
    config: &AppConfig,
    products: Option<PathBuf>,
    faqs: Option<PathBuf>,
    index: Option<PathBuf>,
    rebuild: bool,
) -> Result<()> {
    // Validate API key before doing anything
    let client = OpenAiClient::from_app_config(config)?;

    let ingest_config = IngestConfig {
        products_csv: products.unwrap_or_else(|| PathBuf::from(&config.defaults.products_csv)),
        faqs_csv: faqs.unwrap_or_else(|| PathBuf::from(&config.defaults.faqs_csv)),
        index_path: index_path(config, index),
        batch_size: config.retrieval.embed_batch_size,
        rebuild,
    };

    info!(
        products = %ingest_config.products_csv.display(),
        faqs = %ingest_config.faqs_csv.display(),
        "ingesting catalog"
    );

    let reporter = CliProgress::new();
    let result = salesagent_core::ingest::ingest(&ingest_config, &client, &reporter).await?;

    println!();
    println!("  Catalog indexed!");
    println!("  Documents: {}", result.document_count);
    println!("  Embedded:  {}", result.embedded);
    println!("  Unchanged: {}", result.unchanged);
    println!("  In index:  {}", result.indexed_total);
    println!("  Path:      {}", result.index_path.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
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
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn batch_embedded(&self, done: usize, total: usize) {
        self.spinner
            .set_message(format!("Embedding documents [{done}/{total}]"));
    }

    fn done(&self, _result: &IngestResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// chat / ask
// ---------------------------------------------------------------------------

async fn connect(
    config: &AppConfig,
    index: Option<PathBuf>,
) -> Result<AnsweringService<OpenAiClient, OpenAiClient>> {
    let path = index_path(config, index);
    Ok(AnsweringService::<OpenAiClient, OpenAiClient>::connect(config, &path).await?)
}

fn print_answer(result: &AnswerResult) {
    println!("Agent: {}", result.answer);
    println!("Sources:");
    for source in &result.sources {
        println!("- {}", source.source);
    }
}

async fn cmd_ask(config: &AppConfig, question: &str, index: Option<PathBuf>) -> Result<()> {
    let service = connect(config, index).await?;
    let mut session = ChatSession::new();
    let result = session.ask(&service, question).await?;
    print_answer(&result);
    Ok(())
}

async fn cmd_chat(
    config: &AppConfig,
    index: Option<PathBuf>,
    leads_file: Option<PathBuf>,
) -> Result<()> {
    let service = connect(config, index).await?;
    let ledger = ledger(config, leads_file);
    let mut session = ChatSession::new();

    println!("Support chat / product Q&A");
    println!("Ask a product or FAQ question (try: 'What is the return policy?').");
    println!("Commands: /lead  /history  /quit");
    println!();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        prompt("> ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => print_history(&session),
            "/lead" => {
                let form = read_lead_form(&mut lines)?;
                match session.capture_lead(&ledger, &form) {
                    Ok(lead) => print_saved_lead(&lead),
                    Err(e) => eprintln!("Could not save lead: {e}"),
                }
            }
            _ => match session.ask(&service, &line).await {
                Ok(result) => print_answer(&result),
                Err(e) if e.is_validation() => eprintln!("{e}"),
                Err(e) => eprintln!("Error: {e}"),
            },
        }
        println!();
    }

    info!(session = %session.id(), turns = session.interaction_count(), "chat session ended");
    Ok(())
}

fn prompt(label: &str) -> Result<()> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_history(session: &ChatSession) {
    if session.turns().is_empty() {
        println!("(no questions yet)");
        return;
    }
    for (i, turn) in session.turns().iter().enumerate() {
        println!("{}. You:   {}", i + 1, turn.question);
        println!("   Agent: {}", turn.answer);
    }
}

fn read_lead_form<I>(lines: &mut I) -> Result<LeadForm>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut field = |label: &str| -> Result<String> {
        prompt(&format!("  {label}: "))?;
        match lines.next() {
            Some(line) => Ok(line?.trim_end().to_string()),
            None => Ok(String::new()),
        }
    };

    Ok(LeadForm {
        name: field("Name")?,
        email: field("Email")?,
        interest: field("Interest / Product")?,
        budget: field("Budget (optional)")?,
    })
}

fn print_saved_lead(lead: &Lead) {
    println!("Saved lead (score={}, status={})", lead.lead_score, lead.status);
}

// ---------------------------------------------------------------------------
// leads
// ---------------------------------------------------------------------------

fn cmd_lead_add(
    config: &AppConfig,
    form: &LeadForm,
    interactions: usize,
    leads_file: Option<PathBuf>,
) -> Result<()> {
    let ledger = ledger(config, leads_file);
    let lead = ledger
        .capture(form, interactions)
        .map_err(|e| eyre!("could not save lead: {e}"))?;
    print_saved_lead(&lead);
    Ok(())
}

fn cmd_leads_list(config: &AppConfig, leads_file: Option<PathBuf>) -> Result<()> {
    let ledger = ledger(config, leads_file);
    let leads = ledger.read_all()?;

    if leads.is_empty() {
        println!("No leads captured yet ({}).", display_path(ledger.path()));
        return Ok(());
    }

    println!(
        "{:<20}  {:<20}  {:<26}  {:>5}  {:<4}  INTEREST",
        "CAPTURED", "NAME", "EMAIL", "SCORE", "TIER"
    );
    for lead in &leads {
        println!(
            "{:<20}  {:<20}  {:<26}  {:>5}  {:<4}  {}",
            lead.timestamp.format("%Y-%m-%d %H:%M:%S"),
            lead.name,
            lead.email,
            lead.lead_score,
            lead.status,
            lead.interest
        );
    }
    println!();
    println!("{} lead(s) in {}", leads.len(), display_path(ledger.path()));
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

// ---------------------------------------------------------------------------
// captions
// ---------------------------------------------------------------------------

async fn cmd_captions(config: &AppConfig, product: &str, audience: &str) -> Result<()> {
    let client = OpenAiClient::from_app_config(config)?;
    let text = generate_captions(&client, product, audience).await?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
