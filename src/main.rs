use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use statement::config::{config_dir, init_config_dir, load_config};
use statement::error::Result;
use statement::layout::format_amount;
use statement::statement::{
    display_client, generate_statement, invoice_views, load_statement_data, summarize, DateRange,
    GenerateRequest,
};

#[derive(Parser)]
#[command(name = "statement")]
#[command(version, about = "Offline Arabic client account statements as PDF", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.statement or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Render a client statement PDF from a JSON data file
    Render {
        /// Statement data file (client + invoices)
        #[arg(short, long)]
        data: PathBuf,

        /// Only include invoices dated on or after this day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only include invoices dated on or before this day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Custom output file path (default: output_dir/كشف_<client>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Brand title (default: from config.toml)
        #[arg(long)]
        title: Option<String>,

        /// Brand subtitle (default: from config.toml)
        #[arg(long)]
        subtitle: Option<String>,
    },

    /// Show per-invoice totals and the client balance
    Summary {
        /// Statement data file (client + invoices)
        #[arg(short, long)]
        data: PathBuf,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Render {
            data,
            from,
            to,
            output,
            title,
            subtitle,
        } => cmd_render(
            &cfg_dir,
            GenerateRequest {
                data_path: data,
                from,
                to,
                output,
                title,
                subtitle,
            },
        ),
        Commands::Summary { data, from, to } => {
            cmd_summary(&cfg_dir, &data, from.as_deref(), to.as_deref())
        }
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized statement config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit brand and page settings:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Render a statement:            statement render --data <file.json>");

    Ok(())
}

fn cmd_render(cfg_dir: &Path, request: GenerateRequest) -> Result<()> {
    let today = Local::now().date_naive();
    let generated = generate_statement(cfg_dir, &request, today)?;

    println!("Generated statement for {}", generated.client);
    println!("  Invoices: {}", generated.invoices);
    println!("  Pages:    {}", generated.pages);
    println!("  Size:     {} bytes", generated.bytes);
    println!("  Saved:    {}", generated.path.display());

    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "INVOICE")]
    name: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "OPERATIONS")]
    operations: String,
    #[tabled(rename = "RECEIPTS")]
    receipts: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
}

/// Show per-invoice totals for a data file
fn cmd_summary(
    cfg_dir: &Path,
    data_path: &Path,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let range = DateRange::parse(from, to)?;
    let data = load_statement_data(data_path)?;
    let client = display_client(&data, &config.render.default_currency);
    let invoices = invoice_views(&data, &client, &range);

    println!("Client: {} | {} | {}", client.name, client.phone, client.location);

    if invoices.is_empty() {
        println!("No invoices in range.");
        return Ok(());
    }

    let summary = summarize(&invoices);
    let rows: Vec<SummaryRow> = summary
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| SummaryRow {
            index: i + 1,
            name: row.name,
            date: row.date,
            operations: row.operations,
            receipts: row.receipts,
            balance: row.balance,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let sym = statement::model::currency_symbol(&client.currency);
    println!("Client balance: {}", format_amount(summary.balance, &sym));

    Ok(())
}
