use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use feedback_sentiment::batch::{BatchOptions, FailurePolicy};
use feedback_sentiment::sentiment::{
    ModernBertClassifier, ModernBertSize, SentimentAnalyzer, SentimentAnalyzerBuilder,
};
use feedback_sentiment::table::{read_csv_path, write_csv_path, Record, TextColumn};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "sentiment_analysis_results_with_emoji.csv";

/// Sentiment analysis for customer feedback.
#[derive(Debug, Parser)]
#[command(name = "feelcheck", version, about)]
struct Cli {
    /// Model size: `base` or `large`.
    #[arg(long, global = true, env = "FEELCHECK_MODEL_SIZE", default_value = "base")]
    size: ModernBertSize,

    /// Run on this CUDA device instead of the CPU.
    #[arg(long, global = true, env = "FEELCHECK_CUDA_DEVICE")]
    cuda: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze the sentiment of a single text.
    Text {
        /// Text to analyze.
        text: String,
    },
    /// Analyze every row of a CSV file with a text column.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Input CSV with a header row.
    input: PathBuf,

    /// Where to write the augmented CSV.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Name of the column holding the text.
    #[arg(long, env = "FEELCHECK_TEXT_COLUMN", default_value = "Text")]
    text_column: String,

    /// Match the text column name ignoring case.
    #[arg(long)]
    ignore_case: bool,

    /// Classifier calls in flight at once (defaults to available parallelism).
    #[arg(long, env = "FEELCHECK_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Per-text timeout in seconds; 0 disables it.
    #[arg(long, env = "FEELCHECK_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Keep going when a row fails, marking it Unknown / N/A.
    #[arg(long, env = "FEELCHECK_FALLBACK")]
    fallback: bool,

    /// Refuse inputs with more rows than this.
    #[arg(long, env = "FEELCHECK_MAX_ROWS")]
    max_rows: Option<usize>,

    /// Rows to show before and after analysis.
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

impl BatchArgs {
    fn text_column(&self) -> TextColumn {
        if self.ignore_case {
            TextColumn::case_insensitive(&self.text_column)
        } else {
            TextColumn::exact(&self.text_column)
        }
    }

    fn options(&self) -> BatchOptions {
        let mut options = BatchOptions::default()
            .timeout((self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)))
            .max_rows(self.max_rows)
            .text_column(self.text_column());
        if let Some(concurrency) = self.concurrency {
            options = options.concurrency(concurrency);
        }
        if self.fallback {
            options = options.failure_policy(FailurePolicy::Fallback);
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Command::Text { text } => run_text(&cli, text),
        Command::Batch(args) => run_batch(&cli, args).await,
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_analyzer(cli: &Cli) -> Result<SentimentAnalyzer<ModernBertClassifier>> {
    let builder = SentimentAnalyzerBuilder::modernbert(cli.size);
    let builder = match cli.cuda {
        Some(index) => builder.cuda(index),
        None => builder.cpu(),
    };
    builder
        .build()
        .with_context(|| format!("failed to load {} sentiment model", cli.size))
}

fn run_text(cli: &Cli, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Please enter some text to analyze.");
    }

    let analyzer = build_analyzer(cli)?;
    let item = analyzer.analyze_one(text)?;
    println!("Sentiment: {item} ({})", item.confidence);
    Ok(())
}

async fn run_batch(cli: &Cli, args: &BatchArgs) -> Result<()> {
    let options = args.options();
    let table = read_csv_path(&args.input, &options.text_column)
        .with_context(|| format!("cannot use {}", args.input.display()))?;

    println!("Data preview:");
    print_rows(
        table.columns().iter().map(String::as_str),
        table.head(args.preview).iter().map(Record::fields),
    );

    let analyzer = build_analyzer(cli)?;
    println!("Performing sentiment analysis...");
    let output = analyzer
        .batch(options)
        .analyze_table(&table)
        .await
        .context("sentiment analysis failed")?;

    println!("Sentiment analysis results:");
    print_rows(output.columns(), output.rows().take(args.preview));

    if output.is_partial() {
        tracing::warn!(
            rows = ?output.fallback_rows(),
            "some rows could not be classified and were marked Unknown / N/A"
        );
    }

    write_csv_path(&output, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "Wrote {} rows to {} in {:.2}s",
        output.len(),
        args.output.display(),
        output.stats.total_time.as_secs_f64()
    );
    Ok(())
}

fn print_rows<'a, H, R, F, S>(header: H, rows: R)
where
    H: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = F>,
    F: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    println!("{}", header.into_iter().collect::<Vec<_>>().join("\t"));
    for row in rows {
        let fields: Vec<String> = row.into_iter().map(|f| f.as_ref().to_string()).collect();
        println!("{}", fields.join("\t"));
    }
}
