use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wikiharvest_core::{
    AdvancedSearch, AnalyzeKind, ChatSettings, ChatSummarizer, DisabledSummarizer, HarvestError, HttpTransport,
    LocaleLoader, LocaleLoaderBuilder, ReportKind, SearchOptions, SortMode, Summarizer, WikiClient, WikiConfig,
    count_words, default_report_file_name,
};

mod echo;

use echo::{format_size, print_banner, print_detail, print_info, print_step, print_success, print_timing, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_REPORT: &str = "wikipedia_results.txt";

/// Search Wikipedia, clean article content and save text reports
#[derive(Parser, Debug)]
#[command(name = "wikiharvest")]
#[command(author = "wikiharvest contributors")]
#[command(version)]
#[command(about = "Search Wikipedia and save cleaned article reports", long_about = None)]
struct Cli {
    /// Wikipedia language edition
    #[arg(long, global = true, default_value = "tr", value_name = "LANG")]
    lang: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Custom locale profile directory
    #[arg(long, global = true, value_name = "DIR")]
    locale_dir: Option<PathBuf>,

    /// OpenAI-compatible endpoint used for guide summaries
    #[arg(long, global = true, env = "LLM_BASE_URL", value_name = "URL")]
    llm_url: Option<String>,

    /// Model name for guide summaries
    #[arg(long, global = true, env = "LLM_MODEL", default_value = "gpt-4o-mini", value_name = "MODEL")]
    llm_model: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search and write a report of the results
    Search {
        /// Search term
        query: String,

        /// Number of results
        #[arg(short, long, default_value = "1")]
        limit: usize,

        /// Report file
        #[arg(short, long, default_value = DEFAULT_REPORT, value_name = "FILE")]
        output: PathBuf,

        /// Attach word counts, summaries and categories to each hit
        #[arg(long)]
        enrich: bool,

        /// Drop hits with fewer words (implies --enrich)
        #[arg(long, default_value = "0", value_name = "NUM")]
        min_words: usize,

        /// Keep hits in this category (repeatable, implies --enrich)
        #[arg(long = "category", value_name = "NAME")]
        categories: Vec<String>,

        /// Result ordering (relevance, date)
        #[arg(long, default_value = "relevance")]
        sort: SortMode,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cleaned content of a page
    Page {
        /// Page id
        id: u64,

        /// Print content with metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summary, keywords or section headings of a page
    Analyze {
        /// Page id
        id: u64,

        /// Analysis type (summary, keywords, sections, all)
        #[arg(short, long, default_value = "summary")]
        kind: AnalyzeKind,
    },

    /// Compare two pages by categories and vocabulary
    Compare {
        /// First page id
        first: u64,
        /// Second page id
        second: u64,
    },

    /// List the categories of a page
    Categories {
        /// Page id
        id: u64,
    },

    /// List images of a page with their file URLs
    Images {
        /// Page id
        id: u64,

        /// Maximum images
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Pages sharing the first category of a page
    Related {
        /// Page id
        id: u64,

        /// Maximum pages
        #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=20))]
        limit: u16,
    },

    /// Search with exact phrases, exclusions and date ranges
    Advanced {
        /// Search term
        query: String,

        #[arg(long, value_name = "PHRASE")]
        exact: Option<String>,

        /// Space separated words to exclude
        #[arg(long, value_name = "WORDS")]
        exclude: Option<String>,

        #[arg(long, value_name = "DATE")]
        from: Option<String>,

        #[arg(long, value_name = "DATE")]
        to: Option<String>,

        /// Category substring filter
        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value = "0", value_name = "NUM")]
        min_words: usize,

        #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u16).range(1..=50))]
        limit: u16,

        /// Report file (default: timestamped name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Research a topic and its linked pages
    Topic {
        /// Topic to research
        topic: String,

        /// 1 for main pages only, 2 or 3 to follow links
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=3))]
        depth: u8,

        /// Main pages to collect
        #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=10))]
        limit: u16,

        /// Report file (default: timestamped name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wikiharvest_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn build_client(cli: &Cli) -> anyhow::Result<WikiClient> {
    let mut builder = WikiConfig::builder().language(&cli.lang).timeout(cli.timeout);
    if let Some(user_agent) = &cli.user_agent {
        builder = builder.user_agent(user_agent);
    }
    let mut config = builder.build().context("Invalid configuration")?;

    let mut loader = match &cli.locale_dir {
        Some(dir) => LocaleLoaderBuilder::new().custom_dir(dir).build(),
        None => LocaleLoader::default(),
    };
    config.locale = loader.load(&cli.lang).context("Failed to load locale profile")?;

    let summarizer: Arc<dyn Summarizer> = match &cli.llm_url {
        Some(base_url) => Arc::new(
            ChatSummarizer::new(ChatSettings {
                base_url: base_url.clone(),
                model: cli.llm_model.clone(),
                fallback_model: None,
                api_key: std::env::var("LLM_API_KEY").ok(),
                timeout: 60,
            })
            .context("Failed to create summarizer")?,
        ),
        None => Arc::new(DisabledSummarizer),
    };

    let transport = HttpTransport::from_config(&config).context("Failed to create HTTP client")?;
    WikiClient::with_parts(config, Arc::new(transport), summarizer).context("Failed to create client")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn not_found(err: HarvestError, page_id: u64) -> anyhow::Error {
    match err {
        HarvestError::NoContent => anyhow::anyhow!("No content found for page {}", page_id),
        other => anyhow::Error::new(other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "wikiharvest", &mut io::stdout());
        return Ok(());
    }

    if cli.verbose {
        print_banner();
        init_logging();
        print_info("Debug logging enabled");
        print_detail("Language", &cli.lang);
        eprintln!();
    }

    let client = build_client(&cli)?;
    let started = Instant::now();

    match &cli.command {
        Command::Search { query, limit, output, enrich, min_words, categories, sort, json } => {
            let options = SearchOptions::new(query)
                .limit(*limit)
                .min_word_count(*min_words)
                .categories(categories.clone())
                .sort(*sort)
                .enrich(*enrich || *min_words > 0 || !categories.is_empty());

            if cli.verbose {
                print_step(1, 2, &format!("Searching for {}", query.bright_white()));
            }
            let hits = client.search(&options).await.context("Search failed")?;
            if hits.is_empty() {
                print_warning(&format!("No results for '{}'", query));
            }
            if *json {
                print_json(&hits)?;
            }

            if cli.verbose {
                print_step(2, 2, &format!("Writing report for {} result(s)", hits.len()));
            }
            let report = client.build_report(query, &hits).await;
            let path = wikiharvest_core::write_report(output, &report)
                .with_context(|| format!("Failed to write to file: {}", output.display()))?;
            if cli.verbose {
                print_detail("Size", &format_size(report.len()));
            }
            print_success(&format!("Report written to {}", path.display().bright_white()));
        }
        Command::Page { id, json } => {
            let page = client.page(*id).await.map_err(|e| not_found(e, *id))?;
            if *json {
                print_json(&page)?;
            } else {
                print!("{}", page.content);
            }
            if cli.verbose {
                print_detail("Words", &count_words(&page.content).to_string());
            }
        }
        Command::Analyze { id, kind } => {
            let analysis = client.analyzer().analyze(*id, *kind).await.map_err(|e| not_found(e, *id))?;
            print_json(&analysis)?;
        }
        Command::Compare { first, second } => {
            let comparison = client.analyzer().compare(*first, *second).await;
            print_json(&comparison)?;
        }
        Command::Categories { id } => {
            for category in client.metadata().categories(*id).await {
                println!("{}", category);
            }
        }
        Command::Images { id, limit } => {
            let images = client.metadata().images_with_urls(*id, *limit).await;
            for image in &images {
                if let Some(url) = &image.url {
                    println!("{}\t{}", image.title, url);
                }
            }
        }
        Command::Related { id, limit } => {
            let related = client.explorer().related_pages(*id, usize::from(*limit)).await;
            print_json(&related)?;
        }
        Command::Advanced { query, exact, exclude, from, to, category, min_words, limit, output } => {
            let params = AdvancedSearch {
                query: query.clone(),
                exact_phrase: exact.clone(),
                exclude_words: exclude.clone(),
                date_start: from.clone(),
                date_end: to.clone(),
                category: category.clone(),
                min_word_count: *min_words,
                limit: usize::from(*limit),
            };
            let result = client.explorer().advanced_search(&params).await;
            if cli.verbose {
                print_detail("Query", &result.query);
            }

            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_report_file_name(ReportKind::Advanced, query)));
            let written = client.save_report(&result.query, &result.hits, &path).await?;
            print_json(&result)?;
            print_success(&format!("Report written to {}", written.display().bright_white()));
        }
        Command::Topic { topic, depth, limit, output } => {
            let research = client.explorer().topic_research(topic, *depth, usize::from(*limit)).await?;
            if research.main_pages.is_empty() {
                bail!("No pages found for topic '{}'", topic);
            }

            let path =
                output.clone().unwrap_or_else(|| PathBuf::from(default_report_file_name(ReportKind::Topic, topic)));
            let written = client.save_report(&research.report_term(), &research.hits, &path).await?;
            print_json(&research)?;
            print_success(&format!("Report written to {}", written.display().bright_white()));
        }
        Command::Completions { .. } => unreachable!("handled before the client is built"),
    }

    if cli.verbose {
        eprintln!();
        print_timing("Total", started.elapsed());
    }

    Ok(())
}
