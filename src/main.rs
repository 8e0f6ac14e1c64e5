use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use finsights::api::{AnalysisService, HttpAnalysisService};
use finsights::conversation::{ConversationPage, Role, SendOutcome, ViewMode, PROMPT_SUGGESTIONS};
use finsights::document::{count_pages, PreviewStorage, SqliteStore, UploadFlow, UploadStateStore};
use finsights::Config;

/// Explore bank statements with the Finsights analysis service.
#[derive(Parser, Debug)]
#[command(name = "finsights", version, about)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select a PDF statement and submit it for analysis
    Upload {
        path: PathBuf,
        /// Only hash and remember the file
        #[arg(long)]
        no_submit: bool,
    },
    /// Show the current document
    Status,
    /// Show the extracted transaction tables
    Tables,
    /// Show the insights dashboard
    Insights,
    /// Ask one question about the statement
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Open the interactive conversation page
    Chat,
    /// Forget the current document
    Clear,
}

struct App {
    store: UploadStateStore,
    service: Arc<dyn AnalysisService>,
    previews: PreviewStorage,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    init_tracing(&config.log_level);

    let durable = SqliteStore::open(&config.state_path()).context("Failed to open state store")?;
    let store = UploadStateStore::new(Arc::new(durable));
    store.hydrate();

    let service: Arc<dyn AnalysisService> =
        Arc::new(HttpAnalysisService::new(&config.api_url, config.request_timeout())?);
    let app = App {
        store,
        service,
        previews: PreviewStorage::new(&config.state_dir),
    };

    match cli.command {
        Command::Upload { path, no_submit } => upload(&app, &path, no_submit).await,
        Command::Status => status(&app),
        Command::Tables => show_panel(&app, ViewMode::Table).await,
        Command::Insights => show_panel(&app, ViewMode::Insights).await,
        Command::Ask { query } => ask(&app, &query.join(" ")).await,
        Command::Chat => chat(&app).await,
        Command::Clear => {
            app.store.clear()?;
            println!("Document cleared.");
            Ok(())
        }
    }
}

async fn upload(app: &App, path: &std::path::Path, no_submit: bool) -> Result<()> {
    let flow = UploadFlow::new(app.store.clone(), app.service.clone());
    let record = flow.select_path(path).await?;
    println!(
        "{} {} ({:.2} MB)",
        style("Selected").green(),
        record.name,
        record.size_mb()
    );
    if no_submit {
        return Ok(());
    }
    println!("Analyzing statement...");
    match flow.submit().await {
        Ok(record) => {
            println!(
                "{} document id {}",
                style("Ready:").green(),
                record.id.as_deref().unwrap_or("-")
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", style("An error occurred while uploading the file.").red());
            Err(e.into())
        }
    }
}

fn status(app: &App) -> Result<()> {
    match app.store.get() {
        Some(record) => {
            println!("Name:     {}", record.name);
            println!("Size:     {:.2} MB", record.size_mb());
            println!("SHA-256:  {}", record.hash);
            println!("Selected: {}", record.uploaded_at);
            println!("Id:       {}", record.id.as_deref().unwrap_or("(not submitted)"));
        }
        None => println!("No document uploaded."),
    }
    Ok(())
}

async fn open_page(app: &App) -> Result<ConversationPage> {
    let Some(mut record) = app.store.get() else {
        bail!("No document uploaded. Run `finsights upload <file>` first.");
    };
    if let Err(e) = app.previews.restore_url(&mut record).await {
        tracing::warn!(error = %e, "document preview unavailable");
    }
    let pages = record.bytes().map(|b| count_pages(&b)).unwrap_or(1);
    let page = ConversationPage::new(record, app.service.clone());
    page.report_page_count(pages);
    Ok(page)
}

fn print_alerts(page: &ConversationPage) {
    for alert in page.take_alerts() {
        eprintln!("{} {}", style("!").red().bold(), alert);
    }
}

async fn show_panel(app: &App, mode: ViewMode) -> Result<()> {
    let page = open_page(app).await?;
    page.select_view(mode);
    page.mount().await;
    print_alerts(&page);
    print!("{}", page.render());
    Ok(())
}

async fn ask(app: &App, query: &str) -> Result<()> {
    let page = open_page(app).await?;
    if page.chat().send_query(query).await == SendOutcome::Ignored {
        bail!("Query is empty");
    }
    if let Some(reply) = page.chat().messages().last() {
        println!("{}", reply.content);
    }
    Ok(())
}

const CHAT_HELP: &str = "Commands: :doc  :table  :insights  :next  :prev  :zoom+  :zoom-  \
                         :1-:5 (suggestion, before the first question)  :help  :quit";

async fn chat(app: &App) -> Result<()> {
    let page = Arc::new(open_page(app).await?);
    let _loader = tokio::spawn({
        let page = page.clone();
        async move { page.mount().await }
    });

    println!(
        "{}",
        style("Ask Finsights questions about your bank statements").bold()
    );
    println!("{CHAT_HELP}");
    for (idx, suggestion) in PROMPT_SUGGESTIONS.iter().enumerate() {
        println!("  :{} {}", idx + 1, suggestion);
    }
    print!("{}", page.render());

    loop {
        let line = tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()
        })
        .await??;
        print_alerts(&page);

        let command = line.trim();
        let rerender = match command {
            ":quit" | ":q" => break,
            ":help" => {
                println!("{CHAT_HELP}");
                false
            }
            ":doc" => {
                page.toggle_document();
                true
            }
            ":table" => {
                page.select_view(ViewMode::Table);
                true
            }
            ":insights" => {
                page.toggle_insights();
                true
            }
            ":next" => {
                page.next_page();
                true
            }
            ":prev" => {
                page.prev_page();
                true
            }
            ":zoom+" => {
                page.zoom_in();
                true
            }
            ":zoom-" => {
                page.zoom_out();
                true
            }
            _ => {
                let outcome = match command
                    .strip_prefix(':')
                    .and_then(|n| n.parse::<usize>().ok())
                {
                    Some(n) if (1..=page.chat().suggestions().len()).contains(&n) => {
                        page.chat().send_suggestion(n - 1).await
                    }
                    Some(_) => {
                        println!("No such suggestion. {CHAT_HELP}");
                        SendOutcome::Ignored
                    }
                    None => page.chat().send_query(&line).await,
                };
                if outcome != SendOutcome::Ignored {
                    if let Some(reply) = page.chat().messages().last() {
                        if reply.role == Role::Assistant {
                            println!("{} {}", style("finsights:").cyan(), reply.content);
                        }
                    }
                }
                false
            }
        };
        if rerender {
            print!("{}", page.render());
        }
    }

    page.dispose();
    Ok(())
}
