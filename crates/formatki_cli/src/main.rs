//! Command-line front end for the Formatki generation service.
//!
//! Read commands call the service directly. `generate` drives a full form
//! session (cascade, paste resolution, validation, submission) and prints what
//! a graphical form would have shown.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use formatki_client::HttpCatalog;
use formatki_core::constants::DEFAULT_GENERATED_FILENAME;
use formatki_core::{
    candidates, Config, EmailStore, FileEmailStore, MemoryEmailStore, RemoteCatalog, TagSet,
};
use formatki_session::{spawn_backend, FormSession, RenderCmd, Stage, UiEvent};
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formatki", about = "Formatki generator CLI", version)]
struct Cli {
    /// Server URL (can also be set via FORMATKI_SERVER env var)
    #[arg(short, long, env = "FORMATKI_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, env = "FORMATKI_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List the selectable categories
    Categories,
    /// List GT codes for a category
    Gt {
        category: String,
        /// Keep only codes containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List KW codes for one or more GT codes
    Kw {
        #[arg(required = true)]
        gt: Vec<String>,
    },
    /// Expand pasted text into GT codes of a category
    Resolve { category: String, raw: String },
    /// Fill the form and request a generated file
    Generate {
        #[arg(short, long)]
        category: String,
        /// GT codes to select (repeatable)
        #[arg(long = "gt")]
        gt: Vec<String>,
        /// Pasted GT text resolved by the service
        #[arg(long)]
        gt_paste: Option<String>,
        /// KW codes to select (repeatable)
        #[arg(long = "kw")]
        kw: Vec<String>,
        /// Pasted KW text, separated by ',' or ';'
        #[arg(long)]
        kw_paste: Option<String>,
        /// Recipient addresses; defaults to the remembered email
        #[arg(short, long)]
        email: Option<String>,
        /// Save the generated file into this directory when a link is offered
        #[arg(long)]
        download_dir: Option<PathBuf>,
        /// Print every render command to stderr
        #[arg(long)]
        trace_render: bool,
    },
}

struct GenerateArgs {
    category: String,
    gt: Vec<String>,
    gt_paste: Option<String>,
    kw: Vec<String>,
    kw_paste: Option<String>,
    email: Option<String>,
    download_dir: Option<PathBuf>,
    trace_render: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("formatki=warn,formatki_session=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn fail(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn explicit_server_override(server: Option<String>) -> Option<String> {
    server.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_server(server: Option<String>, config: &Config) -> String {
    explicit_server_override(server).unwrap_or_else(|| config.server_url.clone())
}

fn resolve_timeout(timeout: Option<u64>, config: &Config) -> u64 {
    timeout.filter(|secs| *secs > 0).unwrap_or(config.timeout_secs)
}

fn format_list_output(items: &[String], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(items)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(items.join("\n"))
}

fn print_list(action: &str, items: &[String], json: bool) {
    match format_list_output(items, json) {
        Ok(output) if !output.is_empty() => println!("{}", output),
        Ok(_) => {}
        Err(message) => fail(action, message),
    }
}

/// Spelling of `typed` as it appears in `available`, if it appears at all.
fn canonical_token(available: &[String], typed: &str) -> Option<String> {
    let typed = typed.trim().to_lowercase();
    available
        .iter()
        .find(|item| item.to_lowercase() == typed)
        .cloned()
}

fn download_target(dir: &Path, label: &str) -> PathBuf {
    let name = Path::new(label)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_GENERATED_FILENAME);
    dir.join(name)
}

fn save_download(dir: &Path, label: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = download_target(dir, label);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

fn summary_json(session: &FormSession, saved: Option<&Path>) -> Value {
    let state = session.form_state();
    let message = session.message();
    json!({
        "category": state.category,
        "gt": state.gt,
        "kw": state.kw,
        "email": state.email,
        "message": message.map(|m| m.text.clone()),
        "is_error": message.map(|m| m.is_error).unwrap_or(false),
        "download_url": session.download().map(|link| link.url.clone()),
        "saved_to": saved.map(|path| path.display().to_string()),
    })
}

/// Headless stand-in for the form view: forwards events and drains renders.
struct Driver {
    session: FormSession,
    wait: Duration,
    trace_render: bool,
}

impl Driver {
    fn send(&mut self, event: UiEvent) {
        debug!(?event, "ui event");
        self.session.handle(event);
        self.flush();
    }

    /// Wait for outstanding requests and fail on any error message they left.
    fn settle(&mut self, action: &str) {
        let settled = self.session.pump(self.wait);
        self.flush();
        if !settled {
            fail(
                action,
                format!("no answer from the service within {:?}", self.wait),
            );
        }
        if let Some(message) = self.session.message() {
            if message.is_error {
                fail(action, &message.text);
            }
        }
    }

    fn flush(&mut self) {
        for cmd in self.session.drain_render() {
            if self.trace_render {
                eprintln!("[render] {:?}", cmd);
            }
            if let RenderCmd::ShowMessage { text, is_error } = &cmd {
                if !is_error {
                    info!("{}", text);
                }
            }
        }
    }

    fn select(&mut self, stage: Stage, typed: &str) {
        let Some(token) = canonical_token(self.session.available(stage), typed) else {
            fail(
                "Generate",
                format!("unknown {} code '{}'", stage.label(), typed.trim()),
            );
        };
        self.send(UiEvent::TextTyped { stage, text: token });
        self.send(UiEvent::EnterPressed { stage });
    }
}

fn run_generate(catalog: HttpCatalog, config: &Config, args: GenerateArgs, json: bool, timeout: u64) {
    let store: Box<dyn EmailStore> = if config.remember_email {
        Box::new(FileEmailStore::in_dir(&config.state_dir))
    } else {
        Box::new(MemoryEmailStore::default())
    };
    let downloader = catalog.clone();
    let mut driver = Driver {
        session: FormSession::new(spawn_backend(catalog), store),
        wait: Duration::from_secs(timeout.saturating_mul(2).max(1)),
        trace_render: args.trace_render,
    };
    driver.flush();
    driver.settle("Loading categories");

    let Some(category) = canonical_token(driver.session.categories(), &args.category) else {
        fail(
            "Generate",
            format!("unknown category '{}'", args.category.trim()),
        );
    };
    driver.send(UiEvent::CategoryChanged(category));
    driver.settle("Loading GT list");

    if let Some(raw) = &args.gt_paste {
        driver.send(UiEvent::Pasted {
            stage: Stage::Gt,
            text: raw.clone(),
        });
        driver.settle("Resolving GT paste");
    }
    for gt in &args.gt {
        driver.select(Stage::Gt, gt);
        driver.settle("Loading KW list");
    }

    if let Some(raw) = &args.kw_paste {
        driver.send(UiEvent::Pasted {
            stage: Stage::Kw,
            text: raw.clone(),
        });
    }
    for kw in &args.kw {
        driver.select(Stage::Kw, kw);
    }

    if let Some(email) = args.email {
        driver.send(UiEvent::EmailEdited(email));
    }
    driver.send(UiEvent::Submitted);
    driver.settle("Generate");

    let mut saved = None;
    if let (Some(dir), Some(link)) = (&args.download_dir, driver.session.download()) {
        let bytes = match downloader.download(&link.url) {
            Ok(bytes) => bytes,
            Err(err) => fail("Download", err),
        };
        match save_download(dir, &link.label, &bytes) {
            Ok(path) => saved = Some(path),
            Err(err) => fail("Download", err),
        }
    }

    if json {
        match serde_json::to_string_pretty(&summary_json(&driver.session, saved.as_deref())) {
            Ok(output) => println!("{}", output),
            Err(err) => fail("Generate", format!("response encoding error: {}", err)),
        }
        return;
    }
    if let Some(message) = driver.session.message() {
        println!("{}", message.text);
    }
    if let Some(link) = driver.session.download() {
        match &saved {
            Some(path) => println!("Saved: {}", path.display()),
            None => println!("Download: {}", link.url),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let config = Config::from_env();
    let server = resolve_server(server, &config);
    let timeout = resolve_timeout(timeout, &config);
    let mut catalog = HttpCatalog::new(&server, Duration::from_secs(timeout))?;
    info!(server = %catalog.base_url(), timeout, "using generation service");

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Categories => match catalog.categories() {
            Ok(items) => print_list("Categories", &items, json),
            Err(err) => fail("Categories", err),
        },
        Commands::Gt { category, filter } => match catalog.gt_list(category.trim()) {
            Ok(items) => {
                let prefix = filter.unwrap_or_default();
                let items = candidates(&items, &TagSet::new(), &prefix);
                print_list("GT", &items, json);
            }
            Err(err) => fail("GT", err),
        },
        Commands::Kw { gt } => {
            let mut selected = TagSet::new();
            for token in &gt {
                if !selected.add(token) {
                    warn!(token = %token, "ignoring blank or repeated GT code");
                }
            }
            match catalog.kw_list(selected.as_slice()) {
                Ok(items) => print_list("KW", &items, json),
                Err(err) => fail("KW", err),
            }
        }
        Commands::Resolve { category, raw } => match catalog.resolve_gt(category.trim(), &raw) {
            Ok(items) => print_list("Resolve", &items, json),
            Err(err) => fail("Resolve", err),
        },
        Commands::Generate {
            category,
            gt,
            gt_paste,
            kw,
            kw_paste,
            email,
            download_dir,
            trace_render,
        } => {
            let args = GenerateArgs {
                category,
                gt,
                gt_paste,
                kw,
                kw_paste,
                email,
                download_dir,
                trace_render,
            };
            run_generate(catalog, &config, args, json, timeout);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
