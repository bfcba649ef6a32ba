//! CLI entry point for `mboxview`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{info, warn};

use mboxview::api::{self, AppState};
use mboxview::config::{self, Config};
use mboxview::search::query::{ListQuery, QueryParams};
use mboxview::search::{self, IdMode};
use mboxview::store::archive::Archive;

#[derive(Parser)]
#[command(
    name = "mboxview",
    version,
    about = "Browse an MBOX archive from the browser",
    long_about = "Serves the messages of an MBOX archive as JSON (filtered, paginated \
                  listings and single-message lookups) together with a small browser client."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// MBOX file to serve (same as `mboxview serve FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the archive over HTTP
    Serve {
        /// MBOX file (defaults to the configured archive)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding index.html and the .js/.css assets
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
        /// How listing ids are numbered
        #[arg(long, value_enum)]
        id_mode: Option<IdMode>,
    },
    /// Print one page of a listing as JSON
    List {
        path: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        page: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        per_page: Option<i64>,
        /// Substring of subject or sender
        #[arg(long)]
        search: Option<String>,
        /// Substring of sender
        #[arg(long)]
        sender: Option<String>,
        /// Earliest date, YYYY-MM-DD
        #[arg(long)]
        from_date: Option<String>,
        /// Latest date, YYYY-MM-DD
        #[arg(long)]
        to_date: Option<String>,
        /// How listing ids are numbered
        #[arg(long, value_enum)]
        id_mode: Option<IdMode>,
    },
    /// Print one message as JSON
    Show {
        path: PathBuf,
        /// Absolute archive position
        #[arg(long, allow_hyphen_values = true)]
        id: i64,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; failures are reported once logging is set up
    let (config, config_error) = match config::load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match (config_error, config::config_file_path()) {
        (Some(e), _) => warn!(error = %e, "Failed to load config, using defaults"),
        (None, Some(path)) if path.exists() => {
            info!(path = %path.display(), "Loaded config");
        }
        _ => {}
    }

    match cli.command {
        Some(Commands::Serve {
            file,
            host,
            port,
            static_dir,
            id_mode,
        }) => {
            let opts = ServeOptions {
                file,
                host,
                port,
                static_dir,
                id_mode,
            };
            cmd_serve(opts, &config).await
        }
        None => {
            let opts = ServeOptions {
                file: cli.file,
                ..ServeOptions::default()
            };
            cmd_serve(opts, &config).await
        }
        Some(Commands::List {
            path,
            page,
            per_page,
            search,
            sender,
            from_date,
            to_date,
            id_mode,
        }) => {
            let mut pairs = Vec::new();
            let numbers = [("page", page), ("per_page", per_page)];
            for (key, value) in numbers {
                if let Some(v) = value {
                    pairs.push((key.to_string(), v.to_string()));
                }
            }
            let texts = [
                ("search", search),
                ("sender", sender),
                ("from_date", from_date),
                ("to_date", to_date),
            ];
            for (key, value) in texts {
                if let Some(v) = value {
                    pairs.push((key.to_string(), v));
                }
            }
            let id_mode = id_mode.unwrap_or(config.query.id_mode);
            cmd_list(&path, QueryParams::new(pairs), id_mode, &config)
        }
        Some(Commands::Show { path, id }) => cmd_show(&path, id, &config),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxview.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Command-line overrides for the `[server]` and `[query]` config sections.
#[derive(Default)]
struct ServeOptions {
    file: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    id_mode: Option<IdMode>,
}

/// Open the archive and serve it until Ctrl-C.
async fn cmd_serve(opts: ServeOptions, config: &Config) -> anyhow::Result<()> {
    use humansize::{format_size, BINARY};

    let path = opts.file.unwrap_or_else(|| config.server.archive.clone());
    let archive = open_archive(&path, config)?;

    let host = opts.host.unwrap_or_else(|| config.server.host.clone());
    let port = opts.port.unwrap_or(config.server.port);
    let static_dir = opts
        .static_dir
        .unwrap_or_else(|| config.server.static_dir.clone());

    info!(
        archive = %path.display(),
        size = %format_size(archive.file_size()?, BINARY),
        static_dir = %static_dir.display(),
        "Archive ready"
    );
    info!("Server running at http://{host}:{port}/");

    let state = Arc::new(AppState {
        archive,
        static_dir,
        id_mode: opts.id_mode.unwrap_or(config.query.id_mode),
        default_per_page: config.query.default_per_page,
    });

    api::serve(&format!("{host}:{port}"), state).await?;
    Ok(())
}

/// Print one listing page as JSON.
fn cmd_list(
    path: &Path,
    params: QueryParams,
    id_mode: IdMode,
    config: &Config,
) -> anyhow::Result<()> {
    let archive = open_archive(path, config)?;
    let query = ListQuery::from_params(&params, config.query.default_per_page)?;
    let page = search::list_emails(&archive, &query, id_mode)?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// Print the message at an absolute archive position as JSON.
fn cmd_show(path: &Path, id: i64, config: &Config) -> anyhow::Result<()> {
    let archive = open_archive(path, config)?;
    match search::find_email(&archive, id)? {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => anyhow::bail!("Email not found"),
    }
}

fn open_archive(path: &Path, config: &Config) -> anyhow::Result<Archive> {
    if !path.exists() {
        anyhow::bail!("MBOX file not found: {}", path.display());
    }
    Ok(Archive::open(path, &config.performance)?)
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxview", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
