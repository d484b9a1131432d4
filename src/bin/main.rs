use anyhow::Result;
use dayslip::cli;
use dayslip::client::{AgendaClient, StoredTokens};
use dayslip::config::Config;
use dayslip::context::{AppContext, StandardContext};
use dayslip::executor::JobRunner;
use dayslip::printer::{ConsoleSink, SerialPrinter};
use dayslip::scheduler;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // --root <path> may appear anywhere; strip it before subcommand parsing.
    let mut rest: Vec<String> = Vec::new();
    let mut root: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--root" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a path", args[i]);
                    std::process::exit(2);
                }
                root = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            other => {
                rest.push(other.to_string());
                i += 1;
            }
        }
    }

    if rest.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        cli::print_help("dayslip");
        return Ok(());
    }

    let ctx: Arc<dyn AppContext> = Arc::new(StandardContext::new(root));

    if rest.first().map(String::as_str) == Some("config-path") {
        println!("{}", Config::get_path_string(ctx.as_ref())?);
        return Ok(());
    }

    init_logging(ctx.as_ref());

    let config = Config::load_or_default(ctx.as_ref());
    let auto_start = config.auto_start;
    let shared_config = Arc::new(RwLock::new(config));

    match rest.first().map(String::as_str) {
        Some("print") => {
            let console = rest.iter().any(|a| a == "--console");
            let runner = build_runner(ctx.as_ref(), &shared_config, console, None).await?;
            let outcome = runner.run_once().await;
            println!("{}", outcome.message);
            if !outcome.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Some("daemon") => run_daemon(ctx, shared_config).await,
        None if auto_start => run_daemon(ctx, shared_config).await,
        None => {
            cli::print_help("dayslip");
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command '{}'. See 'dayslip --help'.", other);
            std::process::exit(2);
        }
    }
}

async fn run_daemon(ctx: Arc<dyn AppContext>, config: Arc<RwLock<Config>>) -> Result<()> {
    let (outcome_tx, mut outcome_rx) = mpsc::channel(16);
    let runner = build_runner(ctx.as_ref(), &config, false, Some(outcome_tx)).await?;

    let handle = scheduler::spawn(runner, config);
    println!("Dayslip daemon running; Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(outcome) = outcome_rx.recv() => {
                let tag = if outcome.success { "ok" } else { "FAILED" };
                println!("[{}] {}", tag, outcome.message);
            }
        }
    }

    // Stop issuing triggers; an in-flight job finishes on its own.
    handle.stop_and_join().await;
    Ok(())
}

async fn build_runner(
    ctx: &dyn AppContext,
    config: &Arc<RwLock<Config>>,
    console_primary: bool,
    outcomes: Option<mpsc::Sender<dayslip::model::JobOutcome>>,
) -> Result<Arc<JobRunner>> {
    let snapshot = config.read().await.clone();

    let tokens = StoredTokens::new(ctx, &snapshot.token_url)
        .map_err(|e| anyhow::anyhow!("Credential setup failed: {}", e))?;
    let client = Arc::new(AgendaClient::new(
        &snapshot.calendar_url,
        &snapshot.tasks_url,
        tokens,
        snapshot.fetch_timeout_secs,
    ));

    let printer: Arc<dyn dayslip::printer::ReportSink> = if console_primary {
        Arc::new(ConsoleSink)
    } else {
        Arc::new(SerialPrinter::new(
            &snapshot.printer_port,
            snapshot.printer_baudrate,
            Duration::from_secs(snapshot.print_timeout_secs),
        ))
    };

    Ok(Arc::new(JobRunner::new(
        client.clone(),
        client,
        printer,
        Arc::new(ConsoleSink),
        config.clone(),
        outcomes,
    )))
}

fn init_logging(ctx: &dyn AppContext) {
    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = ctx.get_log_path()
        && let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path)
    {
        loggers.push(WriteLogger::new(
            LevelFilter::Info,
            simplelog::Config::default(),
            file,
        ));
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
