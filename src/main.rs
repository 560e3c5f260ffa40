use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voice_qa::{
    create_router, AppState, Config, ControllerHandle, HttpAnswerClient, InteractionController,
    RecognitionAdapter, RecognitionBackendConfig, RecognitionBackendFactory, SessionSnapshot,
};

#[derive(Debug, Parser)]
#[command(name = "voice-qa", version, about = "Voice-driven question answering client")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/voice-qa")]
    config: String,

    /// Override the answer endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the recognition locale (BCP-47)
    #[arg(long)]
    language: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal: Enter toggles capture, `q` quits
    Repl,
    /// Serve the control API
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(endpoint) = cli.endpoint {
        cfg.answer.endpoint = endpoint;
    }
    if let Some(language) = cli.language {
        cfg.recognition.language = language;
    }
    cfg.validate()?;

    info!("Voice Q&A v{}", env!("CARGO_PKG_VERSION"));
    info!("Recognition locale: {}", cfg.recognition.language);

    let controller = build_controller(&cfg)?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => run_repl(controller.spawn()).await,
        Command::Serve { bind, port } => {
            let bind = bind.unwrap_or(cfg.http.bind.clone());
            let port = port.unwrap_or(cfg.http.port);
            serve(controller.spawn(), &bind, port).await
        }
    }
}

fn build_controller(cfg: &Config) -> Result<InteractionController> {
    let backend = RecognitionBackendFactory::create(
        cfg.recognition.source.clone(),
        RecognitionBackendConfig {
            language: cfg.recognition.language.clone(),
            ..Default::default()
        },
    );

    let mut adapter = RecognitionAdapter::new(backend);
    if adapter.is_available() {
        adapter.configure(&cfg.recognition.language)?;
    }

    let answers = HttpAnswerClient::new(cfg.answer.endpoint.clone(), cfg.answer.timeout())
        .context("Failed to create answer client")?;
    info!("Answer endpoint: {}", answers.endpoint());

    Ok(InteractionController::new(
        cfg.session.clone(),
        adapter,
        Arc::new(answers),
        cfg.answer.timeout(),
    ))
}

async fn run_repl(controller: ControllerHandle) -> Result<()> {
    let mut updates = controller.subscribe();
    render(&updates.borrow_and_update());

    if !controller.snapshot().capture_enabled {
        warn!("Capture is disabled; press q to quit");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line?.as_deref().map(str::trim) {
                    None | Some("q") | Some("quit") => break,
                    Some(_) => controller.toggle()?,
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&updates.borrow_and_update());
            }
        }
    }

    controller.shutdown().await
}

async fn serve(controller: ControllerHandle, bind: &str, port: u16) -> Result<()> {
    let app = create_router(AppState::new(controller.clone()));
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Control API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    controller.shutdown().await
}

fn render(snapshot: &SessionSnapshot) {
    println!("[{}] {}", snapshot.phase, snapshot.status);
    if let Some(notice) = &snapshot.notice {
        println!("  ! {}", notice);
    }
    if let Some(transcript) = &snapshot.transcript {
        println!("  heard:  {}", transcript);
    }
    if let Some(answer) = &snapshot.answer {
        println!("  answer: {}", answer);
    }
    if let Some(error) = &snapshot.error {
        println!("  error:  {}", error);
    }
    if snapshot.is_listening() {
        println!("  (Enter to stop)");
    }
}
