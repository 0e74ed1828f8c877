use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio_util::sync::CancellationToken;
use tracing::info;

use kafkalens::app::{App, AppOptions};
use kafkalens::clipboard::SystemClipboard;
use kafkalens::config::AppConfig;
use kafkalens::dispatch::{spawn_signal_dispatcher, SignalSender, UiQueue, UiQueueReceiver};
use kafkalens::supervisor::Recovery;
use kafkalens::{events, logging, ui};
use kafkalens_adapters::{Gateway, MemoryGateway};

/// Interval between generated messages in demo mode.
const DEMO_TRAFFIC_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "kafkalens")]
#[command(about = "Terminal dashboard for exploring Kafka topics, consumer groups and contexts")]
struct Args {
    /// Config file (TOML/YAML); defaults to ./kafkalens.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Context to start in
    #[arg(long)]
    context: Option<String>,

    /// Bootstrap brokers for an ad-hoc context (host:port[,host:port])
    #[arg(short, long, conflicts_with = "demo")]
    brokers: Option<String>,

    /// Explore a built-in cluster with generated traffic
    #[arg(long)]
    demo: bool,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Resource poll interval (e.g., "5s")
    #[arg(long)]
    poll_interval: Option<String>,

    /// Topic table refresh interval (e.g., "100ms")
    #[arg(short, long)]
    refresh: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(interval) = args.poll_interval {
        config.poll_interval = interval;
    }
    if let Some(refresh) = args.refresh {
        config.refresh_interval = refresh;
    }

    let log_path = args
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(logging::default_log_path);
    // The UI owns the terminal, so a log file that can't be opened just means no logs.
    let _ = logging::init(&log_path);

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let traffic = CancellationToken::new();
    let gateway: Arc<dyn Gateway> = if args.demo {
        let gateway = Arc::new(MemoryGateway::demo());
        gateway.spawn_traffic(DEMO_TRAFFIC_INTERVAL, traffic.clone());
        gateway as Arc<dyn Gateway>
    } else {
        connect(&config, args.context.as_deref(), args.brokers.as_deref())?
    };

    let recovery = Recovery::new();
    let options = AppOptions {
        gateway,
        poll_interval: config.poll_interval()?,
        refresh_interval: config.refresh_interval()?,
        default_flags: config.consume_flags(),
        theme: ui::Theme::auto_detect(),
        recovery: recovery.clone(),
    };

    let result = run_tui(options, &recovery);
    traffic.cancel();

    result?;
    if let Some(reason) = recovery.reason() {
        bail!("stopped after a background failure: {}", reason);
    }
    Ok(())
}

#[cfg(feature = "kafka")]
fn connect(config: &AppConfig, context: Option<&str>, brokers: Option<&str>) -> Result<Arc<dyn Gateway>> {
    use kafkalens_adapters::KafkaGateway;

    let mut builder = KafkaGateway::builder();
    if let Some(brokers) = brokers {
        builder = builder.profile("cli", brokers).current("cli");
    } else {
        if config.contexts.is_empty() {
            bail!("no contexts configured; pass --brokers, --demo or a config file");
        }
        for ctx in &config.contexts {
            builder = builder.profile(&ctx.name, &ctx.brokers);
        }
        if let Some(current) = context.or(config.initial_context()) {
            builder = builder.current(current);
        }
    }
    let gateway = builder.build().context("connecting to Kafka")?;
    info!(context = %gateway.current_context(), "connected");
    Ok(Arc::new(gateway))
}

#[cfg(not(feature = "kafka"))]
fn connect(_config: &AppConfig, _context: Option<&str>, _brokers: Option<&str>) -> Result<Arc<dyn Gateway>> {
    bail!("built without the `kafka` feature; only --demo is available")
}

/// Run the TUI until the user quits or a background task fails
fn run_tui(options: AppOptions, recovery: &Recovery) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let (ui_queue, mut ui_rx) = UiQueue::channel();
    let (signals, signal_rx) = SignalSender::channel();
    spawn_signal_dispatcher(signal_rx, ui_queue.clone(), recovery.clone());

    let mut app = App::new(options, ui_queue, signals, Box::new(SystemClipboard::new()));
    info!("kafkalens started");

    let result = run_app(&mut terminal, &mut app, &mut ui_rx, recovery);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ui_rx: &mut UiQueueReceiver<App>,
    recovery: &Recovery,
) -> Result<()> {
    while app.running {
        ui_rx.drain(app);
        if recovery.is_triggered() {
            break;
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(50))? {
            events::handle_key_event(app, key);
        }
    }
    info!("kafkalens stopped");
    Ok(())
}
