//! Host runner for the VayuVeer gas-leak monitor.
//!
//! Runs the real alarm engine and the real HTTP connectors against a
//! simulated MQ-6 sensor, with indicator pins that log instead of lighting
//! up. Useful for exercising the chat and store integration end to end.
//!
//! ```text
//! VAYUVEER_BOT_TOKEN=... VAYUVEER_FIREBASE_AUTH=... \
//!     vayuveer-monitor --config vayuveer.json --leak-at 30 --leak-for 20
//! ```
//!
//! Logging goes through `env_logger`; `RUST_LOG=debug` shows every tick.

mod sim;

use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use embedded_hal::delay::DelayNs;
use log::info;

use vayuveer_connectors::{
    FirebaseStore, ProbeConnectivity, QueuedRemote, ServiceConfig, TcpProbe, TelegramNotifier,
    UreqTransport,
};
use vayuveer_core::{
    AlarmAction, AlarmState, ChatNotifier, Connectivity, GasMonitor, MonotonicTime, PinIndicators,
    RemoteStore, Reporter,
};

use sim::{LogPin, SimulatedSensor, StdDelay};

/// How long a link probe result stays fresh
const LINK_RECHECK: Duration = Duration::from_secs(5);

/// VayuVeer monitor with a simulated sensor
#[derive(Parser)]
#[command(name = "vayuveer-monitor")]
#[command(about = "Run the VayuVeer gas-leak monitor against a simulated sensor", long_about = None)]
#[command(version)]
struct Cli {
    /// Service configuration file (JSON)
    #[arg(short, long, env = "VAYUVEER_CONFIG")]
    config: Option<PathBuf>,

    /// Telegram bot token, overrides the config file
    #[arg(long, env = "VAYUVEER_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Firebase database secret, overrides the config file
    #[arg(long, env = "VAYUVEER_FIREBASE_AUTH", hide_env_values = true)]
    firebase_auth: Option<String>,

    /// Stop after this many loop iterations
    #[arg(long)]
    ticks: Option<u64>,

    /// Clean-air reading of the simulated sensor
    #[arg(long, default_value_t = 1000)]
    baseline: u16,

    /// Peak noise of the simulated sensor, in ADC counts
    #[arg(long, default_value_t = 8)]
    noise: u16,

    /// Tick at which a simulated leak starts
    #[arg(long)]
    leak_at: Option<u64>,

    /// Length of the simulated leak in ticks
    #[arg(long, default_value_t = 20)]
    leak_for: u64,

    /// Raw reading during the simulated leak
    #[arg(long, default_value_t = 1600)]
    leak_level: u16,

    /// Skip the sensor warm-up
    #[arg(long)]
    no_warmup: bool,

    /// Send remote calls from a background reporter thread
    #[arg(long)]
    queued: bool,
}

impl Cli {
    fn leak_window(&self) -> Option<Range<u64>> {
        self.leak_at.map(|start| start..start.saturating_add(self.leak_for))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServiceConfig::default(),
    }
    .with_secrets(cli.bot_token.clone(), cli.firebase_auth.clone());

    if cli.no_warmup {
        config.monitor.warmup_ms = 0;
    }
    config.validate().context("invalid configuration")?;

    info!("Starting VayuVeer monitor {}", vayuveer_core::VERSION);
    info!("Telegram: {:?}", config.telegram);
    info!("Firebase: {:?}", config.firebase);

    let transport = UreqTransport::new(&config.http);
    let chat = TelegramNotifier::new(config.telegram.clone(), transport.clone())?;
    let store = FirebaseStore::new(config.firebase.clone(), transport)?;
    let link = ProbeConnectivity::new(
        TcpProbe::new(config.firebase.host(), 443, config.http.timeout()),
        LINK_RECHECK,
    );

    if cli.queued {
        let (chat, store, reporter_thread) =
            QueuedRemote::spawn(chat, store, config.queue_capacity)?;
        run(&cli, &config, Reporter::new(chat, store, link))?;

        info!("Waiting for queued reports to drain");
        reporter_thread.join()?;
    } else {
        run(&cli, &config, Reporter::new(chat, store, link))?;
    }

    Ok(())
}

/// Start the monitor and loop until the tick budget runs out
fn run<C, R, L>(cli: &Cli, config: &ServiceConfig, reporter: Reporter<C, R, L>) -> anyhow::Result<()>
where
    C: ChatNotifier,
    R: RemoteStore,
    L: Connectivity,
{
    let indicators = PinIndicators::new(
        LogPin::new("Red LED"),
        LogPin::new("Green LED"),
        LogPin::new("Buzzer"),
    );
    let sensor = SimulatedSensor::new(cli.baseline, cli.noise);
    let mut delay = StdDelay;

    let mut monitor: GasMonitor<_, _, _, _, _, _> = GasMonitor::new(
        sensor,
        indicators,
        MonotonicTime::new(),
        reporter,
        config.monitor.clone(),
    )
    .map_err(|e| anyhow::anyhow!("invalid monitor configuration: {}", e))?;

    let calibration = monitor.start(&mut delay);
    info!(
        "Calibrated: baseline {} from {} readings, threshold {}",
        calibration.baseline,
        calibration.samples_used,
        monitor.threshold()
    );

    let leak = cli.leak_window();
    let mut alerts = 0u64;
    let mut tick = 0u64;

    while cli.ticks.map_or(true, |limit| tick < limit) {
        let leaking = leak.as_ref().is_some_and(|window| window.contains(&tick));
        monitor
            .sensor_mut()
            .set_leak(leaking.then_some(cli.leak_level));

        let outcome = monitor.tick();
        if outcome.action == AlarmAction::Entered(AlarmState::Alert) {
            alerts += 1;
        }

        tick += 1;
        delay.delay_ms(config.monitor.loop_delay_ms);
    }

    info!(
        "Stopped after {} ticks: {} alert(s), state {}",
        tick,
        alerts,
        monitor.state().name()
    );
    Ok(())
}
