use crate::ui;
use color_eyre::eyre::{Result, eyre};
use lucky_wheel::SpinError;
use lucky_wheel::audio::{SilentSounds, SoundPort, TerminalBell};
use lucky_wheel::backend::{HttpBackend, SpinBackend};
use lucky_wheel::session::{ChannelReconfig, ReconfigSource, WheelEngine, WheelReconfig};
use lucky_wheel::tracker::ControlFace;
use lucky_wheel::wheel::WheelState;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_url: String,
    pub silent: bool,
    /// How often the wheel version is polled for reconfiguration.
    pub poll_secs: u64,
    /// Fixed animation length; `None` keeps the randomized default.
    pub spin_ms: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: String::from("http://localhost:8000/wheel"),
            silent: false,
            poll_secs: 15,
            spin_ms: None,
        }
    }
}

/// Sound output picked at startup; both arms swallow their own failures.
pub enum AppSounds {
    Bell(TerminalBell),
    Silent(SilentSounds),
}

impl SoundPort for AppSounds {
    fn play_tick(&self) {
        match self {
            AppSounds::Bell(bell) => bell.play_tick(),
            AppSounds::Silent(s) => s.play_tick(),
        }
    }

    fn play_win(&self) {
        match self {
            AppSounds::Bell(bell) => bell.play_win(),
            AppSounds::Silent(s) => s.play_win(),
        }
    }
}

/// Everything one draw needs, captured at a single instant.
pub struct WheelSnapshot {
    pub wheel: WheelState,
    pub angle: f64,
    pub face: ControlFace,
    pub gate_label: String,
    pub status: String,
    pub result_message: Option<String>,
    pub out_of_sync: bool,
    pub errors: Vec<String>,
}

pub async fn run_app(app_config: AppConfig) -> Result<()> {
    let backend = HttpBackend::new(&app_config.server_url).map_err(|e| eyre!("{e}"))?;
    let wheel_config = backend
        .fetch_config()
        .await
        .map_err(|e| eyre!("failed to load wheel configuration: {e}"))?;
    info!(
        version = wheel_config.version_id,
        sectors = wheel_config.sectors.len(),
        "wheel configuration loaded"
    );

    let sounds = if app_config.silent {
        AppSounds::Silent(SilentSounds)
    } else {
        AppSounds::Bell(TerminalBell)
    };

    let initial_version = wheel_config.version_id.clone();
    let mut engine = WheelEngine::new(backend.clone(), sounds, wheel_config);
    if let Some(ms) = app_config.spin_ms {
        engine = engine.with_spin_duration(Duration::from_millis(ms));
    }
    engine.start_tracker();
    engine.refresh_gate(Instant::now()).await.ok();

    let (send, reconfig) = ChannelReconfig::channel(4);
    let poller = tokio::spawn(poll_wheel_version(
        backend,
        initial_version,
        Duration::from_secs(app_config.poll_secs),
        send,
    ));

    let mut ui_state = ui::UiState::default();
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut engine, reconfig, &mut ui_state).await;
    ui::terminal_exit()?;
    poller.abort();
    res
}

/// Detects server-side wheel replacement by re-reading the configuration and
/// forwarding it whenever the version token changes.
async fn poll_wheel_version(
    backend: HttpBackend,
    mut last_version: String,
    every: Duration,
    send: tokio::sync::mpsc::Sender<WheelReconfig>,
) {
    let mut ticker = time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match backend.fetch_config().await {
            Ok(config) if config.version_id != last_version => {
                last_version = config.version_id.clone();
                let change = WheelReconfig {
                    sectors: config.sectors,
                    version_id: config.version_id,
                };
                if send.send(change).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => warn!("version poll failed: {e}"),
        }
    }
}

async fn run_loop(
    engine: &mut WheelEngine<HttpBackend, AppSounds>,
    mut reconfig: ChannelReconfig,
    ui_state: &mut ui::UiState,
) -> Result<()> {
    let mut frames = time::interval(Duration::from_millis(33));
    let mut seconds = time::interval(Duration::from_secs(1));
    let mut face = ControlFace::default();
    let mut reconfig_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = frames.tick() => {
                let now = Instant::now();
                let update = engine.frame(now);
                face = update.face;
                if update.finished {
                    engine.refresh_gate(now).await.ok();
                }
                while let Some(ev) = ui::poll_event()? {
                    match ev {
                        ui::UserEvent::Quit => return Ok(()),
                        ui::UserEvent::Dismiss => engine.dismiss_result(),
                        ui::UserEvent::Back => {
                            if matches!(
                                engine.phase(),
                                lucky_wheel::session::SpinPhase::ShowingResult { .. }
                            ) {
                                engine.dismiss_result();
                            } else {
                                return Ok(());
                            }
                        }
                        ui::UserEvent::Spin => {
                            match engine.trigger_spin(Instant::now()).await {
                                Ok(_) => {}
                                Err(SpinError::VersionConflict { .. }) => {
                                    return Err(eyre!(
                                        "the wheel was reconfigured on the server; \
                                         restart to pick up the new wheel"
                                    ));
                                }
                                // Already logged and surfaced in the error pane.
                                Err(_) => {}
                            }
                        }
                    }
                }
                ui::draw(ui_state, &snapshot(engine, &face, now))?;
            }
            _ = seconds.tick() => {
                // Countdown label only changes once a second.
                ui::draw(ui_state, &snapshot(engine, &face, Instant::now()))?;
            }
            change = reconfig.next_change(), if reconfig_open => {
                match change {
                    Some(change) => engine.apply_reconfiguration(change),
                    None => reconfig_open = false,
                }
            }
        }
    }
    Ok(())
}

fn snapshot(
    engine: &WheelEngine<HttpBackend, AppSounds>,
    face: &ControlFace,
    now: Instant,
) -> WheelSnapshot {
    let result_message = match engine.phase() {
        lucky_wheel::session::SpinPhase::ShowingResult { message } => Some(message.clone()),
        _ => None,
    };
    WheelSnapshot {
        wheel: engine.wheel().clone(),
        angle: engine.display_angle(now),
        face: face.clone(),
        gate_label: engine.gate().label(now),
        status: engine.status().to_string(),
        result_message,
        out_of_sync: engine.is_out_of_sync(),
        errors: engine.recent_errors(2),
    }
}
