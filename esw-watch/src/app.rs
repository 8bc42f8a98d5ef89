//! Watch application
//!
//! Owns every collaborator and dispatches queued events to the session
//! controller, the alert protocol and the UI. Handlers run to completion;
//! outcomes the core returns are logged here and never escalate.

use embedded_hal::delay::DelayNs;

use esw_core::alert::{AlertProtocol, ReplyOutcome};
use esw_core::clock::{Timestamp, WallTime};
use esw_core::config::{load_settings, save_settings, ConfigError, Settings, TelemetryConfig};
use esw_core::session::{SessionController, SessionError, StopReport};
use esw_core::telemetry::CompassOutcome;
use esw_core::traits::{
    AccelSample, Clock, CompassReading, MessageChannel, SensorService, SettingsStore,
    StorageError, Ui,
};
use esw_core::uplink::{LinkStats, Uplink};
use esw_protocol::{DictReader, PhoneCommand, RecordingCommand, ReplyToken, TransportError};

use crate::channels::{EventQueue, Inbox};
use crate::events::{Button, Event};

pub const WELCOME_TEXT: &str = "Welcome to ESW!";
pub const WAITING_TEXT: &str = "Waiting for new message...";
pub const DISCONNECTED_TEXT: &str = "Phone is not connected";
pub const CONFIRMED_YES_TEXT: &str = "Confirmed as yes! Waiting for new message...";
pub const CONFIRMED_NO_TEXT: &str = "Not now! Waiting for new message...";
pub const VIBRATION_ON_TEXT: &str = "Vibration on";
pub const VIBRATION_OFF_TEXT: &str = "Vibration off";

/// The watch app
///
/// - `inbox`: where received dictionaries wait for [`Event::Inbound`]
/// - `C`: raw platform outbox
/// - `S`: sensor service
/// - `K`: millisecond clock
/// - `U`: rendering layer
/// - `D`: blocking delay for reply retries
/// - `P`: settings storage
pub struct App<'a, C, S, K, U, D, P> {
    inbox: &'a Inbox,
    uplink: Uplink<C>,
    sensors: S,
    clock: K,
    ui: U,
    delay: D,
    store: P,
    session: SessionController,
    alert: AlertProtocol,
    settings: Settings,
}

impl<'a, C, S, K, U, D, P> App<'a, C, S, K, U, D, P>
where
    C: MessageChannel,
    S: SensorService,
    K: Clock,
    U: Ui,
    D: DelayNs,
    P: SettingsStore,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TelemetryConfig,
        inbox: &'a Inbox,
        channel: C,
        sensors: S,
        clock: K,
        ui: U,
        delay: D,
        store: P,
    ) -> Self {
        Self {
            inbox,
            uplink: Uplink::new(channel),
            sensors,
            clock,
            ui,
            delay,
            store,
            session: SessionController::new(config),
            alert: AlertProtocol::with_retry(config.reply_attempts, config.reply_retry_delay_ms),
            settings: Settings::default(),
        }
    }

    /// Load stored settings and greet the user
    pub fn boot(&mut self) {
        self.settings = match load_settings(&mut self.store) {
            Ok(settings) => settings,
            Err(ConfigError::Storage(StorageError::NotFound)) => {
                debug!("No stored settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to load settings: {:?}", e);
                Settings::default()
            }
        };
        info!(
            "Watch app started, vibration {}",
            self.settings.vibrate_on_alert
        );
        self.ui.present(WELCOME_TEXT);
    }

    /// Release both sensor subscriptions without flushing
    pub fn shutdown(&mut self) {
        let report = self.session.link_lost(&mut self.sensors, &mut self.uplink);
        info!("Watch app stopping: {:?}", report);
    }

    /// Handle every queued event in arrival order
    ///
    /// Returns the number of events handled.
    pub fn run_pending(&mut self, queue: &EventQueue) -> usize {
        let mut handled = 0;
        while let Ok(event) = queue.try_receive() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::AccelBatch { timestamp, samples } => self.on_accel_batch(timestamp, &samples),
            Event::Compass(reading) => self.on_compass(reading),
            Event::Inbound => self.on_inbound(),
            Event::InboxDropped(reason) => self.on_inbox_dropped(reason),
            Event::OutboxSent => self.on_outbox_sent(),
            Event::OutboxFailed(reason) => self.on_outbox_failed(reason),
            Event::Button(button) => self.on_button(button),
            Event::ConnectionChanged(connected) => self.on_connection_changed(connected),
            Event::MinuteTick(time) => self.on_minute_tick(time),
        }
    }

    fn on_accel_batch(&mut self, timestamp: Timestamp, samples: &[AccelSample]) {
        match self
            .session
            .on_accel_batch(samples, timestamp, &mut self.uplink)
        {
            Ok(()) => trace!("Accel batch sent"),
            Err(SessionError::NotCollecting) => debug!("Accel batch outside session, ignored"),
            Err(e) => warn!("Accel batch dropped: {:?}", e),
        }
    }

    fn on_compass(&mut self, reading: CompassReading) {
        let now = self.clock.now();
        match self.session.on_compass(reading, now, &mut self.uplink) {
            Ok(CompassOutcome::Ignored(status)) => trace!("Compass not calibrated: {:?}", status),
            Ok(CompassOutcome::Buffered { cursor }) => trace!("Compass buffered, cursor {}", cursor),
            Ok(CompassOutcome::Flushed { from, pairs }) => {
                debug!("Compass buffer {:?} flushed, {} pairs", from, pairs)
            }
            Err(SessionError::NotCollecting) => debug!("Compass event outside session, ignored"),
            Err(e) => warn!("Compass flush failed: {:?}", e),
        }
    }

    fn on_inbound(&mut self) {
        let message = match self.inbox.try_receive() {
            Ok(message) => message,
            Err(_) => {
                debug!("Inbox empty");
                return;
            }
        };

        let reader = match DictReader::new(&message) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Malformed inbound message: {:?}", e);
                return;
            }
        };

        for tuple in reader {
            let tuple = match tuple {
                Ok(tuple) => tuple,
                Err(e) => {
                    warn!("Malformed inbound tuple: {:?}", e);
                    break;
                }
            };
            match PhoneCommand::from_tuple(&tuple) {
                Some(command) => self.on_command(command),
                None => debug!("Ignoring inbound key {}", tuple.key),
            }
        }
    }

    fn on_command(&mut self, command: PhoneCommand<'_>) {
        match command {
            PhoneCommand::Recording(RecordingCommand::On) => {
                let now = self.clock.now();
                if self.session.start(now, &mut self.sensors) {
                    info!("Recording started at {} ms", now.as_millis());
                    self.ui.set_recording_indicator(true);
                } else {
                    debug!("Recording already running");
                }
            }
            PhoneCommand::Recording(RecordingCommand::Off) => {
                match self.session.stop(&mut self.sensors, &mut self.uplink) {
                    StopReport::NotRunning => debug!("Recording not running"),
                    StopReport::FlushFailed(e) => {
                        warn!("Recording stopped, final compass flush failed: {:?}", e)
                    }
                    report => info!("Recording stopped: {:?}", report),
                }
                self.ui.set_recording_indicator(false);
            }
            PhoneCommand::Alert(text) => {
                if self.alert.on_alert(text) {
                    warn!("Alert truncated from {} bytes", text.len());
                }
                info!("Alert received");
                self.ui.present(self.alert.text());
                if self.settings.vibrate_on_alert {
                    self.ui.vibrate_short();
                }
            }
        }
    }

    fn on_inbox_dropped(&mut self, reason: TransportError) {
        self.uplink.on_inbox_dropped(reason);
        warn!("Inbound message dropped: {}", reason.as_str());
    }

    fn on_outbox_sent(&mut self) {
        self.uplink.on_sent();
        trace!("Outbound message delivered");
    }

    fn on_outbox_failed(&mut self, reason: TransportError) {
        self.uplink.on_failed(reason);
        warn!("Outbound message failed: {}", reason.as_str());
    }

    fn on_button(&mut self, button: Button) {
        match button {
            Button::Up => self.confirm(ReplyToken::Yes),
            Button::Down if self.alert.is_pending() => self.confirm(ReplyToken::No),
            Button::Down => self.toggle_vibration(),
        }
    }

    fn confirm(&mut self, token: ReplyToken) {
        match self.alert.confirm(token, &mut self.uplink, &mut self.delay) {
            ReplyOutcome::NotPending => debug!("No alert pending"),
            ReplyOutcome::Sent { token, attempts } => {
                info!("Reply {} sent after {} attempts", token.as_str(), attempts);
                self.ui.present(match token {
                    ReplyToken::Yes => CONFIRMED_YES_TEXT,
                    ReplyToken::No => CONFIRMED_NO_TEXT,
                });
            }
            ReplyOutcome::GaveUp { token, last_error } if last_error.is_link_down() => {
                warn!("Reply {} not sent, phone unreachable", token.as_str());
                self.ui.present(DISCONNECTED_TEXT);
            }
            ReplyOutcome::GaveUp { token, last_error } => warn!(
                "Reply {} not sent: {}",
                token.as_str(),
                last_error.as_str()
            ),
        }
    }

    fn toggle_vibration(&mut self) {
        let enabled = self.settings.toggle_vibration();
        if let Err(e) = save_settings(&mut self.store, &self.settings) {
            warn!("Failed to save settings: {:?}", e);
        }
        info!("Vibration {}", enabled);
        self.ui.present(if enabled {
            VIBRATION_ON_TEXT
        } else {
            VIBRATION_OFF_TEXT
        });
    }

    fn on_connection_changed(&mut self, connected: bool) {
        if connected {
            info!("Phone connected");
            self.ui.present(WAITING_TEXT);
            return;
        }

        let report = self.session.link_lost(&mut self.sensors, &mut self.uplink);
        self.uplink.on_disconnected();
        info!("Phone disconnected: {:?}", report);
        self.ui.set_recording_indicator(false);
        self.ui.present(DISCONNECTED_TEXT);
    }

    fn on_minute_tick(&mut self, time: WallTime) {
        self.ui.show_time(time);
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn alert(&self) -> &AlertProtocol {
        &self.alert
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn link_stats(&self) -> LinkStats {
        self.uplink.stats()
    }

    pub fn channel(&self) -> &C {
        self.uplink.channel()
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}
