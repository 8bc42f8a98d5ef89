//! Session controller
//!
//! Owns the session start timestamp and both telemetry streams, and keeps
//! the sensor subscriptions in step with the session state. Subscription
//! flags make repeated unsubscribes harmless.

use crate::clock::Timestamp;
use crate::config::TelemetryConfig;
use crate::state::{SessionEvent, SessionState};
use crate::telemetry::{AccelError, AccelPipeline, CompassChannel, CompassError, CompassOutcome};
use crate::traits::{AccelSample, CompassReading, SensorService, Transport};

/// Errors from session operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// A sensor callback arrived while no session is running
    NotCollecting,
    Accel(AccelError),
    Compass(CompassError),
}

impl From<AccelError> for SessionError {
    fn from(e: AccelError) -> Self {
        SessionError::Accel(e)
    }
}

impl From<CompassError> for SessionError {
    fn from(e: CompassError) -> Self {
        SessionError::Compass(e)
    }
}

/// Outcome of ending a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReport {
    /// No session was running
    NotRunning,
    /// Session stopped; the remaining compass pairs were handed to the transport
    Flushed { pairs: usize },
    /// Session stopped; sending the remaining compass pairs failed
    FlushFailed(CompassError),
    /// Session stopped by link loss; buffered pairs were discarded
    Dropped,
}

/// Sensor subscriptions currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Subscriptions {
    pub accel: bool,
    pub compass: bool,
}

/// Start/stop coordination for the telemetry streams
#[derive(Debug, Clone)]
pub struct SessionController {
    config: TelemetryConfig,
    state: SessionState,
    started_at: Option<Timestamp>,
    subscriptions: Subscriptions,
    accel: AccelPipeline,
    compass: CompassChannel,
}

impl SessionController {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: SessionState::Stopped,
            started_at: None,
            subscriptions: Subscriptions::default(),
            accel: AccelPipeline::new(),
            compass: CompassChannel::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state.is_collecting()
    }

    /// Start of the current or most recent session
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn subscriptions(&self) -> Subscriptions {
        self.subscriptions
    }

    pub fn accel(&self) -> &AccelPipeline {
        &self.accel
    }

    pub fn compass(&self) -> &CompassChannel {
        &self.compass
    }

    /// Begin collecting at `now`
    ///
    /// Returns false if a session is already running.
    pub fn start<S: SensorService>(&mut self, now: Timestamp, sensors: &mut S) -> bool {
        let next = self.state.transition(SessionEvent::Start);
        if next == self.state {
            return false;
        }

        self.started_at = Some(now);
        self.accel.begin(now);
        self.compass.begin(now);

        sensors.subscribe_accel(self.config.sampling_rate, self.config.accel_batch_size);
        self.subscriptions.accel = true;
        sensors.subscribe_compass(self.config.heading_filter_deg);
        self.subscriptions.compass = true;

        self.state = next;
        true
    }

    /// End the session, sending any buffered compass pairs first
    pub fn stop<S, T>(&mut self, sensors: &mut S, transport: &mut T) -> StopReport
    where
        S: SensorService,
        T: Transport,
    {
        self.end(SessionEvent::Stop, sensors, transport)
    }

    /// End the session after link loss, without flushing
    ///
    /// Subscriptions are released even if no session was running.
    pub fn link_lost<S, T>(&mut self, sensors: &mut S, transport: &mut T) -> StopReport
    where
        S: SensorService,
        T: Transport,
    {
        self.release(sensors);
        self.end(SessionEvent::LinkLost, sensors, transport)
    }

    fn end<S, T>(&mut self, event: SessionEvent, sensors: &mut S, transport: &mut T) -> StopReport
    where
        S: SensorService,
        T: Transport,
    {
        let next = self.state.transition(event);
        if next == self.state {
            return StopReport::NotRunning;
        }

        let report = if event.flushes() {
            match self.compass.flush_remaining(transport) {
                Ok(pairs) => StopReport::Flushed { pairs },
                Err(e) => StopReport::FlushFailed(e),
            }
        } else {
            self.compass.discard();
            StopReport::Dropped
        };
        self.release(sensors);
        self.state = next;
        report
    }

    /// Drop every held subscription; already released ones are skipped
    pub fn release<S: SensorService>(&mut self, sensors: &mut S) {
        if self.subscriptions.accel {
            sensors.unsubscribe_accel();
            self.subscriptions.accel = false;
        }
        if self.subscriptions.compass {
            sensors.unsubscribe_compass();
            self.subscriptions.compass = false;
        }
    }

    /// Forward an accelerometer batch
    pub fn on_accel_batch<T: Transport>(
        &mut self,
        samples: &[AccelSample],
        timestamp: Timestamp,
        transport: &mut T,
    ) -> Result<(), SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }
        self.accel.on_batch(samples, timestamp, transport)?;
        Ok(())
    }

    /// Buffer a compass reading observed at `now`
    pub fn on_compass<T: Transport>(
        &mut self,
        reading: CompassReading,
        now: Timestamp,
        transport: &mut T,
    ) -> Result<CompassOutcome, SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }
        Ok(self.compass.on_reading(reading, now, transport)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SamplingRate;
    use crate::telemetry::ACCEL_BATCH_SIZE;
    use esw_protocol::{Outbox, TransportError};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SensorCall {
        SubscribeAccel(SamplingRate, usize),
        UnsubscribeAccel,
        SubscribeCompass(u16),
        UnsubscribeCompass,
    }

    #[derive(Default)]
    struct FakeSensors {
        calls: Vec<SensorCall>,
    }

    impl SensorService for FakeSensors {
        fn subscribe_accel(&mut self, rate: SamplingRate, batch_size: usize) {
            self.calls.push(SensorCall::SubscribeAccel(rate, batch_size));
        }

        fn unsubscribe_accel(&mut self) {
            self.calls.push(SensorCall::UnsubscribeAccel);
        }

        fn subscribe_compass(&mut self, heading_filter_deg: u16) {
            self.calls.push(SensorCall::SubscribeCompass(heading_filter_deg));
        }

        fn unsubscribe_compass(&mut self) {
            self.calls.push(SensorCall::UnsubscribeCompass);
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        sent: Vec<Outbox>,
        refuse: Option<TransportError>,
    }

    impl Transport for FakeTransport {
        fn send(&mut self, message: &Outbox) -> Result<(), TransportError> {
            if let Some(e) = self.refuse {
                return Err(e);
            }
            self.sent.push(message.clone());
            Ok(())
        }
    }

    fn ms(t: u64) -> Timestamp {
        Timestamp::from_millis(t)
    }

    #[test]
    fn test_start_subscribes_both_streams() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();

        assert!(session.start(ms(1000), &mut sensors));

        assert_eq!(session.state(), SessionState::Collecting);
        assert_eq!(session.started_at(), Some(ms(1000)));
        assert_eq!(
            sensors.calls,
            [
                SensorCall::SubscribeAccel(SamplingRate::Hz25, ACCEL_BATCH_SIZE),
                SensorCall::SubscribeCompass(1),
            ]
        );
    }

    #[test]
    fn test_second_start_ignored() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();

        session.start(ms(1000), &mut sensors);
        assert!(!session.start(ms(2000), &mut sensors));
        assert_eq!(session.started_at(), Some(ms(1000)));
        assert_eq!(sensors.calls.len(), 2);
    }

    #[test]
    fn test_compass_scenario_from_session_start() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(1000), &mut sensors);
        session
            .on_compass(CompassReading::calibrated(10), ms(1010), &mut transport)
            .unwrap();
        session
            .on_compass(CompassReading::calibrated(15), ms(1015), &mut transport)
            .unwrap();

        assert_eq!(session.compass().cursor(), 4);
        assert_eq!(session.compass().active_buffer().valid(), &[10, 10, 15, 15]);
    }

    #[test]
    fn test_stop_flushes_then_unsubscribes() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(0), &mut sensors);
        for i in 0..3 {
            session
                .on_compass(CompassReading::calibrated(i), ms(i as u64 * 10), &mut transport)
                .unwrap();
        }

        let report = session.stop(&mut sensors, &mut transport);

        assert_eq!(report, StopReport::Flushed { pairs: 3 });
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].count(), 3);
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.subscriptions(), Subscriptions::default());
        assert_eq!(
            &sensors.calls[2..],
            [SensorCall::UnsubscribeAccel, SensorCall::UnsubscribeCompass]
        );
    }

    #[test]
    fn test_stop_with_empty_buffer_sends_nothing() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(0), &mut sensors);
        assert_eq!(
            session.stop(&mut sensors, &mut transport),
            StopReport::Flushed { pairs: 0 }
        );
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_stop_reports_flush_failure_and_still_stops() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(0), &mut sensors);
        session
            .on_compass(CompassReading::calibrated(90), ms(5), &mut transport)
            .unwrap();
        transport.refuse = Some(TransportError::Busy);

        assert_eq!(
            session.stop(&mut sensors, &mut transport),
            StopReport::FlushFailed(CompassError::Transport(TransportError::Busy))
        );
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.compass().cursor(), 0);
    }

    #[test]
    fn test_stop_when_stopped_is_no_op() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        assert_eq!(
            session.stop(&mut sensors, &mut transport),
            StopReport::NotRunning
        );
        assert!(sensors.calls.is_empty());
    }

    #[test]
    fn test_link_lost_drops_without_flush() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(0), &mut sensors);
        session
            .on_compass(CompassReading::calibrated(90), ms(5), &mut transport)
            .unwrap();

        assert_eq!(
            session.link_lost(&mut sensors, &mut transport),
            StopReport::Dropped
        );
        assert!(transport.sent.is_empty());
        assert_eq!(session.compass().cursor(), 0);
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn test_double_unsubscribe_is_harmless() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();

        session.start(ms(0), &mut sensors);
        session.stop(&mut sensors, &mut transport);
        assert_eq!(
            session.link_lost(&mut sensors, &mut transport),
            StopReport::NotRunning
        );
        session.release(&mut sensors);

        let unsubscribes = sensors
            .calls
            .iter()
            .filter(|c| matches!(c, SensorCall::UnsubscribeAccel))
            .count();
        assert_eq!(unsubscribes, 1);
    }

    #[test]
    fn test_callbacks_outside_session_rejected() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut transport = FakeTransport::default();
        let samples = [AccelSample::default(); ACCEL_BATCH_SIZE];

        assert_eq!(
            session.on_accel_batch(&samples, ms(0), &mut transport),
            Err(SessionError::NotCollecting)
        );
        assert_eq!(
            session.on_compass(CompassReading::calibrated(1), ms(0), &mut transport),
            Err(SessionError::NotCollecting)
        );
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_accel_deltas_relative_to_session_start() {
        let mut session = SessionController::new(TelemetryConfig::default());
        let mut sensors = FakeSensors::default();
        let mut transport = FakeTransport::default();
        let samples = [AccelSample::new(1, 2, 3); ACCEL_BATCH_SIZE];

        session.start(ms(10_000), &mut sensors);
        session
            .on_accel_batch(&samples, ms(11_000), &mut transport)
            .unwrap();

        assert_eq!(transport.sent[0].reader().get(0), Some("1000"));
        assert_eq!(transport.sent[0].reader().get(1), Some("1,2,3"));
    }
}
