//! Interrupt-driven read loop
//!
//! The sensor pulls its interrupt line low when it has an event. The loop
//! samples the line; each sample that finds it low triggers exactly one read
//! exchange before the line is sampled again. Events raised faster than one
//! loop iteration collapse into a single read.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use touchit_hal::Transport;
use touchit_protocol::{Position, Touch};

use crate::device::{Error, TouchIt};

/// Default pause between samples of an idle line
pub const DEFAULT_INTERVAL_US: u32 = 1_000;

/// Longest pause between samples; bounds how late a cancel is noticed
pub const MAX_INTERVAL_US: u32 = 1_000_000;

/// Poll loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollState {
    /// Interrupt line released
    #[default]
    Idle,
    /// Line held low, one read exchange owed
    EventPending,
}

/// Inputs to the poll state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollEvent {
    /// Line sampled low
    Asserted,
    /// Line sampled high or unreadable
    Released,
    /// The read exchange finished, successfully or not
    ExchangeDone,
}

impl PollState {
    /// Process an event and return the next state
    pub fn transition(self, event: PollEvent) -> Self {
        use PollEvent::*;
        use PollState::*;

        match (self, event) {
            (Idle, Asserted) => EventPending,
            (EventPending, ExchangeDone) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

/// Which exchange an event triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadMode {
    /// Coarse `GetTouch`
    #[default]
    Touch,
    /// Fine `GetPosition`
    Position,
}

/// Result of one successful read exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    Touch(Touch),
    Position(Position),
}

/// Counters kept across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollStats {
    /// Events detected (one exchange each)
    pub events: u32,
    /// Exchanges that failed and were skipped
    pub failures: u32,
}

/// Samples the interrupt line and reads the sensor on each event
pub struct Poller<'a, T, D> {
    device: &'a mut TouchIt<T>,
    delay: D,
    mode: ReadMode,
    interval_us: u32,
    state: PollState,
    stats: PollStats,
}

impl<'a, T: Transport, D: DelayNs> Poller<'a, T, D> {
    pub fn new(device: &'a mut TouchIt<T>, delay: D, mode: ReadMode) -> Self {
        Self {
            device,
            delay,
            mode,
            interval_us: DEFAULT_INTERVAL_US,
            state: PollState::Idle,
            stats: PollStats::default(),
        }
    }

    /// Pause between idle samples; 0 spins without sleeping
    ///
    /// Clamped to [`MAX_INTERVAL_US`].
    pub fn with_interval_us(mut self, interval_us: u32) -> Self {
        self.interval_us = interval_us.min(MAX_INTERVAL_US);
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Run one loop iteration
    ///
    /// Returns `None` when no event was pending, otherwise the outcome of
    /// the single exchange the event triggered.
    pub fn poll_once(&mut self) -> Option<Result<Report, Error<T::Error>>> {
        let sample = if self.device.event_pending() {
            PollEvent::Asserted
        } else {
            PollEvent::Released
        };
        self.state = self.state.transition(sample);

        if self.state != PollState::EventPending {
            if self.interval_us > 0 {
                self.delay.delay_us(self.interval_us);
            }
            return None;
        }

        let result = self.read();
        self.state = self.state.transition(PollEvent::ExchangeDone);

        self.stats.events = self.stats.events.wrapping_add(1);
        if result.is_err() {
            self.stats.failures = self.stats.failures.wrapping_add(1);
        }
        Some(result)
    }

    /// Loop until `cancel` is set, handing each report to `emit`
    ///
    /// Failed exchanges are logged and skipped.
    pub fn run<F>(&mut self, cancel: &AtomicBool, mut emit: F) -> PollStats
    where
        F: FnMut(Report),
    {
        debug!("Poll loop started ({:?} mode)", self.mode);

        while !cancel.load(Ordering::Relaxed) {
            match self.poll_once() {
                Some(Ok(report)) => emit(report),
                Some(Err(e)) => warn!("{:?} read failed, skipping: {e:?}", self.mode),
                None => {}
            }
        }

        debug!("Poll loop stopped: {:?}", self.stats);
        self.stats
    }

    fn read(&mut self) -> Result<Report, Error<T::Error>> {
        match self.mode {
            ReadMode::Touch => self.device.touch().map(Report::Touch),
            ReadMode::Position => self.device.position().map(Report::Position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{response, MockTransport};
    use touchit_protocol::messages::{CMD_GET_POSITION, CMD_GET_TOUCH};
    use touchit_protocol::Address;

    /// Counts delay calls instead of sleeping
    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, _ns: u32) {
            self.calls += 1;
        }
    }

    #[test]
    fn test_transitions() {
        assert_eq!(PollState::Idle.transition(PollEvent::Asserted), PollState::EventPending);
        assert_eq!(PollState::Idle.transition(PollEvent::Released), PollState::Idle);
        assert_eq!(PollState::Idle.transition(PollEvent::ExchangeDone), PollState::Idle);
        assert_eq!(
            PollState::EventPending.transition(PollEvent::ExchangeDone),
            PollState::Idle
        );
        assert_eq!(
            PollState::EventPending.transition(PollEvent::Asserted),
            PollState::EventPending
        );
    }

    #[test]
    fn test_single_assert_triggers_single_exchange() {
        let mut mock = MockTransport::new();
        mock.queue_notify(&[false, true, false, false]);
        mock.queue_response(response(CMD_GET_TOUCH, &[0x05]));
        let mut dev = TouchIt::new(mock, Address::DEFAULT);

        let mut poller = Poller::new(&mut dev, CountingDelay::default(), ReadMode::Touch);
        let outcomes: Vec<_> = (0..4).filter_map(|_| poller.poll_once()).collect();

        assert_eq!(outcomes, vec![Ok(Report::Touch(Touch { position: 0x05 }))]);
        assert_eq!(poller.state(), PollState::Idle);
        assert_eq!(poller.stats(), PollStats { events: 1, failures: 0 });
        assert_eq!(poller.delay.calls, 3);

        assert_eq!(dev.release().writes_of(CMD_GET_TOUCH), 1);
    }

    #[test]
    fn test_failed_exchange_returns_to_idle() {
        let mut mock = MockTransport::new();
        mock.queue_notify(&[true, true]);
        // First read gets a corrupted frame, second a good one
        let mut bad = response(CMD_GET_TOUCH, &[0x03]);
        bad[4] ^= 0xFF;
        mock.queue_response(bad);
        mock.queue_response(response(CMD_GET_TOUCH, &[0x04]));
        let mut dev = TouchIt::new(mock, Address::DEFAULT);

        let mut poller = Poller::new(&mut dev, CountingDelay::default(), ReadMode::Touch);
        assert!(matches!(poller.poll_once(), Some(Err(Error::Frame(_)))));
        assert_eq!(poller.state(), PollState::Idle);
        assert_eq!(
            poller.poll_once(),
            Some(Ok(Report::Touch(Touch { position: 0x04 })))
        );
        assert_eq!(poller.stats(), PollStats { events: 2, failures: 1 });
        // Events never wait on the delay
        assert_eq!(poller.delay.calls, 0);
    }

    #[test]
    fn test_position_mode() {
        let mut mock = MockTransport::new();
        mock.queue_notify(&[true]);
        mock.queue_response(response(CMD_GET_POSITION, &[0x01, 0x00, 0x00, 0x20]));
        let mut dev = TouchIt::new(mock, Address::DEFAULT);

        let mut poller = Poller::new(&mut dev, CountingDelay::default(), ReadMode::Position);
        assert_eq!(
            poller.poll_once(),
            Some(Ok(Report::Position(Position { x: 0x0100, y: 0x0020 })))
        );
        assert_eq!(dev.release().writes_of(CMD_GET_TOUCH), 0);
    }

    #[test]
    fn test_zero_interval_never_sleeps() {
        let mut dev = TouchIt::new(MockTransport::new(), Address::DEFAULT);
        let mut poller =
            Poller::new(&mut dev, CountingDelay::default(), ReadMode::Touch).with_interval_us(0);

        for _ in 0..10 {
            assert_eq!(poller.poll_once(), None);
        }
        assert_eq!(poller.delay.calls, 0);
    }

    #[test]
    fn test_interval_is_clamped() {
        /// Records the longest requested pause
        #[derive(Default)]
        struct LongestDelay {
            longest_ns: u32,
        }

        impl DelayNs for LongestDelay {
            fn delay_ns(&mut self, ns: u32) {
                self.longest_ns = self.longest_ns.max(ns);
            }
        }

        let mut dev = TouchIt::new(MockTransport::new(), Address::DEFAULT);
        let mut poller =
            Poller::new(&mut dev, LongestDelay::default(), ReadMode::Touch).with_interval_us(u32::MAX);

        assert_eq!(poller.interval_us, MAX_INTERVAL_US);
        assert_eq!(poller.poll_once(), None);
        assert!(poller.delay.longest_ns <= 1_000_000_000);
    }

    #[test]
    fn test_run_stops_on_cancel() {
        let mut dev = TouchIt::new(MockTransport::new(), Address::DEFAULT);
        let cancel = AtomicBool::new(true);
        let mut reports = Vec::new();

        let stats = Poller::new(&mut dev, CountingDelay::default(), ReadMode::Touch)
            .run(&cancel, |report| reports.push(report));

        assert_eq!(stats, PollStats::default());
        assert!(reports.is_empty());
        assert!(dev.release().reads.is_empty());
    }

    #[test]
    fn test_run_emits_reports() {
        /// Delay that raises the cancel flag after a few idle samples
        struct CancelAfter<'c> {
            flag: &'c AtomicBool,
            remaining: u32,
        }

        impl DelayNs for CancelAfter<'_> {
            fn delay_ns(&mut self, _ns: u32) {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.flag.store(true, Ordering::Relaxed);
                }
            }
        }

        let mut mock = MockTransport::new();
        mock.queue_notify(&[false, true, false, true, false]);
        mock.queue_response(response(CMD_GET_TOUCH, &[0x01]));
        mock.queue_response(response(CMD_GET_TOUCH, &[0x02]));
        let mut dev = TouchIt::new(mock, Address::DEFAULT);

        let cancel = AtomicBool::new(false);
        let delay = CancelAfter {
            flag: &cancel,
            remaining: 3,
        };
        let mut reports = Vec::new();
        let stats = Poller::new(&mut dev, delay, ReadMode::Touch)
            .run(&cancel, |report| reports.push(report));

        assert_eq!(
            reports,
            vec![
                Report::Touch(Touch { position: 0x01 }),
                Report::Touch(Touch { position: 0x02 }),
            ]
        );
        assert_eq!(stats.events, 2);
    }
}
