use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use proctor_core::{ClockEvent, Countdown};

use super::SessionEvent;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Once-per-second countdown running on the tokio timer.
///
/// Every run is stamped with a generation. `stop` bumps the generation
/// before aborting the task, so a tick already in flight is recognisably
/// stale and the driver discards it.
#[derive(Debug)]
pub struct TickerClock {
    period: Duration,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl TickerClock {
    #[must_use]
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Generation of the current (or last) run.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start a fresh countdown, replacing any previous run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, total_secs: u32, sink: UnboundedSender<SessionEvent>) {
        self.stop();
        let generation = self.generation();
        let live = Arc::clone(&self.generation);
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            let mut countdown = Countdown::new(total_secs);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if live.load(Ordering::SeqCst) != generation {
                    break;
                }
                let Some(event) = countdown.tick() else {
                    break;
                };
                tracing::debug!(?event, generation, "clock tick");
                if sink.send(SessionEvent::Clock { generation, event }).is_err() {
                    break;
                }
                if event == ClockEvent::Expired {
                    break;
                }
            }
        }));
        tracing::debug!(total_secs, generation, "clock started");
    }

    /// Idempotent. No tick of the stopped run is accepted afterwards.
    pub fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("clock stopped");
        }
    }
}

impl Default for TickerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TickerClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_then_expires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clock = TickerClock::new();
        clock.start(3, tx);
        let generation = clock.generation();

        let mut events = Vec::new();
        while let Some(SessionEvent::Clock { event, generation: g }) = rx.recv().await {
            assert_eq!(g, generation);
            events.push(event);
            if event == ClockEvent::Expired {
                break;
            }
        }
        assert_eq!(
            events,
            vec![
                ClockEvent::Tick { remaining: 2 },
                ClockEvent::Tick { remaining: 1 },
                ClockEvent::Expired,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_silences_further_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clock = TickerClock::new();
        clock.start(10, tx);
        let first = rx.recv().await;
        assert!(matches!(
            first,
            Some(SessionEvent::Clock {
                event: ClockEvent::Tick { remaining: 9 },
                ..
            })
        ));

        let stale = clock.generation();
        clock.stop();
        clock.stop();
        assert_ne!(clock.generation(), stale);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert!(!clock.is_running());
    }
}
