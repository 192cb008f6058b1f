//! Periodic location reporting while sharing is active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::channel::{Channel, RelayMessage};
use crate::device::LocationProvider;
use crate::state::SharedSession;

pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(30);
pub const MIN_REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct LocationReporter {
    session: SharedSession,
    location: Arc<dyn LocationProvider>,
    channel: Option<Arc<dyn Channel>>,
    interval: Duration,
}

/// A running reporter. Dropping it stops the timer as well.
pub struct ReporterHandle {
    stopped: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Cancel the timer. A fix already in flight still completes and refreshes
    /// the device position, but nothing more is emitted.
    pub fn stop(&self) {
        let _ = self.stopped.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl LocationReporter {
    /// Intervals shorter than [`MIN_REPORT_INTERVAL`] are raised to it.
    pub fn new(
        session: SharedSession,
        location: Arc<dyn LocationProvider>,
        channel: Option<Arc<dyn Channel>>,
        interval: Duration,
    ) -> Self {
        if interval < MIN_REPORT_INTERVAL {
            tracing::warn!(
                "Report interval {:?} too short, using {:?}",
                interval,
                MIN_REPORT_INTERVAL
            );
        }

        Self {
            session,
            location,
            channel,
            interval: interval.max(MIN_REPORT_INTERVAL),
        }
    }

    /// Arm the timer. The first tick fires one interval from now.
    pub fn start(&self) -> ReporterHandle {
        let (stopped, stopped_rx) = watch::channel(false);
        let task = tokio::spawn(self.clone().run(stopped_rx));
        tracing::info!("Reporting location every {:?}", self.interval);
        ReporterHandle { stopped, task }
    }

    async fn run(self, mut stopped: watch::Receiver<bool>) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let in_flight = Arc::new(AtomicBool::new(false));

        loop {
            tokio::select! {
                biased;
                _ = stopped.changed() => break,
                _ = ticker.tick() => {}
            }

            if in_flight.swap(true, Ordering::AcqRel) {
                tracing::debug!("Previous fix still in flight, skipping tick");
                continue;
            }

            let reporter = self.clone();
            let in_flight = in_flight.clone();
            let stopped = stopped.clone();
            tokio::spawn(async move {
                reporter.tick(&stopped).await;
                in_flight.store(false, Ordering::Release);
            });
        }

        tracing::info!("Location reporting stopped");
    }

    async fn tick(&self, stopped: &watch::Receiver<bool>) {
        let position = match self.location.current_position().await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Skipping location report: {}", e);
                return;
            }
        };

        let (start_point, stop_point) = {
            let mut session = self.session.lock().await;
            session.device_position = Some(position);
            (session.start_point, session.stop_point)
        };

        if *stopped.borrow() {
            tracing::debug!("Sharing stopped while acquiring a fix, not sending it");
            return;
        }

        let Some(channel) = &self.channel else {
            tracing::debug!("No relay channel, position {:?} kept locally", position);
            return;
        };

        channel.emit(RelayMessage::LocationUpdate(position));
        channel.emit(RelayMessage::Endpoints {
            start_point,
            stop_point,
        });
        tracing::info!("Location sent: {:?}", position);
    }
}
