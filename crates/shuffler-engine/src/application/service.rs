//! Async host for the selection engine.
//!
//! `EngineService` owns one `SelectionEngine` and drives its timers on
//! tokio time. A background task sleeps until the next deadline and fires
//! due timers; every control call and read also catches the engine up to
//! the current instant first, so callers never observe a stale schedule.
//!
//! The `Mutex` is only held for synchronous engine calls, never across an
//! await point.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use shuffler_core::clock::Clock;
use shuffler_core::error::EngineError;
use shuffler_core::event::DomainEvent;
use shuffler_core::rng::DeterministicRng;
use shuffler_core::sink::{ResultsSink, SavedResults};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::config::EngineConfig;
use crate::domain::engine::{EngineSnapshot, SelectionEngine, Transition};
use crate::domain::events::EngineEvent;

struct Inner {
    engine: SelectionEngine,
    rng: Box<dyn DeterministicRng>,
}

impl Inner {
    fn catch_up(&mut self, now: Duration) {
        let fired = self.engine.advance_to(now, self.rng.as_mut());
        if fired > 0 {
            debug!(fired, now = ?now, "fired due timers");
        }
        log_events(self.engine.drain_events());
    }
}

struct Shared {
    state: Mutex<Inner>,
    wake: Notify,
    epoch: Instant,
    stopped: AtomicBool,
}

impl Shared {
    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, EngineError> {
        self.state
            .lock()
            .map_err(|e| EngineError::Infrastructure(format!("engine mutex poisoned: {e}")))
    }

    /// Fires due timers and returns the next deadline.
    fn tick(&self) -> Result<Option<Duration>, EngineError> {
        let mut inner = self.lock()?;
        inner.catch_up(self.elapsed());
        Ok(inner.engine.next_deadline())
    }
}

fn log_events(events: Vec<EngineEvent>) {
    for event in events {
        info!(
            event_type = event.event_type(),
            occurred_at = ?event.occurred_at,
            payload = %event.to_payload(),
            "engine event"
        );
    }
}

async fn drive(shared: Arc<Shared>) {
    loop {
        let next = match shared.tick() {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, "engine driver stopped");
                return;
            }
        };

        match next {
            Some(deadline) => {
                tokio::select! {
                    () = tokio::time::sleep_until(shared.epoch + deadline) => {}
                    () = shared.wake.notified() => {}
                }
            }
            None => shared.wake.notified().await,
        }
    }
}

/// A running selection engine.
pub struct EngineService {
    shared: Arc<Shared>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ResultsSink>,
    driver: JoinHandle<()>,
}

impl fmt::Debug for EngineService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineService")
            .field("epoch", &self.shared.epoch)
            .finish_non_exhaustive()
    }
}

impl EngineService {
    /// Builds the engine and starts its timer driver on the current tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the configuration is
    /// inconsistent.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
        sink: Arc<dyn ResultsSink>,
    ) -> Result<Self, EngineError> {
        let engine = SelectionEngine::new(config)?;
        let shared = Arc::new(Shared {
            state: Mutex::new(Inner { engine, rng }),
            wake: Notify::new(),
            epoch: Instant::now(),
            stopped: AtomicBool::new(false),
        });
        let driver = tokio::spawn(drive(Arc::clone(&shared)));
        info!("selection engine started");

        Ok(Self {
            shared,
            clock,
            sink,
            driver,
        })
    }

    /// Runs `f` against the engine after catching it up to now, logs the
    /// resulting events and wakes the driver so it picks up any new timers.
    /// Refused once the service has shut down, since nothing would fire the
    /// timers `f` schedules.
    fn control<T>(
        &self,
        f: impl FnOnce(&mut SelectionEngine, &mut dyn DeterministicRng, Duration) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let result = {
            let mut inner = self.shared.lock()?;
            if self.shared.stopped.load(Ordering::Acquire) {
                return Err(EngineError::Infrastructure(
                    "selection engine has shut down".to_string(),
                ));
            }
            let now = self.shared.elapsed();
            inner.catch_up(now);
            let Inner { engine, rng } = &mut *inner;
            let result = f(engine, rng.as_mut(), now);
            log_events(engine.drain_events());
            result
        };
        self.shared.wake.notify_one();
        result
    }

    /// Reads from the engine after catching it up to now.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Infrastructure` if the engine lock is poisoned.
    pub fn read<T>(&self, f: impl FnOnce(&SelectionEngine) -> T) -> Result<T, EngineError> {
        let mut inner = self.shared.lock()?;
        inner.catch_up(self.shared.elapsed());
        Ok(f(&inner.engine))
    }

    /// Captures the current render state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Infrastructure` if the engine lock is poisoned.
    pub fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        self.read(SelectionEngine::snapshot)
    }

    /// Starts a shuffle.
    ///
    /// # Errors
    ///
    /// See [`SelectionEngine::shuffle_display`].
    pub fn shuffle_display(&self) -> Result<Transition, EngineError> {
        self.control(|engine, _, now| engine.shuffle_display(now))
    }

    /// Starts a pick.
    ///
    /// # Errors
    ///
    /// See [`SelectionEngine::pick_prizes`].
    pub fn pick_prizes(&self) -> Result<Transition, EngineError> {
        self.control(|engine, rng, now| engine.pick_prizes(now, rng))
    }

    /// Resets the engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Infrastructure` if the engine lock is poisoned.
    pub fn reset(&self) -> Result<Transition, EngineError> {
        self.control(|engine, _, now| Ok(engine.reset(now)))
    }

    /// Hands the finished draw to the results sink. Returns `Ok(None)` when
    /// there is nothing to save yet. A sink failure is returned to the
    /// caller but never changes engine state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persistence` if the sink fails, or
    /// `EngineError::PreconditionViolated` under the strict guard policy.
    pub async fn save_results(&self) -> Result<Option<SavedResults>, EngineError> {
        let Some(draw) = self.control(|engine, _, _| engine.save_results())? else {
            debug!("save requested before prizes were picked");
            return Ok(None);
        };

        let saved = SavedResults {
            draw_id: Uuid::new_v4(),
            saved_at: self.clock.now(),
            prizes: draw.prizes,
            pool: draw.pool,
            prize_names: draw.prize_names,
        };

        if let Err(err) = self.sink.persist(&saved).await {
            warn!(draw_id = %saved.draw_id, error = %err, "failed to persist results");
            return Err(err);
        }

        info!(draw_id = %saved.draw_id, "results saved");
        Ok(Some(saved))
    }

    /// Stops the driver and cancels every outstanding timer. Later control
    /// calls fail with `EngineError::Infrastructure`. Also runs on drop.
    pub fn shutdown(&self) {
        self.driver.abort();
        let mut inner = match self.shared.state.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.shared.stopped.store(true, Ordering::Release);
        inner.engine.teardown();
    }

    #[cfg(test)]
    fn status_without_catch_up(&self) -> crate::domain::engine::EngineStatus {
        self.shared.state.lock().unwrap().engine.status()
    }
}

impl Drop for EngineService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
