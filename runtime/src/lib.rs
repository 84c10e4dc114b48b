//! # Pestaway Runtime
//!
//! Runtime implementation for the Pestaway session engine.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: the runtime that manages state and executes effects
//! - **Effect Driver**: executes effect descriptions and feeds produced
//!   actions back into the reducer
//! - **Action Broadcast**: lets callers wait for a terminal action
//!   (request-response over the feedback loop)
//!
//! ## Example
//!
//! ```ignore
//! use pestaway_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action and wait for its effect cascade to settle
//! let handle = store.send(Action::Next).await?;
//! handle.wait().await?;
//!
//! // Read state
//! let step = store.state(|s| s.step).await;
//! ```

use pestaway_core::effect::Effect;
use pestaway_core::reducer::Reducer;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A task join error occurred during effect execution
        ///
        /// This typically means a spawned effect driver panicked.
        #[error("Task failed during effect execution: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// Typically means the store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for waiting on the effect cascade spawned by one `send`
///
/// The driver task runs every effect returned by the reducer, including
/// effects produced by feedback actions, before completing. Awaiting the
/// handle therefore means "everything this action set in motion is done".
#[derive(Debug)]
pub struct EffectHandle {
    driver: Option<tokio::task::JoinHandle<()>>,
}

impl EffectHandle {
    /// Create a handle that is already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub const fn completed() -> Self {
        Self { driver: None }
    }

    /// Wait for the effect cascade to complete
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if the driver task panicked.
    pub async fn wait(mut self) -> Result<(), StoreError> {
        if let Some(driver) = self.driver.take() {
            driver.await?;
        }
        Ok(())
    }

    /// Wait for the effect cascade with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the cascade did not settle in time,
    /// or [`StoreError::TaskJoinError`] if the driver task panicked.
    pub async fn wait_with_timeout(mut self, timeout: Duration) -> Result<(), StoreError> {
        if let Some(driver) = self.driver.take() {
            match tokio::time::timeout(timeout, driver).await {
                Ok(joined) => joined?,
                Err(_) => return Err(StoreError::Timeout),
            }
        }
        Ok(())
    }
}

struct StoreInner<S, A, E, R> {
    state: RwLock<S>,
    reducer: R,
    environment: E,
    shutdown: AtomicBool,
    pending_effects: AtomicUsize,
    /// Actions produced by effects are broadcast to observers. This enables
    /// request-response patterns: send a command, wait for the terminal
    /// event action.
    action_broadcast: broadcast::Sender<A>,
}

/// The Store - runtime for reducer-based session state
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// Cloning a Store yields another handle to the same state.
///
/// # Type Parameters
///
/// - `S`: state type
/// - `A`: action type
/// - `E`: environment type
/// - `R`: reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    inner: Arc<StoreInner<S, A, E, R>>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// The action broadcast capacity defaults to 16; use
    /// [`Store::with_broadcast_capacity`] if observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new store with a custom action broadcast capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                shutdown: AtomicBool::new(false),
                pending_effects: AtomicUsize::new(0),
                action_broadcast,
            }),
        }
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Spawns a driver task that executes the returned effects; actions
    ///    produced by effects are fed back through the reducer (and broadcast
    ///    to observers) until the cascade settles
    ///
    /// `send()` returns after the reducer ran, not after effects finished.
    /// Await the returned [`EffectHandle`] to wait for the cascade.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.actions.sent").increment(1);

        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        self.inner.pending_effects.fetch_add(1, Ordering::AcqRel);

        let store = self.clone();
        let driver = tokio::spawn(async move {
            for effect in effects {
                run_effect(store.clone(), effect).await;
            }
            store.inner.pending_effects.fetch_sub(1, Ordering::AcqRel);
        });

        Ok(EffectHandle {
            driver: Some(driver),
        })
    }

    /// Send an action and wait for a matching result action
    ///
    /// Designed for request-response flows: subscribe to the action
    /// broadcast BEFORE sending (avoids races), send the initial action,
    /// then wait for the first feedback action matching the predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within `timeout`
    /// - [`StoreError::ChannelClosed`]: broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut receiver = self.inner.action_broadcast.subscribe();
        let _handle = self.send(action).await?;

        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(candidate) => {
                        if predicate(&candidate) {
                            return Ok(candidate);
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Read state through a projection function
    ///
    /// Holds the read lock only for the duration of `f`.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.inner.state.read().await;
        f(&state)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// Sets the shutdown flag (rejecting new actions), then waits for
    /// pending effect cascades to complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires with
    /// effects still running.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        self.inner.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            let pending = self.inner.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Feed an effect-produced action back through the reducer
    ///
    /// The action is broadcast to observers first, then reduced; any new
    /// effects are executed inline so the surrounding driver task only
    /// finishes once the whole cascade has settled.
    async fn feedback(&self, action: A) {
        let _ = self.inner.action_broadcast.send(action.clone());
        metrics::counter!("store.actions.feedback").increment(1);

        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        for effect in effects {
            run_effect(self.clone(), effect).await;
        }
    }
}

/// Execute one effect, recursing through the feedback loop
///
/// Boxed because the cascade is recursive: a `Future` effect may produce an
/// action whose reduction produces further effects.
fn run_effect<S, A, E, R>(
    store: Store<S, A, E, R>,
    effect: Effect<A>,
) -> Pin<Box<dyn Future<Output = ()> + Send>>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                let drivers = effects
                    .into_iter()
                    .map(|e| run_effect(store.clone(), e))
                    .collect::<Vec<_>>();
                futures::future::join_all(drivers).await;
            },
            Effect::Sequential(effects) => {
                for e in effects {
                    run_effect(store.clone(), e).await;
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                store.feedback(*action).await;
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed").increment(1);
                if let Some(action) = fut.await {
                    store.feedback(action).await;
                }
            },
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use pestaway_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        count: i32,
        echoes: usize,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Increment,
        IncrementAndEcho,
        Echoed,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            (): &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                CounterAction::IncrementAndEcho => {
                    state.count += 1;
                    smallvec![Effect::future(async { Some(CounterAction::Echoed) })]
                },
                CounterAction::Echoed => {
                    state.echoes += 1;
                    smallvec![Effect::None]
                },
            }
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
    }

    #[tokio::test]
    async fn send_updates_state() {
        init_tracing();
        let store = Store::new(CounterState::default(), CounterReducer, ());
        let handle = store.send(CounterAction::Increment).await.unwrap();
        handle.wait().await.unwrap();

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn effect_feedback_reaches_reducer() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        let handle = store.send(CounterAction::IncrementAndEcho).await.unwrap();
        handle.wait().await.unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.count, 1);
        assert_eq!(state.echoes, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_matches_feedback_action() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        let result = store
            .send_and_wait_for(
                CounterAction::IncrementAndEcho,
                |a| matches!(a, CounterAction::Echoed),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(result, CounterAction::Echoed);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store.send(CounterAction::Increment).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    }
}
