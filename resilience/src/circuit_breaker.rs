use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::Instant;

use utils::serde::serialize_option_offset_datetime;

use crate::window::{Outcome, OutcomeWindow};
use crate::{
    CircuitBreakerConfig, CircuitConfigError, CircuitEvent, CircuitEventKind, CircuitEventSink,
    FallbackCause, TracingEventSink,
};

/// サーキットの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// サーキットブレーカーの状態のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSnapshot {
    /// サーキットブレーカーの名前
    pub name: String,
    /// 状態
    pub state: CircuitState,
    /// スライディングウィンドウに記録されている呼び出し結果の数
    pub buffered_calls: u32,
    /// スライディングウィンドウに記録されている失敗の数
    pub failed_calls: u32,
    /// 失敗率（パーセント）
    ///
    /// 記録されている呼び出し結果の数が評価に必要な最小数に満たない場合は`None`
    pub failure_rate: Option<f64>,
    /// フォールバック値を返した回数
    pub fallback_calls: u64,
    /// 呼び出しを許可しなかった回数
    pub not_permitted_calls: u64,
    /// 最後に`Open`に遷移した日時
    #[serde(serialize_with = "serialize_option_offset_datetime")]
    pub opened_at: Option<OffsetDateTime>,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    /// 状態が遷移するたびに増加する世代
    ///
    /// 遷移前に許可された呼び出しの結果は、世代が一致しないため無視される。
    generation: u64,
    window: OutcomeWindow,
    opened_at: Option<Instant>,
    opened_at_wall: Option<OffsetDateTime>,
    trials_in_flight: u32,
    fallback_calls: u64,
    not_permitted_calls: u64,
}

impl Inner {
    fn transition(&mut self, to: CircuitState, events: &mut Vec<CircuitEventKind>) {
        let from = self.state;
        self.state = to;
        self.generation += 1;
        self.trials_in_flight = 0;
        match to {
            CircuitState::Closed => {
                self.window.reset();
                self.opened_at = None;
            }
            CircuitState::Open => {
                self.opened_at = Some(Instant::now());
                self.opened_at_wall = Some(OffsetDateTime::now_utc());
            }
            CircuitState::HalfOpen => {}
        }
        events.push(CircuitEventKind::StateTransition { from, to });
    }
}

/// サーキットブレーカー
///
/// 状態はミューテックスで保護され、ロックは保護する呼び出しの実行中に保持されない。
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
    sink: Arc<dyn CircuitEventSink>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// `tracing`にイベントを記録するサーキットブレーカーを作成する。
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
    ) -> Result<Self, CircuitConfigError> {
        Self::with_sink(name, config, Arc::new(TracingEventSink))
    }

    /// イベントの発行先を指定してサーキットブレーカーを作成する。
    pub fn with_sink(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        sink: Arc<dyn CircuitEventSink>,
    ) -> Result<Self, CircuitConfigError> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                generation: 0,
                window: OutcomeWindow::new(config.sliding_window_size),
                opened_at: None,
                opened_at_wall: None,
                trials_in_flight: 0,
                fallback_calls: 0,
                not_permitted_calls: 0,
            }),
            sink,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// 呼び出しを実行して、失敗した場合または呼び出しが許可されなかった場合はフォールバック値を返す。
    ///
    /// `call`は、サーキットが呼び出しを許可した場合にのみ実行される。
    pub async fn execute<T, E, F, Fut, B>(&self, call: F, fallback: B) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        B: FnOnce() -> T,
    {
        let Some(permit) = self.try_acquire() else {
            self.record_fallback(FallbackCause::ShortCircuited);
            return fallback();
        };
        match call().await {
            Ok(value) => {
                permit.on_success();
                value
            }
            Err(e) => {
                permit.on_failure(&e);
                self.record_fallback(FallbackCause::CallFailed);
                fallback()
            }
        }
    }

    /// 呼び出しの許可を要求する。
    ///
    /// `Open`で待機時間が経過している場合は`HalfOpen`に遷移する。
    /// 呼び出しが許可されない場合は`None`を返す。
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut events = Vec::new();
        let permit = {
            let mut inner = self.lock();
            if inner.state == CircuitState::Open && self.cool_down_elapsed(&inner) {
                inner.transition(CircuitState::HalfOpen, &mut events);
            }
            match inner.state {
                CircuitState::Closed => Some((inner.generation, false)),
                CircuitState::HalfOpen
                    if inner.trials_in_flight < self.config.permitted_calls_in_half_open_state =>
                {
                    inner.trials_in_flight += 1;
                    Some((inner.generation, true))
                }
                _ => {
                    inner.not_permitted_calls += 1;
                    None
                }
            }
        };
        self.publish(events);
        permit.map(|(generation, trial)| CallPermit {
            breaker: self,
            generation,
            trial,
            settled: false,
        })
    }

    /// 現在の状態のスナップショットを返す。
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        let buffered_calls = inner.window.len();
        let failure_rate = (buffered_calls >= self.config.effective_minimum_number_of_calls())
            .then(|| inner.window.failure_rate());
        CircuitSnapshot {
            name: self.name.clone(),
            state: inner.state,
            buffered_calls,
            failed_calls: inner.window.failures(),
            failure_rate,
            fallback_calls: inner.fallback_calls,
            not_permitted_calls: inner.not_permitted_calls,
            opened_at: inner.opened_at_wall,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // ロックを保持している間にパニックする処理はないため、状態は常に一貫している
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cool_down_elapsed(&self, inner: &Inner) -> bool {
        inner
            .opened_at
            .is_none_or(|at| at.elapsed() >= self.config.wait_duration_in_open_state)
    }

    fn should_trip(&self, window: &OutcomeWindow) -> bool {
        window.len() >= self.config.effective_minimum_number_of_calls()
            && window.failure_rate() >= self.config.failure_rate_threshold
    }

    fn record(&self, generation: u64, trial: bool, outcome: Outcome) {
        let mut events = Vec::new();
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                tracing::debug!(
                    breaker = %self.name,
                    "ignored the outcome of a call permitted before the last state transition"
                );
                return;
            }
            match (inner.state, outcome) {
                (CircuitState::Closed, outcome) => {
                    inner.window.record(outcome);
                    if outcome == Outcome::Failure && self.should_trip(&inner.window) {
                        inner.transition(CircuitState::Open, &mut events);
                    }
                }
                (CircuitState::HalfOpen, Outcome::Success) if trial => {
                    inner.transition(CircuitState::Closed, &mut events);
                }
                (CircuitState::HalfOpen, Outcome::Failure) if trial => {
                    inner.transition(CircuitState::Open, &mut events);
                }
                _ => {}
            }
        }
        self.publish(events);
    }

    fn release_trial(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
        }
    }

    fn record_fallback(&self, cause: FallbackCause) {
        self.lock().fallback_calls += 1;
        self.publish(vec![CircuitEventKind::FallbackReturned { cause }]);
    }

    fn publish(&self, events: Vec<CircuitEventKind>) {
        for kind in events {
            self.sink.publish(&CircuitEvent {
                breaker: self.name.clone(),
                kind,
                occurred_at: OffsetDateTime::now_utc(),
            });
        }
    }
}

/// 呼び出しの許可
///
/// 結果を報告せずに破棄された場合、`HalfOpen`の試行呼び出しの枠を解放する。
#[must_use = "the outcome of a permitted call must be reported"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl CallPermit<'_> {
    /// `HalfOpen`の試行呼び出しの場合は`true`を返す。
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// 呼び出しの成功を報告する。
    pub fn on_success(mut self) {
        self.settled = true;
        self.breaker
            .record(self.generation, self.trial, Outcome::Success);
    }

    /// 呼び出しの失敗を報告する。
    pub fn on_failure(mut self, error: &dyn fmt::Display) {
        self.settled = true;
        self.breaker.publish(vec![CircuitEventKind::CallFailed {
            error: error.to_string(),
        }]);
        self.breaker
            .record(self.generation, self.trial, Outcome::Failure);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release_trial(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<CircuitEventKind>>,
    }

    impl RecordingSink {
        fn transitions(&self) -> Vec<(CircuitState, CircuitState)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|kind| match kind {
                    CircuitEventKind::StateTransition { from, to } => Some((*from, *to)),
                    _ => None,
                })
                .collect()
        }

        fn fallbacks(&self, cause: FallbackCause) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|kind| **kind == CircuitEventKind::FallbackReturned { cause })
                .count()
        }
    }

    impl CircuitEventSink for RecordingSink {
        fn publish(&self, event: &CircuitEvent) {
            self.events.lock().unwrap().push(event.kind.clone());
        }
    }

    const WAIT: Duration = Duration::from_secs(10);

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_rate_threshold: 50.0,
            sliding_window_size: 4,
            minimum_number_of_calls: 4,
            wait_duration_in_open_state: WAIT,
            permitted_calls_in_half_open_state: 1,
        }
    }

    fn breaker(config: CircuitBreakerConfig) -> (CircuitBreaker, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let breaker = CircuitBreaker::with_sink("by-city", config, sink.clone()).unwrap();
        (breaker, sink)
    }

    async fn fail(breaker: &CircuitBreaker, calls: &AtomicUsize) -> Vec<i32> {
        breaker
            .execute(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Vec<i32>, _>("connection refused")
                },
                Vec::new,
            )
            .await
    }

    async fn succeed(breaker: &CircuitBreaker, calls: &AtomicUsize) -> Vec<i32> {
        breaker
            .execute(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(vec![1, 2])
                },
                Vec::new,
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn successful_call_returns_its_value() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);

        assert_eq!(succeed(&breaker, &calls).await, vec![1, 2]);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(sink.fallbacks(FallbackCause::CallFailed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_call_returns_fallback() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);

        assert!(fail(&breaker, &calls).await.is_empty());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(sink.fallbacks(FallbackCause::CallFailed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn opens_when_failure_rate_reaches_threshold() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);

        succeed(&breaker, &calls).await;
        succeed(&breaker, &calls).await;
        fail(&breaker, &calls).await;
        assert_eq!(breaker.state(), CircuitState::Closed);
        fail(&breaker, &calls).await;
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(
            sink.transitions(),
            vec![(CircuitState::Closed, CircuitState::Open)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_open_before_minimum_number_of_calls() {
        let (breaker, _) = breaker(config());
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            fail(&breaker, &calls).await;
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().failure_rate, None);
        fail(&breaker, &calls).await;
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn open_circuit_does_not_invoke_the_call() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        for _ in 0..5 {
            assert!(succeed(&breaker, &calls).await.is_empty());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(sink.fallbacks(FallbackCause::ShortCircuited), 5);
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, CircuitState::Open);
        assert_eq!(snapshot.not_permitted_calls, 5);
        assert_eq!(snapshot.fallback_calls, 9);
        assert!(snapshot.opened_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn trial_success_closes_the_circuit() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }

        tokio::time::advance(WAIT - Duration::from_millis(1)).await;
        assert!(succeed(&breaker, &calls).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(succeed(&breaker, &calls).await, vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(
            sink.transitions(),
            vec![
                (CircuitState::Closed, CircuitState::Open),
                (CircuitState::Open, CircuitState::HalfOpen),
                (CircuitState::HalfOpen, CircuitState::Closed),
            ]
        );

        // 閉じた後は、再び最小数の失敗が必要
        for _ in 0..3 {
            fail(&breaker, &calls).await;
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
        fail(&breaker, &calls).await;
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn trial_failure_reopens_the_circuit() {
        let (breaker, sink) = breaker(config());
        let calls = AtomicUsize::new(0);
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }

        tokio::time::advance(WAIT).await;
        assert!(fail(&breaker, &calls).await.is_empty());
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        // 待機時間は再び開いた時点から数える
        tokio::time::advance(WAIT / 2).await;
        succeed(&breaker, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            sink.transitions(),
            vec![
                (CircuitState::Closed, CircuitState::Open),
                (CircuitState::Open, CircuitState::HalfOpen),
                (CircuitState::HalfOpen, CircuitState::Open),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_limits_concurrent_trials() {
        let (breaker, _) = breaker(CircuitBreakerConfig {
            permitted_calls_in_half_open_state: 2,
            ..config()
        });
        let calls = AtomicUsize::new(0);
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }
        tokio::time::advance(WAIT).await;

        let first = breaker.try_acquire().unwrap();
        let second = breaker.try_acquire().unwrap();
        assert!(first.is_trial() && second.is_trial());
        assert!(breaker.try_acquire().is_none());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        first.on_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        // 遷移前に許可された試行の結果は無視される
        second.on_failure(&"late failure");
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().buffered_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_trial_permit_releases_its_slot() {
        let (breaker, _) = breaker(config());
        let calls = AtomicUsize::new(0);
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }
        tokio::time::advance(WAIT).await;

        let permit = breaker.try_acquire().unwrap();
        assert!(breaker.try_acquire().is_none());
        drop(permit);

        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        let permit = breaker.try_acquire().unwrap();
        permit.on_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_outcome_is_ignored() {
        let (breaker, _) = breaker(config());
        let calls = AtomicUsize::new(0);

        let stale = breaker.try_acquire().unwrap();
        for _ in 0..4 {
            fail(&breaker, &calls).await;
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        stale.on_success();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, CircuitState::Open);
        assert_eq!(snapshot.buffered_calls, 4);
        assert_eq!(snapshot.failed_calls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_failures_are_all_counted() {
        let sink = Arc::new(RecordingSink::default());
        let breaker = Arc::new(
            CircuitBreaker::with_sink(
                "by-filters",
                CircuitBreakerConfig {
                    failure_rate_threshold: 100.0,
                    sliding_window_size: 50,
                    minimum_number_of_calls: 50,
                    ..config()
                },
                sink.clone(),
            )
            .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..49 {
            let breaker = breaker.clone();
            handles.push(tokio::spawn(async move {
                breaker
                    .execute(
                        || async {
                            tokio::task::yield_now().await;
                            Err::<(), _>("timed out")
                        },
                        || (),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, CircuitState::Closed);
        assert_eq!(snapshot.failed_calls, 49);

        breaker
            .execute(|| async { Err::<(), _>("timed out") }, || ())
            .await;
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(sink.transitions().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = CircuitBreaker::new(
            "by-id",
            CircuitBreakerConfig {
                sliding_window_size: 0,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, CircuitConfigError::SlidingWindowSize);
    }

    #[test]
    fn snapshot_serializes_state_in_kebab_case() {
        let (breaker, _) = breaker(config());
        let json = serde_json::to_value(breaker.snapshot()).unwrap();
        assert_eq!(json["name"], "by-city");
        assert_eq!(json["state"], "closed");
        assert_eq!(json["bufferedCalls"], 0);
        assert!(json["openedAt"].is_null());
    }
}
