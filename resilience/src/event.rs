use std::fmt;

use time::OffsetDateTime;

use crate::CircuitState;

/// フォールバック値を返した原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    /// サーキットが呼び出しを許可しなかった
    ShortCircuited,
    /// 呼び出しが失敗した
    CallFailed,
}

impl fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortCircuited => write!(f, "short-circuited"),
            Self::CallFailed => write!(f, "call-failed"),
        }
    }
}

/// サーキットブレーカーイベントの種類
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitEventKind {
    /// 状態が遷移した
    StateTransition { from: CircuitState, to: CircuitState },
    /// 呼び出しが失敗した
    CallFailed { error: String },
    /// フォールバック値を返した
    FallbackReturned { cause: FallbackCause },
}

/// サーキットブレーカーイベント
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitEvent {
    /// サーキットブレーカーの名前
    pub breaker: String,
    /// イベントの種類
    pub kind: CircuitEventKind,
    /// 発生日時
    pub occurred_at: OffsetDateTime,
}

/// サーキットブレーカーイベントの発行先
///
/// イベントはサーキットブレーカーの状態をロックしていないときに発行される。
pub trait CircuitEventSink: Send + Sync {
    fn publish(&self, event: &CircuitEvent);
}

/// `tracing`にイベントを記録する発行先
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl CircuitEventSink for TracingEventSink {
    fn publish(&self, event: &CircuitEvent) {
        match &event.kind {
            CircuitEventKind::StateTransition { from, to } => tracing::warn!(
                breaker = %event.breaker,
                from = %from,
                to = %to,
                "circuit breaker changed its state"
            ),
            CircuitEventKind::CallFailed { error } => tracing::info!(
                breaker = %event.breaker,
                error = %error,
                "protected call failed"
            ),
            CircuitEventKind::FallbackReturned { cause } => tracing::warn!(
                breaker = %event.breaker,
                cause = %cause,
                "returned the fallback value"
            ),
        }
    }
}
