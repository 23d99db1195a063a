use std::time::Duration;

/// サーキットブレーカー設定エラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CircuitConfigError {
    #[error("failure_rate_threshold must be greater than 0 and less than or equal to 100: {0}")]
    FailureRateThreshold(f64),

    #[error("sliding_window_size must be greater than 0")]
    SlidingWindowSize,

    #[error("minimum_number_of_calls must be greater than 0")]
    MinimumNumberOfCalls,

    #[error("permitted_calls_in_half_open_state must be greater than 0")]
    PermittedCallsInHalfOpenState,
}

/// サーキットブレーカー設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitBreakerConfig {
    /// 失敗率のしきい値（パーセント）
    ///
    /// 失敗率がこの値以上になると`Open`に遷移する。
    pub failure_rate_threshold: f64,
    /// スライディングウィンドウに記録する直近の呼び出し結果の数
    pub sliding_window_size: u32,
    /// 失敗率を評価するために必要な呼び出し結果の最小数
    ///
    /// スライディングウィンドウのサイズより大きい場合は、スライディングウィンドウのサイズを使用する。
    pub minimum_number_of_calls: u32,
    /// `Open`に遷移してから`HalfOpen`に遷移できるようになるまでの待機時間
    pub wait_duration_in_open_state: Duration,
    /// `HalfOpen`で同時に実行できる試行呼び出しの数
    pub permitted_calls_in_half_open_state: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            wait_duration_in_open_state: Duration::from_secs(10),
            permitted_calls_in_half_open_state: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// 設定を検証する。
    pub fn validate(&self) -> Result<(), CircuitConfigError> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 100.0) {
            return Err(CircuitConfigError::FailureRateThreshold(
                self.failure_rate_threshold,
            ));
        }
        if self.sliding_window_size == 0 {
            return Err(CircuitConfigError::SlidingWindowSize);
        }
        if self.minimum_number_of_calls == 0 {
            return Err(CircuitConfigError::MinimumNumberOfCalls);
        }
        if self.permitted_calls_in_half_open_state == 0 {
            return Err(CircuitConfigError::PermittedCallsInHalfOpenState);
        }
        Ok(())
    }

    pub(crate) fn effective_minimum_number_of_calls(&self) -> u32 {
        self.minimum_number_of_calls.min(self.sliding_window_size)
    }
}
