use std::collections::VecDeque;

/// 呼び出し結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure,
}

/// 直近の呼び出し結果を記録する件数ベースのスライディングウィンドウ
#[derive(Debug)]
pub(crate) struct OutcomeWindow {
    outcomes: VecDeque<Outcome>,
    capacity: usize,
    failures: u32,
}

impl OutcomeWindow {
    pub(crate) fn new(capacity: u32) -> Self {
        let capacity = capacity as usize;
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            failures: 0,
        }
    }

    /// 呼び出し結果を記録して、ウィンドウから溢れた最も古い結果を捨てる。
    pub(crate) fn record(&mut self, outcome: Outcome) {
        if self.outcomes.len() == self.capacity {
            if let Some(Outcome::Failure) = self.outcomes.pop_front() {
                self.failures -= 1;
            }
        }
        self.outcomes.push_back(outcome);
        if outcome == Outcome::Failure {
            self.failures += 1;
        }
    }

    pub(crate) fn len(&self) -> u32 {
        self.outcomes.len() as u32
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }

    /// 失敗率（パーセント）
    pub(crate) fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        f64::from(self.failures) * 100.0 / self.outcomes.len() as f64
    }

    pub(crate) fn reset(&mut self) {
        self.outcomes.clear();
        self.failures = 0;
    }
}
