//! 下流サービスの呼び出しを保護するサーキットブレーカー
//!
//! サーキットブレーカーは、呼び出しの種類ごとに独立した状態を持つ。
//!
//! * `Closed` - 呼び出しを実行して、直近の結果をスライディングウィンドウに記録する。
//!   失敗率がしきい値以上になると`Open`に遷移する。
//! * `Open` - 呼び出しを実行せずにフォールバック値を返す。
//!   待機時間が経過した後の最初の呼び出しで`HalfOpen`に遷移する。
//! * `HalfOpen` - 許可された数の試行呼び出しだけを実行する。
//!   試行が成功すると`Closed`に、失敗すると`Open`に遷移する。
mod circuit_breaker;
mod config;
mod event;
mod window;

pub use circuit_breaker::*;
pub use config::*;
pub use event::*;
