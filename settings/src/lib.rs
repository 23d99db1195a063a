use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// アプリケーション設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// HTTPサーバー設定
    pub http: HttpSettings,
    /// データベース設定
    pub database: DatabaseSettings,
    /// ログ設定
    pub log: LogSettings,
    /// 初期データ設定
    pub seed: SeedSettings,
    /// 宿泊施設サービス設定
    ///
    /// 場所サービスでのみ使用する。
    #[serde(default)]
    pub accommodations: Option<RemoteSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename = "protocol")]
#[serde(rename_all = "lowercase")]
pub enum HttpProtocol {
    /// HTTPプロトコル
    Http,
    /// HTTPSプロトコル
    Https,
}

/// HTTPサーバー設定
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// プロトコル
    pub protocol: HttpProtocol,
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
}

impl HttpSettings {
    /// バインドするアドレス（ホスト名とポート番号）を返す。
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// データベース設定
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// ユーザー名
    pub user: String,
    /// パスワード
    pub password: SecretString,
    /// データベース名
    pub name: String,
    /// 最大接続数
    pub max_connections: u32,
    /// 接続タイムアウト（秒）
    pub connection_timeout: u64,
}

impl DatabaseSettings {
    /// データベースを指定しない接続オプションを返す。
    pub fn server_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
    }

    /// 接続オプションを返す。
    pub fn connect_options(&self) -> PgConnectOptions {
        self.server_options().database(&self.name)
    }
}

/// ログ設定
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// ログレベル
    ///
    /// `info`や`DEBUG`のように大文字小文字を区別せずに指定する。
    #[serde(deserialize_with = "utils::serde::deserialize_from_str")]
    pub level: log::Level,
}

/// 初期データ設定
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    /// 初期データを記録したCSVファイルのパス
    pub path: String,
}

/// 宿泊施設サービス設定
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSettings {
    /// ベースURL
    pub base_url: String,
    /// リクエストタイムアウト（ミリ秒）
    pub timeout_millis: u64,
    /// すべての呼び出しに適用するサーキットブレーカー設定
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    /// 呼び出しの種類ごとにサーキットブレーカー設定を上書きする値
    ///
    /// キーは`by-id`、`by-city`、`by-state`、`by-country`または`by-filters`である。
    #[serde(default)]
    pub circuit_breakers: HashMap<String, CircuitBreakerOverrides>,
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }

    /// 呼び出しの種類に適用するサーキットブレーカー設定を返す。
    pub fn circuit_breaker_for(&self, name: &str) -> CircuitBreakerSettings {
        match self.circuit_breakers.get(name) {
            Some(overrides) => overrides.apply(self.circuit_breaker),
            None => self.circuit_breaker,
        }
    }
}

/// サーキットブレーカー設定
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// 失敗率のしきい値（パーセント）
    pub failure_rate_threshold: f64,
    /// スライディングウィンドウのサイズ
    pub sliding_window_size: u32,
    /// 失敗率を評価するために必要な呼び出し結果の最小数
    pub minimum_number_of_calls: u32,
    /// `Open`から`HalfOpen`に遷移できるようになるまでの待機時間（ミリ秒）
    pub wait_duration_in_open_state_millis: u64,
    /// `HalfOpen`で同時に実行できる試行呼び出しの数
    pub permitted_calls_in_half_open_state: u32,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            wait_duration_in_open_state_millis: 10_000,
            permitted_calls_in_half_open_state: 1,
        }
    }
}

/// 呼び出しの種類ごとに上書きするサーキットブレーカー設定
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CircuitBreakerOverrides {
    pub failure_rate_threshold: Option<f64>,
    pub sliding_window_size: Option<u32>,
    pub minimum_number_of_calls: Option<u32>,
    pub wait_duration_in_open_state_millis: Option<u64>,
    pub permitted_calls_in_half_open_state: Option<u32>,
}

impl CircuitBreakerOverrides {
    fn apply(&self, base: CircuitBreakerSettings) -> CircuitBreakerSettings {
        CircuitBreakerSettings {
            failure_rate_threshold: self
                .failure_rate_threshold
                .unwrap_or(base.failure_rate_threshold),
            sliding_window_size: self.sliding_window_size.unwrap_or(base.sliding_window_size),
            minimum_number_of_calls: self
                .minimum_number_of_calls
                .unwrap_or(base.minimum_number_of_calls),
            wait_duration_in_open_state_millis: self
                .wait_duration_in_open_state_millis
                .unwrap_or(base.wait_duration_in_open_state_millis),
            permitted_calls_in_half_open_state: self
                .permitted_calls_in_half_open_state
                .unwrap_or(base.permitted_calls_in_half_open_state),
        }
    }
}
