//! tracing 기반 로깅 초기화.
//!
//! 커넥터는 `tracing` 매크로로 이벤트만 남기고, 구독자 설정은 호출하는 쪽이
//! 한 번 `init_logging`으로 합니다. 출력 형식은 pretty, json, compact 중 하나입니다.

use crate::config::LoggingConfig;
use std::fmt;
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 포함 (개발용)
    #[default]
    Pretty,
    /// 줄마다 JSON 객체 하나 (로그 수집용)
    Json,
    /// 한 줄 요약
    Compact,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Pretty, LogFormat::Json, LogFormat::Compact]
            .into_iter()
            .find(|format| format.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown log format: {}", s))
    }
}

/// 구독자 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "info", "bbwrapper_exchange=debug")
    pub level: String,
    pub format: LogFormat,
    /// 소스 파일/줄 번호 표시
    pub with_file: bool,
    /// 모듈 경로 표시
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            with_file: true,
            with_target: true,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// `RUST_LOG`와 `LOG_FORMAT`에서 설정을 읽습니다. 없거나 잘못된 값은 기본값.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        Self::new(level).with_format(format)
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span> + 'static,
    {
        let base = tracing_subscriber::fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_file)
            .with_target(self.with_target);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        // 알 수 없는 형식은 pretty
        Self::new(config.level.clone()).with_format(config.format.parse().unwrap_or_default())
    }
}

/// 전역 구독자를 설치합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선합니다.
/// 이미 구독자가 설치된 경우 에러를 반환합니다.
///
/// ```no_run
/// use bbwrapper_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("bbwrapper_exchange=debug").with_format(LogFormat::Json))
///     .expect("logging already initialized");
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(config.fmt_layer::<Registry>())
        .with(env_filter)
        .try_init()?;

    tracing::info!(format = %config.format, level = %config.level, "Logging initialized");
    Ok(())
}

/// `LogConfig::from_env()`로 초기화합니다.
pub fn init_logging_from_env() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogConfig::from_env())
}
