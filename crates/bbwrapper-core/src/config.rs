//! 설정 관리.
//!
//! 거래소 자격증명과 커넥터 옵션, 로깅 설정을 정의합니다.
//! 파일(TOML)과 `BBWRAPPER__` 접두사 환경 변수에서 로드할 수 있습니다.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 기본 요청 타임아웃 (밀리초).
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 30_000;

/// 커넥터 옵션.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectorOptions {
    /// 요청 타임아웃 (밀리초). 없으면 30초
    #[serde(default)]
    pub timeout_millis: Option<u64>,
    /// 테스트넷 사용
    #[serde(default)]
    pub testnet: bool,
    /// REST API 기본 URL 재정의 (mock 서버 등)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ConnectorOptions {
    /// 모든 요청에 적용되는 타임아웃.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis.unwrap_or(DEFAULT_TIMEOUT_MILLIS))
    }

    /// 실제로 사용할 REST 기본 URL을 반환합니다.
    ///
    /// `base_url`이 없으면 테스트넷 여부에 따라 `mainnet` 또는 `testnet`을 고릅니다.
    pub fn rest_base_url<'a>(&'a self, mainnet: &'a str, testnet: &'a str) -> &'a str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.testnet => testnet,
            None => mainnet,
        }
    }
}

/// 비공개 API 사용을 위한 자격증명.
///
/// # 보안
/// - `Debug` 구현은 민감 정보(`api_key`, `api_secret`)를 마스킹합니다.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// API 키
    pub api_key: String,
    /// API 시크릿
    pub api_secret: String,
    /// 커넥터 옵션
    #[serde(default)]
    pub options: ConnectorOptions,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars: Vec<char> = self.api_key.chars().collect();
        let masked_key = if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("Credentials")
            .field("api_key", &masked_key)
            .field("api_secret", &"***REDACTED***")
            .field("options", &self.options)
            .finish()
    }
}

impl Credentials {
    /// 새 자격증명을 생성합니다.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            options: ConnectorOptions::default(),
        }
    }

    /// 커넥터 옵션을 설정합니다.
    pub fn with_options(mut self, options: ConnectorOptions) -> Self {
        self.options = options;
        self
    }

    /// 요청 타임아웃을 설정합니다.
    pub fn with_timeout_millis(mut self, timeout_millis: u64) -> Self {
        self.options.timeout_millis = Some(timeout_millis);
        self
    }

    /// 기본 URL을 재정의합니다.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.options.base_url = Some(base_url.into());
        self
    }

    /// 키와 시크릿이 모두 비어 있지 않은지 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(CoreError::Config(
                "api_key와 api_secret이 필요합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 환경 변수에서 생성.
    ///
    /// `BYBIT_API_KEY`, `BYBIT_API_SECRET`가 필요하며
    /// `BYBIT_TESTNET`, `BYBIT_TIMEOUT_MS`는 선택입니다.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BYBIT_API_KEY").ok()?;
        let api_secret = std::env::var("BYBIT_API_SECRET").ok()?;

        let testnet = std::env::var("BYBIT_TESTNET")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
        let timeout_millis = std::env::var("BYBIT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok());

        Some(Self {
            api_key,
            api_secret,
            options: ConnectorOptions {
                timeout_millis,
                testnet,
                base_url: None,
            },
        })
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct WrapperConfig {
    /// 거래소 자격증명
    pub exchange: Credentials,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WrapperConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment());

        Ok(builder.build()?.try_deserialize()?)
    }

    /// TOML 문자열과 환경 변수에서 설정을 로드합니다.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .add_source(Self::environment());

        Ok(builder.build()?.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("BBWRAPPER")
            .separator("__")
            .try_parsing(true)
    }
}
