//! 거래소 에러 타입.

use bbwrapper_core::CoreError;
use thiserror::Error;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 자격증명/설정 에러 (생성 시점)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 2xx가 아닌 HTTP 상태
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 응답 본문 파싱 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP는 성공했지만 페이로드가 실패 코드를 담은 경우
    #[error("API error {ret_code} ({ext_code}): {message} {ext_info}")]
    Api {
        ret_code: i64,
        message: String,
        ext_code: String,
        ext_info: String,
    },

    /// 이 거래소가 의도적으로 지원하지 않는 작업
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// 유효한 JSON이지만 결과 계산에 필요한 데이터가 없거나 잘못된 경우
    #[error("Unexpected data shape: {0}")]
    DataShape(String),

    /// 잘못된 요청 값
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 주문을 찾을 수 없음
    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

impl ExchangeError {
    /// 전송 계층 에러인지 확인.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExchangeError::Network(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::HttpStatus { .. }
                | ExchangeError::Parse(_)
        )
    }

    /// 재시도 가능한 에러인지 확인.
    ///
    /// 이 크레이트는 재시도하지 않으며, 호출자의 재시도 정책을 위한 분류입니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::Network(_) | ExchangeError::Timeout(_) => true,
            ExchangeError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn not_supported(operation: &str) -> Self {
        ExchangeError::NotSupported(format!("{} is not supported", operation))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExchangeError::Parse(err.to_string())
        } else {
            ExchangeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Parse(err.to_string())
    }
}

impl From<CoreError> for ExchangeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => ExchangeError::Configuration(msg),
            CoreError::InvalidInput(msg) | CoreError::Serialization(msg) => {
                ExchangeError::DataShape(msg)
            }
        }
    }
}
