//! 거래소 연결 및 주문 처리.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Exchange trait: 통합 거래소 인터페이스
//! - Bybit 커넥터 (REST)
//! - 백테스트 거래소
//! - 거래소 에러 분류

pub mod connector;
pub mod error;
pub mod simulated;
pub mod traits;

pub use connector::{BybitClient, BYBIT_NAME};
pub use error::*;
pub use simulated::{
    BacktestConfig, BacktestExchange, BacktestExecutionStream, EventBroadcaster, Fill,
    MatchingEngine, RestingOrder,
};
pub use traits::*;

use bbwrapper_core::Credentials;

/// 자격 증명으로 Bybit 거래소 인스턴스를 생성합니다.
///
/// 자격 증명이 비어 있거나 HTTP 클라이언트를 만들 수 없으면 `Configuration` 에러를 반환합니다.
pub fn new(credentials: Credentials) -> ExchangeResult<Box<dyn Exchange>> {
    Ok(Box::new(BybitClient::new(credentials)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_returns_bybit() {
        let exchange = new(Credentials::new("key", "secret")).unwrap();
        assert_eq!(exchange.name(), BYBIT_NAME);
        assert_eq!(exchange.order_types().market, "Market");
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        assert!(matches!(
            new(Credentials::new("", "")),
            Err(ExchangeError::Configuration(_))
        ));
    }
}
