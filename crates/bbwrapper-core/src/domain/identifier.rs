//! 거래소 간 주문을 유일하게 식별하는 전역 ID.
//!
//! 문자열 형식은 `{거래소}::{심볼}::{로컬ID}` 입니다 (예: `bybit::BTCUSD::abc-123`).

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = "::";

/// 전역 주문 식별자.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// 거래소 이름
    pub exchange_name: String,
    /// 심볼
    pub symbol: String,
    /// 거래소가 부여한 주문 ID
    pub local_id: String,
}

impl Identifier {
    /// 새 식별자를 생성합니다.
    pub fn new(
        exchange_name: impl Into<String>,
        symbol: impl Into<String>,
        local_id: impl Into<String>,
    ) -> Self {
        Self {
            exchange_name: exchange_name.into(),
            symbol: symbol.into(),
            local_id: local_id.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.exchange_name, self.symbol, self.local_id
        )
    }
}

impl FromStr for Identifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 로컬 ID에는 구분자가 포함될 수 있으므로 앞의 두 개만 분리
        let mut parts = s.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(exchange), Some(symbol), Some(local_id))
                if !exchange.is_empty() && !symbol.is_empty() && !local_id.is_empty() =>
            {
                Ok(Self::new(exchange, symbol, local_id))
            }
            _ => Err(CoreError::InvalidInput(format!(
                "식별자 형식이 아님 (exchange::symbol::localID): {}",
                s
            ))),
        }
    }
}
