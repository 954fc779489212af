//! 주문, 호가, 포지션이 공유하는 기본 값 타입.

use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 가격과 수량의 쌍.
///
/// 수량은 관례상 0 이상이며, 방향(매수/매도)은 바깥 타입이 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Norm {
    /// 가격
    pub price: Price,
    /// 수량
    pub size: Quantity,
}

impl Norm {
    /// 새 Norm을 생성합니다.
    pub fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }

    /// 명목 가치 (가격 × 수량).
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}

/// 통화별 잔고.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// 통화 코드 (예: "BTC")
    pub currency_code: String,
    /// 사용 가능한 수량
    pub size: Quantity,
}

impl Balance {
    /// 새 잔고를 생성합니다.
    pub fn new(currency_code: impl Into<String>, size: Quantity) -> Self {
        Self {
            currency_code: currency_code.into(),
            size,
        }
    }
}

/// 미결제약정 스냅샷.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterest {
    /// 미결제약정 값
    pub value: Decimal,
    /// 유닉스 타임스탬프 (초)
    pub timestamp: i64,
}
