//! 호가창 스냅샷.

use super::base::Norm;
use crate::error::{CoreError, CoreResult};
use crate::types::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 매도/매수 호가 목록.
///
/// `asks`는 가격 오름차순, `bids`는 가격 내림차순으로 정렬됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 거래소 이름
    pub exchange_name: String,
    /// 심볼
    pub symbol: String,
    /// 중간 가격 ((최우선 매도 + 최우선 매수) / 2)
    pub mid_price: Price,
    /// 매도 호가 (오름차순)
    pub asks: Vec<Norm>,
    /// 매수 호가 (내림차순)
    pub bids: Vec<Norm>,
}

impl Board {
    /// 정렬되지 않은 호가로부터 호가창을 구성합니다.
    ///
    /// 한쪽이라도 비어 있으면 중간 가격을 계산할 수 없으므로 에러를 반환합니다.
    pub fn from_levels(
        exchange_name: impl Into<String>,
        symbol: impl Into<String>,
        mut asks: Vec<Norm>,
        mut bids: Vec<Norm>,
    ) -> CoreResult<Self> {
        let symbol = symbol.into();

        asks.sort_by(|a, b| a.price.cmp(&b.price));
        bids.sort_by(|a, b| b.price.cmp(&a.price));

        let (best_ask, best_bid) = match (asks.first(), bids.first()) {
            (Some(ask), Some(bid)) => (ask.price, bid.price),
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "호가창 한쪽이 비어 있음: {} (asks={}, bids={})",
                    symbol,
                    asks.len(),
                    bids.len()
                )))
            }
        };

        Ok(Self {
            exchange_name: exchange_name.into(),
            symbol,
            mid_price: (best_ask + best_bid) / Decimal::TWO,
            asks,
            bids,
        })
    }

    /// 최우선 매도 호가.
    pub fn best_ask(&self) -> Option<&Norm> {
        self.asks.first()
    }

    /// 최우선 매수 호가.
    pub fn best_bid(&self) -> Option<&Norm> {
        self.bids.first()
    }

    /// 스프레드 (최우선 매도 - 최우선 매수).
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }
}
