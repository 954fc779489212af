//! 주문 타입.
//!
//! 이 모듈은 어댑터가 주고받는 주문 관련 타입을 정의합니다:
//! - `OrderType` - 주문 유형 (시장가/지정가)
//! - `OrderTypes` - 거래소별 주문 유형 와이어 이름
//! - `OrderRequest` - 주문 요청
//! - `OrderResponse` - 주문 생성 응답
//! - `Order` - 주문 엔티티

use super::base::Norm;
use super::identifier::Identifier;
use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// 시장가 주문 - 가격은 무시됨
    Market,
    /// 지정가 주문
    Limit,
}

/// 거래소가 사용하는 주문 유형 이름.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTypes {
    /// 시장가 주문 이름
    pub market: &'static str,
    /// 지정가 주문 이름
    pub limit: &'static str,
}

impl OrderTypes {
    /// 주문 유형의 와이어 이름을 반환합니다.
    pub fn wire_name(&self, order_type: OrderType) -> &'static str {
        match order_type {
            OrderType::Market => self.market,
            OrderType::Limit => self.limit,
        }
    }

    /// 와이어 이름을 주문 유형으로 변환합니다.
    pub fn parse(&self, wire: &str) -> Option<OrderType> {
        if wire == self.market {
            Some(OrderType::Market)
        } else if wire == self.limit {
            Some(OrderType::Limit)
        } else {
            None
        }
    }
}

/// 새 주문 요청.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 가격과 수량
    pub norm: Norm,
    /// 심볼
    pub symbol: String,
    /// 매수 여부
    pub is_buy: bool,
    /// 주문 유형
    pub order_type: OrderType,
}

impl OrderRequest {
    /// 지정가 주문 요청을 생성합니다.
    pub fn limit(symbol: impl Into<String>, is_buy: bool, price: Price, size: Quantity) -> Self {
        Self {
            norm: Norm::new(price, size),
            symbol: symbol.into(),
            is_buy,
            order_type: OrderType::Limit,
        }
    }

    /// 시장가 주문 요청을 생성합니다. 가격은 0으로 설정됩니다.
    pub fn market(symbol: impl Into<String>, is_buy: bool, size: Quantity) -> Self {
        Self {
            norm: Norm::new(Decimal::ZERO, size),
            symbol: symbol.into(),
            is_buy,
            order_type: OrderType::Market,
        }
    }

    /// 거래소로 전송할 가격. 시장가 주문은 항상 0입니다.
    pub fn effective_price(&self) -> Price {
        match self.order_type {
            OrderType::Market => Decimal::ZERO,
            OrderType::Limit => self.norm.price,
        }
    }
}

/// 주문 생성 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    /// 주문 식별자
    pub id: Identifier,
    /// 즉시 체결된 수량 (0 이상, 요청 수량 이하)
    pub filled_size: Quantity,
}

impl OrderResponse {
    /// 요청 수량과 잔여 수량으로 응답을 생성합니다.
    ///
    /// 체결 수량은 `[0, requested]` 범위로 제한됩니다.
    pub fn from_leaves(id: Identifier, requested: Quantity, leaves: Quantity) -> Self {
        let filled_size = (requested - leaves).max(Decimal::ZERO).min(requested.max(Decimal::ZERO));
        Self { id, filled_size }
    }
}

/// 주문 엔티티.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// 주문 식별자
    pub id: Identifier,
    /// 주문 요청 내용
    pub request: OrderRequest,
    /// 마지막 갱신 시각 (유닉스 초)
    pub updated_at_unix: i64,
}
