//! 백테스트 거래소를 위한 주문 매칭 엔진.
//!
//! 주입된 체결가/호가에 대해 대기 중인 지정가 주문을 체결합니다.
//! 대기 주문은 지정가에 전량 체결됩니다 (부분 체결 없음).

use bbwrapper_core::{Price, Quantity};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 매칭 엔진의 대기 주문.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    /// 주문 ID
    pub order_id: u64,
    /// 심볼
    pub symbol: String,
    /// 매수 여부
    pub is_buy: bool,
    /// 지정가
    pub price: Price,
    /// 잔여 수량
    pub size: Quantity,
    /// 마지막 갱신 시각
    pub updated_at: DateTime<Utc>,
}

impl RestingOrder {
    /// 체결가로 이 주문이 체결되는지 확인합니다.
    fn crosses_trade(&self, ltp: Price) -> bool {
        if self.is_buy {
            self.price >= ltp
        } else {
            self.price <= ltp
        }
    }

    /// 최우선 호가로 이 주문이 체결되는지 확인합니다.
    fn crosses_quote(&self, best_ask: Price, best_bid: Price) -> bool {
        if self.is_buy {
            self.price >= best_ask
        } else {
            self.price <= best_bid
        }
    }
}

/// 주문 체결 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// 주문 ID
    pub order_id: u64,
    /// 심볼
    pub symbol: String,
    /// 매수 여부
    pub is_buy: bool,
    /// 체결 가격
    pub price: Price,
    /// 체결 수량
    pub size: Quantity,
    /// 체결 시각
    pub timestamp: DateTime<Utc>,
}

/// 주문 매칭 엔진.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    /// ID 순으로 정렬된 대기 주문
    resting: BTreeMap<u64, RestingOrder>,
    /// 주문 ID 카운터
    next_order_id: u64,
}

impl MatchingEngine {
    /// 새로운 매칭 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 주문 ID를 할당합니다 (1부터 시작).
    pub fn allocate_id(&mut self) -> u64 {
        self.next_order_id += 1;
        self.next_order_id
    }

    /// 지정가 주문을 대기열에 추가합니다.
    pub fn rest(&mut self, order: RestingOrder) {
        self.resting.insert(order.order_id, order);
    }

    /// 대기 주문을 조회합니다.
    pub fn get_mut(&mut self, order_id: u64) -> Option<&mut RestingOrder> {
        self.resting.get_mut(&order_id)
    }

    /// 대기 주문을 제거합니다.
    pub fn remove(&mut self, order_id: u64) -> Option<RestingOrder> {
        self.resting.remove(&order_id)
    }

    /// 심볼의 모든 대기 주문을 제거하고 제거된 개수를 반환합니다.
    pub fn remove_symbol(&mut self, symbol: &str) -> usize {
        let before = self.resting.len();
        self.resting.retain(|_, order| order.symbol != symbol);
        before - self.resting.len()
    }

    /// 심볼의 대기 주문 (ID 순).
    pub fn resting_for(&self, symbol: &str) -> Vec<RestingOrder> {
        self.resting
            .values()
            .filter(|order| order.symbol == symbol)
            .cloned()
            .collect()
    }

    /// 체결가에 도달한 대기 주문을 체결합니다.
    pub fn match_trade(&mut self, ltp: Price, timestamp: DateTime<Utc>) -> Vec<Fill> {
        self.drain_matching(|order| order.crosses_trade(ltp), timestamp)
    }

    /// 최우선 호가와 교차하는 대기 주문을 체결합니다.
    pub fn match_quote(
        &mut self,
        best_ask: Price,
        best_bid: Price,
        timestamp: DateTime<Utc>,
    ) -> Vec<Fill> {
        self.drain_matching(|order| order.crosses_quote(best_ask, best_bid), timestamp)
    }

    /// 대기 주문 수.
    pub fn len(&self) -> usize {
        self.resting.len()
    }

    /// 대기 주문이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.resting.is_empty()
    }

    fn drain_matching<F>(&mut self, crosses: F, timestamp: DateTime<Utc>) -> Vec<Fill>
    where
        F: Fn(&RestingOrder) -> bool,
    {
        let matched: Vec<u64> = self
            .resting
            .values()
            .filter(|order| crosses(order))
            .map(|order| order.order_id)
            .collect();

        matched
            .into_iter()
            .filter_map(|id| self.resting.remove(&id))
            .map(|order| Fill {
                order_id: order.order_id,
                symbol: order.symbol,
                is_buy: order.is_buy,
                price: order.price,
                size: order.size,
                timestamp,
            })
            .collect()
    }
}
