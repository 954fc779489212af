//! 거래소 trait 정의.

use async_trait::async_trait;
use bbwrapper_core::{
    Balance, Board, Execution, OpenInterest, Order, OrderRequest, OrderResponse, OrderTypes,
    Price, Quantity, Stock,
};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 통합 거래소 인터페이스를 위한 Exchange trait.
///
/// 트레이딩 로직은 이 trait에만 의존하고, 거래소마다 구현체를 하나씩 둡니다.
/// 각 메서드는 최대 한 번의 네트워크 왕복을 수행하며 내부에서 재시도하지 않습니다.
#[async_trait]
pub trait Exchange: Send + Sync {
    // === 상수 ===

    /// 이 거래소의 주문 유형 이름.
    fn order_types(&self) -> OrderTypes;

    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    // === 공개 작업 ===

    /// 정기 점검 중인지 확인.
    async fn in_scheduled_maintenance(&self) -> bool;

    /// 심볼의 호가창 조회.
    async fn boards(&self, symbol: &str) -> ExchangeResult<Board>;

    /// 미결제약정 조회. `minute`은 집계 주기(분), `limit`은 최대 행 수.
    async fn open_interest(
        &self,
        symbol: &str,
        minute: u32,
        limit: u32,
    ) -> ExchangeResult<Vec<OpenInterest>>;

    // === 주문 작업 ===

    /// 새 주문 제출.
    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderResponse>;

    /// 청산 주문 제출.
    async fn liquidation_order(&self, request: &OrderRequest) -> ExchangeResult<OrderResponse>;

    /// 기존 주문의 가격/수량 정정.
    async fn edit_order(
        &self,
        symbol: &str,
        local_id: &str,
        price: Price,
        size: Quantity,
    ) -> ExchangeResult<Order>;

    /// 주문 취소.
    async fn cancel_order(&self, symbol: &str, local_id: &str) -> ExchangeResult<()>;

    /// 심볼의 모든 주문 취소.
    async fn cancel_all_orders(&self, symbol: &str) -> ExchangeResult<()>;

    /// 심볼의 미체결 주문 조회.
    async fn active_orders(&self, symbol: &str) -> ExchangeResult<Vec<Order>>;

    // === 계좌 작업 ===

    /// 심볼의 순포지션 조회.
    async fn stocks(&self, symbol: &str) -> ExchangeResult<Stock>;

    /// 통화별 잔고 조회.
    async fn balance(&self) -> ExchangeResult<Vec<Balance>>;

    // === 백테스트 전용 ===

    /// 최근 체결가 주입.
    async fn update_ltp(&self, price: Price) -> ExchangeResult<()>;

    /// 최우선 매도/매수 호가 주입.
    async fn update_best_price(&self, best_ask: Price, best_bid: Price) -> ExchangeResult<()>;
}

/// 체결 이벤트 스트림.
///
/// 지연 평가되는, 무한할 수 있고 재시작할 수 없는 체결 시퀀스입니다.
#[async_trait]
pub trait Stream: Send {
    /// 스트림 시작.
    async fn start(&mut self) -> ExchangeResult<()>;

    /// 다음 체결 반환. `None`은 스트림 종료가 아니라 "아직 이벤트 없음"을 뜻합니다.
    async fn read(&mut self) -> ExchangeResult<Option<Execution>>;
}
