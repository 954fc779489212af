//! 백테스트 거래소 구현.

use async_trait::async_trait;
use bbwrapper_core::{
    Balance, Board, Execution, Identifier, Norm, OpenInterest, Order, OrderRequest,
    OrderResponse, OrderType, OrderTypes, Price, Quantity, Stock,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::{Exchange, ExchangeResult};
use crate::ExchangeError;

use super::matching_engine::{Fill, MatchingEngine, RestingOrder};
use super::stream::{BacktestExecutionStream, EventBroadcaster};

const BACKTEST_ORDER_TYPES: OrderTypes = OrderTypes {
    market: "Market",
    limit: "Limit",
};

/// 백테스트 거래소 설정.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// 거래소 이름
    pub name: String,
    /// 체결 대금이 오가는 통화
    pub quote_currency: String,
    /// 통화별 초기 잔고
    pub initial_balances: BTreeMap<String, Decimal>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            name: "backtest".to_string(),
            quote_currency: "USD".to_string(),
            initial_balances: BTreeMap::new(),
        }
    }
}

impl BacktestConfig {
    /// 통화의 초기 잔고를 추가합니다.
    pub fn with_initial_balance(mut self, currency: &str, amount: Decimal) -> Self {
        self.initial_balances.insert(currency.to_string(), amount);
        self
    }

    /// 체결 대금 통화를 설정합니다.
    pub fn with_quote_currency(mut self, currency: &str) -> Self {
        self.quote_currency = currency.to_string();
        self
    }

    /// 거래소 이름을 설정합니다.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

/// 주입된 시장 상태와 계정 상태.
#[derive(Debug)]
struct BacktestState {
    /// 최근 체결가
    ltp: Option<Price>,
    /// (최우선 매도, 최우선 매수)
    best_quote: Option<(Price, Price)>,
    /// 대기 주문
    engine: MatchingEngine,
    /// 심볼별 부호 있는 순포지션
    positions: HashMap<String, Quantity>,
    /// 통화별 잔고
    balances: BTreeMap<String, Decimal>,
}

impl BacktestState {
    fn new(config: &BacktestConfig) -> Self {
        Self {
            ltp: None,
            best_quote: None,
            engine: MatchingEngine::new(),
            positions: HashMap::new(),
            balances: config.initial_balances.clone(),
        }
    }

    /// 시장가 주문의 체결 가격. 호가가 있으면 호가, 없으면 최근 체결가.
    fn market_price(&self, is_buy: bool) -> Option<Price> {
        match self.best_quote {
            Some((ask, bid)) => Some(if is_buy { ask } else { bid }),
            None => self.ltp,
        }
    }

    /// 지정가 주문이 즉시 체결될 경우의 체결 가격.
    fn crossing_price(&self, is_buy: bool, limit: Price) -> Option<Price> {
        let reference = self.market_price(is_buy)?;
        let crosses = if is_buy {
            limit >= reference
        } else {
            limit <= reference
        };
        crosses.then_some(reference)
    }

    /// 체결 결과를 포지션과 잔고에 반영합니다.
    fn apply_fill(&mut self, fill: &Fill, quote_currency: &str) {
        let signed = if fill.is_buy { fill.size } else { -fill.size };
        *self.positions.entry(fill.symbol.clone()).or_default() += signed;

        let notional = fill.price * fill.size;
        let cash = self.balances.entry(quote_currency.to_string()).or_default();
        if fill.is_buy {
            *cash -= notional;
        } else {
            *cash += notional;
        }
    }
}

/// 백테스트용 거래소.
///
/// 네트워크를 사용하지 않으며 `update_ltp` / `update_best_price`로 주입한 가격으로
/// 주문을 체결합니다. 주입된 가격은 모든 심볼에 적용됩니다 (단일 시장 시뮬레이션).
pub struct BacktestExchange {
    /// 설정
    config: BacktestConfig,
    /// 시장/계정 상태
    state: RwLock<BacktestState>,
    /// 체결 이벤트 브로드캐스터
    executions: EventBroadcaster<Execution>,
}

impl BacktestExchange {
    /// 새로운 백테스트 거래소를 생성합니다.
    pub fn new(config: BacktestConfig) -> Self {
        let state = BacktestState::new(&config);
        Self {
            config,
            state: RwLock::new(state),
            executions: EventBroadcaster::new(),
        }
    }

    /// 이 거래소의 체결 스트림을 생성합니다.
    pub async fn execution_stream(&self) -> BacktestExecutionStream {
        BacktestExecutionStream::new(self.executions.subscribe().await)
    }

    /// 최근 체결가.
    pub async fn last_traded_price(&self) -> Option<Price> {
        self.state.read().await.ltp
    }

    fn identifier(&self, symbol: &str, order_id: u64) -> Identifier {
        Identifier::new(&self.config.name, symbol, order_id.to_string())
    }

    fn parse_local_id(local_id: &str) -> ExchangeResult<u64> {
        local_id
            .parse()
            .map_err(|_| ExchangeError::OrderNotFound(local_id.to_string()))
    }

    fn order_from_resting(&self, order: &RestingOrder) -> Order {
        Order {
            id: self.identifier(&order.symbol, order.order_id),
            request: OrderRequest {
                norm: Norm::new(order.price, order.size),
                symbol: order.symbol.clone(),
                is_buy: order.is_buy,
                order_type: OrderType::Limit,
            },
            updated_at_unix: order.updated_at.timestamp(),
        }
    }

    /// 체결 결과를 계정에 반영하고 구독자에게 전달합니다.
    async fn settle(&self, state: &mut BacktestState, fills: Vec<Fill>) {
        for fill in fills {
            state.apply_fill(&fill, &self.config.quote_currency);
            debug!(
                order_id = fill.order_id,
                symbol = %fill.symbol,
                price = %fill.price,
                size = %fill.size,
                "backtest fill"
            );

            self.executions
                .broadcast(Execution {
                    id: self.identifier(&fill.symbol, fill.order_id),
                    norm: Norm::new(fill.price, fill.size),
                    is_buy: fill.is_buy,
                    occurred_at: fill.timestamp,
                })
                .await;
        }
    }

    fn ensure_positive(name: &str, value: Decimal) -> ExchangeResult<()> {
        if value <= Decimal::ZERO {
            return Err(ExchangeError::InvalidRequest(format!(
                "{} must be positive: {}",
                name, value
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Exchange for BacktestExchange {
    fn order_types(&self) -> OrderTypes {
        BACKTEST_ORDER_TYPES
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn in_scheduled_maintenance(&self) -> bool {
        false
    }

    async fn boards(&self, symbol: &str) -> ExchangeResult<Board> {
        let state = self.state.read().await;
        let (ask, bid) = state.best_quote.ok_or_else(|| {
            ExchangeError::DataShape("no best price injected; call update_best_price".to_string())
        })?;

        Ok(Board::from_levels(
            &self.config.name,
            symbol,
            vec![Norm::new(ask, Decimal::ZERO)],
            vec![Norm::new(bid, Decimal::ZERO)],
        )?)
    }

    async fn open_interest(
        &self,
        _symbol: &str,
        _minute: u32,
        _limit: u32,
    ) -> ExchangeResult<Vec<OpenInterest>> {
        Err(ExchangeError::not_supported("open_interest"))
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderResponse> {
        Self::ensure_positive("size", request.norm.size)?;
        if request.order_type == OrderType::Limit {
            Self::ensure_positive("price", request.norm.price)?;
        }

        let mut state = self.state.write().await;
        let order_id = state.engine.allocate_id();
        let now = Utc::now();

        let fill_price = match request.order_type {
            OrderType::Market => Some(state.market_price(request.is_buy).ok_or_else(|| {
                ExchangeError::DataShape(
                    "no market price injected; call update_ltp or update_best_price".to_string(),
                )
            })?),
            OrderType::Limit => state.crossing_price(request.is_buy, request.norm.price),
        };

        let filled_size = match fill_price {
            Some(price) => {
                let fill = Fill {
                    order_id,
                    symbol: request.symbol.clone(),
                    is_buy: request.is_buy,
                    price,
                    size: request.norm.size,
                    timestamp: now,
                };
                self.settle(&mut state, vec![fill]).await;
                request.norm.size
            }
            None => {
                state.engine.rest(RestingOrder {
                    order_id,
                    symbol: request.symbol.clone(),
                    is_buy: request.is_buy,
                    price: request.norm.price,
                    size: request.norm.size,
                    updated_at: now,
                });
                Decimal::ZERO
            }
        };

        Ok(OrderResponse {
            id: self.identifier(&request.symbol, order_id),
            filled_size,
        })
    }

    async fn liquidation_order(&self, _request: &OrderRequest) -> ExchangeResult<OrderResponse> {
        Err(ExchangeError::not_supported("liquidation_order"))
    }

    async fn edit_order(
        &self,
        symbol: &str,
        local_id: &str,
        price: Price,
        size: Quantity,
    ) -> ExchangeResult<Order> {
        Self::ensure_positive("price", price)?;
        Self::ensure_positive("size", size)?;
        let order_id = Self::parse_local_id(local_id)?;

        let mut state = self.state.write().await;
        let order = state
            .engine
            .get_mut(order_id)
            .filter(|order| order.symbol == symbol)
            .ok_or_else(|| ExchangeError::OrderNotFound(local_id.to_string()))?;

        let now = Utc::now();
        order.price = price;
        order.size = size;
        order.updated_at = now;
        let edited = order.clone();

        // 정정 후 가격이 호가와 교차하면 신규 지정가 주문과 같이 즉시 체결
        if let Some(fill_price) = state.crossing_price(edited.is_buy, price) {
            state.engine.remove(order_id);
            let fill = Fill {
                order_id,
                symbol: edited.symbol.clone(),
                is_buy: edited.is_buy,
                price: fill_price,
                size,
                timestamp: now,
            };
            self.settle(&mut state, vec![fill]).await;
        }

        Ok(self.order_from_resting(&edited))
    }

    async fn cancel_order(&self, symbol: &str, local_id: &str) -> ExchangeResult<()> {
        let order_id = Self::parse_local_id(local_id)?;
        let mut state = self.state.write().await;

        let belongs = state
            .engine
            .get_mut(order_id)
            .is_some_and(|order| order.symbol == symbol);
        if !belongs {
            return Err(ExchangeError::OrderNotFound(local_id.to_string()));
        }

        state.engine.remove(order_id);
        Ok(())
    }

    async fn cancel_all_orders(&self, symbol: &str) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        let removed = state.engine.remove_symbol(symbol);
        debug!(symbol, removed, "backtest cancel all");
        Ok(())
    }

    async fn active_orders(&self, symbol: &str) -> ExchangeResult<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .engine
            .resting_for(symbol)
            .iter()
            .map(|order| self.order_from_resting(order))
            .collect())
    }

    async fn stocks(&self, symbol: &str) -> ExchangeResult<Stock> {
        let state = self.state.read().await;
        let net = state.positions.get(symbol).copied().unwrap_or_default();
        Ok(Stock::from_net(symbol, net))
    }

    async fn balance(&self) -> ExchangeResult<Vec<Balance>> {
        let state = self.state.read().await;
        Ok(state
            .balances
            .iter()
            .map(|(currency, size)| Balance::new(currency.clone(), *size))
            .collect())
    }

    async fn update_ltp(&self, price: Price) -> ExchangeResult<()> {
        Self::ensure_positive("ltp", price)?;

        let mut state = self.state.write().await;
        state.ltp = Some(price);
        let fills = state.engine.match_trade(price, Utc::now());
        self.settle(&mut state, fills).await;
        Ok(())
    }

    async fn update_best_price(&self, best_ask: Price, best_bid: Price) -> ExchangeResult<()> {
        Self::ensure_positive("best_ask", best_ask)?;
        Self::ensure_positive("best_bid", best_bid)?;
        if best_ask < best_bid {
            return Err(ExchangeError::InvalidRequest(format!(
                "crossed book: ask {} < bid {}",
                best_ask, best_bid
            )));
        }

        let mut state = self.state.write().await;
        state.best_quote = Some((best_ask, best_bid));
        let fills = state.engine.match_quote(best_ask, best_bid, Utc::now());
        self.settle(&mut state, fills).await;
        Ok(())
    }
}
