//! Bybit REST 클라이언트 및 `Exchange` 구현.

use super::auth::{canonical_query, sign_params, Params};
use super::models::{
    parse_decimal, side_name, ApiResponse, CancelOrderParams, CreateOrderParams,
    CreateOrderResult, OpenInterestParams, OpenInterestRow, OrderBookParams, OrderBookRow,
    OrderListParams, OrderListResult, PositionResult, ReplaceOrderParams, ReplaceOrderResult,
    SymbolParams, WalletBalanceResult, ACTIVE_ORDER_STATUSES, GOOD_TILL_CANCEL,
};
use crate::traits::{Exchange, ExchangeResult};
use crate::ExchangeError;
use async_trait::async_trait;
use bbwrapper_core::{
    Balance, Board, Credentials, Identifier, Norm, OpenInterest, Order, OrderRequest,
    OrderResponse, OrderType, OrderTypes, Price, Quantity, Stock,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, error, info, warn};

/// 거래소 이름.
pub const BYBIT_NAME: &str = "bybit";

const MAINNET_URL: &str = "https://api.bybit.com";
const TESTNET_URL: &str = "https://api-testnet.bybit.com";

const BYBIT_ORDER_TYPES: OrderTypes = OrderTypes {
    market: "Market",
    limit: "Limit",
};

/// Bybit 거래소 클라이언트.
///
/// 불변 자격증명과 커넥션 풀을 가진 `reqwest::Client`만 보관하므로
/// `Arc`로 감싸 여러 태스크에서 공유할 수 있습니다.
pub struct BybitClient {
    credentials: Credentials,
    client: Client,
    base_url: String,
}

impl BybitClient {
    /// 새 Bybit 클라이언트 생성.
    ///
    /// # Errors
    /// `api_key` 또는 `api_secret`이 비어 있거나 HTTP 클라이언트 생성에 실패하면
    /// `ExchangeError::Configuration`을 반환합니다.
    pub fn new(credentials: Credentials) -> ExchangeResult<Self> {
        credentials.validate()?;

        let client = Client::builder()
            .timeout(credentials.options.timeout())
            .build()
            .map_err(|e| {
                ExchangeError::Configuration(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        let base_url = credentials
            .options
            .rest_base_url(MAINNET_URL, TESTNET_URL)
            .to_string();

        Ok(Self {
            credentials,
            client,
            base_url,
        })
    }

    /// 환경 변수에서 생성.
    ///
    /// 환경 변수가 설정되지 않았거나 클라이언트 생성에 실패하면 `None`을 반환합니다.
    /// 생성 실패 원인은 `warn!`으로 남깁니다.
    pub fn from_env() -> Option<Self> {
        Self::from_env_credentials(Credentials::from_env())
    }

    fn from_env_credentials(credentials: Option<Credentials>) -> Option<Self> {
        match Self::new(credentials?) {
            Ok(client) => Some(client),
            Err(err) => {
                warn!("BYBIT_* 환경 변수로 클라이언트를 만들 수 없음: {}", err);
                None
            }
        }
    }

    /// REST API 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 현재 타임스탬프(밀리초) 반환.
    fn timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// `api_key`와 `timestamp`를 추가한 뒤 서명합니다. (정규 쿼리, 서명) 반환.
    fn authenticate(&self, params: &mut Params) -> ExchangeResult<(String, String)> {
        params.insert("api_key".to_string(), self.credentials.api_key.clone());
        params.insert("timestamp".to_string(), Self::timestamp_ms().to_string());

        let signature = sign_params(params, &self.credentials.api_secret)?;
        Ok((canonical_query(params), signature))
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get(&self, endpoint: &str, params: Params) -> ExchangeResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let query = canonical_query(&params);

        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("GET {}", full_url);

        let response = self.client.get(&full_url).send().await?;
        self.handle_response(endpoint, response).await
    }

    /// 서명된 GET 요청. 서명은 쿼리 문자열의 `sign` 파라미터로 붙습니다.
    async fn signed_get(&self, endpoint: &str, mut params: Params) -> ExchangeResult<ApiResponse> {
        let (query, signature) = self.authenticate(&mut params)?;
        let full_url = format!("{}{}?{}&sign={}", self.base_url, endpoint, query, signature);

        debug!("GET (signed) {}", endpoint);

        let response = self.client.get(&full_url).send().await?;
        self.handle_response(endpoint, response).await
    }

    /// 서명된 POST 요청. `sign`을 포함한 전체 파라미터가 JSON 본문이 됩니다.
    async fn signed_post(&self, endpoint: &str, mut params: Params) -> ExchangeResult<ApiResponse> {
        let (_, signature) = self.authenticate(&mut params)?;
        params.insert("sign".to_string(), signature);

        let url = format!("{}{}", self.base_url, endpoint);

        debug!("POST (signed) {}", endpoint);

        let response = self.client.post(&url).json(&params).send().await?;
        self.handle_response(endpoint, response).await
    }

    /// API 응답 처리.
    ///
    /// HTTP 상태와 페이로드의 `ret_code`를 모두 확인합니다.
    /// 2xx가 아니면 페이로드는 확인하지 않습니다.
    async fn handle_response(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> ExchangeResult<ApiResponse> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "HTTP error response");
            return Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response: {} - Body: {}", e, body);
            ExchangeError::Parse(e.to_string())
        })?;

        if let Err(err) = parsed.check_ret_code() {
            warn!(endpoint, "API error: {}", err);
            return Err(err);
        }

        Ok(parsed)
    }

    fn order_from_row(symbol: &str, row: super::models::OrderRow) -> ExchangeResult<Order> {
        let price = parse_decimal("price", &row.price)?;
        let size = parse_decimal("qty", &row.qty)?;
        let order_type = BYBIT_ORDER_TYPES.parse(&row.order_type).ok_or_else(|| {
            ExchangeError::DataShape(format!("알 수 없는 주문 유형: {}", row.order_type))
        })?;
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at).map_err(|e| {
            ExchangeError::DataShape(format!("updated_at 파싱 실패 ({}): {}", row.updated_at, e))
        })?;

        Ok(Order {
            id: Identifier::new(BYBIT_NAME, symbol, row.order_id),
            request: OrderRequest {
                norm: Norm::new(price, size),
                symbol: symbol.to_string(),
                is_buy: row.side == "Buy",
                order_type,
            },
            updated_at_unix: updated_at.timestamp(),
        })
    }

    /// `time_now` ("1577444332.192859")를 정수 초로 변환.
    fn parse_time_now(time_now: Option<&str>) -> ExchangeResult<i64> {
        let raw = time_now
            .ok_or_else(|| ExchangeError::DataShape("time_now 필드 없음".to_string()))?;
        parse_decimal("time_now", raw)?
            .trunc()
            .to_i64()
            .ok_or_else(|| ExchangeError::DataShape(format!("time_now 범위 초과: {}", raw)))
    }
}

#[async_trait]
impl Exchange for BybitClient {
    fn order_types(&self) -> OrderTypes {
        BYBIT_ORDER_TYPES
    }

    fn name(&self) -> &str {
        BYBIT_NAME
    }

    async fn in_scheduled_maintenance(&self) -> bool {
        // TODO: 공지/상태 API를 조회해 정기 점검 시간대를 판단
        false
    }

    async fn boards(&self, symbol: &str) -> ExchangeResult<Board> {
        let resp = self
            .public_get("/v2/public/orderBook/L2", OrderBookParams { symbol }.to_params())
            .await?;
        let rows: Vec<OrderBookRow> = resp.decode()?;

        let mut asks = Vec::new();
        let mut bids = Vec::new();
        for row in rows {
            let norm = Norm::new(parse_decimal("price", &row.price)?, row.size);
            if row.side == "Buy" {
                bids.push(norm);
            } else {
                asks.push(norm);
            }
        }

        Ok(Board::from_levels(BYBIT_NAME, symbol, asks, bids)?)
    }

    async fn open_interest(
        &self,
        symbol: &str,
        minute: u32,
        limit: u32,
    ) -> ExchangeResult<Vec<OpenInterest>> {
        let resp = self
            .public_get(
                "/v2/public/open-interest",
                OpenInterestParams {
                    symbol,
                    minute,
                    limit,
                }
                .to_params(),
            )
            .await?;
        resp.check_ok_message()?;

        let rows: Vec<OpenInterestRow> = resp.decode()?;
        Ok(rows
            .into_iter()
            .map(|row| OpenInterest {
                value: row.open_interest,
                timestamp: row.timestamp,
            })
            .collect())
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderResponse> {
        let side = side_name(request.is_buy);
        let order_type = BYBIT_ORDER_TYPES.wire_name(request.order_type);
        let params = CreateOrderParams {
            side,
            symbol: &request.symbol,
            order_type,
            qty: request.norm.size,
            price: request.effective_price(),
            time_in_force: GOOD_TILL_CANCEL,
        };

        info!(
            "Placing {} {} order for {} {} @ {}",
            side,
            order_type,
            request.norm.size,
            request.symbol,
            params.price
        );

        let resp = self
            .signed_post("/v2/private/order/create", params.to_params())
            .await?;
        let result: CreateOrderResult = resp.decode()?;

        let leaves = result.leaves_qty;
        let leaves_in_range = leaves >= rust_decimal::Decimal::ZERO && leaves <= request.norm.size;
        if !leaves_in_range {
            warn!(
                order_id = %result.order_id,
                leaves_qty = %result.leaves_qty,
                requested = %request.norm.size,
                "leaves_qty out of range; clamping filled size"
            );
        }

        info!("Order placed successfully: {}", result.order_id);
        Ok(OrderResponse::from_leaves(
            Identifier::new(BYBIT_NAME, &request.symbol, result.order_id),
            request.norm.size,
            result.leaves_qty,
        ))
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
        let params = ReplaceOrderParams {
            order_id: local_id,
            symbol,
            qty: size,
            price,
        };
        let resp = self
            .signed_post("/v2/private/order/replace", params.to_params())
            .await?;
        resp.check_ok_message()?;

        let updated_at_unix = Self::parse_time_now(resp.time_now.as_deref())?;
        let result: ReplaceOrderResult = resp.decode()?;

        info!("Order {} replaced: {} @ {}", result.order_id, size, price);
        Ok(Order {
            id: Identifier::new(BYBIT_NAME, symbol, result.order_id),
            // 정정 응답은 방향을 돌려주지 않음
            request: OrderRequest {
                norm: Norm::new(price, size),
                symbol: symbol.to_string(),
                is_buy: false,
                order_type: OrderType::Limit,
            },
            updated_at_unix,
        })
    }

    async fn cancel_order(&self, symbol: &str, local_id: &str) -> ExchangeResult<()> {
        let params = CancelOrderParams {
            symbol,
            order_id: local_id,
        };
        self.signed_post("/v2/private/order/cancel", params.to_params())
            .await?;

        info!("Order {} cancelled", local_id);
        Ok(())
    }

    async fn cancel_all_orders(&self, symbol: &str) -> ExchangeResult<()> {
        self.signed_post(
            "/v2/private/order/cancelAll",
            SymbolParams { symbol }.to_params(),
        )
        .await?;

        info!("All orders cancelled for {}", symbol);
        Ok(())
    }

    async fn active_orders(&self, symbol: &str) -> ExchangeResult<Vec<Order>> {
        let params = OrderListParams {
            symbol,
            order_status: ACTIVE_ORDER_STATUSES,
        };
        let resp = self
            .signed_get("/v2/private/order/list", params.to_params())
            .await?;
        let result: OrderListResult = resp.decode()?;

        result
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|row| Self::order_from_row(symbol, row))
            .collect()
    }

    async fn stocks(&self, symbol: &str) -> ExchangeResult<Stock> {
        let resp = self
            .signed_get(
                "/v2/private/position/list",
                SymbolParams { symbol }.to_params(),
            )
            .await?;
        let result: PositionResult = resp.decode()?;

        Ok(Stock::from_side(symbol, result.side == "Sell", result.size))
    }

    async fn balance(&self) -> ExchangeResult<Vec<Balance>> {
        let resp = self
            .signed_get("/v2/private/wallet/balance", Params::new())
            .await?;
        let result: WalletBalanceResult = resp.decode()?;

        Ok(result
            .into_iter()
            .map(|(currency, entry)| Balance::new(currency, entry.available_balance))
            .collect())
    }

    async fn update_ltp(&self, _price: Price) -> ExchangeResult<()> {
        Err(ExchangeError::not_supported("update_ltp"))
    }

    async fn update_best_price(&self, _best_ask: Price, _best_bid: Price) -> ExchangeResult<()> {
        Err(ExchangeError::not_supported("update_best_price"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn client() -> BybitClient {
        BybitClient::new(Credentials::new("hoge", "fuga")).expect("테스트용 클라이언트 생성 실패")
    }

    #[test]
    fn test_from_env_credentials() {
        assert!(BybitClient::from_env_credentials(None).is_none());
        let blank = Credentials::new("  ", "secret");
        assert!(BybitClient::from_env_credentials(Some(blank)).is_none());

        let client = BybitClient::from_env_credentials(Some(Credentials::new("key", "secret")));
        assert_eq!(client.map(|c| c.credentials.api_key), Some("key".to_string()));
    }

    #[test]
    fn test_new() {
        let client = client();
        assert_eq!(client.name(), "bybit");
        assert_eq!(client.base_url(), "https://api.bybit.com");
        assert_eq!(client.order_types().limit, "Limit");
    }

    #[test]
    fn test_new_requires_credentials() {
        let err = BybitClient::new(Credentials::new("hoge", "")).err().unwrap();
        assert!(matches!(err, ExchangeError::Configuration(_)));

        let err = BybitClient::new(Credentials::new("", "fuga")).err().unwrap();
        assert!(matches!(err, ExchangeError::Configuration(_)));
    }

    #[test]
    fn test_testnet_url() {
        let mut credentials = Credentials::new("hoge", "fuga");
        credentials.options.testnet = true;
        let client = BybitClient::new(credentials).unwrap();
        assert_eq!(client.base_url(), "https://api-testnet.bybit.com");
    }

    #[test]
    fn test_authenticate_injects_key_and_timestamp() {
        let client = client();
        let mut params = SymbolParams { symbol: "BTCUSD" }.to_params();
        let (query, signature) = client.authenticate(&mut params).unwrap();

        assert_eq!(params["api_key"], "hoge");
        assert!(params["timestamp"].parse::<i64>().unwrap() > 0);
        assert!(query.starts_with("api_key=hoge&symbol=BTCUSD&timestamp="));
        assert_eq!(signature, sign_params(&params, "fuga").unwrap());
    }

    #[test]
    fn test_parse_time_now() {
        assert_eq!(
            BybitClient::parse_time_now(Some("1577444332.192859")).unwrap(),
            1577444332
        );
        assert!(matches!(
            BybitClient::parse_time_now(Some("not-a-time")),
            Err(ExchangeError::DataShape(_))
        ));
        assert!(BybitClient::parse_time_now(None).is_err());
    }

    #[test]
    fn test_order_from_row() {
        let row: super::super::models::OrderRow = serde_json::from_value(serde_json::json!({
            "order_id": "e66b101a-ef3f-4647-83b5-28e0f38dcae0",
            "symbol": "BTCUSD",
            "side": "Sell",
            "order_type": "Limit",
            "price": "9000.5",
            "qty": "30",
            "updated_at": "2019-11-30T11:02:07.000Z"
        }))
        .unwrap();

        let order = BybitClient::order_from_row("BTCUSD", row).unwrap();
        assert_eq!(
            order.id.to_string(),
            "bybit::BTCUSD::e66b101a-ef3f-4647-83b5-28e0f38dcae0"
        );
        assert_eq!(order.request.norm, Norm::new(dec!(9000.5), dec!(30)));
        assert!(!order.request.is_buy);
        assert_eq!(order.request.order_type, OrderType::Limit);
        assert_eq!(order.updated_at_unix, 1575111727);
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let client = client();
        let request = OrderRequest::limit("BTCUSD", true, dec!(9000), dec!(1));

        assert!(matches!(
            client.liquidation_order(&request).await,
            Err(ExchangeError::NotSupported(_))
        ));
        assert!(matches!(
            client.update_ltp(dec!(9000)).await,
            Err(ExchangeError::NotSupported(_))
        ));
        assert!(matches!(
            client.update_best_price(dec!(9001), dec!(9000)).await,
            Err(ExchangeError::NotSupported(_))
        ));
        assert!(!client.in_scheduled_maintenance().await);
    }
}
