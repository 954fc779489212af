//! Bybit v2 REST 요청 파라미터 및 응답 타입.

#![allow(dead_code)] // API 응답 필드 전체 매핑 (일부만 사용)

use super::auth::Params;
use crate::traits::ExchangeResult;
use crate::ExchangeError;
use bbwrapper_core::{DecimalExt, Price, Quantity};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 체결 가능성 있는 주문 상태만 조회 (종료 상태 제외).
pub const ACTIVE_ORDER_STATUSES: &str = "Created,New,PartiallyFilled";

/// 주문 유효 기간 (항상 취소 시까지 유효).
pub const GOOD_TILL_CANCEL: &str = "GoodTillCancel";

/// 매수/매도 방향의 와이어 이름.
pub fn side_name(is_buy: bool) -> &'static str {
    if is_buy {
        "Buy"
    } else {
        "Sell"
    }
}

/// 엄격한 Decimal 파싱. 잘못된 숫자 문자열은 0으로 대체하지 않고 에러로 처리합니다.
pub fn parse_decimal(field: &str, value: &str) -> ExchangeResult<Decimal> {
    value.trim().parse::<Decimal>().map_err(|e| {
        ExchangeError::DataShape(format!(
            "{} 필드를 숫자로 파싱할 수 없음 ({:?}): {}",
            field, value, e
        ))
    })
}

// ============================================================================
// 요청 파라미터
// ============================================================================

fn insert(params: &mut Params, key: &str, value: impl Into<String>) {
    params.insert(key.to_string(), value.into());
}

/// `/v2/public/orderBook/L2`
pub struct OrderBookParams<'a> {
    pub symbol: &'a str,
}

impl OrderBookParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "symbol", self.symbol);
        params
    }
}

/// `/v2/public/open-interest`
pub struct OpenInterestParams<'a> {
    pub symbol: &'a str,
    pub minute: u32,
    pub limit: u32,
}

impl OpenInterestParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "symbol", self.symbol);
        insert(&mut params, "period", format!("{}min", self.minute));
        insert(&mut params, "limit", self.limit.to_string());
        params
    }
}

/// `/v2/private/order/create`
pub struct CreateOrderParams<'a> {
    pub side: &'static str,
    pub symbol: &'a str,
    pub order_type: &'static str,
    pub qty: Quantity,
    pub price: Price,
    pub time_in_force: &'static str,
}

impl CreateOrderParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "side", self.side);
        insert(&mut params, "symbol", self.symbol);
        insert(&mut params, "order_type", self.order_type);
        insert(&mut params, "qty", self.qty.to_wire_string());
        insert(&mut params, "price", self.price.to_wire_string());
        insert(&mut params, "time_in_force", self.time_in_force);
        params
    }
}

/// `/v2/private/order/replace`
pub struct ReplaceOrderParams<'a> {
    pub order_id: &'a str,
    pub symbol: &'a str,
    pub qty: Quantity,
    pub price: Price,
}

impl ReplaceOrderParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "order_id", self.order_id);
        insert(&mut params, "symbol", self.symbol);
        insert(&mut params, "p_r_qty", self.qty.to_wire_string());
        insert(&mut params, "p_r_price", self.price.to_wire_string());
        params
    }
}

/// `/v2/private/order/cancel`
pub struct CancelOrderParams<'a> {
    pub symbol: &'a str,
    pub order_id: &'a str,
}

impl CancelOrderParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "symbol", self.symbol);
        insert(&mut params, "order_id", self.order_id);
        params
    }
}

/// `/v2/private/order/cancelAll`, `/v2/private/position/list`
pub struct SymbolParams<'a> {
    pub symbol: &'a str,
}

impl SymbolParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "symbol", self.symbol);
        params
    }
}

/// `/v2/private/order/list`
pub struct OrderListParams<'a> {
    pub symbol: &'a str,
    pub order_status: &'static str,
}

impl OrderListParams<'_> {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        insert(&mut params, "symbol", self.symbol);
        insert(&mut params, "order_status", self.order_status);
        params
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// 모든 Bybit 응답의 공통 봉투.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    #[serde(default)]
    pub ext_code: Option<String>,
    #[serde(default)]
    pub ext_info: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub time_now: Option<String>,
}

impl ApiResponse {
    /// 페이로드 상태 코드 확인. 0이 아니면 API 에러입니다.
    pub fn check_ret_code(&self) -> ExchangeResult<()> {
        if self.ret_code != 0 {
            return Err(self.to_api_error());
        }
        Ok(())
    }

    /// `ret_msg == "OK"` 규약을 쓰는 엔드포인트용 확인.
    pub fn check_ok_message(&self) -> ExchangeResult<()> {
        if self.ret_msg != "OK" {
            return Err(self.to_api_error());
        }
        Ok(())
    }

    /// `result` 필드를 타입으로 디코딩.
    ///
    /// 봉투는 이미 파싱되었으므로, 필드 누락이나 타입 불일치는 전송 에러가 아니라
    /// `DataShape`입니다.
    pub fn decode<T: DeserializeOwned>(self) -> ExchangeResult<T> {
        serde_json::from_value(self.result)
            .map_err(|e| ExchangeError::DataShape(format!("result 디코딩 실패: {}", e)))
    }

    fn to_api_error(&self) -> ExchangeError {
        ExchangeError::Api {
            ret_code: self.ret_code,
            message: self.ret_msg.clone(),
            ext_code: self.ext_code.clone().unwrap_or_default(),
            ext_info: self.ext_info.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderBookRow {
    pub symbol: String,
    pub price: String,
    pub size: Decimal,
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenInterestRow {
    pub open_interest: Decimal,
    pub timestamp: i64,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderResult {
    pub order_id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub order_status: String,
    pub leaves_qty: Decimal,
    #[serde(default)]
    pub cum_exec_qty: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceOrderResult {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderListResult {
    #[serde(default)]
    pub data: Option<Vec<OrderRow>>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderRow {
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub price: String,
    pub qty: String,
    #[serde(default)]
    pub order_status: String,
    #[serde(default)]
    pub leaves_qty: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct PositionResult {
    #[serde(default)]
    pub symbol: String,
    pub side: String,
    pub size: Decimal,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub position_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletBalanceEntry {
    pub available_balance: Decimal,
    #[serde(default)]
    pub wallet_balance: Option<Decimal>,
    #[serde(default)]
    pub used_margin: Option<Decimal>,
}

/// 통화 코드 → 잔고. 사전순으로 순회됩니다.
pub type WalletBalanceResult = BTreeMap<String, WalletBalanceEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_strict() {
        assert_eq!(parse_decimal("price", "9000.5").unwrap(), dec!(9000.5));
        assert_eq!(parse_decimal("price", " 1 ").unwrap(), dec!(1));
        assert!(matches!(
            parse_decimal("price", "abc"),
            Err(ExchangeError::DataShape(_))
        ));
        assert!(parse_decimal("qty", "").is_err());
    }

    #[test]
    fn test_create_order_params() {
        let params = CreateOrderParams {
            side: side_name(true),
            symbol: "BTCUSD",
            order_type: "Limit",
            qty: dec!(10),
            price: dec!(9000.50),
            time_in_force: GOOD_TILL_CANCEL,
        }
        .to_params();

        assert_eq!(params["side"], "Buy");
        assert_eq!(params["qty"], "10");
        assert_eq!(params["price"], "9000.5");
        assert_eq!(params["time_in_force"], "GoodTillCancel");
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_open_interest_period() {
        let params = OpenInterestParams {
            symbol: "BTCUSD",
            minute: 5,
            limit: 50,
        }
        .to_params();
        assert_eq!(params["period"], "5min");
        assert_eq!(params["limit"], "50");
    }

    #[test]
    fn test_replace_params_keys() {
        let params = ReplaceOrderParams {
            order_id: "abc",
            symbol: "BTCUSD",
            qty: dec!(3),
            price: dec!(8800),
        }
        .to_params();
        let keys: Vec<_> = params.keys().cloned().collect();
        assert_eq!(keys, vec!["order_id", "p_r_price", "p_r_qty", "symbol"]);
    }

    #[test]
    fn test_api_response_checks() {
        let ok: ApiResponse = serde_json::from_str(
            r#"{"ret_code":0,"ret_msg":"OK","ext_code":"","result":{"order_id":"x"},"time_now":"1577444332.192859"}"#,
        )
        .unwrap();
        assert!(ok.check_ret_code().is_ok());
        assert!(ok.check_ok_message().is_ok());
        let result: ReplaceOrderResult = ok.decode().unwrap();
        assert_eq!(result.order_id, "x");

        let failed: ApiResponse = serde_json::from_str(
            r#"{"ret_code":30032,"ret_msg":"order has been finished or canceled","ext_code":null,"ext_info":"","result":null}"#,
        )
        .unwrap();
        match failed.check_ret_code() {
            Err(ExchangeError::Api { ret_code, message, ext_code, .. }) => {
                assert_eq!(ret_code, 30032);
                assert_eq!(message, "order has been finished or canceled");
                assert_eq!(ext_code, "");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_message_convention() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"ret_code":0,"ret_msg":"","result":[]}"#).unwrap();
        assert!(resp.check_ret_code().is_ok());
        assert!(matches!(resp.check_ok_message(), Err(ExchangeError::Api { .. })));
    }

    #[test]
    fn test_decode_failure_is_data_shape() {
        let missing: ApiResponse =
            serde_json::from_str(r#"{"ret_code":0,"ret_msg":"OK","result":{"order_id":"x"}}"#)
                .unwrap();
        let err = missing.decode::<CreateOrderResult>().unwrap_err();
        assert!(matches!(err, ExchangeError::DataShape(_)), "got {:?}", err);
        assert!(!err.is_transport());

        let null: ApiResponse =
            serde_json::from_str(r#"{"ret_code":0,"ret_msg":"OK","result":null}"#).unwrap();
        assert!(matches!(
            null.decode::<PositionResult>(),
            Err(ExchangeError::DataShape(_))
        ));
    }
}
