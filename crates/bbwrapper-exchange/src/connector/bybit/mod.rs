//! Bybit 거래소 연동 모듈.
//!
//! Bybit v2 REST API (인버스 무기한 계약)를 `Exchange` trait으로 감쌉니다.
//!
//! # 기능
//!
//! - 정규 쿼리 문자열 + HMAC-SHA256 요청 서명
//! - HTTP 상태와 페이로드 `ret_code`의 이중 에러 확인
//! - 호가창, 미결제약정, 주문, 포지션, 잔고 매핑
//!
//! # API 문서
//!
//! 공식 API 문서: <https://bybit-exchange.github.io/docs/inverse/>
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use bbwrapper_core::{Credentials, OrderRequest};
//! use bbwrapper_exchange::{BybitClient, Exchange};
//! use rust_decimal_macros::dec;
//!
//! let client = BybitClient::new(Credentials::new("key", "secret").with_timeout_millis(5000))?;
//! let board = client.boards("BTCUSD").await?;
//! let resp = client
//!     .create_order(&OrderRequest::limit("BTCUSD", true, board.bids[0].price, dec!(10)))
//!     .await?;
//! println!("{} filled {}", resp.id, resp.filled_size);
//! ```

pub mod auth;
mod client;
mod models;

pub use auth::{canonical_query, sign_params, sign_payload, Params};
pub use client::{BybitClient, BYBIT_NAME};
