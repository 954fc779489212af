//! 네트워크 없이 동작하는 백테스트 거래소.
//!
//! 주입된 체결가/호가로 주문을 체결하고, 체결 결과를 스트림으로 전달합니다.
//!
//! # 예제
//!
//! ```ignore
//! use bbwrapper_exchange::simulated::{BacktestConfig, BacktestExchange};
//! use bbwrapper_exchange::{Exchange, Stream};
//!
//! let exchange = BacktestExchange::new(
//!     BacktestConfig::default().with_initial_balance("USD", dec!(10000)),
//! );
//! let mut executions = exchange.execution_stream().await;
//! executions.start().await?;
//!
//! exchange.update_best_price(dec!(101), dec!(100)).await?;
//! exchange.create_order(&OrderRequest::market("BTCUSD", true, dec!(1))).await?;
//! let fill = executions.read().await?;
//! ```

mod exchange;
mod matching_engine;
mod stream;

pub use exchange::{BacktestConfig, BacktestExchange};
pub use matching_engine::{Fill, MatchingEngine, RestingOrder};
pub use stream::{BacktestExecutionStream, EventBroadcaster};
