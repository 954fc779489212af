//! 체결 기록.

use super::base::Norm;
use super::identifier::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 주문 체결 이벤트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// 체결된 주문의 식별자
    pub id: Identifier,
    /// 체결 가격과 수량
    pub norm: Norm,
    /// 매수 체결 여부
    pub is_buy: bool,
    /// 체결 시각
    pub occurred_at: DateTime<Utc>,
}
