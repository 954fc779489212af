//! 포지션 타입.
//!
//! - `Position` - 롱/숏 버킷을 가진 포지션
//! - `Stock` - 단일 순포지션 모델 (심볼당 하나의 부호 있는 수량)

use super::base::Norm;
use crate::types::Quantity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 롱/숏 버킷으로 나뉜 포지션.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// 심볼
    pub symbol: String,
    /// 롱 포지션 목록
    pub long: Vec<Norm>,
    /// 숏 포지션 목록
    pub short: Vec<Norm>,
}

impl Position {
    /// 롱 포지션 보유 여부.
    pub fn has_long(&self) -> bool {
        !self.long.is_empty()
    }

    /// 숏 포지션 보유 여부.
    pub fn has_short(&self) -> bool {
        !self.short.is_empty()
    }
}

/// 순포지션.
///
/// 순수량이 양수면 `long_size`, 음수면 `short_size`에 절대값이 들어가며,
/// 무포지션이면 둘 다 0입니다. 같은 심볼에 대해 롱과 숏을 동시에 가질 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stock {
    /// 심볼
    pub symbol: String,
    /// 부호 있는 순수량 (매도 포지션은 음수)
    pub summary: Quantity,
    /// 롱 수량
    pub long_size: Quantity,
    /// 숏 수량
    pub short_size: Quantity,
}

impl Stock {
    /// 거래소가 보고한 방향과 수량으로 순포지션을 생성합니다.
    ///
    /// `is_sell`이면 순수량의 부호를 뒤집습니다.
    pub fn from_side(symbol: impl Into<String>, is_sell: bool, size: Quantity) -> Self {
        let size_abs = size.abs();
        let summary = if is_sell { -size_abs } else { size_abs };
        Self::from_net(symbol, summary)
    }

    /// 부호 있는 순수량으로 순포지션을 생성합니다.
    pub fn from_net(symbol: impl Into<String>, summary: Quantity) -> Self {
        let size_abs = summary.abs();
        let (long_size, short_size) = if summary > Decimal::ZERO {
            (size_abs, Decimal::ZERO)
        } else if summary < Decimal::ZERO {
            (Decimal::ZERO, size_abs)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        Self {
            symbol: symbol.into(),
            summary,
            long_size,
            short_size,
        }
    }

    /// 무포지션 여부.
    pub fn is_flat(&self) -> bool {
        self.summary.is_zero()
    }
}
