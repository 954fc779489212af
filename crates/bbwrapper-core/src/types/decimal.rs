//! 정밀한 금융 계산을 위한 Decimal 유틸리티.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 양수인지 확인합니다.
    fn is_positive(&self) -> bool;

    /// 음수인지 확인합니다.
    fn is_negative(&self) -> bool;

    /// 거래소 파라미터용 문자열로 변환합니다 (후행 0 제거, 예: "100.50" -> "100.5").
    fn to_wire_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn is_positive(&self) -> bool {
        *self > Decimal::ZERO
    }

    fn is_negative(&self) -> bool {
        *self < Decimal::ZERO
    }

    fn to_wire_string(&self) -> String {
        self.normalize().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_ext() {
        assert!(dec!(0.1).is_positive());
        assert!(dec!(-0.1).is_negative());
        assert!(!Decimal::ZERO.is_positive());
        assert!(!Decimal::ZERO.is_negative());
    }

    #[test]
    fn test_wire_string() {
        assert_eq!(dec!(100.50).to_wire_string(), "100.5");
        assert_eq!(dec!(9000.0).to_wire_string(), "9000");
        assert_eq!(Decimal::ZERO.to_wire_string(), "0");
        assert_eq!(dec!(0.001).to_wire_string(), "0.001");
    }
}
