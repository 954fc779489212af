//! # bbwrapper Core
//!
//! 거래소 어댑터들이 공유하는 정규화된 도메인 모델을 제공합니다.
//!
//! - 가격/수량 쌍, 잔고, 미결제약정
//! - 호가창 스냅샷
//! - 주문 요청/응답 및 주문 엔티티
//! - 포지션 및 체결 기록
//! - 전역 주문 식별자
//! - 자격증명 및 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
