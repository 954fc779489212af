//! 모든 어댑터가 공유하는 정규화된 도메인 모델.

mod base;
mod board;
mod execution;
mod identifier;
mod order;
mod position;

pub use base::*;
pub use board::*;
pub use execution::*;
pub use identifier::*;
pub use order::*;
pub use position::*;
