//! 백테스트 체결 스트림.

use async_trait::async_trait;
use bbwrapper_core::Execution;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::RwLock;

use crate::traits::{ExchangeResult, Stream};
use crate::ExchangeError;

/// 백테스트 거래소의 체결 스트림.
///
/// `start` 이후에만 읽을 수 있고, 한 번 시작하면 다시 시작할 수 없습니다.
/// 대기 중인 체결이 없으면 `read`는 `Ok(None)`을 반환합니다.
pub struct BacktestExecutionStream {
    /// 체결 수신기
    event_rx: mpsc::UnboundedReceiver<Execution>,
    /// 시작 여부
    started: bool,
}

impl BacktestExecutionStream {
    /// 새로운 체결 스트림을 생성합니다.
    pub fn new(event_rx: mpsc::UnboundedReceiver<Execution>) -> Self {
        Self {
            event_rx,
            started: false,
        }
    }
}

#[async_trait]
impl Stream for BacktestExecutionStream {
    async fn start(&mut self) -> ExchangeResult<()> {
        if self.started {
            return Err(ExchangeError::InvalidRequest(
                "stream already started and cannot be restarted".to_string(),
            ));
        }
        self.started = true;
        Ok(())
    }

    async fn read(&mut self) -> ExchangeResult<Option<Execution>> {
        if !self.started {
            return Err(ExchangeError::InvalidRequest(
                "stream must be started before reading".to_string(),
            ));
        }

        match self.event_rx.try_recv() {
            Ok(execution) => Ok(Some(execution)),
            // 거래소가 사라져도 "이벤트 없음"으로 취급
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(None),
        }
    }
}

/// 백테스트 거래소를 위한 이벤트 브로드캐스터.
///
/// 거래소가 여러 구독자에게 이벤트를 전송할 수 있게 합니다.
pub struct EventBroadcaster<T: Clone + Send> {
    /// 각 구독자의 송신기
    senders: Arc<RwLock<Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T: Clone + Send> EventBroadcaster<T> {
    /// 새로운 이벤트 브로드캐스터를 생성합니다.
    pub fn new() -> Self {
        Self {
            senders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 이벤트를 구독하고 수신기를 가져옵니다.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.write().await.push(tx);
        rx
    }

    /// 모든 구독자에게 이벤트를 브로드캐스트하고, 연결이 끊긴 구독자를 제거합니다.
    pub async fn broadcast(&self, event: T) {
        let mut senders = self.senders.write().await;
        senders.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// 현재 구독자 수.
    pub async fn subscriber_count(&self) -> usize {
        self.senders.read().await.len()
    }
}

impl<T: Clone + Send> Default for EventBroadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}
