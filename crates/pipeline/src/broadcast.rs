//! 이벤트 방송 허브
//!
//! 보강된 이벤트를 등록된 모든 구독자에게 복사해 전달합니다. 전달은
//! `try_send` 기반 fire-and-forget이라 멈춘 구독자가 나머지 구독자나
//! 발행자를 막지 못합니다.
//!
//! 구독자 생명주기는 전달 실패로만 감지됩니다:
//! - 채널이 닫힘(수신측 드롭): 해당 구독자를 허브에서 제거
//! - 채널이 가득 참(수신 지연): 이번 이벤트만 드롭, 등록은 유지

use std::collections::HashMap;
use std::sync::Mutex;

use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use logwarden_core::metrics as metric_names;
use logwarden_core::types::EnrichedEvent;

/// 구독자 식별자
pub type SubscriberId = Uuid;

/// 한 번의 발행 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// 채널에 넣는 데 성공한 전달 수
    pub delivered: usize,
    /// 채널 포화로 드롭된 전달 수
    pub dropped: usize,
    /// 닫힌 채널이 발견되어 제거된 구독자 수
    pub removed: usize,
}

/// 방송 허브
///
/// 구독자 맵은 짧게 잡는 `std::sync::Mutex`로 보호하고, 실제 전달은
/// 발행 시점 스냅샷을 떠서 락 밖에서 수행합니다.
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<EnrichedEvent>>>,
}

impl BroadcastHub {
    /// 빈 허브를 생성합니다.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// 지정한 용량의 채널로 새 구독자를 등록합니다.
    ///
    /// 수신측이 받은 `Receiver`를 드롭하면 다음 발행에서 자동으로
    /// 제거됩니다.
    pub fn subscribe(&self, capacity: usize) -> (SubscriberId, mpsc::Receiver<EnrichedEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let id = Uuid::new_v4();
        self.register(id, tx);
        (id, rx)
    }

    /// 기존 송신 핸들로 구독자를 등록합니다.
    pub fn register(&self, id: SubscriberId, sender: mpsc::Sender<EnrichedEvent>) {
        let count = {
            let mut map = self.lock_subscribers();
            map.insert(id, sender);
            map.len()
        };
        gauge!(metric_names::BROADCAST_SUBSCRIBERS).set(count as f64);
        debug!(subscriber_id = %id, subscribers = count, "subscriber registered");
    }

    /// 구독자를 제거합니다. 등록되어 있었으면 true를 반환합니다.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let (existed, count) = {
            let mut map = self.lock_subscribers();
            let existed = map.remove(&id).is_some();
            (existed, map.len())
        };
        if existed {
            gauge!(metric_names::BROADCAST_SUBSCRIBERS).set(count as f64);
            debug!(subscriber_id = %id, subscribers = count, "subscriber unregistered");
        }
        existed
    }

    /// 현재 구독자 수를 반환합니다.
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// 이벤트를 모든 구독자에게 발행합니다.
    ///
    /// 구독자별로 이벤트를 복제해 전달하므로 구독자는 서로의 소비에
    /// 영향을 주지 않습니다.
    pub fn publish(&self, event: &EnrichedEvent) -> PublishReport {
        // 전달 중 락을 쥐지 않도록 스냅샷을 뜬다
        let snapshot: Vec<(SubscriberId, mpsc::Sender<EnrichedEvent>)> = self
            .lock_subscribers()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut closed = Vec::new();

        for (id, tx) in snapshot {
            match tx.try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(subscriber_id = %id, "subscriber channel full, delivery dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    closed.push(id);
                }
            }
        }

        if !closed.is_empty() {
            let count = {
                let mut map = self.lock_subscribers();
                for id in &closed {
                    if map.remove(id).is_some() {
                        report.removed += 1;
                    }
                }
                map.len()
            };
            gauge!(metric_names::BROADCAST_SUBSCRIBERS).set(count as f64);
        }

        counter!(metric_names::BROADCAST_DELIVERED_TOTAL).increment(report.delivered as u64);
        counter!(metric_names::BROADCAST_DROPPED_TOTAL).increment(report.dropped as u64);
        counter!(metric_names::BROADCAST_REMOVED_TOTAL).increment(report.removed as u64);
        report
    }

    /// 구독자 맵 락을 획득합니다. poisoned 락은 그대로 이어받습니다.
    fn lock_subscribers(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<EnrichedEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
