use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::domain::Sport;

use super::model::ClientId;

/// A subscribe/resubscribe request, already parsed and filtered down to
/// known sports. Valid iff `client_id >= 0`, `sports` is non-empty, and
/// `interval_seconds >= 1` (spec §3); invalid DTOs never reach the
/// queue — validation happens in the coordinator before push.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeRequestDto {
    pub client_id: ClientId,
    pub sports: Vec<Sport>,
    pub interval_seconds: i32,
}

impl SubscribeRequestDto {
    pub fn is_valid(&self) -> bool {
        self.client_id >= 0 && !self.sports.is_empty() && self.interval_seconds >= 1
    }
}

/// Process-global FIFO of pending subscribe requests, one global queue
/// shared by all streams (spec's documented Open Question: a per-client
/// queue is an equally conformant alternative; this implementation
/// keeps the single global queue and filters by client id at peek
/// time, as the original source does).
///
/// Peek and pop are deliberately not atomic with respect to each
/// other: the coordinator peeks, decides, and only then pops, so it
/// can leave a message in place when it belongs to a different
/// client's iteration.
pub struct MessageQueue {
    data: Mutex<VecDeque<SubscribeRequestDto>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn push(&self, dto: SubscribeRequestDto) {
        self.data.lock().await.push_back(dto);
    }

    pub async fn peek(&self) -> Option<SubscribeRequestDto> {
        self.data.lock().await.front().cloned()
    }

    /// No-op when the queue is empty. (The original source has a
    /// sibling variant that only pops when empty — inverted and wrong;
    /// this is the corrected, conditional-on-non-empty behavior.)
    pub async fn pop(&self) {
        let mut data = self.data.lock().await;
        if !data.is_empty() {
            data.pop_front();
        }
    }

    pub async fn size(&self) -> usize {
        self.data.lock().await.len()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}
