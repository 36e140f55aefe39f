use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::Sport;

use super::delta::DeltaService;
use super::model::{ClientId, ClientSubscription};
use super::queue::{MessageQueue, SubscribeRequestDto};
use super::registry::SubscriptionRegistry;
use super::sender::ResponseSender;
use super::ticker::{TickerFactory, TokioTickerFactory};

/// The baseline assigned to every sport in a brand-new subscription,
/// before the first real score has ever been read (spec §4.5).
const DEFAULT_SCORE: f32 = 1.0;

/// Owns the registry, the message queue, and the delta service; the
/// hard-engineering core described in spec §4.5. `subscribe` is meant
/// to be called in a tight loop by the stream session's dispatch loop
/// until it returns `false`.
pub struct SubscriptionCoordinator {
    registry: SubscriptionRegistry,
    queue: MessageQueue,
    delta: Arc<DeltaService>,
    ticker_factory: Arc<dyn TickerFactory>,
}

impl SubscriptionCoordinator {
    pub fn new(delta: DeltaService) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            queue: MessageQueue::new(),
            delta: Arc::new(delta),
            ticker_factory: Arc::new(TokioTickerFactory),
        }
    }

    #[cfg(test)]
    pub fn with_ticker_factory(delta: DeltaService, ticker_factory: Arc<dyn TickerFactory>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            queue: MessageQueue::new(),
            delta: Arc::new(delta),
            ticker_factory,
        }
    }

    /// Validates and enqueues. Invalid requests are silently dropped —
    /// they never represent user state worth preserving (spec §4.5).
    pub async fn push_message(&self, dto: SubscribeRequestDto) {
        if !dto.is_valid() {
            return;
        }
        self.queue.push(dto).await;
    }

    /// Stops the timer (if any) and removes the entry. Idempotent.
    pub async fn unsubscribe(&self, client_id: ClientId) {
        self.registry.remove(client_id).await;
    }

    /// Attempts to advance `client_id`'s state by one queued message.
    /// Returns `true` when a dispatch task was (re)installed. The
    /// caller loops on `true` to drain everything currently queued for
    /// this client.
    pub async fn subscribe(&self, sender: Arc<dyn ResponseSender>, client_id: ClientId) -> bool {
        let head = match self.queue.peek().await {
            Some(dto) if dto.client_id == client_id => dto,
            _ => return false,
        };

        if head.sports.is_empty() {
            self.queue.pop().await;
            return false;
        }

        let existing = self.registry.get(client_id).await;

        let changed = match &existing {
            None => true,
            Some(handle) => {
                let sub = handle.lock().await;
                self.delta
                    .is_subscription_changed(true, &sub.baselines, &head.sports)
            }
        };

        if !changed {
            self.queue.pop().await;
            return false;
        }

        if let Some(handle) = existing {
            let mut sub = handle.lock().await;
            if let Some(task) = sub.task.take() {
                task.stop();
            }
        }

        self.install(Arc::clone(&sender), &head).await;
        self.queue.pop().await;
        true
    }

    async fn install(&self, sender: Arc<dyn ResponseSender>, msg: &SubscribeRequestDto) {
        let baselines: HashMap<Sport, f32> = msg
            .sports
            .iter()
            .map(|s| (*s, DEFAULT_SCORE))
            .collect();

        let handle = self
            .registry
            .insert(msg.client_id, ClientSubscription::new(baselines))
            .await;

        self.emit(Arc::clone(&handle), Arc::clone(&sender), msg.sports.clone(), false)
            .await;

        let interval_seconds = msg.interval_seconds;
        let sports = msg.sports.clone();
        let emit_handle = Arc::clone(&handle);
        let emit_sender = Arc::clone(&sender);
        let emit_delta = Arc::clone(&self.delta);

        let tick_fn: super::ticker::TickFn = Arc::new(move || {
            let handle = Arc::clone(&emit_handle);
            let sender = Arc::clone(&emit_sender);
            let sports = sports.clone();
            let delta = Arc::clone(&emit_delta);
            Box::pin(async move {
                Self::emit_with(&delta, handle, sender, sports, true).await;
            })
        });

        let task = self.ticker_factory.schedule(interval_seconds, tick_fn);

        let mut sub = handle.lock().await;
        sub.task = Some(task);
    }

    async fn emit(
        &self,
        handle: Arc<tokio::sync::Mutex<ClientSubscription>>,
        sender: Arc<dyn ResponseSender>,
        sports: Vec<Sport>,
        need_delta: bool,
    ) {
        Self::emit_with(&self.delta, handle, sender, sports, need_delta).await;
    }

    /// Reads the store first, with no lock held, then takes the
    /// per-client lock only for the local baseline diff/update, and
    /// releases it again before sending. Spec §5: no lock is held
    /// across I/O to the store or to the stream.
    async fn emit_with(
        delta: &DeltaService,
        handle: Arc<tokio::sync::Mutex<ClientSubscription>>,
        sender: Arc<dyn ResponseSender>,
        sports: Vec<Sport>,
        need_delta: bool,
    ) {
        let mut lines = match delta.fetch_scores(&sports).await {
            Ok(lines) => lines,
            Err(err) => {
                error!("delta computation failed: {}", err);
                return;
            }
        };

        {
            let mut sub = handle.lock().await;
            delta.apply_diff(&mut lines, need_delta, &mut sub);
        }

        if let Err(err) = sender.send(lines).await {
            warn!("failed to send lines to subscriber: {}", err);
        }
    }

    #[cfg(test)]
    pub async fn registry_len(&self) -> usize {
        self.registry.len().await
    }

    #[cfg(test)]
    pub async fn queue_size(&self) -> usize {
        self.queue.size().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sport;
    use crate::store::fake::FakeScoreStore;
    use crate::subscription::sender::fake::RecordingSender;

    fn coordinator_with(scores: impl IntoIterator<Item = (Sport, f32)>) -> SubscriptionCoordinator {
        let store = Arc::new(FakeScoreStore::new(scores));
        SubscriptionCoordinator::new(DeltaService::new(store))
    }

    fn req(client_id: i64, sports: Vec<Sport>, interval: i32) -> SubscribeRequestDto {
        SubscribeRequestDto {
            client_id,
            sports,
            interval_seconds: interval,
        }
    }

    #[tokio::test]
    async fn empty_queue_subscribe_is_false_with_no_side_effects() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        assert!(!coordinator.subscribe(sender, 1).await);
        assert_eq!(coordinator.registry_len().await, 0);
    }

    #[tokio::test]
    async fn fresh_subscription_emits_absolute_score() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        let sender = Arc::new(RecordingSender::default());
        let sender_dyn: Arc<dyn ResponseSender> = sender.clone();

        coordinator
            .push_message(req(1, vec![Sport::Baseball], 1))
            .await;
        assert!(coordinator.subscribe(sender_dyn, 1).await);

        let sent = sender.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0].score, 0.8);
        assert_eq!(coordinator.registry_len().await, 1);
        assert_eq!(coordinator.queue_size().await, 0);
    }

    #[tokio::test]
    async fn invalid_message_is_dropped_before_queue() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        coordinator.push_message(req(1, vec![], 1)).await;
        assert_eq!(coordinator.queue_size().await, 0);

        coordinator.push_message(req(-1, vec![Sport::Baseball], 1)).await;
        assert_eq!(coordinator.queue_size().await, 0);

        coordinator.push_message(req(1, vec![Sport::Baseball], 0)).await;
        assert_eq!(coordinator.queue_size().await, 0);
    }

    #[tokio::test]
    async fn message_for_other_client_is_left_in_place() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator
            .push_message(req(2, vec![Sport::Baseball], 1))
            .await;

        assert!(!coordinator.subscribe(Arc::clone(&sender), 1).await);
        assert_eq!(coordinator.queue_size().await, 1);
    }

    #[tokio::test]
    async fn empty_sports_is_rejected_before_reaching_the_queue() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator.push_message(req(1, vec![], 1)).await;
        assert_eq!(coordinator.queue_size().await, 0);
        assert!(!coordinator.subscribe(sender, 1).await);
    }

    #[tokio::test]
    async fn resubscribe_unchanged_consumes_message_without_new_install() {
        let coordinator = coordinator_with([(Sport::Soccer, 1.0), (Sport::Football, 1.0)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator
            .push_message(req(1, vec![Sport::Soccer, Sport::Football], 2))
            .await;
        assert!(coordinator.subscribe(Arc::clone(&sender), 1).await);

        coordinator
            .push_message(req(1, vec![Sport::Soccer, Sport::Football], 2))
            .await;
        assert!(!coordinator.subscribe(Arc::clone(&sender), 1).await);
        assert_eq!(coordinator.queue_size().await, 0);
        assert_eq!(coordinator.registry_len().await, 1);
    }

    #[tokio::test]
    async fn resubscribe_changed_replaces_subscription() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8), (Sport::Soccer, 1.2)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator
            .push_message(req(1, vec![Sport::Baseball], 1))
            .await;
        assert!(coordinator.subscribe(Arc::clone(&sender), 1).await);

        coordinator
            .push_message(req(1, vec![Sport::Soccer], 1))
            .await;
        assert!(coordinator.subscribe(Arc::clone(&sender), 1).await);
        assert_eq!(coordinator.registry_len().await, 1);
    }

    #[tokio::test]
    async fn registry_lock_is_not_held_across_the_store_read() {
        use std::time::{Duration, Instant};
        use tokio::time::sleep;

        let store = Arc::new(FakeScoreStore::new([(Sport::Baseball, 0.5)]));
        let coordinator = SubscriptionCoordinator::new(DeltaService::new(store.clone()));
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator
            .push_message(req(1, vec![Sport::Baseball], 5))
            .await;
        assert!(coordinator.subscribe(Arc::clone(&sender), 1).await);

        // Only slow down reads that happen *after* the install above, so
        // the in-flight emit below is the one under test.
        store.set_read_delay(Duration::from_millis(150)).await;

        let handle = coordinator.registry.get(1).await.unwrap();
        let delta = Arc::clone(&coordinator.delta);
        let emit_handle = Arc::clone(&handle);
        let emit_sender = Arc::clone(&sender);
        tokio::spawn(async move {
            SubscriptionCoordinator::emit_with(&delta, emit_handle, emit_sender, vec![Sport::Baseball], true)
                .await;
        });

        // Give the spawned emit time to enter `fetch_scores` and start
        // sleeping, but well short of the store's artificial delay.
        sleep(Duration::from_millis(20)).await;

        let start = Instant::now();
        coordinator.unsubscribe(1).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(100),
            "unsubscribe blocked behind the in-flight store read: {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let coordinator = coordinator_with([(Sport::Baseball, 0.8)]);
        let sender: Arc<dyn ResponseSender> = Arc::new(RecordingSender::default());

        coordinator
            .push_message(req(1, vec![Sport::Baseball], 1))
            .await;
        coordinator.subscribe(sender, 1).await;

        coordinator.unsubscribe(1).await;
        assert_eq!(coordinator.registry_len().await, 0);
        coordinator.unsubscribe(1).await;
        assert_eq!(coordinator.registry_len().await, 0);
    }
}
