use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::domain::parse_sports_lenient;

use super::coordinator::SubscriptionCoordinator;
use super::model::ClientId;
use super::queue::SubscribeRequestDto;
use super::sender::ResponseSender;

/// The not-yet-validated shape of an incoming subscribe message, as
/// decoded off the wire by a transport. Kept free of any `tonic`/proto
/// type so the session logic stays transport-agnostic and testable
/// without a gRPC channel (spec §4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSubscribeRequest {
    pub sports: Vec<String>,
    pub interval_seconds: i32,
}

const DISPATCH_IDLE_SLEEP: Duration = Duration::from_millis(100);

/// `clientId ← random() mod 10^6` (spec §4.7 step 1).
pub fn assign_client_id() -> ClientId {
    rand::thread_rng().gen_range(0..1_000_000)
}

/// Validates one raw request and, if it survives, pushes a DTO onto
/// the coordinator's queue. Returns `true` iff a DTO was pushed.
///
/// Per spec §4.7: `intervalSeconds < 1` or an empty sport list rejects
/// the request outright; a non-empty sport list that is entirely
/// unknown sports is logged and the stream stays open, but no DTO is
/// queued either.
pub async fn handle_incoming_request(
    coordinator: &SubscriptionCoordinator,
    client_id: ClientId,
    raw: RawSubscribeRequest,
) -> bool {
    if raw.interval_seconds < 1 {
        warn!(client_id, interval_seconds = raw.interval_seconds, "rejected subscribe request: interval too small");
        return false;
    }
    if raw.sports.is_empty() {
        warn!(client_id, "rejected subscribe request: no sports listed");
        return false;
    }

    let sports = parse_sports_lenient(&raw.sports);
    if sports.is_empty() {
        info!(client_id, "all requested sports were unknown, dropping request");
        return false;
    }

    coordinator
        .push_message(SubscribeRequestDto {
            client_id,
            sports,
            interval_seconds: raw.interval_seconds,
        })
        .await;
    true
}

/// The dispatch loop (spec §4.7 step 2, second bullet): drains every
/// queued message belonging to `client_id`, then sleeps ~100ms and
/// retries. Runs until the task driving it is cancelled, which the
/// transport does once its receive loop observes EOF or a transport
/// error and calls `coordinator.unsubscribe(client_id)`.
pub async fn run_dispatch_loop(
    coordinator: Arc<SubscriptionCoordinator>,
    sender: Arc<dyn ResponseSender>,
    client_id: ClientId,
) {
    loop {
        while coordinator.subscribe(Arc::clone(&sender), client_id).await {}
        sleep(DISPATCH_IDLE_SLEEP).await;
    }
}
