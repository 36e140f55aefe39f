mod coordinator;
mod delta;
mod model;
mod queue;
mod registry;
mod sender;
mod session;
mod ticker;

pub use coordinator::SubscriptionCoordinator;
pub use delta::DeltaService;
pub use model::{ClientId, ClientSubscription};
pub use queue::{MessageQueue, SubscribeRequestDto};
pub use registry::SubscriptionRegistry;
pub use sender::ResponseSender;
pub use session::{assign_client_id, handle_incoming_request, run_dispatch_loop, RawSubscribeRequest};
pub use ticker::{PeriodicTask, TickFn, TickerFactory, TokioTickerFactory};

#[cfg(test)]
pub use sender::fake as sender_fake;
