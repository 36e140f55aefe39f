//! The bidirectional-streaming gRPC service generated from
//! `proto/lines.proto`, wired onto the subscription core: one stream
//! session per accepted connection (spec §4.7). The generated service
//! trait is the transport this crate's otherwise-opaque wire encoding
//! gets, matching the `SubscribeOnSportsLines(stream) returns (stream)`
//! shape named in spec.md §6.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, warn};

use crate::domain::SportLine;
use crate::subscription::{
    assign_client_id, handle_incoming_request, run_dispatch_loop, RawSubscribeRequest,
    ResponseSender, SubscriptionCoordinator,
};

pub mod proto {
    tonic::include_proto!("kiddy_lines");
}

pub use proto::kiddy_line_processor_server::KiddyLineProcessorServer;
use proto::kiddy_line_processor_server::KiddyLineProcessor;

/// Outbound channel depth per subscriber. Dispatch ticks are infrequent
/// (spec's minimum cadence is 1s) relative to how fast a client drains
/// its stream, so a small buffer is enough slack for a slow receiver
/// without masking backpressure.
const OUTBOUND_BUFFER: usize = 16;

/// Bridges the coordinator's duck-typed `ResponseSender` (spec §9) onto
/// the tonic stream's outbound half.
struct ChannelSender {
    tx: mpsc::Sender<Result<proto::SubscribeResponse, Status>>,
}

#[async_trait]
impl ResponseSender for ChannelSender {
    async fn send(&self, lines: Vec<SportLine>) -> Result<(), anyhow::Error> {
        let sports = lines
            .into_iter()
            .map(|line| proto::Sport {
                r#type: line.sport.as_str().to_string(),
                line: line.score,
            })
            .collect();
        self.tx
            .send(Ok(proto::SubscribeResponse { sports }))
            .await
            .map_err(|err| anyhow::anyhow!("subscriber channel closed: {}", err))
    }
}

pub struct LinesService {
    coordinator: Arc<SubscriptionCoordinator>,
}

impl LinesService {
    pub fn new(coordinator: Arc<SubscriptionCoordinator>) -> Self {
        Self { coordinator }
    }
}

type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<proto::SubscribeResponse, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl KiddyLineProcessor for LinesService {
    type SubscribeOnSportsLinesStream = ResponseStream;

    /// Spec §4.7: assign a client id, then fork the receive loop and the
    /// dispatch loop. The receive loop owns the incoming half and
    /// unsubscribes + aborts the dispatch task the moment the stream
    /// ends or errors; the dispatch loop never decides to stop itself.
    async fn subscribe_on_sports_lines(
        &self,
        request: Request<Streaming<proto::SubscribeRequest>>,
    ) -> Result<Response<Self::SubscribeOnSportsLinesStream>, Status> {
        let mut incoming = request.into_inner();
        let client_id = assign_client_id();
        info!(client_id, "subscription stream accepted");

        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let sender: Arc<dyn ResponseSender> = Arc::new(ChannelSender { tx });

        let dispatch_coordinator = Arc::clone(&self.coordinator);
        let dispatch_sender = Arc::clone(&sender);
        let dispatch_task = tokio::spawn(run_dispatch_loop(
            dispatch_coordinator,
            dispatch_sender,
            client_id,
        ));

        let receive_coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move {
            loop {
                match incoming.message().await {
                    Ok(Some(req)) => {
                        handle_incoming_request(
                            &receive_coordinator,
                            client_id,
                            RawSubscribeRequest {
                                sports: req.sports,
                                interval_seconds: req.interval_in_second,
                            },
                        )
                        .await;
                    }
                    Ok(None) => {
                        info!(client_id, "subscription stream closed by client");
                        break;
                    }
                    Err(err) => {
                        warn!(client_id, error = %err, "subscription stream receive error");
                        break;
                    }
                }
            }
            receive_coordinator.unsubscribe(client_id).await;
            dispatch_task.abort();
        });

        Ok(Response::new(
            Box::pin(ReceiverStream::new(rx)) as Self::SubscribeOnSportsLinesStream
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sport;

    #[tokio::test]
    async fn channel_sender_forwards_lines_as_proto_sports() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = ChannelSender { tx };

        sender
            .send(vec![SportLine::new(Sport::Baseball, 0.65)])
            .await
            .unwrap();

        let message = rx.recv().await.unwrap().unwrap();
        assert_eq!(message.sports.len(), 1);
        assert_eq!(message.sports[0].r#type, "baseball");
        assert_eq!(message.sports[0].line, 0.65);
    }

    #[tokio::test]
    async fn channel_sender_errors_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = ChannelSender { tx };

        let result = sender.send(vec![SportLine::new(Sport::Soccer, 1.0)]).await;
        assert!(result.is_err());
    }
}
