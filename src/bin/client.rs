//! Minimal demo client for manually exercising the subscription RPC:
//! connects, sends one `SubscribeRequest` built from argv, and prints
//! every line that arrives for the life of the stream.
//!
//! Usage: lines-client [grpc-url] [comma-separated-sports] [interval-seconds]

use kiddy_lines::grpc::proto::kiddy_line_processor_client::KiddyLineProcessorClient;
use kiddy_lines::grpc::proto::SubscribeRequest;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let endpoint = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:50051".to_string());
    let sports: Vec<String> = args
        .next()
        .unwrap_or_else(|| "baseball".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let interval_in_second: i32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    let mut client = KiddyLineProcessorClient::connect(endpoint).await?;

    let request = SubscribeRequest {
        sports,
        interval_in_second,
    };
    let outbound = tokio_stream::once(request);
    let response = client.subscribe_on_sports_lines(outbound).await?;
    let mut inbound = response.into_inner();

    while let Some(message) = inbound.message().await? {
        for sport in message.sports {
            info!(sport = %sport.r#type, line = sport.line, "update");
        }
    }

    Ok(())
}
