use async_trait::async_trait;

use crate::domain::SportLine;

/// The duck-typed capability a dispatch task sends through: "send these
/// lines". Production wires this to the gRPC stream's outbound half;
/// tests use a recording fake (spec §9).
#[async_trait]
pub trait ResponseSender: Send + Sync {
    async fn send(&self, lines: Vec<SportLine>) -> Result<(), anyhow::Error>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<Vec<SportLine>>>,
        pub fail_next: Mutex<bool>,
    }

    #[async_trait]
    impl ResponseSender for RecordingSender {
        async fn send(&self, lines: Vec<SportLine>) -> Result<(), anyhow::Error> {
            let mut fail_next = self.fail_next.lock().await;
            if *fail_next {
                *fail_next = false;
                return Err(anyhow::anyhow!("fake send failure"));
            }
            self.sent.lock().await.push(lines);
            Ok(())
        }
    }
}
