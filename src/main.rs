use rask_log_relay::error::RelayError;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    rask_log_relay::app::run().await
}
