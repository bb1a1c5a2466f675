//! Retry and deadline behavior of upstream calls.

mod test_utils;

use postforge_core::{InboundRequest, Message};
use postforge_error::PostforgeErrorKind;
use postforge_pipeline::{Deadline, FixedChooser, Pipeline, UpstreamClient, completion_request};
use postforge_rate_limit::RetryPolicy;
use postforge_storage::LearningStore;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{COMPLIANT_BODY, HYPE_TEXT, MockDriver, structured_response, test_config};

fn client(driver: &Arc<MockDriver>) -> UpstreamClient {
    UpstreamClient::new(
        driver.clone(),
        RetryPolicy::default(),
        Duration::from_millis(1_500),
    )
}

fn request() -> postforge_core::CompletionRequest {
    completion_request("mock-model", vec![Message::user("hello")], 0.7, 100)
        .expect("valid request")
}

#[tokio::test(start_paused = true)]
async fn test_transient_status_is_retried() -> anyhow::Result<()> {
    let driver = Arc::new(MockDriver::new_fail_then_succeed(2, 503, "BTC 区块 840000"));
    let deadline = Deadline::from_millis(25_000);

    let response = client(&driver).complete(&request(), &deadline, "test").await?;

    assert_eq!(response.text, "BTC 区块 840000");
    assert_eq!(driver.call_count(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_permanent_status_fails_immediately() {
    let driver = Arc::new(MockDriver::new_status(401));
    let deadline = Deadline::from_millis(25_000);

    let err = client(&driver)
        .complete(&request(), &deadline, "test")
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), PostforgeErrorKind::Upstream(_)));
    assert_eq!(driver.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_stop_at_max_attempts() {
    let driver = Arc::new(MockDriver::new_status(503));
    let deadline = Deadline::from_millis(25_000);

    let err = client(&driver)
        .complete(&request(), &deadline, "test")
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), PostforgeErrorKind::Upstream(_)));
    assert_eq!(driver.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_skipped_when_backoff_exceeds_deadline() {
    let driver = Arc::new(MockDriver::new_status(429));
    let deadline = Deadline::from_millis(1_200);

    let result = client(&driver).complete(&request(), &deadline, "test").await;

    assert!(result.is_err());
    assert_eq!(driver.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_deadline_never_calls_upstream() {
    let driver = Arc::new(MockDriver::new_success("unused"));
    let deadline = Deadline::from_millis(100);
    tokio::time::advance(Duration::from_millis(200)).await;

    let err = client(&driver)
        .complete(&request(), &deadline, "test")
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_upstream_times_out_request() {
    let driver = Arc::new(
        MockDriver::new_success(structured_response("", COMPLIANT_BODY))
            .with_latency(Duration::from_secs(10)),
    );
    let pipeline = Pipeline::new(driver.clone(), Arc::new(LearningStore::new()), &test_config())
        .with_chooser(Arc::new(FixedChooser(0)));

    let err = pipeline
        .handle("local", InboundRequest::new("BTC").with_deadline_ms(3_000u64))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repair_skipped_when_deadline_is_close() -> anyhow::Result<()> {
    let driver = Arc::new(
        MockDriver::new_success(HYPE_TEXT).with_latency(Duration::from_millis(600)),
    );
    let pipeline = Pipeline::new(driver.clone(), Arc::new(LearningStore::new()), &test_config())
        .with_chooser(Arc::new(FixedChooser(0)));

    let result = pipeline
        .handle("local", InboundRequest::new("BTC").with_deadline_ms(2_500u64))
        .await?;

    assert!(result.flags.skipped_for_deadline);
    assert!(result.flags.needs_review);
    assert_eq!(result.flags.repair_attempts, 0);
    assert_eq!(driver.call_count(), 1);
    Ok(())
}
