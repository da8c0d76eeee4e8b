//! Prometheus metrics for the conversation ledger.

use actix_web::{get, HttpResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Duration;

static MESSAGES_APPENDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chat_ledger_messages_appended_total",
        "Total number of messages appended to conversation histories"
    )
    .expect("failed to register chat_ledger_messages_appended_total")
});

static STATUS_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "chat_ledger_status_transitions_total",
        "Status transitions by outcome (applied/ignored) and requested status",
        &["outcome", "status"]
    )
    .expect("failed to register chat_ledger_status_transitions_total")
});

static MESSAGES_EXPIRED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chat_ledger_messages_expired_total",
        "Total number of self-destructing messages removed by the sweeper"
    )
    .expect("failed to register chat_ledger_messages_expired_total")
});

static SWEEP_FAULTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chat_ledger_sweep_faults_total",
        "Conversations skipped because processing them panicked"
    )
    .expect("failed to register chat_ledger_sweep_faults_total")
});

static SWEEP_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "chat_ledger_sweep_duration_seconds",
        "Duration of one expiry sweep over the whole ledger",
        vec![0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("failed to register chat_ledger_sweep_duration_seconds")
});

static MESSAGES_ANONYMIZED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chat_ledger_messages_anonymized_total",
        "Total number of messages rewritten on account deletion"
    )
    .expect("failed to register chat_ledger_messages_anonymized_total")
});

pub fn record_message_appended() {
    MESSAGES_APPENDED_TOTAL.inc();
}

pub fn record_status_transition(applied: bool, status: &str) {
    let outcome = if applied { "applied" } else { "ignored" };
    STATUS_TRANSITIONS_TOTAL
        .with_label_values(&[outcome, status])
        .inc();
}

pub fn record_sweep(duration: Duration, expired: usize, faults: usize) {
    SWEEP_DURATION_SECONDS.observe(duration.as_secs_f64());
    MESSAGES_EXPIRED_TOTAL.inc_by(expired as u64);
    SWEEP_FAULTS_TOTAL.inc_by(faults as u64);
}

pub fn record_messages_anonymized(count: usize) {
    MESSAGES_ANONYMIZED_TOTAL.inc_by(count as u64);
}

/// GET /metrics
#[get("/metrics")]
pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
