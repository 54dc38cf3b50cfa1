use std::sync::Arc;
use std::time::Duration;

use crate::server::{
    error::upstream::UpstreamError,
    model::{
        batch::BatchProgress,
        fetch::{FetchFailure, PlayerRecord},
    },
    service::{
        batch::{BatchOptions, PlayerBatch},
        source::{RateLimitedSource, SourceConfig},
        upstream::fake::FakeUpstream,
    },
};


fn source_with_caps(
    cap_a: usize,
    cap_b: usize,
) -> (RateLimitedSource, Arc<FakeUpstream>, Arc<FakeUpstream>) {
    let a = FakeUpstream::new();
    let b = FakeUpstream::new();
    let source = RateLimitedSource::new(
        SourceConfig {
            window: Duration::from_secs(60),
            cap_a,
            cap_b,
            default_throttle_wait: Duration::from_secs(60),
        },
        a.clone(),
        b.clone(),
    );
    (source, a, b)
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn identifiers_of(records: &[PlayerRecord]) -> Vec<String> {
    records.iter().map(|record| record.identifier.clone()).collect()
}
