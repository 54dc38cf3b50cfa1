use std::sync::Arc;
use std::time::Duration;

use crate::server::{
    error::upstream::UpstreamError,
    model::fetch::{EndpointId, FetchFailure, FetchOutcome, FetchStatus},
    service::{
        source::{RateLimitedSource, SourceConfig},
        upstream::fake::FakeUpstream,
    },
};

mod describe;

const WINDOW: Duration = Duration::from_secs(60);
const DEFAULT_WAIT: Duration = Duration::from_secs(60);

/// Builds a source over two fake upstreams with the given window caps.
fn source_with_caps(
    cap_a: usize,
    cap_b: usize,
) -> (RateLimitedSource, Arc<FakeUpstream>, Arc<FakeUpstream>) {
    let a = FakeUpstream::new();
    let b = FakeUpstream::new();
    let source = RateLimitedSource::new(
        SourceConfig {
            window: WINDOW,
            cap_a,
            cap_b,
            default_throttle_wait: DEFAULT_WAIT,
        },
        a.clone(),
        b.clone(),
    );
    (source, a, b)
}

fn usage(source: &RateLimitedSource, id: EndpointId) -> usize {
    source
        .window_usage()
        .into_iter()
        .find(|(endpoint, _)| *endpoint == id)
        .map(|(_, count)| count)
        .unwrap()
}
