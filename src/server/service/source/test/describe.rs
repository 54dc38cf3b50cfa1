use super::*;

/// Tests descriptions with both endpoints available.
///
/// Expected: combined per-minute rate and dual mode
#[tokio::test]
async fn describes_dual_endpoint_mode() {
    let (source, _a, _b) = source_with_caps(30, 20);

    assert_eq!(
        source.processing_rate_description(),
        "~50 requests/minute using 2 endpoints"
    );
    assert_eq!(source.mode_description(), "Dual endpoint (A + B)");
}

/// Tests descriptions with one endpoint down.
///
/// Expected: surviving endpoint's rate and single mode naming it
#[tokio::test]
async fn describes_single_endpoint_mode() {
    let (source, a, _b) = source_with_caps(30, 20);
    a.set_probe_ok(false);
    source.check_availability().await;

    assert_eq!(
        source.processing_rate_description(),
        "~20 requests/minute, 1 endpoint down"
    );
    assert_eq!(source.mode_description(), "Single endpoint (B only)");
}

/// Tests descriptions with no endpoint available.
///
/// Expected: paused rate and no-endpoint mode
#[tokio::test]
async fn describes_no_endpoint_mode() {
    let (source, a, b) = source_with_caps(30, 20);
    a.set_probe_ok(false);
    b.set_probe_ok(false);
    source.check_availability().await;

    assert_eq!(
        source.processing_rate_description(),
        "No endpoint available, processing paused"
    );
    assert_eq!(source.mode_description(), "No endpoint available");
}
