#![no_main]
use libfuzzer_sys::fuzz_target;
use rover_core::TelemetryWindower;
use rover_core::protocol::parse_frame;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, triples)) = parse_frame(data, 24) {
        assert!(!triples.is_empty());
        assert!(triples.iter().all(|t| t.to_array().iter().all(|v| v.is_finite())));
    }

    // Rejected packets must never disturb the partial window.
    let mut windower = TelemetryWindower::new(24);
    let _ = windower.ingest(b"0.1,0.2,0.3");
    let before = windower.pending();
    match windower.ingest(data) {
        Ok(Some(window)) => assert_eq!(window.len(), 24),
        Ok(None) => assert_eq!(windower.pending(), before + 1),
        Err(_) => assert_eq!(windower.pending(), before),
    }
});
