use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TalusError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TalusError::missing_counterpart("flow_01")
            .to_string()
            .contains("missing counterpart for 'flow_01'")
    );
    assert!(
        TalusError::unreadable("bad.png", "truncated")
            .to_string()
            .contains("unreadable buffer 'bad.png'")
    );
    assert!(
        TalusError::UnsupportedChannelLayout(2)
            .to_string()
            .contains("2 channels")
    );
}

#[test]
fn dimension_mismatch_reports_both_shapes() {
    let err = TalusError::dimension_mismatch((100, 60), (60, 100));
    let msg = err.to_string();
    assert!(msg.contains("100x60"));
    assert!(msg.contains("60x100"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TalusError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
