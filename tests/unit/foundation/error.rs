use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PoseplayError::not_ready("x")
            .to_string()
            .contains("not ready:")
    );
    assert!(
        PoseplayError::illegal_transition("x")
            .to_string()
            .contains("illegal state transition:")
    );
    assert!(
        PoseplayError::capture_unavailable("x")
            .to_string()
            .contains("capture unavailable:")
    );
    assert!(
        PoseplayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PoseplayError::media("x").to_string().contains("media error:"));
}

#[test]
fn only_not_ready_and_illegal_transition_are_recoverable() {
    assert!(PoseplayError::not_ready("x").is_recoverable_rejection());
    assert!(PoseplayError::illegal_transition("x").is_recoverable_rejection());
    assert!(!PoseplayError::capture_unavailable("x").is_recoverable_rejection());
    assert!(!PoseplayError::media("x").is_recoverable_rejection());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PoseplayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
