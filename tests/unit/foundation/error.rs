use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DeviceError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DeviceError::allocation("x")
            .to_string()
            .contains("allocation error:")
    );
    assert!(
        DeviceError::recording("x")
            .to_string()
            .contains("recording error:")
    );
    assert!(DeviceError::render("x").to_string().contains("render error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DeviceError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_allocation_is_fatal() {
    assert!(DeviceError::allocation("oom").is_fatal());
    assert!(!DeviceError::validation("bad").is_fatal());
    assert!(!DeviceError::recording("cb").is_fatal());
}
