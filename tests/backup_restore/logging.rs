//! Test log subscriber setup

use crate::common::*;

#[test]
fn logging_setup_can_run_repeatedly() {
    init_test_logging();
    init_test_logging();

    let mut device = Device::new();
    device.call_log.set(calls([1]));
    assert_eq!(device.backup().unwrap().added, vec![1]);
}
