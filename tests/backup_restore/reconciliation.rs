//! Reconciliation across backup passes
//!
//! The saved state of one pass feeds the next, so these tests check what the
//! store and the state look like after each pass.

use crate::common::*;
use calllog_backup::StateError;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Add / remove diff
// ============================================================================

#[test]
fn one_add_and_one_remove_between_passes() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2, 3]));
    device.backup().unwrap();
    assert_eq!(device.known_ids(), vec![1, 2, 3]);

    device.store.clear_ops();
    device.call_log.set(calls([2, 3, 4]));
    let summary = device.backup().unwrap();

    assert_eq!(summary.added, vec![4]);
    assert_eq!(summary.removed, vec![1]);
    assert_eq!(summary.retained, 2);
    assert_eq!(device.known_ids(), vec![2, 3, 4]);
    assert_eq!(
        device.store.ops(),
        &[
            StoreOp::Write("4".to_string()),
            StoreOp::Delete("1".to_string())
        ]
    );
    assert_eq!(device.store.keys(), vec!["2", "3", "4"]);
}

#[test]
fn first_backup_adds_without_removing() {
    let mut device = Device::new();
    device.call_log.set(calls([5]));

    let summary = device.backup().unwrap();

    assert!(summary.is_first_backup());
    assert_eq!(summary.added, vec![5]);
    assert!(summary.removed.is_empty());
    assert_eq!(device.known_ids(), vec![5]);
}

#[test]
fn unchanged_call_log_is_idempotent() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2]));
    device.backup().unwrap();
    device.store.clear_ops();

    let summary = device.backup().unwrap();

    assert!(summary.added.is_empty());
    assert!(summary.removed.is_empty());
    assert_eq!(summary.retained, 2);
    assert!(device.store.ops().is_empty());
    assert_eq!(summary.previous_state_version, calllog_backup::STATE_FORMAT_VERSION);
}

#[test]
fn cleared_call_log_removes_everything() {
    let mut device = Device::new();
    device.call_log.set(calls([7, 8, 9]));
    device.backup().unwrap();

    device.call_log.set(Vec::new());
    let summary = device.backup().unwrap();

    assert_eq!(summary.removed, vec![7, 8, 9]);
    assert!(device.known_ids().is_empty());
    assert!(device.store.is_empty());
}

// ============================================================================
// Voicemail
// ============================================================================

#[test]
fn voicemail_never_reaches_state_or_store() {
    let mut device = Device::new();
    device
        .call_log
        .set(vec![call(1), voicemail(2), call(3), voicemail(4)]);

    let summary = device.backup().unwrap();

    assert_eq!(summary.added, vec![1, 3]);
    assert_eq!(device.known_ids(), vec![1, 3]);
    assert_eq!(device.store.keys(), vec!["1", "3"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn failed_add_is_retried_next_pass() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2, 3]));
    device.store.fail_writes_for("2");

    let summary = device.backup().unwrap();
    assert_eq!(summary.added, vec![1, 3]);
    assert_eq!(summary.failed, vec![2]);
    assert_eq!(device.known_ids(), vec![1, 3]);
    assert_eq!(
        device.accounting.backup_failed(FailureReason::BackupCallFailed),
        1
    );

    device.store.heal("2");
    let summary = device.backup().unwrap();
    assert_eq!(summary.added, vec![2]);
    assert_eq!(device.known_ids(), vec![1, 2, 3]);
}

#[test]
fn failed_remove_is_retried_next_pass() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2]));
    device.backup().unwrap();

    device.call_log.set(calls([2]));
    device.store.fail_writes_for("1");
    let summary = device.backup().unwrap();
    assert_eq!(summary.failed, vec![1]);
    assert_eq!(device.known_ids(), vec![1, 2]);
    assert!(device.store.entity("1").is_some());

    device.store.heal("1");
    let summary = device.backup().unwrap();
    assert_eq!(summary.removed, vec![1]);
    assert_eq!(device.known_ids(), vec![2]);
}

#[test]
fn truncated_state_aborts_pass_without_writes() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2]));
    device.backup().unwrap();
    device.store.clear_ops();

    device.state.truncate(device.state.len() - 2);
    let saved = device.state.clone();
    device.call_log.set(calls([3]));

    let err = device.backup().unwrap_err();

    assert!(matches!(
        err,
        BackupError::State(StateError::Truncated { expected: Some(2), read: 1 })
    ));
    assert!(device.store.ops().is_empty());
    assert_eq!(device.state, saved);
}

#[test]
fn short_state_is_treated_as_first_backup() {
    let mut device = Device::new();
    device.state = vec![0, 0];
    device.call_log.set(calls([1]));

    let summary = device.backup().unwrap();

    assert!(summary.is_first_backup());
    assert_eq!(summary.added, vec![1]);
}

#[test]
fn state_below_version_one_is_empty() {
    let mut device = Device::new();
    // version 0 followed by bytes that would otherwise be a count and ids
    device.state = vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 9];
    device.call_log.set(calls([1]));

    let summary = device.backup().unwrap();

    assert_eq!(summary.added, vec![1]);
    assert!(summary.removed.is_empty());
}

// ============================================================================
// Accounting
// ============================================================================

#[test]
fn retained_and_added_records_both_count_as_backed_up() {
    let mut device = Device::new();
    device.call_log.set(calls([1, 2]));
    device.backup().unwrap();
    assert_eq!(device.accounting.backed_up(), 2);

    device.call_log.set(calls([1, 2, 3]));
    device.backup().unwrap();
    assert_eq!(device.accounting.backed_up(), 5);
    assert_eq!(device.accounting.data_types(), vec!["telecom_call_logs"]);
}

// ============================================================================
// Property: state tracks the live ids after every pass
// ============================================================================

proptest! {
    #[test]
    fn state_matches_live_after_each_pass(
        passes in prop::collection::vec(prop::collection::btree_set(0i32..40, 0..20), 1..5)
    ) {
        let mut device = Device::new();
        for live in passes {
            device.call_log.set(calls(live.iter().copied()));
            device.backup().unwrap();

            let known: BTreeSet<i32> = device.known_ids().into_iter().collect();
            prop_assert_eq!(&known, &live);
            let stored: BTreeSet<i32> = device
                .store
                .keys()
                .iter()
                .map(|k| k.parse().unwrap())
                .collect();
            prop_assert_eq!(&stored, &live);
        }
    }
}
