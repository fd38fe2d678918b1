//! Restore of a backed-up store onto a fresh device

use crate::common::*;
use calllog_backup::{entity_key, BackupSink};

fn backed_up_device(ids: impl IntoIterator<Item = i32>) -> Device {
    let mut device = Device::new();
    device.call_log.set(calls(ids));
    device.backup().unwrap();
    device
}

fn fresh_agent() -> (BackupAgent, std::sync::Arc<RecordingAccounting>) {
    let accounting = std::sync::Arc::new(RecordingAccounting::new());
    let agent = BackupAgent::default().with_accounting(accounting.clone());
    (agent, accounting)
}

#[test]
fn backed_up_calls_restore_unchanged() {
    let source = backed_up_device([1, 2, 3]);
    let (agent, accounting) = fresh_agent();

    let (summary, restored) = source.restore_into(&agent);

    assert_eq!(summary.restored, 3);
    assert!(summary.failed.is_empty());
    assert_eq!(restored, calls([1, 2, 3]));
    assert_eq!(accounting.restored(), 3);
}

#[test]
fn corrupted_marker_fails_only_that_record() {
    let mut source = backed_up_device([1, 2, 3]);
    let mut payload = source.store.entity("2").unwrap().to_vec();
    let offset = marker_offset(&payload).unwrap();
    payload[offset + 3] ^= 0xFF;
    source.store.write_entity("2", &payload).unwrap();
    let (agent, accounting) = fresh_agent();

    let (summary, restored) = source.restore_into(&agent);

    assert_eq!(
        summary.failed,
        vec![("2".to_string(), FailureReason::EndMarkerNotFound)]
    );
    assert_eq!(restored, calls([1, 3]));
    assert_eq!(accounting.restore_failed(FailureReason::EndMarkerNotFound), 1);
    assert_eq!(accounting.restored(), 2);
}

#[test]
fn crafted_voicemail_entity_is_not_restored() {
    let mut source = backed_up_device([1]);
    let payload = RecordCodec::new().encode(&voicemail(2)).unwrap();
    source.store.write_entity(&entity_key(2), &payload).unwrap();
    let (agent, accounting) = fresh_agent();

    let (summary, restored) = source.restore_into(&agent);

    assert_eq!(summary.skipped_voicemail, 1);
    assert_eq!(restored, calls([1]));
    assert_eq!(accounting.restored(), 1);
    assert_eq!(accounting.restore_failed(FailureReason::ReadingCallData), 0);
}

#[test]
fn non_numeric_key_is_unexpected() {
    let mut source = backed_up_device([1]);
    source.store.write_entity("call-7", b"ignored").unwrap();
    let (agent, accounting) = fresh_agent();

    let (summary, restored) = source.restore_into(&agent);

    assert_eq!(
        summary.failed,
        vec![("call-7".to_string(), FailureReason::UnexpectedKey)]
    );
    assert_eq!(restored.len(), 1);
    assert_eq!(accounting.restore_failed(FailureReason::UnexpectedKey), 1);
}

#[test]
fn each_failure_kind_is_reported_once() {
    let mut source = backed_up_device([1]);

    let mut future = RecordCodec::new().encode(&call(2)).unwrap();
    future[..4].copy_from_slice(&2000i32.to_be_bytes());
    source.store.write_entity("2", &future).unwrap();

    let mut truncated = RecordCodec::new().encode(&call(3)).unwrap();
    truncated.truncate(20);
    source.store.write_entity("3", &truncated).unwrap();

    source.store.write_entity("x", b"").unwrap();
    let (agent, accounting) = fresh_agent();

    let (summary, restored) = source.restore_into(&agent);

    assert_eq!(restored, calls([1]));
    assert_eq!(summary.failed.len(), 3);
    assert_eq!(accounting.restore_failed(FailureReason::UnsupportedVersion), 1);
    assert_eq!(accounting.restore_failed(FailureReason::ReadingCallData), 1);
    assert_eq!(accounting.restore_failed(FailureReason::UnexpectedKey), 1);
}

#[test]
fn restored_record_exposes_account_handle_and_data_usage() {
    let mut device = Device::new();
    let mut with_usage = call(1);
    with_usage.data_usage = 4096;
    let mut without_account = call(2);
    without_account.account_id = None;
    device.call_log.set(vec![with_usage, without_account]);
    device.backup().unwrap();

    let (_, restored) = device.restore_into(&BackupAgent::default());

    assert_eq!(restored[0].data_usage_or_none(), Some(4096));
    assert!(restored[0].account_handle().is_some());
    assert_eq!(restored[1].data_usage_or_none(), None);
    assert!(restored[1].account_handle().is_none());
}
