//! Compatibility between record format revisions
//!
//! Devices pinned to an older revision stand in for older software on either
//! side of a backup.

use crate::common::*;
use calllog_backup::{BackupSink, GRANDFATHERED_RECORD_VERSION, RECORD_FORMAT_VERSION};

fn full_call(id: i32) -> CallRecord {
    let mut r = call(id);
    r.post_dial_digits = Some(",,42".to_string());
    r.via_number = Some("+15550009999".to_string());
    r.add_for_all_users = false;
    r.block_reason = 2;
    r.screening_app_name = Some("Screener".to_string());
    r.screening_component_name = Some("com.screener/.Service".to_string());
    r.missed_reason = 1 << 33;
    r.business_call = true;
    r.asserted_display_name = Some("Example Corp".to_string());
    r
}

fn pinned_agent(version: i32) -> BackupAgent {
    BackupAgent::new(BackupConfig::default().with_record_format_version(version)).unwrap()
}

#[test]
fn older_backup_restores_with_defaults_for_newer_fields() {
    let mut old = Device::with_config(BackupConfig::default().with_record_format_version(1005));
    old.call_log.set(vec![full_call(1)]);
    old.backup().unwrap();

    let (summary, restored) = old.restore_into(&BackupAgent::default());

    assert_eq!(summary.restored, 1);
    let r = &restored[0];
    assert_eq!(r.number, full_call(1).number);
    assert!(!r.add_for_all_users);
    assert_eq!(r.post_dial_digits.as_deref(), Some(",,42"));
    assert_eq!(r.via_number.as_deref(), Some("+15550009999"));
    assert_eq!(r.block_reason, 0);
    assert_eq!(r.screening_app_name, None);
    assert_eq!(r.missed_reason, 0);
    assert!(!r.business_call);
    assert_eq!(r.asserted_display_name.as_deref(), Some(""));
}

#[test]
fn base_revision_backup_restores() {
    let mut old = Device::with_config(BackupConfig::default().with_record_format_version(1));
    old.call_log.set(vec![full_call(1)]);
    old.backup().unwrap();

    let (summary, restored) = old.restore_into(&BackupAgent::default());

    assert_eq!(summary.restored, 1);
    assert!(restored[0].add_for_all_users);
    assert_eq!(restored[0].post_dial_digits.as_deref(), Some(""));
    assert_eq!(restored[0].date, full_call(1).date);
}

#[test]
fn grandfathered_revision_is_read_by_older_codec() {
    assert_eq!(GRANDFATHERED_RECORD_VERSION, RECORD_FORMAT_VERSION);

    let mut current = Device::new();
    current.call_log.set(vec![full_call(1)]);
    current.backup().unwrap();

    let (summary, restored) = current.restore_into(&pinned_agent(1009));

    assert_eq!(summary.restored, 1);
    assert_eq!(restored[0].missed_reason, full_call(1).missed_reason);
    assert!(!restored[0].business_call);
}

#[test]
fn other_newer_revision_is_rejected_by_older_codec() {
    let mut device = Device::new();
    let mut payload = RecordCodec::pinned(1009).unwrap().encode(&call(1)).unwrap();
    payload[..4].copy_from_slice(&1011i32.to_be_bytes());
    device.store.write_entity("1", &payload).unwrap();

    let (summary, restored) = device.restore_into(&pinned_agent(1009));

    assert!(restored.is_empty());
    assert_eq!(
        summary.failed,
        vec![("1".to_string(), FailureReason::UnsupportedVersion)]
    );
}

#[test]
fn pinned_device_writes_its_revision() {
    let mut device = Device::with_config(BackupConfig::default().with_record_format_version(1007));
    device.call_log.set(vec![call(1)]);
    device.backup().unwrap();

    let payload = device.store.entity("1").unwrap();
    assert_eq!(&payload[..4], &1007i32.to_be_bytes());
}
