//! Behaviour of the NVM façade over the RAM record database.
//!
//! These tests cover:
//! - Store routing by record type
//! - First/Next traversal and end of sequence
//! - Identity records surviving single and bulk discards
//! - Legacy status codes at the stack boundary

use blenvm_adapters::legacy::{
    BLEPLAT_BUSY, BLEPLAT_EOF, BLEPLAT_FULL, BLEPLAT_NVM_ALL, BLEPLAT_NVM_CURRENT,
    BLEPLAT_NVM_FIRST, BLEPLAT_NVM_NEXT, BLEPLAT_OK,
};
use blenvm_adapters::{
    CompareOutcome, DiscardMode, MemoryRecordDb, NvmAdapter, NvmConfig, NvmError, RecordType,
    SeekMode, StoreId,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn nvm(security_gatt: usize, device_identity: usize) -> NvmAdapter<MemoryRecordDb> {
    init_logger();
    let db = MemoryRecordDb::with_capacity(security_gatt, device_identity);
    NvmAdapter::new(db, NvmConfig::default()).unwrap()
}

/// Walk every record of `record_type` with First then Next.
fn collect(nvm: &mut NvmAdapter<MemoryRecordDb>, record_type: RecordType) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = [0u8; 64];
    let mut mode = SeekMode::First;
    loop {
        match nvm.get(mode, record_type, 0, &mut buf) {
            Ok(len) => out.push(buf[..len].to_vec()),
            Err(NvmError::EndOfSequence) => return out,
            Err(err) => panic!("unexpected error: {err}"),
        }
        mode = SeekMode::Next;
    }
}

#[test]
fn test_traversal_yields_matching_records_in_order() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::SECURITY, b"bond-1", &[]).unwrap();
    nvm.add(RecordType::GATT, b"cccd-1", &[]).unwrap();
    nvm.add(RecordType::SECURITY, b"bond-2", &[]).unwrap();
    nvm.add(RecordType::DEVICE_ID, b"irk", &[]).unwrap();

    assert_eq!(collect(&mut nvm, RecordType::SECURITY), vec![b"bond-1".to_vec(), b"bond-2".to_vec()]);
    assert_eq!(collect(&mut nvm, RecordType::GATT), vec![b"cccd-1".to_vec()]);
    assert_eq!(collect(&mut nvm, RecordType::DEVICE_ID), vec![b"irk".to_vec()]);

    // ANY routes to the security/GATT store and sees both of its types.
    assert_eq!(collect(&mut nvm, RecordType::ANY).len(), 3);

    // Exhausted traversal keeps reporting end of sequence.
    let mut buf = [0u8; 8];
    assert_eq!(
        nvm.get(SeekMode::Next, RecordType::SECURITY, 0, &mut buf),
        Err(NvmError::EndOfSequence)
    );
}

#[test]
fn test_round_trip_with_extra_and_offset() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::GATT, b"handle:", b"0x002a").unwrap();

    let mut buf = [0u8; 32];
    let len = nvm.get(SeekMode::First, RecordType::GATT, 0, &mut buf).unwrap();
    assert_eq!(&buf[..len], b"handle:0x002a");

    let mut tail = [0u8; 6];
    assert_eq!(nvm.get(SeekMode::Current, RecordType::GATT, 7, &mut tail), Ok(13));
    assert_eq!(&tail, b"0x002a");

    assert_eq!(nvm.compare(7, b"0x002a"), CompareOutcome::Equal);
    assert_eq!(nvm.compare(7, b"0x002a-longer"), CompareOutcome::ShorterThanPattern);
    assert_eq!(nvm.compare(0, b"hand"), CompareOutcome::Equal);
    assert_eq!(nvm.compare(0, b"zzz"), CompareOutcome::ShorterThanPattern);
    assert_eq!(nvm.compare(0, b"aaa"), CompareOutcome::LongerThanPattern);
}

#[test]
fn test_identity_record_survives_discard_current() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::DEVICE_ID, b"static-addr", &[]).unwrap();

    let mut buf = [0u8; 16];
    nvm.get(SeekMode::First, RecordType::DEVICE_ID, 0, &mut buf).unwrap();
    assert_eq!(nvm.current_store(), StoreId::DeviceIdentity);

    nvm.discard(DiscardMode::Current);

    assert_eq!(nvm.db().live_count(StoreId::DeviceIdentity), 1);
    assert_eq!(nvm.get(SeekMode::Current, RecordType::DEVICE_ID, 0, &mut buf), Ok(11));
}

#[test]
fn test_discard_current_deletes_security_record() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::SECURITY, b"old", &[]).unwrap();
    nvm.add(RecordType::SECURITY, b"new", &[]).unwrap();

    let mut buf = [0u8; 8];
    nvm.get(SeekMode::First, RecordType::SECURITY, 0, &mut buf).unwrap();
    nvm.discard(DiscardMode::Current);

    assert_eq!(collect(&mut nvm, RecordType::SECURITY), vec![b"new".to_vec()]);
}

#[test]
fn test_discard_all_keeps_identity_store() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::SECURITY, b"bond", &[]).unwrap();
    nvm.add(RecordType::GATT, b"cccd", &[]).unwrap();
    nvm.add(RecordType::DEVICE_ID, b"irk", &[]).unwrap();

    nvm.discard(DiscardMode::All);

    assert_eq!(nvm.db().live_count(StoreId::SecurityGatt), 0);
    assert_eq!(nvm.db().used(StoreId::SecurityGatt), 0);
    assert_eq!(nvm.db().live_count(StoreId::DeviceIdentity), 1);
    assert!(collect(&mut nvm, RecordType::ANY).is_empty());

    // The store is usable again right away.
    nvm.add(RecordType::SECURITY, b"bond-2", &[]).unwrap();
    assert_eq!(collect(&mut nvm, RecordType::SECURITY), vec![b"bond-2".to_vec()]);
}

#[test]
fn test_record_added_after_discard_all_is_not_current() {
    let mut nvm = nvm(1024, 256);
    nvm.add(RecordType::SECURITY, b"old", &[]).unwrap();

    let mut buf = [0u8; 8];
    nvm.get(SeekMode::First, RecordType::SECURITY, 0, &mut buf).unwrap();
    nvm.discard(DiscardMode::All);
    nvm.add(RecordType::SECURITY, b"fresh", &[]).unwrap();

    // No seek since the erase: nothing is under the cursor.
    assert_eq!(
        nvm.get(SeekMode::Current, RecordType::SECURITY, 0, &mut buf),
        Err(NvmError::Busy)
    );
    assert_eq!(nvm.compare(0, b"fresh"), CompareOutcome::LongerThanPattern);
    nvm.discard(DiscardMode::Current);

    assert_eq!(collect(&mut nvm, RecordType::SECURITY), vec![b"fresh".to_vec()]);
}

#[test]
fn test_full_store_reports_full_not_busy() {
    let mut nvm = nvm(8, 4);
    nvm.add(RecordType::SECURITY, b"12345678", &[]).unwrap();
    assert_eq!(nvm.add(RecordType::GATT, b"x", &[]), Err(NvmError::Full));

    // The identity store has its own budget.
    nvm.add(RecordType::DEVICE_ID, b"abcd", &[]).unwrap();
    assert_eq!(nvm.add(RecordType::DEVICE_ID, b"e", &[]), Err(NvmError::Full));
}

#[test]
fn test_custom_identity_type() {
    init_logger();
    let config = NvmConfig::new(RecordType::new(0x10));
    let mut nvm = NvmAdapter::new(MemoryRecordDb::with_capacity(64, 64), config).unwrap();

    nvm.add(RecordType::new(0x10), b"id", &[]).unwrap();
    nvm.add(RecordType::DEVICE_ID, b"not-id", &[]).unwrap();

    assert_eq!(nvm.db().live_count(StoreId::DeviceIdentity), 1);
    assert_eq!(nvm.db().live_count(StoreId::SecurityGatt), 1);
}

#[test]
fn test_legacy_codes() {
    let mut nvm = nvm(16, 16);
    let sec = RecordType::SECURITY.value();

    assert_eq!(nvm.legacy_add(sec, b"0123456789", b"ab"), BLEPLAT_OK);
    assert_eq!(nvm.legacy_add(sec, b"0123456789", &[]), BLEPLAT_FULL);

    let mut buf = [0u8; 16];
    assert_eq!(nvm.legacy_get(BLEPLAT_NVM_FIRST, sec, 0, &mut buf), BLEPLAT_OK);
    assert_eq!(nvm.legacy_get(BLEPLAT_NVM_NEXT, sec, 0, &mut buf), BLEPLAT_EOF);
    assert_eq!(nvm.legacy_get(BLEPLAT_NVM_ALL, sec, 0, &mut buf), BLEPLAT_BUSY);

    // The cursor fell off the end, so there is nothing to compare against.
    assert_eq!(nvm.legacy_compare(0, b"0123"), BLEPLAT_EOF);

    assert_eq!(nvm.legacy_get(BLEPLAT_NVM_FIRST, sec, 0, &mut buf), BLEPLAT_OK);
    assert_eq!(nvm.legacy_compare(0, b"0123"), BLEPLAT_OK);
    assert_eq!(nvm.legacy_compare(10, b"abc"), 3);
    assert_eq!(nvm.legacy_compare(0, b"/"), BLEPLAT_EOF);

    // Unknown discard modes do nothing.
    nvm.legacy_discard(BLEPLAT_NVM_FIRST);
    assert_eq!(nvm.db().live_count(StoreId::SecurityGatt), 1);

    nvm.legacy_discard(BLEPLAT_NVM_CURRENT);
    assert_eq!(nvm.db().live_count(StoreId::SecurityGatt), 0);
}
