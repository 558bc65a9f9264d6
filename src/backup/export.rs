//! Snapshot export
//!
//! Reads every customer and order from the record store, wraps them in a
//! versioned snapshot, and hands the encoded bytes to a transport. Export
//! never mutates the store; read failures surface unchanged.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{TailorError, TailorResult};
use crate::storage::{write_bytes_atomic, RecordStore};

use super::snapshot::{CustomerRecord, OrderRecord, Snapshot};

/// An encoded snapshot ready for a transport
#[derive(Debug, Clone)]
pub struct ExportedSnapshot {
    /// Suggested file name
    pub file_name: String,
    /// Exact snapshot bytes
    pub bytes: Vec<u8>,
    /// Human-readable count summary
    pub summary: String,
    pub customer_count: usize,
    pub order_count: usize,
}

impl ExportedSnapshot {
    /// Encode a snapshot
    pub fn encode(snapshot: &Snapshot, pretty: bool) -> TailorResult<Self> {
        Ok(Self {
            file_name: default_file_name(snapshot.created_at),
            bytes: snapshot_to_bytes(snapshot, pretty)?,
            summary: snapshot.summary(),
            customer_count: snapshot.customers.len(),
            order_count: snapshot.orders.len(),
        })
    }
}

/// Where exported snapshots go
pub trait SnapshotSink {
    fn emit(&mut self, export: &ExportedSnapshot) -> TailorResult<()>;
}

/// Saves snapshot bytes as a named file
#[derive(Debug, Clone)]
pub struct FileSink {
    target: FileTarget,
    written: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum FileTarget {
    /// Use the snapshot's suggested file name inside this directory,
    /// adding a `-N` suffix rather than replacing an existing file
    Dir(PathBuf),
    /// Write to exactly this path
    Path(PathBuf),
}

impl FileSink {
    /// Save into `dir` under the suggested file name
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            target: FileTarget::Dir(dir.into()),
            written: None,
        }
    }

    /// Save to an explicit path
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            target: FileTarget::Path(path.into()),
            written: None,
        }
    }

    /// Path of the last file written
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl SnapshotSink for FileSink {
    fn emit(&mut self, export: &ExportedSnapshot) -> TailorResult<()> {
        let path = match &self.target {
            FileTarget::Dir(dir) => free_path_in(dir, &export.file_name),
            FileTarget::Path(path) => path.clone(),
        };

        write_bytes_atomic(&path, &export.bytes).map_err(|e| {
            TailorError::Export(format!("Failed to save {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = export.bytes.len(), "snapshot saved");
        self.written = Some(path);
        Ok(())
    }
}

/// First path in `dir` not already taken: `name`, then `stem-1.ext`, `stem-2.ext`, ...
fn free_path_in(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (file_name, String::new()),
    };
    (1u32..)
        .map(|n| dir.join(format!("{}-{}{}", stem, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Sends the short text summary to a share target
pub struct ShareSink<W: Write> {
    out: W,
}

impl<W: Write> ShareSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SnapshotSink for ShareSink<W> {
    fn emit(&mut self, export: &ExportedSnapshot) -> TailorResult<()> {
        writeln!(self.out, "{}", export.summary)
            .map_err(|e| TailorError::Export(format!("Failed to share summary: {}", e)))?;
        self.out
            .flush()
            .map_err(|e| TailorError::Export(format!("Failed to share summary: {}", e)))
    }
}

/// Read the full dataset into a snapshot stamped with the current time
pub fn export_snapshot<S: RecordStore + ?Sized>(store: &S) -> TailorResult<Snapshot> {
    let customers = store.list_customers()?;
    let orders = store.list_orders()?;

    let snapshot = Snapshot::new(
        Utc::now(),
        customers.into_iter().map(CustomerRecord::from).collect(),
        orders.into_iter().map(OrderRecord::from).collect(),
    );

    info!(
        customers = snapshot.customers.len(),
        orders = snapshot.orders.len(),
        "exported snapshot"
    );

    Ok(snapshot)
}

/// Export the dataset and deliver it through `sink`
pub fn export_to<S, K>(store: &S, sink: &mut K, pretty: bool) -> TailorResult<ExportedSnapshot>
where
    S: RecordStore + ?Sized,
    K: SnapshotSink + ?Sized,
{
    let snapshot = export_snapshot(store)?;
    let export = ExportedSnapshot::encode(&snapshot, pretty)?;
    sink.emit(&export)?;
    Ok(export)
}

/// Encode a snapshot as UTF-8 JSON
pub fn snapshot_to_bytes(snapshot: &Snapshot, pretty: bool) -> TailorResult<Vec<u8>> {
    if pretty {
        serde_json::to_vec_pretty(snapshot)
    } else {
        serde_json::to_vec(snapshot)
    }
    .map_err(|e| TailorError::Export(e.to_string()))
}

/// Default snapshot file name, e.g. `tailor-backup-20240101-093000.json`
pub fn default_file_name(created_at: DateTime<Utc>) -> String {
    format!("tailor-backup-{}.json", created_at.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::validate::validate;
    use crate::config::paths::TailorPaths;
    use crate::models::{Customer, CustomerId, Measurements, Order, OrderId, OrderStatus};
    use crate::storage::Storage;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TailorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) {
        let mut ali = Customer::new("Ali");
        ali.phone = Some("0300-1234567".into());
        ali.measurements.chest = Some(40.5);
        ali.measurements.fit_preference = Some("slim".into());
        storage.create_customer(&ali).unwrap();

        let sara = Customer::new("Sara");
        storage.create_customer(&sara).unwrap();

        let mut order = Order::new(ali.id.clone(), "20240101-001");
        order.status = OrderStatus::InProgress;
        order.price = Some(120.0);
        order.delivery_date = NaiveDate::from_ymd_opt(2024, 1, 20);
        storage.create_order(&order).unwrap();
        storage
            .create_order(&Order::new(sara.id.clone(), "20240102-001"))
            .unwrap();
    }

    #[test]
    fn test_export_reads_everything() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let snapshot = export_snapshot(&storage).unwrap();
        assert_eq!(snapshot.format_version, "1.0");
        assert_eq!(snapshot.customers.len(), 2);
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.orders[0].status, Some(OrderStatus::InProgress));
    }

    #[test]
    fn test_export_does_not_mutate_store() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);
        let before = (storage.list_customers().unwrap(), storage.list_orders().unwrap());

        export_snapshot(&storage).unwrap();

        let after = (storage.list_customers().unwrap(), storage.list_orders().unwrap());
        assert_eq!(before, after);
    }

    #[test]
    fn test_exported_bytes_validate_to_same_snapshot() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);
        let snapshot = export_snapshot(&storage).unwrap();

        for pretty in [true, false] {
            let bytes = snapshot_to_bytes(&snapshot, pretty).unwrap();
            let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(validate(&raw).unwrap(), snapshot);
        }
    }

    #[test]
    fn test_exported_floats_survive_exactly() {
        let (_temp_dir, storage) = create_test_storage();
        let mut customer = Customer::new("Ali");
        customer.measurements.chest = Some(92.69867446246539);
        customer.measurements.neck = Some(0.1 + 0.2);
        storage.create_customer(&customer).unwrap();
        let mut order = Order::new(customer.id.clone(), "1");
        order.price = Some(1234.5678901234567);
        order.advance_payment = Some(f64::MIN_POSITIVE);
        storage.create_order(&order).unwrap();

        let snapshot = export_snapshot(&storage).unwrap();
        for pretty in [true, false] {
            let bytes = snapshot_to_bytes(&snapshot, pretty).unwrap();
            let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            let restored = validate(&raw).unwrap();

            let chest = restored.customers[0].measurements.chest.unwrap();
            assert_eq!(chest.to_bits(), 92.69867446246539f64.to_bits());
            assert_eq!(restored.orders[0].price, Some(1234.5678901234567));
            assert_eq!(restored, snapshot);
        }
    }

    #[test]
    fn test_empty_store_exports_empty_snapshot() {
        let (_temp_dir, storage) = create_test_storage();
        let snapshot = export_snapshot(&storage).unwrap();

        assert!(snapshot.customers.is_empty());
        assert!(snapshot.orders.is_empty());
        let raw = serde_json::to_value(&snapshot).unwrap();
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn test_file_sink_writes_exact_bytes() {
        let (temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut sink = FileSink::in_dir(temp_dir.path().join("out"));
        let export = export_to(&storage, &mut sink, true).unwrap();

        let path = sink.written().unwrap();
        assert!(path.ends_with(&export.file_name));
        assert_eq!(std::fs::read(path).unwrap(), export.bytes);
    }

    #[test]
    fn test_file_sink_never_overwrites_in_dir() {
        let (temp_dir, storage) = create_test_storage();
        let first = ExportedSnapshot::encode(&export_snapshot(&storage).unwrap(), true).unwrap();
        seed(&storage);
        let mut second = ExportedSnapshot::encode(&export_snapshot(&storage).unwrap(), true).unwrap();
        second.file_name = first.file_name.clone();

        let mut sink = FileSink::in_dir(temp_dir.path());
        sink.emit(&first).unwrap();
        let first_path = sink.written().unwrap().to_path_buf();
        sink.emit(&second).unwrap();
        let second_path = sink.written().unwrap().to_path_buf();
        sink.emit(&second).unwrap();
        let third_path = sink.written().unwrap().to_path_buf();

        assert_eq!(first_path, temp_dir.path().join(&first.file_name));
        assert_eq!(
            second_path,
            temp_dir
                .path()
                .join(first.file_name.replace(".json", "-1.json"))
        );
        assert!(third_path.ends_with(first.file_name.replace(".json", "-2.json")));
        assert_eq!(std::fs::read(&first_path).unwrap(), first.bytes);
        assert_eq!(std::fs::read(&second_path).unwrap(), second.bytes);
    }

    #[test]
    fn test_file_sink_explicit_path() {
        let (temp_dir, storage) = create_test_storage();
        let target = temp_dir.path().join("my-backup.json");

        let mut sink = FileSink::to_path(&target);
        export_to(&storage, &mut sink, false).unwrap();
        assert_eq!(sink.written(), Some(target.as_path()));
    }

    #[test]
    fn test_share_sink_writes_summary() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut sink = ShareSink::new(Vec::new());
        export_to(&storage, &mut sink, true).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("Tailor backup: 2 customers, 2 orders"));
    }

    #[test]
    fn test_default_file_name() {
        let at = DateTime::parse_from_rfc3339("2024-01-01T09:30:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(default_file_name(at), "tailor-backup-20240101-093005.json");
    }

    /// Record store held entirely in memory
    #[derive(Debug)]
    struct MemoryStore {
        customers: Vec<Customer>,
        orders: Vec<Order>,
    }

    impl RecordStore for MemoryStore {
        fn list_customers(&self) -> TailorResult<Vec<Customer>> {
            Ok(self.customers.clone())
        }

        fn create_customer(&self, _customer: &Customer) -> TailorResult<CustomerId> {
            Err(TailorError::Storage("read-only store".into()))
        }

        fn delete_customer(&self, _id: &CustomerId) -> TailorResult<()> {
            Err(TailorError::Storage("read-only store".into()))
        }

        fn list_orders(&self) -> TailorResult<Vec<Order>> {
            Ok(self.orders.clone())
        }

        fn create_order(&self, _order: &Order) -> TailorResult<OrderId> {
            Err(TailorError::Storage("read-only store".into()))
        }

        fn delete_order(&self, _id: &OrderId) -> TailorResult<()> {
            Err(TailorError::Storage("read-only store".into()))
        }
    }

    fn arb_f64() -> impl Strategy<Value = f64> {
        any::<f64>().prop_filter("finite", |v| v.is_finite())
    }

    fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..4_000_000_000, 0u32..1_000_000_000)
            .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
    }

    fn arb_text(max: usize) -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop::string::string_regex(&format!("\\PC{{0,{}}}", max)).unwrap())
    }

    fn arb_measurements() -> impl Strategy<Value = Measurements> {
        (
            prop::collection::vec(prop::option::of(arb_f64()), Measurements::NUMERIC_FIELDS.len()),
            arb_text(30),
            arb_text(30),
            arb_text(30),
        )
            .prop_map(|(values, collar, cuff, fit)| {
                let fields: serde_json::Map<String, serde_json::Value> = Measurements::NUMERIC_FIELDS
                    .iter()
                    .zip(values)
                    .map(|(key, value)| (key.to_string(), serde_json::json!(value)))
                    .collect();
                let mut measurements: Measurements =
                    serde_json::from_value(serde_json::Value::Object(fields)).unwrap();
                measurements.collar_style = collar;
                measurements.cuff_style = cuff;
                measurements.fit_preference = fit;
                measurements
            })
    }

    fn arb_customer() -> impl Strategy<Value = Customer> {
        (
            "\\PC{0,40}",
            arb_text(25),
            arb_measurements(),
            arb_text(200),
            arb_timestamp(),
            arb_timestamp(),
        )
            .prop_map(|(name, phone, measurements, notes, created_at, updated_at)| Customer {
                id: CustomerId::new(),
                name: format!("c{}", name),
                phone,
                measurements,
                notes,
                created_at,
                updated_at,
            })
    }

    fn arb_order(customers: Vec<CustomerId>) -> impl Strategy<Value = Order> {
        (
            any::<prop::sample::Index>(),
            "[A-Za-z0-9-]{1,20}",
            prop::sample::select(OrderStatus::ALL.to_vec()),
            prop::option::of(arb_f64()),
            prop::option::of(arb_f64()),
            prop::option::of(700_000i32..800_000),
            arb_text(200),
            arb_text(100),
            arb_timestamp(),
            arb_timestamp(),
        )
            .prop_map(
                move |(
                    pick,
                    order_number,
                    status,
                    price,
                    advance_payment,
                    delivery_day,
                    description,
                    fabric_details,
                    created_at,
                    updated_at,
                )| Order {
                    id: OrderId::new(),
                    customer_id: pick.get(&customers).clone(),
                    order_number,
                    status,
                    price,
                    advance_payment,
                    delivery_date: delivery_day.and_then(NaiveDate::from_num_days_from_ce_opt),
                    description,
                    fabric_details,
                    created_at,
                    updated_at,
                },
            )
    }

    fn arb_store() -> impl Strategy<Value = MemoryStore> {
        prop::collection::vec(arb_customer(), 1..5).prop_flat_map(|customers| {
            let ids: Vec<CustomerId> = customers.iter().map(|c| c.id.clone()).collect();
            prop::collection::vec(arb_order(ids), 0..6)
                .prop_map(move |orders| MemoryStore {
                    customers: customers.clone(),
                    orders,
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_store_state_exports_to_a_valid_identical_snapshot(store in arb_store()) {
            let snapshot = export_snapshot(&store).unwrap();
            for pretty in [true, false] {
                let bytes = snapshot_to_bytes(&snapshot, pretty).unwrap();
                let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
                prop_assert_eq!(validate(&raw).unwrap(), snapshot.clone());
            }
        }
    }
}
