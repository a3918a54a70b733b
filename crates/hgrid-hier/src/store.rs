//! Durable tier of the distance cache.
//!
//! A [`DistanceStore`] is a keyed table of `(pair, level) -> distance`
//! records. Each record is independent; upserts are idempotent because
//! every writer derives the value from the same immutable graph.
//!
//! Records are only valid for the graph they were computed on. A
//! [`RedbStore`] opened with [`RedbStore::open_for`] records that graph's
//! fingerprint and drops every distance left by a different graph.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hgrid_core::GridGraph;
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};

use crate::key::PairKey;
use crate::Result;

/// Keyed storage for precomputed distances.
pub trait DistanceStore: Send + Sync {
    /// Insert or overwrite one record.
    fn upsert(&self, key: PairKey, distance: i32) -> Result<()>;

    /// Insert or overwrite many records.
    fn upsert_batch(&self, records: &[(PairKey, i32)]) -> Result<()> {
        for &(key, distance) in records {
            self.upsert(key, distance)?;
        }
        Ok(())
    }

    fn fetch(&self, key: PairKey) -> Result<Option<i32>>;

    /// Every stored record, sorted by key.
    fn records(&self) -> Result<Vec<(PairKey, i32)>>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Non-durable store, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<PairKey, i32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl DistanceStore for MemoryStore {
    fn upsert(&self, key: PairKey, distance: i32) -> Result<()> {
        self.records.write().insert(key, distance);
        Ok(())
    }

    fn upsert_batch(&self, records: &[(PairKey, i32)]) -> Result<()> {
        let mut map = self.records.write();
        map.extend(records.iter().copied());
        Ok(())
    }

    fn fetch(&self, key: PairKey) -> Result<Option<i32>> {
        Ok(self.records.read().get(&key).copied())
    }

    fn records(&self) -> Result<Vec<(PairKey, i32)>> {
        let mut out: Vec<_> = self.records.read().iter().map(|(k, v)| (*k, *v)).collect();
        out.sort_unstable();
        Ok(out)
    }
}

// ============================================================================
// RedbStore
// ============================================================================

/// `(first.x, first.y, second.x, second.y, level) -> distance`
const DISTANCES: TableDefinition<(i32, i32, i32, i32, u32), i32> =
    TableDefinition::new("precomputed_distances");

/// Store-level settings, such as the fingerprint of the graph the
/// distances belong to.
const META: TableDefinition<&str, u64> = TableDefinition::new("store_meta");

const GRAPH_FINGERPRINT: &str = "graph_fingerprint";

/// Durable store backed by an embedded redb database file.
///
/// The file is held open from [`open`](Self::open) until [`close`](Self::close)
/// or drop.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open (or create) the database at `path` and make sure the distance
    /// table exists. Safe to call on an existing file.
    ///
    /// The store is not tied to any graph; use [`open_for`](Self::open_for)
    /// before serving queries from it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(redb::Error::from)?;
        create_schema(&db)?;
        log::info!("opened distance store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Open the database at `path` for distances of `graph`.
    ///
    /// If the file was filled from another graph, or from no recorded
    /// graph at all, its distances are dropped before the store is used.
    pub fn open_for(path: impl AsRef<Path>, graph: &GridGraph) -> Result<Self> {
        let store = Self::open(path)?;
        let fingerprint = graph.fingerprint();
        match bind_graph(&store.db, fingerprint)? {
            Binding::Same => {}
            Binding::Fresh => log::debug!("distance store tagged with graph {fingerprint:016x}"),
            Binding::Replaced(Some(old)) => log::warn!(
                "distance store at {} was built for graph {old:016x}, not {fingerprint:016x}; \
                 dropping its distances",
                store.path.display()
            ),
            Binding::Replaced(None) => log::warn!(
                "distance store at {} has distances for an unknown graph; dropping them",
                store.path.display()
            ),
        }
        Ok(store)
    }

    /// Fingerprint of the graph the stored distances belong to, if any.
    pub fn graph_fingerprint(&self) -> Result<Option<u64>> {
        Ok(read_fingerprint(&self.db)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the database file.
    pub fn close(self) {
        log::info!("closing distance store at {}", self.path.display());
        drop(self.db);
    }
}

fn create_schema(db: &Database) -> std::result::Result<(), redb::Error> {
    let txn = db.begin_write()?;
    {
        let _distances = txn.open_table(DISTANCES)?;
        let _meta = txn.open_table(META)?;
    }
    txn.commit()?;
    Ok(())
}

enum Binding {
    /// Already tagged with this graph.
    Same,
    /// Untagged and empty.
    Fresh,
    /// Distances of the recorded graph (`None`: unknown) were dropped.
    Replaced(Option<u64>),
}

/// Tag the store with `fingerprint`, clearing distances of any other graph
/// in the same transaction.
fn bind_graph(db: &Database, fingerprint: u64) -> std::result::Result<Binding, redb::Error> {
    let txn = db.begin_write()?;
    let binding = {
        let mut meta = txn.open_table(META)?;
        let recorded = meta.get(GRAPH_FINGERPRINT)?.map(|guard| guard.value());
        let binding = match recorded {
            Some(old) if old == fingerprint => Binding::Same,
            Some(old) => Binding::Replaced(Some(old)),
            None => {
                let distances = txn.open_table(DISTANCES)?;
                let empty = distances.iter()?.next().is_none();
                if empty { Binding::Fresh } else { Binding::Replaced(None) }
            }
        };
        if !matches!(binding, Binding::Same) {
            meta.insert(GRAPH_FINGERPRINT, fingerprint)?;
        }
        binding
    };
    if let Binding::Replaced(_) = binding {
        txn.delete_table(DISTANCES)?;
        let _distances = txn.open_table(DISTANCES)?;
    }
    txn.commit()?;
    Ok(binding)
}

fn read_fingerprint(db: &Database) -> std::result::Result<Option<u64>, redb::Error> {
    let txn = db.begin_read()?;
    let meta = txn.open_table(META)?;
    let found = meta.get(GRAPH_FINGERPRINT)?.map(|guard| guard.value());
    Ok(found)
}

fn write_records(
    db: &Database,
    records: &[(PairKey, i32)],
) -> std::result::Result<(), redb::Error> {
    let txn = db.begin_write()?;
    {
        let mut table = txn.open_table(DISTANCES)?;
        for &(key, distance) in records {
            table.insert(key.to_tuple(), distance)?;
        }
    }
    txn.commit()?;
    Ok(())
}

fn read_record(db: &Database, key: PairKey) -> std::result::Result<Option<i32>, redb::Error> {
    let txn = db.begin_read()?;
    let table = txn.open_table(DISTANCES)?;
    let found = table.get(key.to_tuple())?.map(|guard| guard.value());
    Ok(found)
}

fn read_all(db: &Database) -> std::result::Result<Vec<(PairKey, i32)>, redb::Error> {
    let txn = db.begin_read()?;
    let table = txn.open_table(DISTANCES)?;
    let mut out = Vec::new();
    for entry in table.iter()? {
        let (k, v) = entry?;
        out.push((PairKey::from_tuple(k.value()), v.value()));
    }
    out.sort_unstable();
    Ok(out)
}

impl DistanceStore for RedbStore {
    fn upsert(&self, key: PairKey, distance: i32) -> Result<()> {
        write_records(&self.db, &[(key, distance)])?;
        Ok(())
    }

    fn upsert_batch(&self, records: &[(PairKey, i32)]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        write_records(&self.db, records)?;
        Ok(())
    }

    fn fetch(&self, key: PairKey) -> Result<Option<i32>> {
        Ok(read_record(&self.db, key)?)
    }

    fn records(&self) -> Result<Vec<(PairKey, i32)>> {
        Ok(read_all(&self.db)?)
    }
}
