//! Main Store struct tying all components together.

use crate::error::{Result, StoreError};
use crate::ids::IdGenerator;
use crate::persist::DataFile;
use crate::query::{self, Page, SortBy, ToyFilter};
use crate::subscriptions::{
    StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{Timestamp, Toy, ToyDraft, ToyId, ToyPatch, UserRef};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Backing file holding the whole collection.
    pub path: PathBuf,

    /// Toys per page for [`ToyStore::query`].
    pub page_size: usize,

    /// Length of generated toy and message ids.
    pub id_length: usize,

    /// How many candidates to try before giving up on a free id.
    pub max_id_attempts: usize,

    /// Start empty (and write an empty file) when the backing file is missing.
    pub create_if_missing: bool,

    /// Indent the backing file.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/toy.json"),
            page_size: 5,
            id_length: 8,
            max_id_attempts: 16,
            create_if_missing: true,
            pretty: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration for a given backing file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// The toy store.
///
/// Holds the authoritative collection in memory and mirrors every mutation
/// to the backing file before acknowledging it. Share it behind an `Arc`.
///
/// Readers clone an `Arc` of the current collection and never wait on file
/// I/O. Writers are serialized by `write_lock`, which is held across
/// copy, apply, flush and publish; a failed flush therefore leaves the
/// published collection untouched.
pub struct ToyStore {
    config: StoreConfig,

    /// Lock file for exclusive access.
    _lock_file: File,

    file: DataFile,

    /// Current published collection, most recent first.
    toys: RwLock<Arc<Vec<Toy>>>,

    /// Lock for write operations to ensure atomicity.
    write_lock: Mutex<()>,

    pub(crate) ids: IdGenerator,

    events: SubscriptionManager,
}

impl ToyStore {
    /// Open the store, loading the backing file.
    ///
    /// A missing file starts an empty store only when
    /// `config.create_if_missing` is set, and the empty collection is flushed
    /// right away. A file that cannot be parsed is always an error.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if !config.create_if_missing && !config.path.exists() {
            return Err(StoreError::NotInitialized);
        }

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_file = Self::acquire_lock(&config.path)?;
        let file = DataFile::new(&config.path, config.pretty);

        let toys = match file.load()? {
            Some(toys) => {
                info!(path = %config.path.display(), toys = toys.len(), "loaded toy store");
                toys
            }
            None if config.create_if_missing => {
                info!(path = %config.path.display(), "no backing file, starting empty");
                file.write(&[])?;
                Vec::new()
            }
            None => return Err(StoreError::NotInitialized),
        };

        let ids = IdGenerator::new(config.id_length, config.max_id_attempts);

        Ok(Self {
            config,
            _lock_file: lock_file,
            file,
            toys: RwLock::new(Arc::new(toys)),
            write_lock: Mutex::new(()),
            ids,
            events: SubscriptionManager::new(),
        })
    }

    // --- Read Operations ---

    /// Point-in-time view of every toy, most recent first.
    pub fn snapshot(&self) -> Arc<Vec<Toy>> {
        Arc::clone(&self.toys.read())
    }

    /// Get a toy by id.
    pub fn get(&self, id: &ToyId) -> Result<Toy> {
        self.toys
            .read()
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::ToyNotFound(id.clone()))
    }

    /// Check whether a toy exists.
    pub fn contains(&self, id: &ToyId) -> bool {
        self.toys.read().iter().any(|t| &t.id == id)
    }

    /// Filter, sort and paginate with the configured page size.
    ///
    /// `page_index` of `None` returns every match.
    pub fn query(&self, filter: &ToyFilter, sort: &SortBy, page_index: Option<usize>) -> Vec<Toy> {
        let snapshot = self.snapshot();
        let page = page_index.map(|index| Page::new(index, self.config.page_size));
        query::query(&snapshot, filter, sort, page)
    }

    /// Number of toys matching `filter`.
    pub fn count(&self, filter: &ToyFilter) -> usize {
        query::count(&self.snapshot(), filter)
    }

    /// Number of pages for `filter` at the configured page size.
    pub fn page_count(&self, filter: &ToyFilter) -> usize {
        query::page_count(self.count(filter), self.config.page_size)
    }

    /// Number of toys in the store.
    pub fn len(&self) -> usize {
        self.toys.read().len()
    }

    /// Check whether the store holds no toys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Write Operations ---

    /// Create a toy from `draft`, owned by `owner`.
    pub fn create(&self, draft: ToyDraft, owner: Option<UserRef>) -> Result<Toy> {
        let name = validate_name(&draft.name)?;
        validate_price(draft.price)?;
        let labels = normalize_labels(draft.labels)?;

        let toy = self.mutate(|toys| {
            let id = self
                .ids
                .generate(|candidate| toys.iter().any(|t| t.id.as_str() == candidate))?;

            let toy = Toy {
                id: ToyId(id),
                name,
                price: draft.price,
                in_stock: draft.in_stock.unwrap_or(true),
                labels,
                created_at: Timestamp::now(),
                owner,
                messages: Vec::new(),
            };
            toys.insert(0, toy.clone());
            Ok((toy.clone(), StoreEvent::ToyAdded { toy }))
        })?;

        debug!(id = %toy.id, "created toy");
        Ok(toy)
    }

    /// Merge `patch` onto an existing toy.
    ///
    /// Fields absent from the patch are preserved, as are `createdAt`,
    /// `owner` and messages.
    /// A missing id is reported before any problem with the patch itself.
    pub fn update(&self, patch: ToyPatch) -> Result<Toy> {
        let toy = self.mutate(|toys| {
            let toy = find_mut(toys, &patch.id)?;
            if patch.is_empty() {
                return Err(StoreError::Validation(format!(
                    "update for {} changes nothing",
                    patch.id
                )));
            }
            let name = patch.name.as_deref().map(validate_name).transpose()?;
            if let Some(price) = patch.price {
                validate_price(price)?;
            }
            let labels = patch.labels.map(normalize_labels).transpose()?;

            if let Some(name) = name {
                toy.name = name;
            }
            if let Some(price) = patch.price {
                toy.price = price;
            }
            if let Some(in_stock) = patch.in_stock {
                toy.in_stock = in_stock;
            }
            if let Some(labels) = labels {
                toy.labels = labels;
            }
            let toy = toy.clone();
            Ok((toy.clone(), StoreEvent::ToyUpdated { toy }))
        })?;

        debug!(id = %toy.id, "updated toy");
        Ok(toy)
    }

    /// Delete a toy. Returns the number of toys removed.
    pub fn delete(&self, id: &ToyId) -> Result<usize> {
        self.mutate(|toys| {
            let idx = toys
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| StoreError::ToyNotFound(id.clone()))?;
            toys.remove(idx);
            Ok(((), StoreEvent::ToyRemoved { id: id.clone() }))
        })?;

        debug!(id = %id, "deleted toy");
        Ok(1)
    }

    // --- Subscriptions ---

    /// Subscribe to committed mutations.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.events.subscribe(config)
    }

    /// Drop a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id)
    }

    // --- Store Operations ---

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Apply `op` to a private copy of the collection, flush it, publish it,
    /// then broadcast the event `op` produced. If `op` or the flush fails
    /// nothing is published or broadcast.
    ///
    /// Broadcasting under the write lock keeps events in flush order.
    pub(crate) fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Toy>) -> Result<(T, StoreEvent)>,
    {
        let _lock = self.write_lock.lock();

        let mut next: Vec<Toy> = Vec::clone(&self.toys.read());
        let (out, event) = op(&mut next)?;

        let bytes = self.file.write(&next)?;
        debug!(toys = next.len(), bytes, "flushed toy store");

        *self.toys.write() = Arc::new(next);
        self.events.broadcast(event);
        Ok(out)
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        let lock_file = File::create(path.with_file_name(name))?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| StoreError::Locked)?;

        Ok(lock_file)
    }
}

pub(crate) fn find_mut<'a>(toys: &'a mut [Toy], id: &ToyId) -> Result<&'a mut Toy> {
    toys.iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| StoreError::ToyNotFound(id.clone()))
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("name is required".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(StoreError::Validation(format!("invalid price: {}", price)));
    }
    Ok(())
}

/// Trim labels, reject blanks, drop repeats keeping the first occurrence.
fn normalize_labels(labels: Vec<String>) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::Validation("labels must not be blank".into()));
        }
        if !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    Ok(out)
}
