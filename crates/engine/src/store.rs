//! Durable ledger storage.
//!
//! The ledger is persisted as four keyed values that are always written
//! together:
//!
//! | key               | value                                        |
//! |-------------------|----------------------------------------------|
//! | `totalPurchases`  | decimal as text                              |
//! | `totalDonations`  | decimal as text                              |
//! | `purchaseHistory` | list of `{date, amount, note}`               |
//! | `donationHistory` | list of `{date, amount, campaign, source}`   |
//!
//! Decoding is forgiving: a key that is missing or malformed decodes as its
//! default and is logged, it never fails the load. A history is malformed when
//! it does not parse, when a record breaks the record rules (amount > 0,
//! non-blank campaign) or when its sum leaves the decimal range. Histories
//! win over stored totals, so a reloaded ledger always satisfies the sum
//! invariant.

use std::{
    cell::RefCell,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    rc::Rc,
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{Amount, DonationRecord, LedgerState, PurchaseRecord, StoreError};

pub const TOTAL_PURCHASES_KEY: &str = "totalPurchases";
pub const TOTAL_DONATIONS_KEY: &str = "totalDonations";
pub const PURCHASE_HISTORY_KEY: &str = "purchaseHistory";
pub const DONATION_HISTORY_KEY: &str = "donationHistory";

/// The persisted key/value document.
pub type Document = Map<String, Value>;

/// Persistence backend for a [`LedgerState`].
pub trait LedgerStore {
    /// Reads the persisted ledger. Missing or corrupt data yields defaults;
    /// `Err` means the storage itself could not be read.
    fn load(&self) -> Result<LedgerState, StoreError>;

    /// Persists all four keys as one unit.
    fn save(&mut self, ledger: &LedgerState) -> Result<(), StoreError>;

    /// Erases every persisted key.
    fn clear(&mut self) -> Result<(), StoreError>;
}

pub fn encode(ledger: &LedgerState) -> Result<Document, StoreError> {
    let mut document = Document::new();
    document.insert(
        TOTAL_PURCHASES_KEY.to_string(),
        Value::String(ledger.total_purchases().value().to_string()),
    );
    document.insert(
        TOTAL_DONATIONS_KEY.to_string(),
        Value::String(ledger.total_donations().value().to_string()),
    );
    document.insert(
        PURCHASE_HISTORY_KEY.to_string(),
        serde_json::to_value(ledger.purchase_history())?,
    );
    document.insert(
        DONATION_HISTORY_KEY.to_string(),
        serde_json::to_value(ledger.donation_history())?,
    );
    Ok(document)
}

pub fn decode(document: &Document) -> LedgerState {
    let purchases: Vec<PurchaseRecord> = decode_history(document, PURCHASE_HISTORY_KEY);
    let donations: Vec<DonationRecord> = decode_history(document, DONATION_HISTORY_KEY);
    let ledger = match LedgerState::from_histories(purchases, donations) {
        Ok(ledger) => ledger,
        Err(err) => {
            tracing::warn!("stored histories do not add up, starting empty: {err}");
            LedgerState::default()
        }
    };

    reconcile_total(document, TOTAL_PURCHASES_KEY, ledger.total_purchases());
    reconcile_total(document, TOTAL_DONATIONS_KEY, ledger.total_donations());
    ledger
}

/// A persisted history row.
trait StoredRecord: DeserializeOwned {
    fn amount(&self) -> Amount;

    /// Why the record breaks the record rules, if it does.
    fn defect(&self) -> Option<String> {
        (!self.amount().is_positive())
            .then(|| format!("amount {} is not positive", self.amount().value()))
    }
}

impl StoredRecord for PurchaseRecord {
    fn amount(&self) -> Amount {
        self.amount
    }
}

impl StoredRecord for DonationRecord {
    fn amount(&self) -> Amount {
        self.amount
    }

    fn defect(&self) -> Option<String> {
        if !self.amount.is_positive() {
            return Some(format!("amount {} is not positive", self.amount.value()));
        }
        self.campaign
            .trim()
            .is_empty()
            .then(|| "campaign is blank".to_string())
    }
}

fn decode_history<T: StoredRecord>(document: &Document, key: &str) -> Vec<T> {
    let parsed = match document.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        // Histories written by older clients are JSON encoded a second time.
        Some(Value::String(raw)) => serde_json::from_str(raw),
        Some(value) => serde_json::from_value(value.clone()),
    };
    let history: Vec<T> = match parsed {
        Ok(history) => history,
        Err(err) => {
            tracing::warn!("corrupt {key}, treating it as empty: {err}");
            return Vec::new();
        }
    };

    if let Some((index, defect)) = history
        .iter()
        .enumerate()
        .find_map(|(index, record)| record.defect().map(|defect| (index, defect)))
    {
        tracing::warn!("corrupt {key}, treating it as empty: record {index}: {defect}");
        return Vec::new();
    }
    if Amount::checked_sum(history.iter().map(StoredRecord::amount)).is_none() {
        tracing::warn!("corrupt {key}, treating it as empty: total out of range");
        return Vec::new();
    }
    history
}

fn reconcile_total(document: &Document, key: &str, derived: Amount) {
    let stored = match document.get(key) {
        None | Some(Value::Null) => return,
        Some(Value::String(raw)) => Decimal::from_str(raw.trim()).ok(),
        Some(Value::Number(number)) => Decimal::from_str(&number.to_string()).ok(),
        Some(_) => None,
    };
    match stored {
        Some(value) if value == derived.value() => {}
        Some(value) => {
            tracing::warn!("{key} was {value}, reconciled to history sum {}", derived.value());
        }
        None => tracing::warn!("corrupt {key}, using history sum {}", derived.value()),
    }
}

/// Ledger persisted as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for FileStore {
    fn load(&self) -> Result<LedgerState, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("no ledger at {}, starting empty", self.path.display());
                return Ok(LedgerState::default());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(document)) => Ok(decode(&document)),
            Ok(_) => {
                tracing::warn!("{} is not a ledger document, starting empty", self.path.display());
                Ok(LedgerState::default())
            }
            Err(err) => {
                tracing::warn!("{} is corrupt, starting empty: {err}", self.path.display());
                Ok(LedgerState::default())
            }
        }
    }

    fn save(&mut self, ledger: &LedgerState) -> Result<(), StoreError> {
        let document = encode(ledger)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_string_pretty(&document)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload)?;
        match fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(&tmp, &self.path)?;
                let _ = fs::remove_file(&tmp);
                Ok(())
            }
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    document: Document,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory store. Clones share the same document, so a test can keep a
/// handle while a tracker owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `load` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// Makes every following `save` and `clear` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.inner.borrow().document.get(key).cloned()
    }

    /// Overwrites a raw value, bypassing encoding.
    pub fn put_raw(&self, key: &str, value: Value) {
        self.inner
            .borrow_mut()
            .document
            .insert(key.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().document.is_empty()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LedgerState, StoreError> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(decode(&inner.document))
    }

    fn save(&mut self, ledger: &LedgerState) -> Result<(), StoreError> {
        if self.inner.borrow().fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        let document = encode(ledger)?;
        self.inner.borrow_mut().document = document;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        inner.document.clear();
        Ok(())
    }
}
