//! Order ledger: the shared record of every line item.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use lunchroom_core::{PaymentStatus, Price};

use super::StoreError;

/// Serde adapter for the ledger's `DD.MM.YYYY` date column.
mod ledger_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%d.%m.%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(Error::custom)
    }
}

/// One ordered dish or set-menu entry tied to a customer and a delivery
/// date.
///
/// There is no unique constraint beyond natural row distinctness: a
/// customer selecting the same dish twice holds two identical rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    /// Customer phone key, digits only.
    pub phone: String,
    /// Delivery date.
    #[serde(with = "ledger_date")]
    pub date: NaiveDate,
    /// Localized weekday name of the delivery date.
    pub weekday: String,
    /// Selected dish or set-menu label.
    pub item: String,
    /// Price at the moment of selection.
    pub price: Price,
    /// Payment status.
    pub status: PaymentStatus,
}

/// The order ledger, backed by one CSV file.
///
/// Every operation loads the full ledger, mutates an in-memory copy and
/// rewrites the file; the mutex serializes those cycles so concurrent
/// mutations cannot lose updates.
#[derive(Debug)]
pub struct OrderLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OrderLedger {
    /// Create a ledger over the given file path.
    ///
    /// A missing file reads as an empty ledger.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<OrderLine>, StoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let mut reader = csv::Reader::from_reader(raw.as_slice());
        reader
            .deserialize()
            .collect::<Result<Vec<OrderLine>, _>>()
            .map_err(|e| StoreError::Data(format!("{}: {e}", self.path.display())))
    }

    fn persist(&self, lines: &[OrderLine]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for line in lines {
            writer
                .serialize(line)
                .map_err(|e| StoreError::Data(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Data(e.to_string()))?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn matches(line: &OrderLine, phone_digits: &str, date: NaiveDate) -> bool {
        let line_digits: String = line.phone.chars().filter(char::is_ascii_digit).collect();
        line_digits == phone_digits && line.date == date
    }

    /// Append one line item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or written.
    #[instrument(skip(self, line), fields(item = %line.item, date = %line.date))]
    pub async fn append(&self, line: OrderLine) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut lines = self.load()?;
        lines.push(line);
        self.persist(&lines)
    }

    /// Remove every line item of one customer for one date.
    ///
    /// Returns the number of removed rows; zero means nothing matched and
    /// the file was not rewritten.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or written.
    #[instrument(skip(self))]
    pub async fn cancel(&self, phone_digits: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let lines = self.load()?;
        let before = lines.len();
        let kept: Vec<OrderLine> = lines
            .into_iter()
            .filter(|line| !Self::matches(line, phone_digits, date))
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.persist(&kept)?;
        }
        Ok(removed)
    }

    /// Mark every line item of one customer for one date as paid.
    ///
    /// Returns the number of updated rows; zero means nothing matched and
    /// the file was not rewritten. Payment is all-or-nothing per date;
    /// there is no partially paid state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or written.
    #[instrument(skip(self))]
    pub async fn pay(&self, phone_digits: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut lines = self.load()?;
        let mut updated = 0;
        for line in &mut lines {
            if Self::matches(line, phone_digits, date) {
                line.status = PaymentStatus::Paid;
                updated += 1;
            }
        }
        if updated > 0 {
            self.persist(&lines)?;
        }
        Ok(updated)
    }

    /// All line items of one customer, across all dates.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn lines_for_phone(&self, phone_digits: &str) -> Result<Vec<OrderLine>, StoreError> {
        let _guard = self.lock.lock().await;
        let lines = self.load()?;
        Ok(lines
            .into_iter()
            .filter(|line| {
                let digits: String = line.phone.chars().filter(char::is_ascii_digit).collect();
                digits == phone_digits
            })
            .collect())
    }

    /// Line items of one customer for one date.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn lines_for_date(
        &self,
        phone_digits: &str,
        date: NaiveDate,
    ) -> Result<Vec<OrderLine>, StoreError> {
        let _guard = self.lock.lock().await;
        let lines = self.load()?;
        Ok(lines
            .into_iter()
            .filter(|line| Self::matches(line, phone_digits, date))
            .collect())
    }

    /// Every line item of every customer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn all(&self) -> Result<Vec<OrderLine>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load()
    }
}
