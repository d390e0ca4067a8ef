//! Menu feed access and snapshot filtering.
//!
//! The menu lives in an external spreadsheet published as CSV; the kitchen
//! runs a two-week rotation, so every row is tagged with a weekday name and
//! a week-parity index. The feed is re-fetched in full on every operation
//! that needs it; there is no caching layer, and two reads during one
//! conversation may legitimately observe different snapshots.

pub mod feed;

pub use feed::CsvFeed;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use thiserror::Error;

use lunchroom_core::Price;

/// Errors that can occur when reading the menu feed.
#[derive(Debug, Error)]
pub enum MenuError {
    /// Fetching the feed failed.
    #[error("Menu fetch failed: {0}")]
    Fetch(String),

    /// The feed content could not be parsed.
    #[error("Menu parse error: {0}")]
    Parse(String),
}

/// One row of the menu feed.
///
/// Column names are fixed by the external sheet and arrive localized.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MenuRow {
    /// Weekday name, localized (`Понедельник` … `Воскресенье`).
    #[serde(rename = "День недели")]
    pub weekday: String,
    /// Week-parity index of the two-week rotation.
    #[serde(rename = "Неделя")]
    pub week_parity: u8,
    /// Category label (set lunch, drink, salad…).
    #[serde(rename = "Название")]
    pub category: String,
    /// Dish label.
    #[serde(rename = "Блюдо")]
    pub dish: String,
    /// Price in rubles.
    #[serde(rename = "Цена")]
    pub price: Price,
}

/// Read-only source of menu snapshots.
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Fetch the full menu, fresh.
    async fn fetch(&self) -> Result<Vec<MenuRow>, MenuError>;
}

/// Week-parity index of a calendar date: ISO week number modulo 2.
///
/// The rotation alternates automatically without manual tagging of
/// calendar dates; the same date always maps to the same parity.
#[must_use]
pub fn week_parity(date: NaiveDate) -> u8 {
    (date.iso_week().week() % 2) as u8
}

/// The feed's localized name for a weekday.
#[must_use]
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Понедельник",
        Weekday::Tue => "Вторник",
        Weekday::Wed => "Среда",
        Weekday::Thu => "Четверг",
        Weekday::Fri => "Пятница",
        Weekday::Sat => "Суббота",
        Weekday::Sun => "Воскресенье",
    }
}

/// The menu rows in effect for one delivery date.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    rows: Vec<MenuRow>,
}

impl DaySnapshot {
    /// Filter a full snapshot down to one date's weekday and week parity.
    #[must_use]
    pub fn filter(rows: Vec<MenuRow>, date: NaiveDate) -> Self {
        let day = weekday_name(date.weekday());
        let parity = week_parity(date);
        Self {
            rows: rows
                .into_iter()
                .filter(|row| row.weekday == day && row.week_parity == parity)
                .collect(),
        }
    }

    /// Whether the date has no menu at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Category labels in feed order, deduplicated.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.category.as_str()) {
                seen.push(row.category.as_str());
            }
        }
        seen
    }

    /// Rows belonging to one category, in feed order.
    pub fn rows_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a MenuRow> {
        self.rows.iter().filter(move |row| row.category == category)
    }

    /// Whether a category is a set menu: several dishes sharing one price,
    /// ordered as a unit under the category label.
    #[must_use]
    pub fn is_set_menu(&self, category: &str) -> bool {
        let mut rows = self.rows_in(category);
        let Some(first) = rows.next() else {
            return false;
        };
        let mut more = false;
        for row in rows {
            if row.price != first.price {
                return false;
            }
            more = true;
        }
        more
    }

    /// Resolve a selected label to a price.
    ///
    /// Category labels take precedence over dish labels (a set menu is
    /// selected by its category name, priced by the category's first row);
    /// an unknown label resolves to `None` and must not create a line item.
    #[must_use]
    pub fn resolve_price(&self, label: &str) -> Option<Price> {
        if let Some(row) = self.rows.iter().find(|row| row.category == label) {
            return Some(row.price);
        }
        self.rows
            .iter()
            .find(|row| row.dish == label)
            .map(|row| row.price)
    }

    /// Labels to offer on the selection keyboard, one row per category.
    ///
    /// A set-menu category contributes its category label as a single
    /// button; any other category contributes one button per dish.
    #[must_use]
    pub fn selection_rows(&self) -> Vec<Vec<String>> {
        self.categories()
            .into_iter()
            .map(|category| {
                if self.is_set_menu(category) {
                    vec![category.to_string()]
                } else {
                    self.rows_in(category)
                        .map(|row| row.dish.clone())
                        .collect()
                }
            })
            .collect()
    }
}
