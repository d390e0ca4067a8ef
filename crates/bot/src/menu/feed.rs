//! CSV menu feed client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{MenuError, MenuRow, MenuSource};

/// Production menu source: a CSV document fetched by URL.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    client: Client,
    url: String,
}

impl CsvFeed {
    /// Create a new feed client.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

/// Parse CSV bytes into menu rows.
///
/// A malformed row aborts the whole parse: a half-read menu would
/// silently hide dishes, which is worse than refusing the snapshot.
pub(crate) fn parse_rows(bytes: &[u8]) -> Result<Vec<MenuRow>, MenuError> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize()
        .collect::<Result<Vec<MenuRow>, _>>()
        .map_err(|e| MenuError::Parse(e.to_string()))
}

#[async_trait]
impl MenuSource for CsvFeed {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<MenuRow>, MenuError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MenuError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MenuError::Fetch(format!(
                "feed returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MenuError::Fetch(e.to_string()))?;

        let rows = parse_rows(&body)?;
        debug!(rows = rows.len(), "Menu snapshot fetched");
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lunchroom_core::Price;
    use rust_decimal::Decimal;

    const FEED: &str = "\
День недели,Неделя,Название,Блюдо,Цена
Понедельник,0,Комплексный обед,Борщ,250
Понедельник,0,Напиток,Чай,50
";

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(FEED.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].weekday, "Понедельник");
        assert_eq!(rows[0].week_parity, 0);
        assert_eq!(rows[0].category, "Комплексный обед");
        assert_eq!(rows[0].dish, "Борщ");
        assert_eq!(rows[0].price, Price::new(Decimal::from(250)));
    }

    #[test]
    fn test_parse_rejects_malformed_row() {
        let broken = "\
День недели,Неделя,Название,Блюдо,Цена
Понедельник,не число,Напиток,Чай,50
";
        assert!(matches!(
            parse_rows(broken.as_bytes()),
            Err(MenuError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_empty_feed() {
        let empty = "День недели,Неделя,Название,Блюдо,Цена\n";
        assert!(parse_rows(empty.as_bytes()).unwrap().is_empty());
    }
}
