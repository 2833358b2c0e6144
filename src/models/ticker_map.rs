use crate::constants::AUTOMAKER_TICKERS;
use crate::error::TransformError;
use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

/// Company display name -> ticker symbol, in display order.
///
/// Immutable once built. Order is part of the identity: two maps with the same
/// entries in a different order are different cache keys, because they yield
/// tables with a different row order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerMap {
    entries: Vec<(String, String)>,
}

impl TickerMap {
    /// Build a map from (name, symbol) pairs; names must be unique
    pub fn new<N, S>(entries: impl IntoIterator<Item = (N, S)>) -> Result<Self, TransformError>
    where
        N: Into<String>,
        S: Into<String>,
    {
        let mut map = Self { entries: Vec::new() };
        for (name, symbol) in entries {
            let name = name.into();
            if map.symbol(&name).is_some() {
                return Err(TransformError::DuplicateSeries(name));
            }
            map.entries.push((name, symbol.into()));
        }
        Ok(map)
    }

    /// The seven domestic automakers shown by the dashboard
    pub fn automakers() -> Self {
        Self {
            entries: AUTOMAKER_TICKERS
                .iter()
                .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
                .collect(),
        }
    }

    /// Look up the ticker for a company name
    pub fn symbol(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbol(name).is_some()
    }

    /// Company names in display order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TickerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, symbol) in &self.entries {
            map.serialize_entry(name, symbol)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automakers() {
        let map = TickerMap::automakers();
        assert_eq!(map.len(), 7);
        assert_eq!(map.symbol("TOYOTA"), Some("7203.T"));
        assert_eq!(map.symbol("YAMAHA"), Some("7272.T"));
        assert_eq!(map.symbol("FORD"), None);
        assert_eq!(
            map.names(),
            vec!["TOYOTA", "HONDA", "Mazda", "NISSAN", "MITSUBISHI", "SUZUKI", "YAMAHA"]
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = TickerMap::new([("A", "AAA"), ("A", "BBB")]);
        assert_eq!(result, Err(TransformError::DuplicateSeries("A".to_string())));
    }

    #[test]
    fn test_order_is_identity() {
        let ab = TickerMap::new([("A", "AAA"), ("B", "BBB")]).unwrap();
        let ba = TickerMap::new([("B", "BBB"), ("A", "AAA")]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_serialize_keeps_order() {
        let map = TickerMap::new([("B", "BBB"), ("A", "AAA")]).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"B":"BBB","A":"AAA"}"#);
    }
}
