//! Query filters for list operations.

/// Named query parameters for a list call.
///
/// Only non-empty, trimmed values are kept, and each name appears at most
/// once (a later value for the same name replaces the earlier one).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    pairs: Vec<(&'static str, String)>,
}

impl QueryFilters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter if `value` is present and non-blank.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: Option<&str>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a filter. Blank values remove any existing entry.
    pub fn insert(&mut self, name: &'static str, value: Option<&str>) {
        self.pairs.retain(|(existing, _)| *existing != name);
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.pairs.push((name, value.to_string()));
        }
    }

    /// Returns the value for `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the filters as query pairs, in insertion order.
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Returns true if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the number of filters set.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}
