//! Lookups
//!
//! A [`Lookup`] is one logical address query: a set of named input fields
//! that the core never interprets, plus a slot for the result the service
//! returns for it.

use std::collections::BTreeMap;

/// Query parameter carrying [`Lookup::max_candidates`]
pub const CANDIDATES_FIELD: &str = "candidates";

/// Field used to address a lookup inside a batch
pub const INPUT_ID_FIELD: &str = "input_id";

/// One address query and, after a round trip, its result
///
/// Field names are lower-cased on insertion and empty values are dropped, so
/// the same lookup always produces the same parameters.
///
/// # Examples
/// ```
/// use lookup_client::Lookup;
///
/// let lookup: Lookup<Vec<String>> = Lookup::new()
///     .field("ZipCode", "3")
///     .field("City", "1")
///     .field("state", "2")
///     .field("street", "");
///
/// let names: Vec<_> = lookup.parameters().into_iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["city", "state", "zipcode"]);
/// assert!(lookup.result().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<R> {
    fields: BTreeMap<String, String>,
    max_candidates: Option<u32>,
    result: Option<R>,
}

impl<R> Default for Lookup<R> {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            max_candidates: None,
            result: None,
        }
    }
}

impl<R> Lookup<R> {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an input field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Limit the number of candidates the service returns
    pub fn max_candidates(mut self, max: u32) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Set the candidate limit in place
    pub fn set_max_candidates(&mut self, max: u32) {
        self.max_candidates = Some(max);
    }

    /// Set an input field in place
    ///
    /// An empty value removes the field.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        let value = value.into();
        if value.is_empty() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, value);
        }
    }

    /// Get an input field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Get the input id used to address this lookup in a batch
    pub fn input_id(&self) -> Option<&str> {
        self.get(INPUT_ID_FIELD)
    }

    /// Get the candidate limit
    pub fn candidate_limit(&self) -> Option<u32> {
        self.max_candidates
    }

    /// Get the non-empty input fields, ordered by name
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Get the request parameters for this lookup, ordered by name
    ///
    /// These are the input fields plus `candidates` when a candidate limit
    /// is set.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let mut parameters = self.fields.clone();
        if let Some(max) = self.max_candidates {
            parameters.insert(CANDIDATES_FIELD.to_string(), max.to_string());
        }
        parameters.into_iter().collect()
    }

    /// Get the result, if a round trip has completed
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// Store the result of a round trip
    pub fn set_result(&mut self, result: R) {
        self.result = Some(result);
    }

    /// Empty the result slot
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    /// Take the result out of the lookup
    pub fn take_result(&mut self) -> Option<R> {
        self.result.take()
    }
}
