//! Response envelopes
//!
//! The bakery API is not consistent about wrapping: lists arrive bare, as a
//! paginated `{results}` page or as `{data, pagination}`, and single records
//! may be wrapped in `{data}`.

use serde::Deserialize;

/// Any of the list shapes the API answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    /// `[...]`
    Bare(Vec<T>),

    /// `{"count": .., "results": [...]}`
    Results {
        /// Page of records.
        results: Vec<T>,
    },

    /// `{"data": [...], "pagination": {...}}`
    Data {
        /// Page of records.
        data: Vec<T>,
    },
}

impl<T> ListEnvelope<T> {
    /// The records, whichever shape they came in.
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items)
            | ListEnvelope::Results { results: items }
            | ListEnvelope::Data { data: items } => items,
        }
    }
}

/// A single record, optionally wrapped in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    /// `{"data": {...}}`
    Data {
        /// The record.
        data: T,
    },

    /// `{...}`
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    /// The record, whichever shape it came in.
    pub fn into_inner(self) -> T {
        match self {
            ItemEnvelope::Data { data } | ItemEnvelope::Bare(data) => data,
        }
    }
}
