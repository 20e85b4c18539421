// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries, one module per table family.

pub mod alerts;
pub mod sources;
pub mod tenants;

use std::str::FromStr;

use rusqlite::types::Type;

/// Parse a text column into one of the strum-backed enums.
pub(crate) fn parse_text<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
