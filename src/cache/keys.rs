//! Cache Key Module
//!
//! Canonical key builders for the read paths that go through the cache.
//! Every builder starts with its own namespace prefix, so keys for unrelated
//! queries cannot collide.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Entity Keys ==
pub fn user(id: impl Display) -> String {
    format!("user:{}", id)
}

pub fn user_profile(id: impl Display) -> String {
    format!("user_profile:{}", id)
}

pub fn posts(page: u32, limit: u32) -> String {
    format!("posts:{}:{}", page, limit)
}

/// Page of one user's posts. The page number comes last, so an id that
/// itself contains `:` still maps to a single key.
pub fn user_posts(user_id: impl Display, page: u32) -> String {
    format!("user_posts:{}:{}", user_id, page)
}

pub fn teams(page: u32, limit: u32) -> String {
    format!("teams:{}:{}", page, limit)
}

pub fn championships(page: u32, limit: u32) -> String {
    format!("championships:{}:{}", page, limit)
}

// == Search Keys ==
/// Filters offered by the player/team/championship search.
///
/// Unset fields are left out of the key, so "no filter" and "filter absent"
/// share a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Serialize)]
struct SearchKey<'a, F: ?Sized> {
    query: &'a str,
    filters: &'a F,
}

/// Key for a search query plus any serializable filter object.
pub fn search<F>(query: &str, filters: &F) -> Result<String>
where
    F: Serialize + ?Sized,
{
    let body = canonical_json(&SearchKey { query, filters })?;
    Ok(format!("search:{}", body))
}

// == Canonical Encoding ==
/// Encodes `value` as compact JSON with object fields sorted at every depth.
///
/// The value goes through `serde_json::Value` first. Its default `Map` is
/// ordered by key, so struct declaration order and map iteration order never
/// reach the output. Enabling serde_json's `preserve_order` feature would
/// break this.
pub fn canonical_json<S>(value: &S) -> Result<String>
where
    S: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// Key derived from a whole argument value (tuple, struct, scalar).
pub fn args_key<A>(args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    canonical_json(args)
}
