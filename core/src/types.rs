//! Request-side types for endpoints that take more than a tag or an id.
//!
//! Responses are not modelled here: every endpoint returns the API's JSON
//! as a `serde_json::Value`.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::http::Query;
use crate::paging::Paging;

/// Body of `POST /players/{tag}/verifytoken`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// War frequency filter accepted by clan search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarFrequency {
    Always,
    MoreThanOncePerWeek,
    OncePerWeek,
    LessThanOncePerWeek,
    Never,
    Unknown,
}

impl WarFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            WarFrequency::Always => "always",
            WarFrequency::MoreThanOncePerWeek => "moreThanOncePerWeek",
            WarFrequency::OncePerWeek => "oncePerWeek",
            WarFrequency::LessThanOncePerWeek => "lessThanOncePerWeek",
            WarFrequency::Never => "never",
            WarFrequency::Unknown => "unknown",
        }
    }
}

/// Filters for `GET /clans`. The API rejects a search with no filter at
/// all, so at least one field other than paging must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClanSearch {
    /// Clan name, at least three characters.
    pub name: Option<String>,
    pub war_frequency: Option<WarFrequency>,
    pub location_id: Option<u32>,
    pub min_members: Option<u32>,
    pub max_members: Option<u32>,
    pub min_clan_points: Option<u32>,
    pub min_clan_level: Option<u32>,
    pub label_ids: Vec<u32>,
    pub paging: Paging,
}

impl ClanSearch {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn has_filter(&self) -> bool {
        self.name.is_some()
            || self.war_frequency.is_some()
            || self.location_id.is_some()
            || self.min_members.is_some()
            || self.max_members.is_some()
            || self.min_clan_points.is_some()
            || self.min_clan_level.is_some()
            || !self.label_ids.is_empty()
    }

    /// Render filters using the API's camelCase field names, followed by
    /// the paging fields.
    pub fn to_query(&self) -> ApiResult<Query> {
        if !self.has_filter() {
            return Err(ApiError::invalid_argument(
                "clan search needs at least one filter",
            ));
        }
        if let Some(name) = &self.name {
            if name.chars().count() < 3 {
                return Err(ApiError::invalid_argument(
                    "clan name filter must be at least 3 characters",
                ));
            }
        }

        let mut query = Query::new();
        let mut push = |key: &str, value: String| query.push((key.to_string(), value));
        if let Some(name) = &self.name {
            push("name", name.clone());
        }
        if let Some(freq) = self.war_frequency {
            push("warFrequency", freq.as_str().to_string());
        }
        if let Some(id) = self.location_id {
            push("locationId", id.to_string());
        }
        if let Some(n) = self.min_members {
            push("minMembers", n.to_string());
        }
        if let Some(n) = self.max_members {
            push("maxMembers", n.to_string());
        }
        if let Some(n) = self.min_clan_points {
            push("minClanPoints", n.to_string());
        }
        if let Some(n) = self.min_clan_level {
            push("minClanLevel", n.to_string());
        }
        if !self.label_ids.is_empty() {
            let ids: Vec<String> = self.label_ids.iter().map(u32::to_string).collect();
            push("labelIds", ids.join(","));
        }
        self.paging.append_to(&mut query)?;
        Ok(query)
    }
}
