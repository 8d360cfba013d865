//! Typed endpoint methods for the Clash of Clans API.
//!
//! # Design
//! Each method maps its arguments to a method, a path and a query, then
//! delegates to `RequestPipeline::execute`. No method retries, translates
//! errors or validates beyond tag normalization and paging rules; all of
//! that lives in the pipeline so every endpoint behaves identically.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, Query, Transport};
use crate::paging::Paging;
use crate::pipeline::{RequestPipeline, Sleeper};
use crate::tag::{encode_segment, normalize_tag};
use crate::types::{ClanSearch, VerifyTokenRequest};

#[cfg(feature = "ureq-transport")]
use crate::transport::UreqTransport;

/// Blocking client for the Clash of Clans API.
///
/// Holds no mutable state; share it across threads freely when `T` is
/// `Sync`. Responses are returned as the API's own JSON.
#[derive(Debug)]
pub struct CocClient<T> {
    pipeline: RequestPipeline<T>,
}

#[cfg(feature = "ureq-transport")]
impl CocClient<UreqTransport> {
    /// Client for the public API with default settings.
    pub fn new(token: &str) -> ApiResult<Self> {
        Self::with_config(ClientConfig::default(), token)
    }

    pub fn with_config(config: ClientConfig, token: &str) -> ApiResult<Self> {
        Self::with_transport(config, token, UreqTransport::new())
    }
}

impl<T: Transport> CocClient<T> {
    /// Client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, token: &str, transport: T) -> ApiResult<Self> {
        Ok(Self {
            pipeline: RequestPipeline::new(config, token, transport)?,
        })
    }

    /// Replace the function used to wait between retry attempts.
    #[must_use]
    pub fn with_sleeper(self, sleep: Sleeper) -> Self {
        Self {
            pipeline: self.pipeline.with_sleeper(sleep),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.pipeline.config()
    }

    pub fn transport(&self) -> &T {
        self.pipeline.transport()
    }

    pub fn pipeline(&self) -> &RequestPipeline<T> {
        &self.pipeline
    }

    fn get(&self, path: &str) -> ApiResult<Value> {
        self.pipeline.execute(HttpMethod::Get, path, Query::new(), None)
    }

    fn get_paged(&self, path: &str, paging: impl Into<Paging>) -> ApiResult<Value> {
        let query = paging.into().to_query()?;
        self.pipeline.execute(HttpMethod::Get, path, query, None)
    }

    // -------------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------------

    pub fn get_player(&self, tag: &str) -> ApiResult<Value> {
        self.get(&format!("/players/{}", normalize_tag(tag)))
    }

    /// Check an in-game API token against a player. The response's `status`
    /// field is `"ok"` or `"invalid"`.
    pub fn verify_player_token(&self, tag: &str, player_token: &str) -> ApiResult<Value> {
        let body = serde_json::to_value(VerifyTokenRequest {
            token: player_token.to_string(),
        })
        .map_err(|e| ApiError::invalid_argument(e.to_string()))?;
        self.pipeline.execute(
            HttpMethod::Post,
            &format!("/players/{}/verifytoken", normalize_tag(tag)),
            Query::new(),
            Some(&body),
        )
    }

    // -------------------------------------------------------------------------
    // Clans
    // -------------------------------------------------------------------------

    pub fn search_clans(&self, search: &ClanSearch) -> ApiResult<Value> {
        let query = search.to_query()?;
        self.pipeline.execute(HttpMethod::Get, "/clans", query, None)
    }

    pub fn get_clan(&self, tag: &str) -> ApiResult<Value> {
        self.get(&format!("/clans/{}", normalize_tag(tag)))
    }

    pub fn list_clan_members(&self, tag: &str, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged(&format!("/clans/{}/members", normalize_tag(tag)), paging)
    }

    /// Fails with `Unauthorized` when the clan's war log is private.
    pub fn get_clan_warlog(&self, tag: &str, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged(&format!("/clans/{}/warlog", normalize_tag(tag)), paging)
    }

    pub fn get_current_war(&self, tag: &str) -> ApiResult<Value> {
        self.get(&format!("/clans/{}/currentwar", normalize_tag(tag)))
    }

    pub fn get_current_war_league_group(&self, tag: &str) -> ApiResult<Value> {
        self.get(&format!("/clans/{}/currentwar/leaguegroup", normalize_tag(tag)))
    }

    pub fn get_clan_capital_raid_seasons(
        &self,
        tag: &str,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.get_paged(
            &format!("/clans/{}/capitalraidseasons", normalize_tag(tag)),
            paging,
        )
    }

    // -------------------------------------------------------------------------
    // Clan war leagues
    // -------------------------------------------------------------------------

    /// A single CWL war, addressed by one of the `warTags` of a league group.
    pub fn get_cwl_war(&self, war_tag: &str) -> ApiResult<Value> {
        self.get(&format!("/clanwarleagues/wars/{}", normalize_tag(war_tag)))
    }

    // -------------------------------------------------------------------------
    // Leagues
    // -------------------------------------------------------------------------

    pub fn list_leagues(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/leagues", paging)
    }

    pub fn get_league(&self, league_id: u32) -> ApiResult<Value> {
        self.get(&format!("/leagues/{league_id}"))
    }

    /// Only available for the Legend League.
    pub fn get_league_seasons(&self, league_id: u32, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged(&format!("/leagues/{league_id}/seasons"), paging)
    }

    pub fn get_league_season_rankings(
        &self,
        league_id: u32,
        season_id: &str,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.get_paged(
            &format!("/leagues/{league_id}/seasons/{}", encode_segment(season_id)),
            paging,
        )
    }

    pub fn list_war_leagues(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/warleagues", paging)
    }

    pub fn get_war_league(&self, league_id: u32) -> ApiResult<Value> {
        self.get(&format!("/warleagues/{league_id}"))
    }

    pub fn list_capital_leagues(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/capitalleagues", paging)
    }

    pub fn get_capital_league(&self, league_id: u32) -> ApiResult<Value> {
        self.get(&format!("/capitalleagues/{league_id}"))
    }

    pub fn list_builder_base_leagues(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/builderbaseleagues", paging)
    }

    pub fn get_builder_base_league(&self, league_id: u32) -> ApiResult<Value> {
        self.get(&format!("/builderbaseleagues/{league_id}"))
    }

    // -------------------------------------------------------------------------
    // Locations and rankings
    // -------------------------------------------------------------------------

    pub fn list_locations(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/locations", paging)
    }

    pub fn get_location(&self, location_id: u32) -> ApiResult<Value> {
        self.get(&format!("/locations/{location_id}"))
    }

    pub fn get_location_player_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "players", paging)
    }

    pub fn get_location_player_builder_base_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "players-builder-base", paging)
    }

    #[deprecated(note = "versus battles were replaced by builder base rankings")]
    pub fn get_location_player_versus_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "players-versus", paging)
    }

    pub fn get_location_clan_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "clans", paging)
    }

    pub fn get_location_clan_builder_base_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "clans-builder-base", paging)
    }

    #[deprecated(note = "versus battles were replaced by builder base rankings")]
    pub fn get_location_clan_versus_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "clans-versus", paging)
    }

    pub fn get_location_capital_rankings(
        &self,
        location_id: u32,
        paging: impl Into<Paging>,
    ) -> ApiResult<Value> {
        self.rankings(location_id, "capitals", paging)
    }

    fn rankings(&self, location_id: u32, kind: &str, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged(&format!("/locations/{location_id}/rankings/{kind}"), paging)
    }

    // -------------------------------------------------------------------------
    // Labels and gold pass
    // -------------------------------------------------------------------------

    pub fn list_player_labels(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/labels/players", paging)
    }

    pub fn list_clan_labels(&self, paging: impl Into<Paging>) -> ApiResult<Value> {
        self.get_paged("/labels/clans", paging)
    }

    pub fn get_current_goldpass_season(&self) -> ApiResult<Value> {
        self.get("/goldpass/seasons/current")
    }
}
