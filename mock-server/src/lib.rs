//! In-memory stand-in for the Clash of Clans API.
//!
//! Serves a seeded world under `/v1` with the real API's auth rule (bearer
//! token, 403 `accessDenied` otherwise), cursor paging, and a throttle that
//! answers the next N requests with 429. Tests hold on to the `Db` handle to
//! arm the throttle and count requests.

pub mod page;
pub mod seed;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use seed::Clan;

/// Everything the mock knows, plus throttle and request counters.
#[derive(Debug, Clone)]
pub struct World {
    pub token: String,
    pub players: BTreeMap<String, Value>,
    pub player_tokens: HashMap<String, String>,
    pub clans: BTreeMap<String, Clan>,
    pub cwl_wars: BTreeMap<String, Value>,
    pub locations: Vec<Value>,
    pub leagues: Vec<Value>,
    pub war_leagues: Vec<Value>,
    pub capital_leagues: Vec<Value>,
    pub builder_base_leagues: Vec<Value>,
    pub legend_seasons: Vec<String>,
    pub player_labels: Vec<Value>,
    pub clan_labels: Vec<Value>,
    pub gold_pass: Value,
    /// Remaining requests to answer with 429.
    pub throttle: u32,
    /// `Retry-After` value sent with throttled responses.
    pub retry_after: Option<String>,
    /// Authenticated-or-not requests that reached a known route.
    pub requests: u64,
}

pub type Db = Arc<RwLock<World>>;

/// Seeded world accepting `token`.
pub fn db(token: &str) -> Db {
    Arc::new(RwLock::new(seed::world(token)))
}

/// Error body in the API's `{"reason", "message"}` shape.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    reason: &'static str,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "badRequest", message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "notFound", "Resource was not found.")
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "accessDenied", message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Json(json!({ "reason": self.reason, "message": self.message }));
        (self.status, body).into_response()
    }
}

type ApiResult = Result<Json<Value>, Failure>;
type Params = Query<HashMap<String, String>>;

pub fn app(db: Db) -> Router {
    let api = Router::new()
        .route("/players/{tag}", get(get_player))
        .route("/players/{tag}/verifytoken", post(verify_token))
        .route("/clans", get(search_clans))
        .route("/clans/{tag}", get(get_clan))
        .route("/clans/{tag}/members", get(clan_members))
        .route("/clans/{tag}/warlog", get(clan_war_log))
        .route("/clans/{tag}/currentwar", get(current_war))
        .route("/clans/{tag}/currentwar/leaguegroup", get(league_group))
        .route("/clans/{tag}/capitalraidseasons", get(raid_seasons))
        .route("/clanwarleagues/wars/{tag}", get(cwl_war))
        .route("/leagues", get(list_leagues))
        .route("/leagues/{id}", get(get_league))
        .route("/leagues/{id}/seasons", get(league_seasons))
        .route("/leagues/{id}/seasons/{season}", get(season_rankings))
        .route("/warleagues", get(list_war_leagues))
        .route("/warleagues/{id}", get(get_war_league))
        .route("/capitalleagues", get(list_capital_leagues))
        .route("/capitalleagues/{id}", get(get_capital_league))
        .route("/builderbaseleagues", get(list_builder_base_leagues))
        .route("/builderbaseleagues/{id}", get(get_builder_base_league))
        .route("/locations", get(list_locations))
        .route("/locations/{id}", get(get_location))
        .route("/locations/{id}/rankings/{kind}", get(location_rankings))
        .route("/labels/players", get(player_labels))
        .route("/labels/clans", get(clan_labels))
        .route("/goldpass/seasons/current", get(gold_pass))
        .route_layer(middleware::from_fn_with_state(db.clone(), gatekeeper))
        .with_state(db);
    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// Count the request, check the bearer token, then apply the throttle.
async fn gatekeeper(State(db): State<Db>, request: Request, next: Next) -> Response {
    {
        let mut world = db.write().await;
        world.requests += 1;

        let expected = format!("Bearer {}", world.token);
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            tracing::debug!("rejecting request with bad or missing token");
            return Failure::access_denied("Invalid authorization").into_response();
        }

        if world.throttle > 0 {
            world.throttle -= 1;
            tracing::debug!(remaining = world.throttle, "throttling request");
            let mut response = Failure::new(
                StatusCode::TOO_MANY_REQUESTS,
                "requestThrottled",
                "Request was throttled, because amount of requests was above the threshold defined for the used API token.",
            )
            .into_response();
            if let Some(value) = world.retry_after.as_deref() {
                if let Ok(value) = HeaderValue::from_str(value) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
            }
            return response;
        }
    }
    next.run(request).await
}

// --- players ---

async fn get_player(State(db): State<Db>, Path(tag): Path<String>) -> ApiResult {
    let world = db.read().await;
    world.players.get(&tag).cloned().map(Json).ok_or_else(Failure::not_found)
}

#[derive(Deserialize)]
struct VerifyToken {
    token: String,
}

async fn verify_token(
    State(db): State<Db>,
    Path(tag): Path<String>,
    Json(input): Json<VerifyToken>,
) -> ApiResult {
    let world = db.read().await;
    if !world.players.contains_key(&tag) {
        return Err(Failure::not_found());
    }
    let valid = world.player_tokens.get(&tag) == Some(&input.token);
    Ok(Json(json!({
        "tag": tag,
        "token": input.token,
        "status": if valid { "ok" } else { "invalid" },
    })))
}

// --- clans ---

fn param_u64(params: &HashMap<String, String>, key: &str) -> Result<Option<u64>, Failure> {
    params
        .get(key)
        .map(|raw| {
            raw.parse()
                .map_err(|_| Failure::bad_request(format!("invalid {key}")))
        })
        .transpose()
}

async fn search_clans(State(db): State<Db>, Query(params): Params) -> ApiResult {
    const FILTERS: [&str; 8] = [
        "name",
        "warFrequency",
        "locationId",
        "minMembers",
        "maxMembers",
        "minClanPoints",
        "minClanLevel",
        "labelIds",
    ];
    if !FILTERS.iter().any(|f| params.contains_key(*f)) {
        return Err(Failure::bad_request("at least one filtering parameter must be given"));
    }
    let name = params.get("name").map(|n| n.to_lowercase());
    if name.as_ref().is_some_and(|n| n.chars().count() < 3) {
        return Err(Failure::bad_request("name needs to be at least three characters long"));
    }
    let min_members = param_u64(&params, "minMembers")?;
    let max_members = param_u64(&params, "maxMembers")?;
    let min_points = param_u64(&params, "minClanPoints")?;
    let min_level = param_u64(&params, "minClanLevel")?;
    let location = param_u64(&params, "locationId")?;
    let labels: Vec<u64> = match params.get("labelIds") {
        Some(raw) => raw
            .split(',')
            .map(|id| id.trim().parse())
            .collect::<Result<_, _>>()
            .map_err(|_| Failure::bad_request("invalid labelIds"))?,
        None => Vec::new(),
    };

    let world = db.read().await;
    let matches: Vec<Value> = world
        .clans
        .values()
        .map(|clan| &clan.info)
        .filter(|info| {
            let num = |key: &str| info[key].as_u64().unwrap_or(0);
            let clan_name = info["name"].as_str().unwrap_or_default().to_lowercase();
            let clan_labels: Vec<u64> = info["labels"]
                .as_array()
                .map(|ls| ls.iter().filter_map(|l| l["id"].as_u64()).collect())
                .unwrap_or_default();
            name.as_ref().map_or(true, |n| clan_name.contains(n.as_str()))
                && params
                    .get("warFrequency")
                    .map_or(true, |f| info["warFrequency"] == f.as_str())
                && location.map_or(true, |id| info["location"]["id"].as_u64() == Some(id))
                && min_members.map_or(true, |n| num("members") >= n)
                && max_members.map_or(true, |n| num("members") <= n)
                && min_points.map_or(true, |n| num("clanPoints") >= n)
                && min_level.map_or(true, |n| num("clanLevel") >= n)
                && labels.iter().all(|l| clan_labels.contains(l))
        })
        .cloned()
        .collect();
    page::page(&matches, &params).map(Json)
}

async fn get_clan(State(db): State<Db>, Path(tag): Path<String>) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    Ok(Json(clan.info.clone()))
}

async fn clan_members(State(db): State<Db>, Path(tag): Path<String>, Query(params): Params) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    page::page(&clan.members, &params).map(Json)
}

async fn clan_war_log(State(db): State<Db>, Path(tag): Path<String>, Query(params): Params) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    if !clan.war_log_public {
        return Err(Failure::access_denied("Access denied, clan war log is private."));
    }
    page::page(&clan.war_log, &params).map(Json)
}

async fn current_war(State(db): State<Db>, Path(tag): Path<String>) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    if !clan.war_log_public {
        return Err(Failure::access_denied("Access denied, clan war log is private."));
    }
    Ok(Json(clan.current_war.clone()))
}

async fn league_group(State(db): State<Db>, Path(tag): Path<String>) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    clan.league_group.clone().map(Json).ok_or_else(Failure::not_found)
}

async fn raid_seasons(State(db): State<Db>, Path(tag): Path<String>, Query(params): Params) -> ApiResult {
    let world = db.read().await;
    let clan = world.clans.get(&tag).ok_or_else(Failure::not_found)?;
    page::page(&clan.raid_seasons, &params).map(Json)
}

async fn cwl_war(State(db): State<Db>, Path(tag): Path<String>) -> ApiResult {
    let world = db.read().await;
    world.cwl_wars.get(&tag).cloned().map(Json).ok_or_else(Failure::not_found)
}

// --- catalogs ---

fn find_by_id(items: &[Value], id: u64) -> ApiResult {
    items
        .iter()
        .find(|item| item["id"].as_u64() == Some(id))
        .cloned()
        .map(Json)
        .ok_or_else(Failure::not_found)
}

async fn list_leagues(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.leagues, &params).map(Json)
}

async fn get_league(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    find_by_id(&db.read().await.leagues, id)
}

async fn league_seasons(State(db): State<Db>, Path(id): Path<u64>, Query(params): Params) -> ApiResult {
    if id != u64::from(seed::LEGEND_LEAGUE_ID) {
        return Err(Failure::not_found());
    }
    let world = db.read().await;
    let seasons: Vec<Value> = world.legend_seasons.iter().map(|s| json!({ "id": s })).collect();
    page::page(&seasons, &params).map(Json)
}

async fn season_rankings(
    State(db): State<Db>,
    Path((id, season)): Path<(u64, String)>,
    Query(params): Params,
) -> ApiResult {
    let world = db.read().await;
    if id != u64::from(seed::LEGEND_LEAGUE_ID) || !world.legend_seasons.contains(&season) {
        return Err(Failure::not_found());
    }
    let ranked = ranked(world.players.values());
    page::page(&ranked, &params).map(Json)
}

async fn list_war_leagues(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.war_leagues, &params).map(Json)
}

async fn get_war_league(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    find_by_id(&db.read().await.war_leagues, id)
}

async fn list_capital_leagues(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.capital_leagues, &params).map(Json)
}

async fn get_capital_league(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    find_by_id(&db.read().await.capital_leagues, id)
}

async fn list_builder_base_leagues(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.builder_base_leagues, &params).map(Json)
}

async fn get_builder_base_league(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    find_by_id(&db.read().await.builder_base_leagues, id)
}

// --- locations ---

async fn list_locations(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.locations, &params).map(Json)
}

async fn get_location(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    find_by_id(&db.read().await.locations, id)
}

/// Attach a `rank` to each entry in iteration order.
fn ranked<'a>(entries: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    entries
        .enumerate()
        .map(|(i, entry)| {
            let mut entry = entry.clone();
            entry["rank"] = json!(i + 1);
            entry
        })
        .collect()
}

async fn location_rankings(
    State(db): State<Db>,
    Path((id, kind)): Path<(u64, String)>,
    Query(params): Params,
) -> ApiResult {
    let world = db.read().await;
    let _location = find_by_id(&world.locations, id)?;
    let entries = match kind.as_str() {
        "players" | "players-builder-base" | "players-versus" => ranked(world.players.values()),
        "clans" | "clans-builder-base" | "clans-versus" | "capitals" => {
            ranked(world.clans.values().map(|clan| &clan.info))
        }
        _ => return Err(Failure::not_found()),
    };
    page::page(&entries, &params).map(Json)
}

// --- labels and gold pass ---

async fn player_labels(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.player_labels, &params).map(Json)
}

async fn clan_labels(State(db): State<Db>, Query(params): Params) -> ApiResult {
    page::page(&db.read().await.clan_labels, &params).map(Json)
}

async fn gold_pass(State(db): State<Db>) -> Json<Value> {
    Json(db.read().await.gold_pass.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_world_has_reference_entities() {
        let world = seed::world("t");
        assert!(world.players.contains_key(seed::PLAYER_TAG));
        assert!(world.clans.contains_key(seed::CLAN_TAG));
        assert!(world.cwl_wars.contains_key(seed::CWL_WAR_TAG));
        assert_eq!(world.throttle, 0);
    }

    #[test]
    fn failure_body_uses_reason_and_message() {
        let failure = Failure::bad_request("nope");
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
        assert_eq!(failure.reason, "badRequest");
        assert_eq!(failure.message, "nope");
    }

    #[test]
    fn ranked_numbers_from_one() {
        let items = [json!({ "tag": "#A" }), json!({ "tag": "#B" })];
        let ranked = ranked(items.iter());
        assert_eq!(ranked[0]["rank"], 1);
        assert_eq!(ranked[1]["rank"], 2);
    }
}
