//! Verify endpoint methods and pipeline status handling against the JSON
//! test vectors stored in `test-vectors/`.
//!
//! `endpoints.json` pins the method, path, query and body each endpoint
//! sends. `status.json` scripts transport outcomes and pins the result of a
//! single call. Bodies are compared as parsed JSON to avoid false negatives
//! from field ordering.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coc_core::{
    ApiError, ClanSearch, ClientConfig, CocClient, HttpMethod, HttpRequest, HttpResponse, Paging,
    Transport, TransportError, WarFrequency,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000/v1";

/// Plays back scripted outcomes (answering `{}` once the script runs out)
/// and records every request.
#[derive(Default)]
struct Scripted {
    outcomes: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    fn new(mut outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn send(&self, request: &HttpRequest, _: Duration) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes.lock().unwrap().pop().unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "{}".to_string(),
            })
        })
    }
}

fn client(max_retries: u32, transport: Scripted) -> CocClient<Scripted> {
    let config = ClientConfig::default()
        .with_base_url(BASE_URL)
        .with_max_retries(max_retries)
        .with_backoff_base(Duration::ZERO);
    CocClient::with_transport(config, "t", transport)
        .unwrap()
        .with_sleeper(Arc::new(|_: Duration| {}))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn paging(args: &Value) -> Paging {
    Paging {
        limit: args["limit"].as_u64().map(|n| n as u32),
        after: args["after"].as_str().map(str::to_string),
        before: args["before"].as_str().map(str::to_string),
    }
}

fn u32_arg(args: &Value, key: &str) -> Option<u32> {
    args[key].as_u64().map(|n| n as u32)
}

/// Invoke the endpoint named in a vector.
#[allow(deprecated)]
fn call(c: &CocClient<Scripted>, name: &str, args: &Value) -> Result<Value, ApiError> {
    let tag = args["tag"].as_str().unwrap_or_default();
    let id = u32_arg(args, "id").unwrap_or_default();
    let p = paging(args);
    match name {
        "get_player" => c.get_player(tag),
        "verify_player_token" => c.verify_player_token(tag, args["token"].as_str().unwrap()),
        "search_clans" => {
            let war_frequency: Option<WarFrequency> =
                serde_json::from_value(args["war_frequency"].clone()).unwrap();
            let search = ClanSearch {
                name: args["name"].as_str().map(str::to_string),
                war_frequency,
                location_id: u32_arg(args, "location_id"),
                min_members: u32_arg(args, "min_members"),
                max_members: u32_arg(args, "max_members"),
                min_clan_points: u32_arg(args, "min_clan_points"),
                min_clan_level: u32_arg(args, "min_clan_level"),
                label_ids: args["label_ids"]
                    .as_array()
                    .map(|ids| ids.iter().map(|v| v.as_u64().unwrap() as u32).collect())
                    .unwrap_or_default(),
                paging: p,
            };
            c.search_clans(&search)
        }
        "get_clan" => c.get_clan(tag),
        "list_clan_members" => c.list_clan_members(tag, p),
        "get_clan_warlog" => c.get_clan_warlog(tag, p),
        "get_current_war" => c.get_current_war(tag),
        "get_current_war_league_group" => c.get_current_war_league_group(tag),
        "get_clan_capital_raid_seasons" => c.get_clan_capital_raid_seasons(tag, p),
        "get_cwl_war" => c.get_cwl_war(tag),
        "list_leagues" => c.list_leagues(p),
        "get_league" => c.get_league(id),
        "get_league_seasons" => c.get_league_seasons(id, p),
        "get_league_season_rankings" => {
            c.get_league_season_rankings(id, args["season"].as_str().unwrap(), p)
        }
        "list_war_leagues" => c.list_war_leagues(p),
        "get_war_league" => c.get_war_league(id),
        "list_capital_leagues" => c.list_capital_leagues(p),
        "get_capital_league" => c.get_capital_league(id),
        "list_builder_base_leagues" => c.list_builder_base_leagues(p),
        "get_builder_base_league" => c.get_builder_base_league(id),
        "list_locations" => c.list_locations(p),
        "get_location" => c.get_location(id),
        "get_location_player_rankings" => c.get_location_player_rankings(id, p),
        "get_location_player_builder_base_rankings" => {
            c.get_location_player_builder_base_rankings(id, p)
        }
        "get_location_player_versus_rankings" => c.get_location_player_versus_rankings(id, p),
        "get_location_clan_rankings" => c.get_location_clan_rankings(id, p),
        "get_location_clan_builder_base_rankings" => {
            c.get_location_clan_builder_base_rankings(id, p)
        }
        "get_location_clan_versus_rankings" => c.get_location_clan_versus_rankings(id, p),
        "get_location_capital_rankings" => c.get_location_capital_rankings(id, p),
        "list_player_labels" => c.list_player_labels(p),
        "list_clan_labels" => c.list_clan_labels(p),
        "get_current_goldpass_season" => c.get_current_goldpass_season(),
        other => panic!("unknown endpoint in vectors: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = client(0, Scripted::default());

        let result = call(&c, case["call"].as_str().unwrap(), &case["args"]);
        assert!(result.is_ok(), "{name}: call failed: {result:?}");

        let requests = c.transport().requests();
        assert_eq!(requests.len(), 1, "{name}: exactly one request");
        let req = &requests[0];
        let expected = &case["expected_request"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

        let expected_query: Vec<(String, String)> = expected["query"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| {
                let arr = pair.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.query, expected_query, "{name}: query");

        match &expected["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            body => {
                let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&sent, body, "{name}: body");
            }
        }

        assert_eq!(req.header("Authorization"), Some("Bearer t"), "{name}: auth header");
    }
}

#[test]
fn every_endpoint_rejects_conflicting_cursors_before_sending() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let expected_query = case["expected_request"]["query"].as_array().unwrap();
        if !expected_query.iter().any(|pair| pair[0] == "limit") {
            continue;
        }
        let name = case["name"].as_str().unwrap();
        let mut args = case["args"].clone();
        args["after"] = Value::from("a");
        args["before"] = Value::from("b");

        let c = client(0, Scripted::default());
        let err = call(&c, case["call"].as_str().unwrap(), &args).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)), "{name}: {err:?}");
        assert!(c.transport().requests().is_empty(), "{name}: nothing sent");
    }
}

// ---------------------------------------------------------------------------
// Status handling
// ---------------------------------------------------------------------------

fn outcome(scripted: &Value) -> Result<HttpResponse, TransportError> {
    if let Some(kind) = scripted["transport_error"].as_str() {
        return Err(match kind {
            "timeout" => TransportError::Timeout("scripted".into()),
            "connection" => TransportError::Connection("scripted".into()),
            "request" => TransportError::Request("scripted".into()),
            other => panic!("unknown transport error: {other}"),
        });
    }
    let headers = scripted["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| (h[0].as_str().unwrap().to_string(), h[1].as_str().unwrap().to_string()))
        .collect();
    Ok(HttpResponse {
        status: scripted["status"].as_u64().unwrap() as u16,
        headers,
        body: scripted["body"].as_str().unwrap().to_string(),
    })
}

fn error_kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::InvalidArgument(_) => "InvalidArgument",
        ApiError::Config(_) => "Config",
        ApiError::Unauthorized { .. } => "Unauthorized",
        ApiError::NotFound { .. } => "NotFound",
        ApiError::RateLimitExceeded { .. } => "RateLimitExceeded",
        ApiError::Network { .. } => "Network",
        ApiError::Api { .. } => "Api",
    }
}

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let script = case["responses"].as_array().unwrap().iter().map(outcome).collect();
        let max_retries = case["max_retries"].as_u64().unwrap() as u32;
        let c = client(max_retries, Scripted::new(script));

        let result = c.list_locations(Paging::none());
        let expected = &case["expected"];
        match (&result, expected.get("ok"), expected["error"].as_str()) {
            (Ok(value), Some(ok), None) => assert_eq!(value, ok, "{name}: payload"),
            (Err(err), None, Some(kind)) => assert_eq!(error_kind(err), kind, "{name}: error kind"),
            _ => panic!("{name}: unexpected result {result:?}"),
        }

        let attempts = case["attempts"].as_u64().unwrap() as usize;
        assert_eq!(c.transport().requests().len(), attempts, "{name}: attempts");
    }
}
