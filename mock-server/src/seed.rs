//! Seed data served by the mock API. Shapes follow the real responses
//! closely enough for clients that only pass JSON through.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use crate::World;

pub const PLAYER_TAG: &str = "#QPL0GRQLR";
pub const PLAYER_TOKEN: &str = "mockplayertoken";
pub const CLAN_TAG: &str = "#2GPVUQYPJ";
pub const PRIVATE_CLAN_TAG: &str = "#8QU8J9LP";
pub const CWL_WAR_TAG: &str = "#2PQ9URCCJ";
pub const LOCATION_ID: u32 = 32000006;
pub const LEGEND_LEAGUE_ID: u32 = 29000022;

/// A clan with everything hanging off it.
#[derive(Debug, Clone)]
pub struct Clan {
    pub info: Value,
    pub members: Vec<Value>,
    pub war_log_public: bool,
    pub war_log: Vec<Value>,
    pub current_war: Value,
    pub league_group: Option<Value>,
    pub raid_seasons: Vec<Value>,
}

fn member(i: usize) -> Value {
    json!({
        "tag": format!("#M{i:04}"),
        "name": format!("member-{i}"),
        "role": if i == 0 { "leader" } else { "member" },
        "expLevel": 100 + i,
        "trophies": 5000 - (i as i64) * 10,
        "clanRank": i + 1,
    })
}

pub fn world(token: &str) -> World {
    let mut players = BTreeMap::new();
    players.insert(
        PLAYER_TAG.to_string(),
        json!({
            "tag": PLAYER_TAG,
            "name": "Quadrigesimo",
            "townHallLevel": 16,
            "expLevel": 230,
            "trophies": 5321,
            "clan": { "tag": CLAN_TAG, "name": "Aogiri", "clanLevel": 20 },
        }),
    );

    let mut player_tokens = HashMap::new();
    player_tokens.insert(PLAYER_TAG.to_string(), PLAYER_TOKEN.to_string());

    let members: Vec<Value> = (0..30).map(member).collect();
    let mut clans = BTreeMap::new();
    clans.insert(
        CLAN_TAG.to_string(),
        Clan {
            info: json!({
                "tag": CLAN_TAG,
                "name": "Aogiri",
                "clanLevel": 20,
                "clanPoints": 52000,
                "members": members.len(),
                "warFrequency": "always",
                "isWarLogPublic": true,
                "location": { "id": LOCATION_ID, "name": "International" },
                "labels": [{ "id": 56000000, "name": "Clan Wars" }],
            }),
            members,
            war_log_public: true,
            war_log: (0..12)
                .map(|i| json!({ "result": if i % 3 == 0 { "lose" } else { "win" }, "teamSize": 15 }))
                .collect(),
            current_war: json!({ "state": "inWar", "teamSize": 15 }),
            league_group: Some(json!({
                "state": "inWar",
                "season": "2025-09",
                "clans": [{ "tag": CLAN_TAG, "name": "Aogiri" }],
                "rounds": [
                    { "warTags": [CWL_WAR_TAG, "#0", "#0", "#0"] },
                    { "warTags": ["#0", "#0", "#0", "#0"] },
                ],
            })),
            raid_seasons: (0..6)
                .map(|i| json!({ "state": "ended", "capitalTotalLoot": 1_000_000 + i * 1000 }))
                .collect(),
        },
    );
    clans.insert(
        PRIVATE_CLAN_TAG.to_string(),
        Clan {
            info: json!({
                "tag": PRIVATE_CLAN_TAG,
                "name": "Quiet Harbor",
                "clanLevel": 4,
                "clanPoints": 9000,
                "members": 3,
                "warFrequency": "never",
                "isWarLogPublic": false,
            }),
            members: (0..3).map(member).collect(),
            war_log_public: false,
            war_log: Vec::new(),
            current_war: json!({ "state": "notInWar" }),
            league_group: None,
            raid_seasons: Vec::new(),
        },
    );

    let mut cwl_wars = BTreeMap::new();
    cwl_wars.insert(
        CWL_WAR_TAG.to_string(),
        json!({
            "tag": CWL_WAR_TAG,
            "state": "inWar",
            "teamSize": 15,
            "clan": { "tag": CLAN_TAG },
            "opponent": { "tag": "#9V2Y8L0Q" },
        }),
    );

    let locations = vec![
        json!({ "id": 32000000, "name": "Europe", "isCountry": false }),
        json!({ "id": LOCATION_ID, "name": "International", "isCountry": false }),
        json!({ "id": 32000113, "name": "Italy", "isCountry": true, "countryCode": "IT" }),
    ];

    let leagues = vec![
        json!({ "id": 29000000, "name": "Unranked" }),
        json!({ "id": 29000021, "name": "Titan League I" }),
        json!({ "id": LEGEND_LEAGUE_ID, "name": "Legend League" }),
    ];

    World {
        token: token.to_string(),
        players,
        player_tokens,
        clans,
        cwl_wars,
        locations,
        leagues,
        war_leagues: vec![
            json!({ "id": 48000000, "name": "Unranked" }),
            json!({ "id": 48000015, "name": "Crystal League I" }),
        ],
        capital_leagues: vec![
            json!({ "id": 85000000, "name": "Unranked" }),
            json!({ "id": 85000003, "name": "Bronze League I" }),
        ],
        builder_base_leagues: vec![
            json!({ "id": 44000000, "name": "Wood League V" }),
            json!({ "id": 44000007, "name": "Clay League III" }),
        ],
        legend_seasons: vec!["2025-07".to_string(), "2025-08".to_string(), "2025-09".to_string()],
        player_labels: vec![
            json!({ "id": 57000000, "name": "Clan Wars" }),
            json!({ "id": 57000001, "name": "Clan War League" }),
        ],
        clan_labels: vec![
            json!({ "id": 56000000, "name": "Clan Wars" }),
            json!({ "id": 56000001, "name": "Clan War League" }),
        ],
        gold_pass: json!({ "startTime": "20251001T080000.000Z", "endTime": "20251101T080000.000Z" }),
        throttle: 0,
        retry_after: None,
        requests: 0,
    }
}
