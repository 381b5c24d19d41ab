//! Advanced query endpoint tests against a live server.

use reqwest::StatusCode;
use sdk_rust::GardenClient;
use serde_json::{json, Value};

mod common;

fn plant_ids(plants: &[Value]) -> Vec<&str> {
    plants
        .iter()
        .map(|p| p["plant_id"].as_str().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_empty_filter_returns_all_plants() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let reply = client.query(&json!({})).await.unwrap();
    assert_eq!(reply.total_matches, 6);
    assert_eq!(reply.count, 6);
    assert_eq!(reply.response_format, "summary");
    assert_eq!(reply.filters_applied, json!({}));
    assert!(reply.debug_signature.starts_with("query-v1:"));
}

#[tokio::test]
async fn test_each_operator() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let cases = [
        (json!({"plants": {"plant_name": {"$eq": "basil"}}}), vec!["2"]),
        (json!({"plants": {"light_requirements": {"$ne": "Full Sun"}}}), vec!["4", "6"]),
        (json!({"plants": {"plant_id": {"$in": ["3", "4"]}}}), vec!["3", "4"]),
        (json!({"plants": {"plant_id": {"$nin": ["1", "2", "3"]}}}), vec!["4", "5", "6"]),
        (json!({"locations": {"total_sun_hours": {"$gt": 7}}}), vec!["3", "5"]),
        (json!({"locations": {"total_sun_hours": {"$gte": 7}}}), vec!["1", "2", "3", "5"]),
        (json!({"locations": {"total_sun_hours": {"$lt": 2}}}), vec!["4"]),
        (json!({"locations": {"total_sun_hours": {"$lte": 2}}}), vec!["2", "4"]),
        (json!({"plants": {"plant_name": {"$regex": "^(ba|ro)"}}}), vec!["2", "3"]),
        (json!({"plants": {"description": {"$exists": false}}}), vec!["5"]),
        (json!({"locations": {"microclimate_conditions": {"$contains": "SHADY"}}}), vec!["4"]),
        (json!({"plants": {"location_ids": {"$contains": "2"}}}), vec!["2"]),
    ];

    for (filters, expected) in cases {
        let reply = client.query(&json!({"filters": filters})).await.unwrap();
        assert_eq!(plant_ids(&reply.plants), expected, "{}", filters);
    }
}

#[tokio::test]
async fn test_multi_table_filters_intersect() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let reply = client
        .query(&json!({
            "filters": {
                "plants": {"watering_needs": "keep moist"},
                "locations": {"location_name": {"$contains": "window"}},
                "containers": {"container_material": "plastic"}
            },
            "response_format": "detailed"
        }))
        .await
        .unwrap();

    assert_eq!(plant_ids(&reply.plants), vec!["2"]);
    let locations = reply.plants[0]["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["location_name"], "Kitchen Window");
    assert_eq!(locations[0]["containers"][0]["container_type"], "Window Box");
    assert_eq!(
        reply.filters_applied["containers"],
        json!({"container_material": {"$eq": "plastic"}})
    );
}

#[tokio::test]
async fn test_response_formats() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);
    let filters = json!({"plants": {"plant_name": "Lavender"}});

    let summary = client
        .query(&json!({"filters": filters, "response_format": "summary"}))
        .await
        .unwrap();
    let plant = &summary.plants[0];
    assert_eq!(plant["plant_name"], "Lavender");
    assert_eq!(plant["locations"][0]["location_name"], "Front Yard");
    assert_eq!(plant["locations"][0]["containers"][0]["material"], "Terracotta");
    assert!(plant.get("watering_needs").is_none());

    let detailed = client
        .query(&json!({"filters": filters, "response_format": "detailed"}))
        .await
        .unwrap();
    assert_eq!(detailed.plants[0]["light_requirements"], "Full Sun");
    assert_eq!(detailed.plants[0]["locations"][0]["morning_sun_hours"], 3.0);

    let minimal = client
        .query(&json!({"filters": filters, "response_format": "minimal"}))
        .await
        .unwrap();
    assert_eq!(
        minimal.plants[0],
        json!({"plant_name": "Lavender", "locations": ["Front Yard"]})
    );

    let ids = client
        .query(&json!({"filters": filters, "response_format": "ids_only"}))
        .await
        .unwrap();
    assert_eq!(ids.plants, vec![json!("5")]);
    assert_eq!(ids.response_format, "ids_only");
}

#[tokio::test]
async fn test_hierarchy_always_names_locations() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let reply = client
        .query(&json!({"response_format": "detailed"}))
        .await
        .unwrap();
    for plant in &reply.plants {
        for location in plant["locations"].as_array().unwrap() {
            assert!(location["location_name"].as_str().is_some_and(|n| !n.is_empty()));
            for container in location["containers"].as_array().unwrap() {
                assert_eq!(container["location_id"], location["location_id"]);
            }
        }
    }
    let mint = reply.plants.iter().find(|p| p["plant_name"] == "Mint").unwrap();
    assert_eq!(mint["locations"], json!([]));
}

#[tokio::test]
async fn test_limit() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let reply = client
        .query(&json!({"limit": 2, "response_format": "ids_only"}))
        .await
        .unwrap();
    assert_eq!(reply.count, 2);
    assert_eq!(reply.total_matches, 6);
    assert_eq!(reply.plants, vec![json!("1"), json!("2")]);
}

#[tokio::test]
async fn test_validation_errors() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let cases = [
        (json!({"filters": {"plants": {"plant_name": {"$like": "b%"}}}}), "invalid_operator"),
        (json!({"filters": {"plants": {"colour": "green"}}}), "invalid_field"),
        (json!({"filters": {"pots": {}}}), "invalid_table"),
        (json!({"response_format": "verbose"}), "invalid_response_format"),
        (json!({"filters": {"plants": {"plant_name": {"$regex": "[a-"}}}}), "invalid_regex"),
        (json!({"limit": 0}), "invalid_limit"),
        (json!({"limit": 5000}), "invalid_limit"),
        (json!({"filters": {"plants": {"plant_id": {"$in": "1"}}}}), "invalid_operand"),
    ];
    for (body, kind) in cases {
        let err = client.query(&body).await.unwrap_err();
        assert_eq!(err.kind(), Some(kind), "{}", body);
        assert_eq!(err.status(), Some(400));
    }
}

#[tokio::test]
async fn test_missing_and_malformed_body() {
    let server = common::start_server().await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/garden/query", server.base_url);

    let res = http.post(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_body");

    let res = http
        .post(&url)
        .header("content-type", "application/json")
        .body("{\"filters\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");
    assert!(has_message(&body));
}

fn has_message(body: &Value) -> bool {
    body["message"].as_str().is_some_and(|m| !m.is_empty())
}
