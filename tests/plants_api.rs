//! CRUD endpoints, error mapping and middleware.

use garden_db::config::GardenConfig;
use reqwest::StatusCode;
use sdk_rust::GardenClient;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_health() {
    let server = common::start_server().await;
    let res = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_and_search_plants() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let all = client.list_plants(None).await.unwrap();
    assert_eq!(all["count"], 6);

    let herbs = client.list_plants(Some("herb")).await.unwrap();
    assert_eq!(herbs["count"], 1);
    assert_eq!(herbs["plants"][0]["plant_name"], "Rosemary");
    assert_eq!(herbs["plants"][0]["location_ids"], json!(["3"]));

    let res = reqwest::get(format!("{}/api/plants?limit=2", server.base_url))
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["total_matches"], 6);
}

#[tokio::test]
async fn test_get_plant_by_id_or_name() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let by_name = client.plant("basil").await.unwrap();
    assert_eq!(by_name["plant_id"], "2");
    let locations: Vec<&str> = by_name["locations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["location_name"].as_str().unwrap())
        .collect();
    assert_eq!(locations, vec!["Patio", "Kitchen Window"]);

    let by_id = client.plant("2").await.unwrap();
    assert_eq!(by_id, by_name);

    let err = client.plant("Giant Sequoia").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.kind(), Some("not_found"));
}

#[tokio::test]
async fn test_create_and_update_plant() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let created = client
        .create_plant(&json!({
            "plant_name": "Thyme",
            "description": "Creeping thyme",
            "location_ids": ["3"],
            "light_requirements": "Full Sun"
        }))
        .await
        .unwrap();
    assert_eq!(created["plant_id"], "7");
    assert!(!created["last_updated"].as_str().unwrap().is_empty());

    let err = client
        .create_plant(&json!({"plant_name": "thyme"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));

    let updated = client
        .update_plant("Thyme", &json!({"watering_needs": "Weekly"}))
        .await
        .unwrap();
    assert_eq!(updated["watering_needs"], "Weekly");
    assert_eq!(updated["description"], "Creeping thyme");

    let reply = client
        .query(&json!({"filters": {"plants": {"plant_name": "thyme"}}}))
        .await
        .unwrap();
    assert_eq!(reply.plants[0]["locations"][0]["location_name"], "Front Yard");
}

#[tokio::test]
async fn test_invalid_plant_input() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);

    let err = client
        .create_plant(&json!({"plant_name": "Sage", "colour": "grey"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("invalid_input"));

    let err = client.create_plant(&json!({"description": "no name"})).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_locations_and_containers() {
    let server = common::start_server().await;
    let client = GardenClient::new(&server.base_url);
    let http = reqwest::Client::new();

    let locations = client.locations().await.unwrap();
    assert_eq!(locations["count"], 4);
    assert_eq!(locations["locations"][0]["total_sun_hours"], 7.0);

    let res = http
        .get(format!("{}/api/locations/3", server.base_url))
        .send()
        .await
        .unwrap();
    let front_yard: Value = res.json().await.unwrap();
    let plants: Vec<&str> = front_yard["containers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["plant_name"].as_str().unwrap())
        .collect();
    assert_eq!(plants, vec!["Rosemary", "Lavender"]);

    let res = http
        .post(format!("{}/api/locations", server.base_url))
        .json(&json!({"location_name": "Greenhouse", "morning_sun_hours": 3, "afternoon_sun_hours": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let greenhouse: Value = res.json().await.unwrap();
    assert_eq!(greenhouse["location_id"], "5");
    assert_eq!(greenhouse["total_sun_hours"], 8.0);

    let res = http
        .post(format!("{}/api/containers", server.base_url))
        .json(&json!({"plant_id": "4", "location_id": "5", "container_type": "Hanging Basket"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = http
        .put(format!("{}/api/containers/7", server.base_url))
        .json(&json!({"container_size": "Large"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let containers = client.containers().await.unwrap();
    assert_eq!(containers["count"], 7);
    assert_eq!(containers["containers"][6]["location_name"], "Greenhouse");
    assert_eq!(containers["containers"][6]["plant_name"], "Fern");
    assert_eq!(containers["containers"][6]["container_size"], "Large");

    let res = http
        .get(format!("{}/api/containers?plant_id=2", server.base_url))
        .send()
        .await
        .unwrap();
    let basil: Value = res.json().await.unwrap();
    assert_eq!(basil["count"], 2);

    let res = http
        .put(format!("{}/api/locations/1", server.base_url))
        .json(&json!({"evening_sun_hours": 30}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = common::start_server().await;
    let res = reqwest::get(format!("{}/api/trees", server.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_bad_query_string_is_json_400() {
    let server = common::start_server().await;
    for path in ["/api/plants?q=basil&q=mint", "/api/containers?plant_id=1&plant_id=2"] {
        let res = reqwest::get(format!("{}{}", server.base_url, path)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "invalid_query", "{}", path);
    }
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = GardenConfig::default();
    config.limits.max_body_bytes = 64;
    let server = common::start_server_with(config, common::fixture_workbook()).await;

    let padding = "x".repeat(256);
    let res = reqwest::Client::new()
        .post(format!("{}/api/garden/query", server.base_url))
        .json(&json!({"filters": {"plants": {"description": {"$contains": padding}}}}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "payload_too_large");
}

#[tokio::test]
async fn test_rate_limit() {
    let mut config = GardenConfig::default();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst_size = 2;
    let server = common::start_server_with(config, common::fixture_workbook()).await;

    let http = reqwest::Client::new();
    let url = format!("{}/health", server.base_url);
    let mut statuses = Vec::new();
    for _ in 0..3 {
        statuses.push(http.get(&url).send().await.unwrap().status());
    }
    assert_eq!(statuses[..2], [StatusCode::OK, StatusCode::OK]);
    assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);

    let res = http.get(&url).send().await.unwrap();
    if res.status() == StatusCode::TOO_MANY_REQUESTS {
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "rate_limited");
    }
}
