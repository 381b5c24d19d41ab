use sdk_rust::GardenClient;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = GardenClient::new("http://localhost:5000");

    // 1. Simple filter: large containers on the patio
    let sunny = client
        .filter(&[("location", "patio"), ("container_size", "large")])
        .await?;
    println!("{} plant(s) on the patio in large containers", sunny.count);

    // 2. Advanced query across all three tables
    let body = json!({
        "filters": {
            "plants": {"light_requirements": {"$regex": "full"}},
            "locations": {"total_sun_hours": {"$gte": 6}},
            "containers": {"container_material": {"$in": ["ceramic", "terracotta"]}}
        },
        "response_format": "minimal",
        "limit": 10
    });
    let reply = client.query(&body).await?;
    println!("signature {}", reply.debug_signature);
    for plant in &reply.plants {
        println!("{}", plant);
    }

    // 3. Validation errors come back with a machine-readable kind
    if let Err(e) = client.query(&json!({"filters": {"plants": {"plant_name": {"$like": "tom"}}}})).await {
        println!("rejected: {:?} {}", e.kind(), e);
    }

    Ok(())
}
