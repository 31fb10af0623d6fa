//! Smoke test a running BCW server
//!
//! ```bash
//! cargo run -p bcw-server --example smoke_client
//! BCW_URL=http://staging:5000 BCW_API_KEY=secret cargo run -p bcw-server --example smoke_client
//! ```

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const DEFAULT_URL: &str = "http://localhost:5000";

/// First sample of the UCI file (malignant).
const SAMPLE: [f64; 30] = [
    17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871, 1.095, 0.9053,
    8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193, 25.38, 17.33, 184.6,
    2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = std::env::var("BCW_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let api_key = std::env::var("BCW_API_KEY").ok();
    let client = Client::new();

    println!("1. Root endpoint:");
    let resp = client.get(format!("{base}/")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    let predict = |body: Value| {
        let mut request = client.post(format!("{base}/predict")).json(&body);
        if let Some(key) = &api_key {
            request = request.header("X-API-Key", key);
        }
        request.send()
    };

    println!("2. Valid prediction:");
    let resp = predict(json!({ "features": SAMPLE })).await?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("Status: {status}");
    println!("Body: {body}");
    anyhow::ensure!(status == StatusCode::OK, "prediction failed with {status}");
    println!();

    println!("3. Malformed requests:");
    let malformed = [
        json!({ "dato": [1, 2, 3] }),
        json!({ "features": "dato_incorrecto" }),
        json!({ "features": [1.0, 2.0, 3.0] }),
        json!({}),
    ];
    for body in malformed {
        let resp = predict(body.clone()).await?;
        let status = resp.status();
        println!("{body} -> {status}: {}", resp.text().await?);
        anyhow::ensure!(
            status == StatusCode::BAD_REQUEST,
            "expected 400 for {body}, got {status}"
        );
    }

    println!();
    println!("All checks passed against {base}");
    Ok(())
}
