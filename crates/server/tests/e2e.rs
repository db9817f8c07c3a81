use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use configs::PlannerConfig;
use server::routes::{self, AppState};

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    let app = routes::build_router(AppState::new(db, PlannerConfig::default()), tower_http::cors::CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });
    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()) })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_time_based_plan_over_http() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let asset: Value = c.post(format!("{}/api/assets", app.base_url))
        .json(&json!({ "name": "Pump", "serial_number": format!("P-{}", Uuid::new_v4()) }))
        .send().await?
        .json().await?;

    let build: Value = c.post(format!("{}/api/builders", app.base_url))
        .json(&json!({ "name": "Weekly check" }))
        .send().await?
        .json().await?;
    let build_id = build["id"].as_str().unwrap_or_default().to_string();
    c.put(format!("{}/api/builders/{build_id}/metadata", app.base_url))
        .json(&json!({ "task_name": "Weekly check" }))
        .send().await?
        .error_for_status()?;
    c.post(format!("{}/api/builders/{build_id}/actions", app.base_url))
        .json(&json!({ "action": { "action_name": "Look and listen" } }))
        .send().await?
        .error_for_status()?;
    let submitted: Value = c.post(format!("{}/api/builders/{build_id}/submit", app.base_url))
        .json(&json!({}))
        .send().await?
        .json().await?;

    let res = c.post(format!("{}/api/plans", app.base_url))
        .json(&json!({
            "name": "Weekly",
            "template_action_set_id": submitted["template_action_set_id"],
            "frequency_type": "days",
            "delta_hours": 168.0
        }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let plan: Value = res.json().await?;
    let plan_id = plan["id"].as_str().unwrap_or_default();

    // a freshly created asset is not due for a week
    let results: Value = c.get(format!("{}/api/plans/{plan_id}/planning", app.base_url)).send().await?.json().await?;
    assert_eq!(results[0]["asset_id"], asset["id"]);
    assert_eq!(results[0]["needs_maintenance"], false);
    assert!(results[0]["due_date"].is_string());

    let next: Value = c.get(format!("{}/api/plans/{plan_id}/next-due?last_date=2024-01-01T00:00:00Z", app.base_url))
        .send().await?
        .json().await?;
    assert_eq!(next["next_due_date"], "2024-01-08T00:00:00Z");
    Ok(())
}
