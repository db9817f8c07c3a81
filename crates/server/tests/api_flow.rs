use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use configs::PlannerConfig;
use server::routes::{self, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect_in_memory().await?;
    Ok(routes::build_router(AppState::new(db, PlannerConfig::default()), cors()))
}

async fn send(app: &mut Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

fn id_of(v: &Value) -> anyhow::Result<String> {
    v["id"].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("no id in {v}"))
}

#[tokio::test]
async fn health_and_openapi() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;
    let (status, body) = send(&mut app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&mut app, "GET", "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/builders/{id}/submit"].is_object());
    Ok(())
}

#[tokio::test]
async fn build_plan_and_schedule() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let planner_id = Uuid::new_v4();
    let (status, asset) = send(&mut app, "POST", "/api/assets", Some(json!({
        "name": "Excavator 7", "serial_number": format!("EX-{}", Uuid::new_v4()), "meters": [150.0, null, null, null],
        "user_id": planner_id
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(asset["created_by_id"], json!(planner_id));
    let asset_id = id_of(&asset)?;

    let (status, proto) = send(&mut app, "POST", "/api/proto-actions", Some(json!({
        "action_name": "Replace filter", "estimated_duration": 0.5, "user_id": planner_id
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(proto["created_by_id"], json!(planner_id));
    let proto_id = id_of(&proto)?;
    let (status, _) = send(&mut app, "POST", &format!("/api/proto-actions/{proto_id}/part-demands"), Some(json!({
        "part_id": Uuid::new_v4(), "quantity_required": 2.0
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, build) = send(&mut app, "POST", "/api/builders", Some(json!({ "name": "Filter service" }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let build_id = id_of(&build)?;
    let (status, _) = send(&mut app, "PUT", &format!("/api/builders/{build_id}/metadata"), Some(json!({
        "task_name": "Filter service", "estimated_duration": "1.5"
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&mut app, "PUT", &format!("/api/builders/{build_id}/metadata"), Some(json!({
        "tsak_name": "Oil"
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("tsak_name")));
    let (status, added) = send(&mut app, "POST", &format!("/api/builders/{build_id}/actions"), Some(json!({
        "proto_action_id": proto_id
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["index"], 0);
    assert_eq!(added["build"]["state"]["actions"][0]["part_demands"].as_array().map(Vec::len), Some(1));
    let (status, _) = send(&mut app, "POST", &format!("/api/builders/{build_id}/actions"), Some(json!({
        "action": { "action_name": "Inspect seals" }
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = send(&mut app, "PUT", &format!("/api/builders/{build_id}/actions/9"), Some(json!({ "notes": "x" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error"], "Index Out Of Range");

    let (status, submitted) = send(&mut app, "POST", &format!("/api/builders/{build_id}/submit"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["build_status"], "Submitted");
    let template_id = submitted["template_action_set_id"].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("no template"))?;

    let (status, again) = send(&mut app, "POST", &format!("/api/builders/{build_id}/submit"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["error"], "Validation Error");

    let (_, summary) = send(&mut app, "GET", &format!("/api/templates/{template_id}/summary"), None).await?;
    assert_eq!(summary["total_action_items"], 2);
    assert_eq!(summary["total_part_demands"], 1);

    let (status, plan) = send(&mut app, "POST", "/api/plans", Some(json!({
        "name": "Every 100h", "template_action_set_id": template_id, "frequency_type": "meter1", "delta_m1": 100.0,
        "user_id": planner_id
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["created_by_id"], json!(planner_id));
    assert_eq!(plan["updated_by_id"], json!(planner_id));
    let plan_id = id_of(&plan)?;

    let (status, due) = send(&mut app, "GET", &format!("/api/plans/{plan_id}/planning?due_only=true"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(due.as_array().map(Vec::len), Some(1));
    assert_eq!(due[0]["asset_id"], asset_id.as_str());

    let (status, run) = send(&mut app, "POST", "/api/planning/run", Some(json!({ "plan_id": plan_id, "create_events": true }))).await?;
    assert_eq!(status, StatusCode::OK);
    let created = run["created_event_ids"].as_array().cloned().unwrap_or_default();
    assert_eq!(created.len(), 1);
    let event_id = created[0].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("bad event id"))?;

    let (_, rerun) = send(&mut app, "POST", "/api/planning/run", Some(json!({ "plan_id": plan_id, "create_events": true }))).await?;
    assert_eq!(rerun["created_event_ids"].as_array().map(Vec::len), Some(0));

    let (_, event) = send(&mut app, "GET", &format!("/api/events/{event_id}"), None).await?;
    assert_eq!(event["status"], "Planned");
    assert_eq!(event["actions"].as_array().map(Vec::len), Some(2));
    let action_id = event["actions"][0]["id"].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("no action"))?;

    let (status, _) = send(&mut app, "POST", &format!("/api/events/{event_id}/start"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, action) = send(&mut app, "PUT", &format!("/api/actions/{action_id}/status"), Some(json!({ "status": "Complete" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(action["status"], "Complete");
    let (status, done) = send(&mut app, "POST", &format!("/api/events/{event_id}/complete"), Some(json!({ "notes": "ok" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "Completed");
    assert_eq!(done["meter1"], 150.0);

    let (status, conflict) = send(&mut app, "DELETE", &format!("/api/templates/{template_id}"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["error"], "Conflict");
    Ok(())
}

#[tokio::test]
async fn error_bodies() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let (status, body) = send(&mut app, "GET", &format!("/api/plans/{}", Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("maintenance plan not found")));

    let (status, body) = send(&mut app, "POST", "/api/plans", Some(json!({
        "name": "Bad", "template_action_set_id": Uuid::new_v4(), "frequency_type": "fortnightly"
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = send(&mut app, "POST", "/api/events", Some(json!({ "asset_id": Uuid::new_v4() }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("template_id or plan_id")));

    let (status, _) = send(&mut app, "DELETE", &format!("/api/builders/{}", Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
