//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::FixedOffset;
use lobby_core::{
  desk::DeskConfig,
  directory::NewHost,
  store::VisitStore,
  visit::{UNKNOWN_VISITOR, VisitStatus},
};
use lobby_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{api_router, operator::ROLE_HEADER};

async fn make_app(config: DeskConfig) -> (Router, Arc<SqliteStore>) {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  store
    .add_hosts(vec![
      NewHost {
        name: "Marc Soler".into(),
        division: "DG Economy".into(),
        org_unit: "Treasury".into(),
        service: "Accounts".into(),
        ..NewHost::default()
      },
      NewHost {
        name: "Anna Puig".into(),
        division: "DG Economy".into(),
        org_unit: "Budget".into(),
        ..NewHost::default()
      },
    ])
    .await
    .unwrap();
  (api_router(store.clone(), config), store)
}

async fn call(
  app: &Router,
  method: &str,
  uri: &str,
  role: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(role) = role {
    builder = builder.header(ROLE_HEADER, role);
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

fn visit_body(identifier: &str, host: &str) -> Value {
  json!({
    "visitor": {
      "identity": { "identifier": identifier, "name": "Joan Vila", "company": "Acme" },
      "details": { "reason": "Meeting", "card_number": "C-17", "party_size": 1 },
    },
    "host_name": host,
  })
}

const DESK: Option<&str> = Some("receptionist");
const ADMIN: Option<&str> = Some("administrator");

// ── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hosts_and_options_are_listed() {
  let (app, _) = make_app(DeskConfig::default()).await;

  let (status, hosts) = call(&app, "GET", "/hosts", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hosts.as_array().unwrap().len(), 2);
  assert_eq!(hosts[0]["name"], "Marc Soler");

  let (_, options) = call(&app, "GET", "/hosts/options", None, None).await;
  assert_eq!(options["divisions"], json!(["DG Economy"]));
  assert_eq!(options["org_units"], json!(["Treasury", "Budget"]));
  assert_eq!(options["services"], json!(["Accounts"]));
}

#[tokio::test]
async fn only_roster_managers_add_hosts() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let body = json!({ "name": "Laia Roca", "org_unit": "Museums" });

  let (status, err) = call(&app, "POST", "/hosts", DESK, Some(body.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(err["error"].as_str().unwrap().contains("manage the host roster"));

  let (status, host) = call(&app, "POST", "/hosts", ADMIN, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(host["org_unit"], "Museums");

  let (status, _) = call(&app, "POST", "/hosts", ADMIN, Some(json!({ "name": " " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_or_unknown_role_is_bad_request() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let (status, _) = call(&app, "GET", "/visits", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, err) = call(&app, "GET", "/visits", Some("janitor"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "unknown role: janitor");
}

#[tokio::test]
async fn register_and_fetch_visit() {
  let (app, store) = make_app(DeskConfig::default()).await;

  let (status, visit) = call(
    &app,
    "POST",
    "/visits",
    DESK,
    Some(visit_body("12345678Z", "Anna Puig")),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(visit["status"], "active");
  assert_eq!(visit["host"]["org_unit"], "Budget");

  let id: Uuid = serde_json::from_value(visit["visit_id"].clone()).unwrap();
  assert!(store.get(id).await.unwrap().is_some());

  let (status, fetched) = call(&app, "GET", &format!("/visits/{id}"), ADMIN, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, visit);

  let missing = Uuid::new_v4();
  let (status, _) = call(&app, "GET", &format!("/visits/{missing}"), ADMIN, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn host_edits_keep_the_roster_name() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let mut body = visit_body("12345678Z", "Anna Puig");
  body["host"] = json!({
    "host_name": "Somebody Else",
    "division": "DG Economy",
    "org_unit": "Budget",
    "location": "Floor 4, room 2",
  });

  let (status, visit) = call(&app, "POST", "/visits", DESK, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(visit["host"]["host_name"], "Anna Puig");
  assert_eq!(visit["host"]["location"], "Floor 4, room 2");

  let (_, last) = call(&app, "GET", "/visits/last-host", DESK, None).await;
  assert_eq!(last["assignment"]["host_name"], "Anna Puig");
  assert!(last["selected"].is_string());
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
  let (app, store) = make_app(DeskConfig::default()).await;

  let (status, err) = call(
    &app,
    "POST",
    "/visits",
    DESK,
    Some(visit_body("AB", "Anna Puig")),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(err["error"].as_str().unwrap().contains("4 to 20"));

  let (status, err) = call(
    &app,
    "POST",
    "/visits",
    DESK,
    Some(visit_body("12345678Z", "Nobody Here")),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(err["error"], "select a host to visit before registering the visit");

  assert!(store.query(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_registration_stores_sentinel() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let mut body = visit_body("", "Marc Soler");
  body["visitor"]["anonymous"] = json!(true);

  let (status, visit) = call(&app, "POST", "/visits", DESK, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(visit["visitor"]["identifier"], UNKNOWN_VISITOR);
  assert_eq!(visit["visitor"]["name"], UNKNOWN_VISITOR);
}

#[tokio::test]
async fn administrators_cannot_register() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let (status, _) = call(
    &app,
    "POST",
    "/visits",
    ADMIN,
    Some(visit_body("12345678Z", "Marc Soler")),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_visit_must_be_admitted_before_discharge() {
  let (app, _) = make_app(DeskConfig {
    initial_status: VisitStatus::Pending,
    ..DeskConfig::default()
  })
  .await;
  let (_, visit) = call(
    &app,
    "POST",
    "/visits",
    DESK,
    Some(visit_body("12345678Z", "Marc Soler")),
  )
  .await;
  assert_eq!(visit["status"], "pending");
  let id = visit["visit_id"].as_str().unwrap().to_owned();

  let (status, _) = call(
    &app,
    "POST",
    &format!("/visits/{id}/discharge"),
    DESK,
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, admitted) = call(&app, "POST", &format!("/visits/{id}/admit"), DESK, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(admitted["status"], "active");

  let (status, done) = call(
    &app,
    "POST",
    &format!("/visits/{id}/discharge"),
    DESK,
    Some(json!({ "observations": "returned badge" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(done["status"], "completed");
  assert_eq!(done["discharge_observations"], "returned badge");
  assert!(done["ended_at"].is_string());

  let (status, _) = call(
    &app,
    "POST",
    &format!("/visits/{id}/discharge"),
    DESK,
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn discharge_body_is_optional() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let (_, visit) = call(
    &app,
    "POST",
    "/visits",
    DESK,
    Some(visit_body("12345678Z", "Marc Soler")),
  )
  .await;
  let id = visit["visit_id"].as_str().unwrap().to_owned();

  let (status, done) = call(&app, "POST", &format!("/visits/{id}/discharge"), DESK, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(done["status"], "completed");
  assert!(done["discharge_observations"].is_null());
}

#[tokio::test]
async fn discharging_unknown_visit_is_not_found() {
  let (app, _) = make_app(DeskConfig::default()).await;
  let id = Uuid::new_v4();
  let (status, _) = call(
    &app,
    "POST",
    &format!("/visits/{id}/discharge"),
    DESK,
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn active_board_and_last_host() {
  let (app, _) = make_app(DeskConfig::default()).await;

  let (_, last) = call(&app, "GET", "/visits/last-host", DESK, None).await;
  assert!(last.is_null());

  for (id, host) in [("12345678Z", "Marc Soler"), ("87654321Y", "Anna Puig")] {
    let (status, _) = call(&app, "POST", "/visits", DESK, Some(visit_body(id, host))).await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (_, board) = call(&app, "GET", "/visits/active?identifier=8765", DESK, None).await;
  assert_eq!(board.as_array().unwrap().len(), 1);
  let (_, board) = call(&app, "GET", "/visits/active?card=c-17", DESK, None).await;
  assert_eq!(board.as_array().unwrap().len(), 2);

  let (_, last) = call(&app, "GET", "/visits/last-host", DESK, None).await;
  assert_eq!(last["assignment"]["host_name"], "Anna Puig");
  assert!(last["selected"].is_string());
}

#[tokio::test]
async fn visit_days_follow_the_desk_offset() {
  // +14:00 and -12:00 are 26 hours apart, so their calendar days never agree.
  let east = DeskConfig {
    utc_offset: FixedOffset::east_opt(14 * 3600).unwrap(),
    ..DeskConfig::default()
  };
  let west = DeskConfig {
    utc_offset: FixedOffset::west_opt(12 * 3600).unwrap(),
    ..DeskConfig::default()
  };
  let (app, _) = make_app(east).await;
  call(&app, "POST", "/visits", DESK, Some(visit_body("12345678Z", "Marc Soler"))).await;

  let (_, board) = call(&app, "GET", "/visits/active", DESK, None).await;
  assert_eq!(board.as_array().unwrap().len(), 1);

  let (_, hits) = call(&app, "GET", &format!("/visits?date={}", east.today()), ADMIN, None).await;
  assert_eq!(hits.as_array().unwrap().len(), 1);
  let (_, hits) = call(&app, "GET", &format!("/visits?date={}", west.today()), ADMIN, None).await;
  assert!(hits.as_array().unwrap().is_empty());
  let (_, board) = call(
    &app,
    "GET",
    &format!("/visits/active?date={}", west.today()),
    DESK,
    None,
  )
  .await;
  assert!(board.as_array().unwrap().is_empty());
}

// ── Search & reports ────────────────────────────────────────────────────────

#[tokio::test]
async fn search_dedupes_visitors() {
  let (app, _) = make_app(DeskConfig::default()).await;
  for id in ["123-AAAA", "123-AAAA", "456-1234"] {
    call(&app, "POST", "/visits", DESK, Some(visit_body(id, "Marc Soler"))).await;
  }

  let (status, found) = call(
    &app,
    "GET",
    "/visitors/search?mode=identifier&term=123",
    DESK,
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<_> = found
    .as_array()
    .unwrap()
    .iter()
    .map(|v| v["visitor"]["identifier"].as_str().unwrap())
    .collect();
  assert_eq!(ids, ["123-AAAA", "456-1234"]);

  let (status, err) = call(&app, "GET", "/visitors/search?mode=name&term=", DESK, None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(err["error"].as_str().unwrap().starts_with("enter"));
}

#[tokio::test]
async fn history_and_statistics_cover_today() {
  let (app, _) = make_app(DeskConfig::default()).await;
  for id in ["12345678Z", "87654321Y"] {
    call(&app, "POST", "/visits", DESK, Some(visit_body(id, "Marc Soler"))).await;
  }
  let today = chrono::Utc::now().date_naive();

  let (status, history) = call(&app, "GET", &format!("/history?start={today}"), ADMIN, None).await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<_> = history
    .as_array()
    .unwrap()
    .iter()
    .map(|v| v["visitor"]["identifier"].as_str().unwrap())
    .collect();
  assert_eq!(ids.len(), 2);

  let (status, stats) = call(&app, "GET", "/statistics", ADMIN, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["summary"]["total"], 2);
  assert_eq!(stats["summary"]["active"], 2);
  assert_eq!(stats["weekdays"].as_array().unwrap().len(), 5);
  assert_eq!(stats["org_units"][0]["org_unit"], "Treasury");
  assert_eq!(stats["org_units"][0]["percentage"], 100.0);

  let (status, _) = call(&app, "GET", &format!("/statistics?end={today}"), ADMIN, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
