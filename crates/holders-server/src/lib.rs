//! HTTP API for the shareholder ledger.
//!
//! Write endpoints commit organizations, persons, and shares to the
//! canonical store; query endpoints read the replicated organization
//! documents.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{AppConfig, BrokerConfig, ReadStoreConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::HoldersServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        HoldersServer::new(AppConfig::default()).router()
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body)).await
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None).await
    }

    /// Organizations 10 and 20 plus one person; returns the person id.
    async fn seed(app: &Router) -> i64 {
        let (status, _) = post(
            app,
            "/api/organization/",
            json!({"orgnr": 10, "name": "my company", "postal_code": "S3000W", "country": "Norway"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        post(
            app,
            "/api/organization/",
            json!({"orgnr": 20, "name": "Holding AS", "postal_code": "0150", "country": "Sweden"}),
        )
        .await;
        let (status, person) = post(
            app,
            "/api/person/",
            json!({"name": "Agustin", "postal_code": "S2300", "country": "Norway", "birth_date": "1990-01-05"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        person["id"].as_i64().unwrap()
    }

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(&app(), "/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_share_returns_the_record() {
        let app = app();
        let person = seed(&app).await;
        let (status, share) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(share["id"], 1);
        assert_eq!(share["person_owner"], person);
        assert_eq!(share["organization_owner"], Value::Null);
        assert_eq!(share["share_class"], "A-aksjer");
    }

    #[tokio::test]
    async fn share_with_two_owners_is_rejected() {
        let app = app();
        let person = seed(&app).await;
        let (status, body) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owner": 20, "organization_owned": 10, "share_class": "A-aksjer"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_requests() {
        let app = app();
        seed(&app).await;
        let (status, _) = post(&app, "/api/share/", json!({"organization_owned": "ten"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post(
            &app,
            "/api/share/",
            json!({"organization_owner": 20, "organization_owned": 10, "share_class": "C-aksje"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_overflowing_the_total_is_rejected() {
        let app = app();
        let person = seed(&app).await;
        let (status, _) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": i64::MAX}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let small = json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": 1});
        let (status, body) = post(&app, "/api/share/", small.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");

        // Other organizations keep replicating.
        let elsewhere = json!({"person_owner": person, "organization_owned": 20, "share_class": "A-aksjer", "amount": 1});
        let (status, _) = post(&app, "/api/share/", elsewhere).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, owners) = get(&app, "/api/10/owners").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(owners["persons_owner"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_organization_is_rejected() {
        let app = app();
        seed(&app).await;
        let (status, _) = post(
            &app,
            "/api/organization/",
            json!({"orgnr": 10, "name": "again", "postal_code": "", "country": "Norway"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_for_unknown_organization_is_not_found() {
        let app = app();
        let person = seed(&app).await;
        let (status, _) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 99, "share_class": "A-aksjer", "amount": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn owners_summary_and_holding_follow_writes() {
        let app = app();
        let person = seed(&app).await;
        post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": 10}),
        )
        .await;
        post(
            &app,
            "/api/share/",
            json!({"organization_owner": 20, "organization_owned": 10, "share_class": "B-aksje", "amount": 10}),
        )
        .await;

        let (status, owners) = get(&app, "/api/10/owners").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(owners["persons_owner"][0]["percentage"], 100.0);
        assert_eq!(owners["persons_owner"][0]["_id"], person);
        assert_eq!(owners["organizations_owner"][0]["_id"], 20);
        assert_eq!(owners["organizations_owner"][0]["percentage"], 50.0);

        let (status, summary) = get(&app, "/api/10/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            summary,
            json!({
                "number_of_owners": 2,
                "number_of_holdings": 0,
                "has_foreign_owners": true,
                "has_multiple_share_class": true,
            })
        );

        let (status, holding) = get(&app, "/api/20/holding").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(holding.as_array().unwrap().len(), 1);
        assert_eq!(holding[0]["_id"], 10);
        assert_eq!(holding[0]["total_shares"], 20);
    }

    #[tokio::test]
    async fn unknown_documents_are_not_found() {
        let app = app();
        seed(&app).await;
        for uri in ["/api/10/owners", "/api/10/summary", "/api/10/holding", "/api/77/owners"] {
            let (status, _) = get(&app, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn non_numeric_orgnr_is_a_bad_request() {
        let (status, _) = get(&app(), "/api/acme/owners").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn started_consumer_receives_the_first_write() {
        let mut config = AppConfig::default();
        config.replication.synchronous = false;
        let server = HoldersServer::new(config);
        let _consumer = server.start_consumer().await.unwrap();
        let app = server.router();
        let person = seed(&app).await;

        let (status, _) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let owners = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                let (status, owners) = get(&app, "/api/10/owners").await;
                if status == StatusCode::OK {
                    return owners;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("share replicated");
        assert_eq!(owners["persons_owner"][0]["percentage"], 100.0);
    }

    #[tokio::test]
    async fn asynchronous_mode_accepts_writes_before_replication() {
        let mut config = AppConfig::default();
        config.replication.synchronous = false;
        let server = HoldersServer::new(config);
        let app = server.router();
        let person = seed(&app).await;

        // No consumer is running, so the event is dropped and nothing is replicated.
        let (status, _) = post(
            &app,
            "/api/share/",
            json!({"person_owner": person, "organization_owned": 10, "share_class": "A-aksjer", "amount": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = get(&app, "/api/10/owners").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
