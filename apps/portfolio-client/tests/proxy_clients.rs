//! Proxy Client Integration Tests
//!
//! Exercises the HTTP price feed, the poller over it, and the advisor client
//! against a mocked market proxy.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portfolio_client::{
    AdviceError, AdvisorClient, CycleOutcome, Extraction, FeedError, HttpPriceFeed, PollerConfig,
    PriceFeed, PricePoller,
};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn mount_market(server: &MockServer, symbol: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/market"))
        .and(query_param("symbol", symbol))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn feed_reads_quote_fields() {
    let server = MockServer::start().await;
    mount_market(
        &server,
        "AAPL",
        ResponseTemplate::new(200).set_body_json(json!({"c": 190.5, "d": 1.2, "dp": 0.63, "pc": 189.3, "cached": true})),
    )
    .await;

    let feed = HttpPriceFeed::new(server.uri(), TIMEOUT).unwrap();
    let quote = feed.latest_price("AAPL").await.unwrap();

    assert_eq!(quote.price, 190.5);
    assert_eq!(quote.change_percent, Some(0.63));
    assert_eq!(quote.previous_close, Some(189.3));
    assert!(quote.cached);
}

#[test_case(ResponseTemplate::new(429).set_body_json(json!({"error": "x", "symbol": "AAPL", "c": 0, "limited": true})), FeedError::Limited ; "throttled")]
#[test_case(ResponseTemplate::new(200).set_body_json(json!({"c": 0, "limited": true})), FeedError::Limited ; "limited flag")]
#[test_case(ResponseTemplate::new(200).set_body_json(json!({"c": 0})), FeedError::NoPrice ; "zero price")]
#[test_case(ResponseTemplate::new(200).set_body_json(json!({})), FeedError::NoPrice ; "empty body")]
#[test_case(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})), FeedError::Status(500) ; "server error")]
#[tokio::test]
async fn feed_failures(response: ResponseTemplate, expected: FeedError) {
    let server = MockServer::start().await;
    mount_market(&server, "AAPL", response).await;

    let feed = HttpPriceFeed::new(server.uri(), TIMEOUT).unwrap();
    assert_eq!(feed.latest_price("AAPL").await.unwrap_err(), expected);
}

#[tokio::test]
async fn poller_isolates_failures_over_http() {
    let server = MockServer::start().await;
    mount_market(&server, "AAPL", ResponseTemplate::new(200).set_body_json(json!({"c": 190.0}))).await;
    mount_market(&server, "MSFT", ResponseTemplate::new(429).set_body_json(json!({"limited": true}))).await;
    mount_market(&server, "TSLA", ResponseTemplate::new(200).set_body_json(json!({"c": 250.0}))).await;

    let feed = Arc::new(HttpPriceFeed::new(server.uri(), TIMEOUT).unwrap());
    let poller = PricePoller::new(feed, PollerConfig::default());
    poller.observe(["tsla", "aapl", "msft"]);

    let outcome = poller.poll_at(NaiveTime::from_hms_opt(12, 0, 0).unwrap()).await;

    assert_eq!(
        outcome,
        CycleOutcome::Completed {
            requested: 3,
            updated: 2,
            failed: 1
        }
    );
    let prices = poller.prices();
    assert_eq!(prices["AAPL"].price, 190.0);
    assert_eq!(prices["TSLA"].price, 250.0);
    assert!(!prices.contains_key("MSFT"));
}

#[tokio::test]
async fn advisor_extracts_structured_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai"))
        .and(body_json(json!({"prompt": "Analyse"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": "Résumé.\n```json\n{\"score\": 8, \"risque\": \"modéré\"}\n```"
        })))
        .mount(&server)
        .await;

    let advisor = AdvisorClient::new(server.uri(), TIMEOUT).unwrap();
    let advice = advisor.analyze("Analyse").await.unwrap();

    assert!(advice.text.starts_with("Résumé."));
    assert_eq!(
        advice.structured,
        Extraction::Found(json!({"score": 8, "risque": "modéré"}))
    );
}

#[tokio::test]
async fn advisor_plain_text_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"analysis": "Tout va bien."})))
        .mount(&server)
        .await;

    let advisor = AdvisorClient::new(server.uri(), TIMEOUT).unwrap();
    let advice = advisor.analyze("Analyse").await.unwrap();

    assert_eq!(advice.structured, Extraction::NotFound);
}

#[tokio::test]
async fn advisor_surfaces_proxy_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Échec de l'analyse IA",
            "message": "Service Unavailable"
        })))
        .mount(&server)
        .await;

    let advisor = AdvisorClient::new(server.uri(), TIMEOUT).unwrap();
    let err = advisor.analyze("Analyse").await.unwrap_err();

    assert_eq!(
        err,
        AdviceError::Rejected {
            status: 500,
            error: "Échec de l'analyse IA".into(),
            message: Some("Service Unavailable".into()),
        }
    );
}
