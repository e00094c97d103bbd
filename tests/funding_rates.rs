//! Integration tests for the funding-rate HTTP client against a mock server.

use flowrate::config::MarketDataConfig;
use flowrate::market::FundingRateClient;
use flowrate::Error;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> MarketDataConfig {
    MarketDataConfig {
        base_url: server.uri(),
        markets: vec!["ETH-USD".to_string(), "BTC-USD".to_string()],
        poll_interval_ms: 30_000,
        request_timeout_secs: 5,
    }
}

#[tokio::test]
async fn fetches_and_parses_funding_rates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/funding-rates"))
        .and(query_param("markets", "ETH-USD,BTC-USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "market": "ETH-USD",
                "currentRate": "0.000125",
                "indexPrice": "4412.55",
                "nextFundingTime": 1700000000
            },
            {
                "market": "BTC-USD",
                "currentRate": "-0.00004",
                "indexPrice": "97350.1"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = FundingRateClient::new(&config_for(&server)).unwrap();
    let snapshot = client.get_funding_rates().await.unwrap();

    assert_eq!(snapshot.rates.len(), 2);
    assert_eq!(snapshot.rates[0].market, "ETH-USD");
    assert_eq!(snapshot.rates[0].current_rate, dec!(0.000125));
    assert_eq!(snapshot.rates[0].index_price, dec!(4412.55));
    assert_eq!(snapshot.rates[1].market, "BTC-USD");
    assert_eq!(snapshot.rates[1].current_rate, dec!(-0.00004));
    assert!(snapshot.fetched_at.is_some());
}

#[tokio::test]
async fn non_2xx_status_maps_to_fetch_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/funding-rates"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = FundingRateClient::new(&config_for(&server)).unwrap();
    let result = client.get_funding_rates().await;

    assert!(matches!(result, Err(Error::FetchFailed { .. })));
}

#[tokio::test]
async fn malformed_payload_maps_to_fetch_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/funding-rates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = FundingRateClient::new(&config_for(&server)).unwrap();
    let result = client.get_funding_rates().await;

    assert!(matches!(result, Err(Error::FetchFailed { .. })));
}

#[tokio::test]
async fn connection_refused_maps_to_fetch_failed() {
    // A server that was already shut down.
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let client = FundingRateClient::new(&config).unwrap();
    let result = client.get_funding_rates().await;

    assert!(matches!(result, Err(Error::FetchFailed { .. })));
}
