// Tests for HttpSheetFetcher against a mocked published sheet
// Uses mockito for HTTP mocking

use league_stats_service::bowlers;
use league_stats_service::fetch_error::FetchError;
use league_stats_service::fetcher::{HttpSheetFetcher, SheetFetcher};
use mockito::Server;

const BOWLERS_CSV: &str = "\
League,Bowler,Gender,Active,Total Games,Total Score,Average,Hdcp\r
pinfinity,\"Lee, Mary\",F,YES,12,2280,190,4\r
pinfinity,Carol,F,YES,10,2000,200,0\r
";

#[tokio::test]
async fn test_fetch_text_success() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::UrlEncoded("output".into(), "csv".into()))
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(BOWLERS_CSV)
        .create_async()
        .await;

    let fetcher = HttpSheetFetcher::new();
    let text = fetcher
        .fetch_text(&format!("{}/pub?gid=1&output=csv", server.url()))
        .await
        .unwrap();

    assert_eq!(text, BOWLERS_CSV);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_rows_handles_quoted_names() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/bowlers.csv")
        .with_status(200)
        .with_body(BOWLERS_CSV)
        .create_async()
        .await;

    let fetcher = HttpSheetFetcher::new();
    let rows = fetcher
        .fetch_rows(&format!("{}/bowlers.csv", server.url()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Bowler"), Some("Lee, Mary"));
    assert_eq!(rows[0].get("Hdcp"), Some("4"));

    let ranked = bowlers::rank(&rows, "pinfinity");
    assert_eq!(ranked[0].plain_name(), "Carol");
    assert_eq!(ranked[1].plain_name(), "Lee, Mary");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_text_not_found() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/missing.csv")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = HttpSheetFetcher::new();
    let result = fetcher
        .fetch_text(&format!("{}/missing.csv", server.url()))
        .await;

    match result {
        Err(FetchError::Status { url, status }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing.csv"));
        }
        other => panic!("Expected Status error, got {other:?}"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_text_server_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/bowlers.csv")
        .with_status(500)
        .create_async()
        .await;

    let fetcher = HttpSheetFetcher::new();
    let result = fetcher
        .fetch_rows(&format!("{}/bowlers.csv", server.url()))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_text_connection_refused() {
    let fetcher = HttpSheetFetcher::new();
    let result = fetcher.fetch_text("http://127.0.0.1:1/bowlers.csv").await;

    assert!(matches!(result, Err(FetchError::Request(_))));
}

#[tokio::test]
async fn test_fetcher_uses_supplied_client() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/bowlers.csv")
        .match_header("user-agent", "league-report")
        .with_status(200)
        .with_body(BOWLERS_CSV)
        .create_async()
        .await;

    let client = reqwest::Client::builder()
        .user_agent("league-report")
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap();
    let fetcher = HttpSheetFetcher::with_client(client);
    let rows = fetcher
        .fetch_rows(&format!("{}/bowlers.csv", server.url()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    mock.assert_async().await;
}
