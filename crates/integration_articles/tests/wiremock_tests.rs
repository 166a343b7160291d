//! Integration tests for the article client using WireMock

use integration_articles::{ArticleClient, ArticleConfig, ArticleError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const PARAGRAPH: &str = "Regulators in three countries opened reviews of the exchange after \
                         a week of record withdrawals and mounting pressure from lawmakers.";

fn article_page() -> String {
    format!(
        "<!doctype html><html><head><title>Markets | Example News</title></head><body>\
         <nav><a href=\"/\">Home</a></nav>\
         <h1>Exchange faces new scrutiny</h1>\
         <article><p>{PARAGRAPH}</p><p>{PARAGRAPH}</p></article>\
         <footer>Subscribe to our newsletter</footer></body></html>"
    )
}

fn test_config() -> ArticleConfig {
    ArticleConfig {
        timeout_ms: 2000,
        ..ArticleConfig::default()
    }
}

#[tokio::test]
async fn fetch_article_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/markets/exchange"))
        .and(header("user-agent", ArticleConfig::default().user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(article_page()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ArticleClient::new(test_config()).unwrap();
    let url = format!("{}/markets/exchange", mock_server.uri());
    let article = client.fetch(&url).await.unwrap();

    assert_eq!(article.url, url);
    assert_eq!(article.title, "Exchange faces new scrutiny");
    assert_eq!(article.domain, "127.0.0.1");
    assert!(article.content.starts_with("Regulators in three countries"));
    assert!(!article.content.contains("Subscribe"));
    assert_eq!(article.word_count, article.content.split_whitespace().count());
}

#[tokio::test]
async fn not_found_is_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = ArticleClient::new(test_config()).unwrap();
    let err = client
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn binary_content_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let client = ArticleClient::new(test_config()).unwrap();
    let err = client
        .fetch(&format!("{}/report.pdf", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::UnsupportedContent(ct) if ct == "application/pdf"));
}

#[tokio::test]
async fn page_without_text_is_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><script>app()</script></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let client = ArticleClient::new(test_config()).unwrap();
    let err = client
        .fetch(&format!("{}/spa", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::NoContent(_)));
}

#[tokio::test]
async fn slow_site_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page())
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = ArticleConfig {
        timeout_ms: 100,
        ..ArticleConfig::default()
    };
    let client = ArticleClient::new(config).unwrap();
    let err = client
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::Timeout { timeout_ms: 100 }));
}
