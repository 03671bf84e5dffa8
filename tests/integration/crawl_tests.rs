//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full sample-fetch-extract-write cycle end-to-end.

use listing_harvester::config::{
    load_config, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
};
use listing_harvester::crawler::{run_crawl, Coordinator};
use listing_harvester::output::{read_csv, read_json_file, FailureKind, FailureStage};
use listing_harvester::record::{FieldValue, FIELD_NAMES};
use listing_harvester::RunPhase;
use std::collections::HashSet;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FULL_DETAIL: &str = r#"<html><head>
    <script>
        window['dataLayer'] = window['dataLayer'] || [];
        window['dataLayer'].push({"latitude": 31.5204, "longitude": 74.3587});
    </script>
    </head><body>
    <div aria-label="Property header">Gulberg III, Lahore</div>
    <span aria-label="Price">PKR 3.2 Crore</span>
    <span aria-label="Type">House</span>
    <span aria-label="Location">Gulberg, Lahore, Punjab</span>
    <span aria-label="Baths">4</span>
    <span aria-label="Area">10 Marla</span>
    <span aria-label="Purpose">For Sale</span>
    <span aria-label="Beds">5</span>
    <span aria-label="Creation date">2 days ago</span>
    <div aria-label="Property description">Corner house near main boulevard.</div>
    </body></html>"#;

const SPARSE_DETAIL: &str = r#"<html><body>
    <span aria-label="Price">PKR 45 Lakh</span>
    <span aria-label="Type">Flat</span>
    </body></html>"#;

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, max_pages: u32, sample: u32, dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url_template: format!("{}/Homes/Lahore-1-{{}}.html", server.uri()),
            site_origin: None,
            detail_path_prefix: "/Property/".to_string(),
            inter_request_delay: 0,
            max_index_pages: max_pages,
            pages_to_sample: sample,
            random_seed: 41,
            concurrency_limit: 2,
            request_timeout: 5,
            fetch_retries: 0,
            retry_delay: 10,
            first_home_id: 0,
            max_run_duration: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            json_path: dir.join("properties.json").display().to_string(),
            csv_path: dir.join("properties.csv").display().to_string(),
        },
    }
}

fn index_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">listing</a></li>"#, href))
        .collect();
    format!(
        r#"<html><body><a href="/about">About</a><ul>{}</ul></body></html>"#,
        anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_index_page() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/Homes/Lahore-1-1.html",
        &index_page(&[
            "/Property/full.html".to_string(),
            "/Property/sparse.html".to_string(),
            format!("{}/Property/broken.html", server.uri()),
            "/Property/full.html#gallery".to_string(),
        ]),
    )
    .await;
    mount_page(&server, "/Property/full.html", FULL_DETAIL).await;
    mount_page(&server, "/Property/sparse.html", SPARSE_DETAIL).await;
    Mock::given(method("GET"))
        .and(path("/Property/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server, 1, 1, dir.path());
    let report = run_crawl(config).await.expect("Crawl should not fail");

    assert_eq!(report.records.len(), 2);
    let ids: HashSet<u64> = report.records.iter().map(|r| r.home_id).collect();
    assert_eq!(ids, HashSet::from([0, 1]));

    let full = report
        .records
        .iter()
        .find(|r| r.property_type.as_str() == "House")
        .expect("full listing extracted");
    assert_eq!(full.price.as_str(), "PKR 3.2 Crore");
    assert_eq!(full.location_precise.as_str(), "Gulberg III, Lahore");
    assert_eq!(full.latitude, Some(31.5204));
    assert_eq!(full.longitude, Some(74.3587));

    let sparse = report
        .records
        .iter()
        .find(|r| r.property_type.as_str() == "Flat")
        .expect("sparse listing extracted");
    assert_eq!(sparse.beds, FieldValue::Unavailable);
    assert_eq!(sparse.latitude, None);

    assert_eq!(report.stats.detail_pages_failed(), 1);
    let failure = &report.stats.failures[0];
    assert_eq!(failure.stage, FailureStage::DetailPage);
    assert_eq!(failure.kind, FailureKind::HttpStatus);
    assert!(failure.url.ends_with("/Property/broken.html"));

    // Both files hold the same records in home_id order
    assert_eq!(report.written.len(), 2);
    let from_json = read_json_file(&report.written[0]).unwrap();
    assert_eq!(from_json, report.records);
    let from_csv = read_csv(std::fs::File::open(&report.written[1]).unwrap()).unwrap();
    assert_eq!(from_csv, report.records);
}

#[tokio::test]
async fn test_zero_sampled_pages_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let config = create_test_config(&server, 10, 0, dir.path());
    let report = run_crawl(config).await.expect("Empty crawl should succeed");

    assert!(report.records.is_empty());
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());

    let json = std::fs::read_to_string(dir.path().join("properties.json")).unwrap();
    assert_eq!(json.trim(), "[]");
    let csv = std::fs::read_to_string(dir.path().join("properties.csv")).unwrap();
    assert_eq!(csv.trim_end(), FIELD_NAMES.join(","));
}

#[tokio::test]
async fn test_unreachable_index_pages_still_write_outputs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&server, 5, 3, dir.path());
    let report = run_crawl(config).await.expect("Crawl should not fail");

    assert!(report.records.is_empty());
    assert_eq!(report.stats.index_pages_failed(), 3);
    assert!(report
        .stats
        .failures
        .iter()
        .all(|f| f.stage == FailureStage::IndexPage));
    assert!(dir.path().join("properties.csv").exists());
}

#[tokio::test]
async fn test_shared_links_fetched_once_across_pages() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let shared: Vec<String> = (0..5).map(|n| format!("/Property/shared-{}.html", n)).collect();
    for page in 1..=3 {
        let mut links = shared.clone();
        links.push(format!("/Property/only-{}.html", page));
        mount_page(
            &server,
            &format!("/Homes/Lahore-1-{}.html", page),
            &index_page(&links),
        )
        .await;
    }

    // Every detail page must be requested exactly once
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/Property/.*\.html$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPARSE_DETAIL))
        .expect(8)
        .mount(&server)
        .await;

    let config = create_test_config(&server, 3, 3, dir.path());
    let report = run_crawl(config).await.expect("Crawl should not fail");

    let ids: Vec<u64> = report.records.iter().map(|r| r.home_id).collect();
    assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    assert_eq!(report.stats.duplicates_skipped, 10);
    assert_eq!(report.stats.links_discovered, 18);

    server.verify().await;
}

#[tokio::test]
async fn test_transient_detail_failure_is_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/Homes/Lahore-1-1.html",
        &index_page(&["/Property/flaky.html".to_string()]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/Property/flaky.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/Property/flaky.html", FULL_DETAIL).await;

    let mut config = create_test_config(&server, 1, 1, dir.path());
    config.crawler.fetch_retries = 2;

    let report = run_crawl(config).await.expect("Crawl should not fail");
    assert_eq!(report.records.len(), 1);
    assert!(report.stats.failures.is_empty());
}

#[tokio::test]
async fn test_first_home_id_offset() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/Homes/Lahore-1-1.html",
        &index_page(&[
            "/Property/a.html".to_string(),
            "/Property/b.html".to_string(),
        ]),
    )
    .await;
    mount_page(&server, "/Property/a.html", SPARSE_DETAIL).await;
    mount_page(&server, "/Property/b.html", SPARSE_DETAIL).await;

    let mut config = create_test_config(&server, 1, 1, dir.path());
    config.crawler.first_home_id = 100;

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    let ids: Vec<u64> = report.records.iter().map(|r| r.home_id).collect();
    assert_eq!(ids, vec![100, 101]);
    assert_eq!(coordinator.phase(), RunPhase::Aggregated);
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/Homes/Lahore-1-1.html",
        &index_page(&["/Property/a.html".to_string()]),
    )
    .await;
    mount_page(&server, "/Property/a.html", FULL_DETAIL).await;

    let config_text = format!(
        r#"
[crawler]
base-url-template = "{uri}/Homes/Lahore-1-{{}}.html"
max-index-pages = 1
pages-to-sample = 1
random-seed = 41
concurrency-limit = 4

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
json-path = "{json}"
csv-path = "{csv}"
"#,
        uri = server.uri(),
        json = dir.path().join("out.json").display(),
        csv = dir.path().join("out.csv").display(),
    );
    let config_path = dir.path().join("harvest.toml");
    std::fs::write(&config_path, config_text).unwrap();

    let config = load_config(&config_path).expect("Config should load");
    let report = run_crawl(config).await.expect("Crawl should not fail");

    assert_eq!(report.records.len(), 1);
    assert!(dir.path().join("out.json").exists());
    assert!(dir.path().join("out.csv").exists());
}
