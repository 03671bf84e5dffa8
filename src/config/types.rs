use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Placeholder in `base-url-template` that is replaced with the page number
pub const PAGE_PLACEHOLDER: &str = "{}";

/// Main configuration structure for Listing-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Index page address with one `{}` placeholder for the page number
    #[serde(rename = "base-url-template")]
    pub base_url_template: String,

    /// Origin that relative detail links are resolved against
    ///
    /// Defaults to the scheme and host of `base_url_template`.
    #[serde(rename = "site-origin", default)]
    pub site_origin: Option<String>,

    /// Path prefix that identifies a detail page link
    #[serde(rename = "detail-path-prefix", default = "default_detail_path_prefix")]
    pub detail_path_prefix: String,

    /// Delay before each index page fetch (milliseconds)
    #[serde(rename = "inter-request-delay", default)]
    pub inter_request_delay: u64,

    /// Highest page number the site serves
    #[serde(rename = "max-index-pages")]
    pub max_index_pages: u32,

    /// Number of distinct index pages to sample
    #[serde(rename = "pages-to-sample")]
    pub pages_to_sample: u32,

    /// Seed for the page sample
    #[serde(rename = "random-seed")]
    pub random_seed: u64,

    /// Maximum simultaneous detail page workers per index page
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Extra attempts for transient fetch failures
    #[serde(rename = "fetch-retries", default)]
    pub fetch_retries: u32,

    /// Pause between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// First `home_id` handed out in this run
    #[serde(rename = "first-home-id", default)]
    pub first_home_id: u64,

    /// Wall-clock budget for the run (seconds), 0 disables the deadline
    #[serde(rename = "max-run-duration", default)]
    pub max_run_duration: u64,
}

fn default_detail_path_prefix() -> String {
    "/Property/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    1000
}

impl CrawlerConfig {
    /// Builds the address of one index page
    pub fn index_page_url(&self, page: u32) -> String {
        self.base_url_template
            .replacen(PAGE_PLACEHOLDER, &page.to_string(), 1)
    }

    /// Returns the origin detail links are resolved against
    pub fn resolved_origin(&self) -> Result<Url, url::ParseError> {
        match &self.site_origin {
            Some(origin) => Url::parse(origin),
            None => {
                let sample = Url::parse(&self.index_page_url(1))?;
                sample.join("/")
            }
        }
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    /// Returns the run deadline, if one is configured
    pub fn max_run_duration(&self) -> Option<Duration> {
        (self.max_run_duration > 0).then(|| Duration::from_secs(self.max_run_duration))
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON array of records
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: String,

    /// Path of the CSV table of records
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,
}

fn default_json_path() -> String {
    "properties.json".to_string()
}

fn default_csv_path() -> String {
    "properties.csv".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            csv_path: default_csv_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config(template: &str) -> CrawlerConfig {
        CrawlerConfig {
            base_url_template: template.to_string(),
            site_origin: None,
            detail_path_prefix: default_detail_path_prefix(),
            inter_request_delay: 0,
            max_index_pages: 10,
            pages_to_sample: 3,
            random_seed: 41,
            concurrency_limit: 4,
            request_timeout: default_request_timeout(),
            fetch_retries: 0,
            retry_delay: default_retry_delay(),
            first_home_id: 0,
            max_run_duration: 0,
        }
    }

    #[test]
    fn test_index_page_url() {
        let config = crawler_config("https://www.zameen.com/Homes/Lahore-1-{}.html");
        assert_eq!(
            config.index_page_url(17),
            "https://www.zameen.com/Homes/Lahore-1-17.html"
        );
    }

    #[test]
    fn test_origin_derived_from_template() {
        let config = crawler_config("https://www.zameen.com/Homes/Lahore-1-{}.html");
        let origin = config.resolved_origin().unwrap();
        assert_eq!(origin.as_str(), "https://www.zameen.com/");
    }

    #[test]
    fn test_explicit_origin_wins() {
        let mut config = crawler_config("https://www.zameen.com/Homes/Lahore-1-{}.html");
        config.site_origin = Some("https://mirror.example.com".to_string());
        let origin = config.resolved_origin().unwrap();
        assert_eq!(origin.host_str(), Some("mirror.example.com"));
    }

    #[test]
    fn test_zero_run_duration_means_no_deadline() {
        let mut config = crawler_config("https://example.com/{}");
        assert!(config.max_run_duration().is_none());

        config.max_run_duration = 60;
        assert_eq!(config.max_run_duration(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "Harvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        assert_eq!(
            ua.header_value(),
            "Harvester/1.0 (+https://example.com/about; admin@example.com)"
        );
    }
}
