use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{Instrument, Span};

use crate::collectors::{PageClient, VacancySource, filter_valid};
use crate::error::AppError;
use crate::models::vacancy::RawVacancy;

const USER_AGENT: &str = "HH-User-Agent";
const PER_PAGE: u32 = 100;
/// Pages 0..PAGE_LIMIT are always requested, full or not.
pub const PAGE_LIMIT: u32 = 20;

/// Employers whose vacancies are loaded.
pub const EMPLOYER_IDS: [&str; 10] = [
    "1942330", "49357", "3036416", "78638", "2748", "2848663", "2180", "1942336", "3529",
    "816144",
];

#[derive(Debug, Deserialize)]
struct ListingPage {
    #[serde(default)]
    items: Vec<Value>,
}

/// Convert each listing item on its own; an item that doesn't fit the
/// vacancy shape is logged and dropped without affecting its neighbours.
fn parse_items(page: u32, items: Vec<Value>) -> Vec<RawVacancy> {
    let total = items.len();
    let parsed: Vec<RawVacancy> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = item.get("id").cloned();
            match serde_json::from_value::<RawVacancy>(item) {
                Ok(vacancy) => Some(vacancy),
                Err(e) => {
                    tracing::warn!("Skipping malformed item {index} (id {id:?}) on page {page}: {e}");
                    None
                }
            }
        })
        .collect();
    if parsed.len() < total {
        tracing::warn!(
            "Page {page}: {} of {total} items skipped as malformed",
            total - parsed.len()
        );
    }
    parsed
}

/// Page client for the HeadHunter `/vacancies` endpoint.
pub struct HttpPageClient {
    http: reqwest::Client,
    url: String,
}

impl HttpPageClient {
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

/// Query string for one page: page, per_page and a repeated employer_id.
fn page_query(page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", page.to_string()),
        ("per_page", PER_PAGE.to_string()),
    ];
    query.extend(EMPLOYER_IDS.iter().map(|id| ("employer_id", (*id).to_string())));
    query
}

#[async_trait]
impl PageClient for HttpPageClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawVacancy>, AppError> {
        let resp = self.http.get(&self.url).query(&page_query(page)).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            tracing::error!("Listing API request for page {page} failed with {status}");
            return Err(AppError::Transport { status });
        }

        let body = resp.bytes().await?;
        let listing: ListingPage =
            serde_json::from_slice(&body).map_err(|source| AppError::Decode { page, source })?;
        Ok(parse_items(page, listing.items))
    }
}

/// Loads vacancies for the fixed employer set, page by page.
pub struct HeadHunter<C = HttpPageClient> {
    client: C,
    span: Span,
}

impl HeadHunter<HttpPageClient> {
    pub fn new(url: impl Into<String>, span: Span) -> Result<Self, AppError> {
        Ok(Self::with_client(HttpPageClient::new(url)?, span))
    }
}

impl<C: PageClient> HeadHunter<C> {
    pub fn with_client(client: C, span: Span) -> Self {
        Self { client, span }
    }
}

#[async_trait]
impl<C: PageClient> VacancySource for HeadHunter<C> {
    fn name(&self) -> &str {
        "headhunter"
    }

    async fn fetch(&self) -> Result<Vec<RawVacancy>, AppError> {
        async {
            tracing::info!("Loading vacancies for {} employers", EMPLOYER_IDS.len());

            let mut collected = Vec::new();
            for page in 0..PAGE_LIMIT {
                let items = self.client.fetch_page(page).await?;
                tracing::info!("Got {} vacancies from page {page}", items.len());
                collected.extend(items);
            }

            let fetched = collected.len();
            let valid = filter_valid(collected);
            tracing::info!(
                "Loaded {fetched} vacancies, {} kept after dropping {} without salary or address",
                valid.len(),
                fetched - valid.len()
            );
            Ok::<_, AppError>(valid)
        }
        .instrument(self.span.clone())
        .await
    }
}
