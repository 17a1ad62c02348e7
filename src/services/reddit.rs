use crate::constants::LISTING_PAGE_SIZE;
use crate::error::{AppError, Result};
use crate::models::{ScanConfig, TextItem};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Client for the forum listing API
///
/// With app credentials it uses an app-only OAuth token against
/// `oauth.reddit.com`; without, it reads the public `.json` listings.
pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Items collected before the feed ended or failed
#[derive(Debug, Default)]
pub struct FeedBatch {
    pub items: Vec<TextItem>,
    pub error: Option<AppError>,
}

impl FeedBatch {
    /// Items as a fallible stream: every item, then the error that ended collection
    pub fn into_results(self) -> impl Iterator<Item = Result<TextItem>> {
        self.items
            .into_iter()
            .map(Ok)
            .chain(self.error.map(Err))
    }
}

impl RedditClient {
    /// Build a client, fetching an OAuth token when credentials are configured
    pub async fn connect(config: &ScanConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => {
                let token = fetch_token(&client, id, secret).await?;
                info!("Authenticated with forum API (app-only OAuth)");
                Ok(Self {
                    client,
                    base_url: OAUTH_BASE_URL.to_string(),
                    token: Some(token),
                })
            }
            _ => {
                info!("No forum API credentials, using public listings");
                Ok(Self {
                    client,
                    base_url: PUBLIC_BASE_URL.to_string(),
                    token: None,
                })
            }
        }
    }

    /// Collect newest posts (and their replies) for one scan.
    ///
    /// Any failure stops collection; items gathered so far are kept in the batch.
    pub async fn collect(&self, config: &ScanConfig) -> FeedBatch {
        let mut batch = FeedBatch::default();
        let cutoff = match config.cutoff(Utc::now()) {
            Ok(cutoff) => cutoff,
            Err(e) => {
                batch.error = Some(e);
                return batch;
            }
        };

        let posts = match self.fetch_new(&config.subreddit, config.submission_limit).await {
            Ok(posts) => posts,
            Err((posts, e)) => {
                batch.error = Some(e);
                posts
            }
        };

        info!(
            subreddit = %config.subreddit,
            posts = posts.len(),
            "Fetched newest posts"
        );

        for mut post in posts {
            if config.count_comments && batch.error.is_none() && post.created_utc >= cutoff {
                match self.fetch_replies(&post.id).await {
                    Ok(replies) => post.replies = replies,
                    Err(e) => {
                        warn!(id = %post.id, error = %e, "Failed to fetch replies");
                        batch.items.push(post);
                        batch.error = Some(e);
                        break;
                    }
                }
            }
            batch.items.push(post);
        }

        batch
    }

    /// Page through `/r/{subreddit}/new` until `limit` posts or the end of the listing.
    /// On failure the posts already read are returned with the error.
    pub async fn fetch_new(
        &self,
        subreddit: &str,
        limit: usize,
    ) -> std::result::Result<Vec<TextItem>, (Vec<TextItem>, AppError)> {
        let mut posts: Vec<TextItem> = Vec::new();
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let page_size = (limit - posts.len()).min(LISTING_PAGE_SIZE);
            let mut url = format!(
                "{}/r/{}/new{}?limit={}&raw_json=1",
                self.base_url,
                subreddit,
                self.suffix(),
                page_size
            );
            if let Some(cursor) = &after {
                url.push_str(&format!("&after={}", cursor));
            }

            let page = match self.get_json(&url).await.and_then(|json| parse_listing(&json)) {
                Ok(page) => page,
                Err(e) => return Err((posts, e)),
            };

            debug!(count = page.items.len(), after = ?page.after, "Fetched listing page");

            let exhausted = page.items.is_empty() || page.after.is_none();
            posts.extend(page.items);
            after = page.after;
            if exhausted {
                break;
            }
        }

        posts.truncate(limit);
        Ok(posts)
    }

    /// Every reply body of a post, whole tree flattened, "load more" stubs dropped
    pub async fn fetch_replies(&self, post_id: &str) -> Result<Vec<Option<String>>> {
        let url = format!(
            "{}/comments/{}{}?raw_json=1",
            self.base_url,
            post_id,
            self.suffix()
        );
        let json = self.get_json(&url).await?;

        // Response is [post listing, comment listing]
        let comments = json
            .get(1)
            .ok_or_else(|| AppError::Parse(format!("Missing comment listing for {}", post_id)))?;

        Ok(flatten_replies(comments))
    }

    fn suffix(&self) -> &'static str {
        if self.token.is_some() {
            ""
        } else {
            ".json"
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {} (url: {})", e, url)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!("API error {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Failed to parse JSON: {}", e)))
    }
}

async fn fetch_token(client: &reqwest::Client, id: &str, secret: &str) -> Result<String> {
    let response = client
        .post(TOKEN_URL)
        .basic_auth(id, Some(secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| AppError::Network(format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Config(format!(
            "Forum API rejected credentials: {}",
            response.status()
        )));
    }

    let json: Value = response.json().await?;
    json["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::Parse("Missing 'access_token' field".to_string()))
}

/// One page of a post listing
#[derive(Debug)]
pub struct ListingPage {
    pub items: Vec<TextItem>,
    pub after: Option<String>,
}

/// Parse a `Listing` of `t3` posts
pub fn parse_listing(json: &Value) -> Result<ListingPage> {
    let data = json
        .get("data")
        .ok_or_else(|| AppError::Parse("Listing without 'data'".to_string()))?;
    let children = data["children"]
        .as_array()
        .ok_or_else(|| AppError::Parse("Listing without 'children'".to_string()))?;

    let items = children
        .iter()
        .filter(|child| child["kind"].as_str() == Some("t3"))
        .filter_map(|child| parse_post(&child["data"]))
        .collect();

    Ok(ListingPage {
        items,
        after: data["after"].as_str().map(str::to_string),
    })
}

fn parse_post(data: &Value) -> Option<TextItem> {
    let id = data["id"].as_str()?;
    let created = data["created_utc"].as_f64()?;
    let created_utc = DateTime::<Utc>::from_timestamp(created as i64, 0)?;

    Some(TextItem {
        id: id.to_string(),
        created_utc,
        title: data["title"].as_str().map(str::to_string),
        body: data["selftext"].as_str().map(str::to_string),
        replies: Vec::new(),
    })
}

/// Depth-first walk of a comment `Listing`
pub fn flatten_replies(listing: &Value) -> Vec<Option<String>> {
    let mut bodies = Vec::new();
    collect_replies(listing, &mut bodies);
    bodies
}

fn collect_replies(listing: &Value, bodies: &mut Vec<Option<String>>) {
    let Some(children) = listing["data"]["children"].as_array() else {
        return;
    };

    for child in children {
        if child["kind"].as_str() != Some("t1") {
            continue;
        }
        let data = &child["data"];
        bodies.push(data["body"].as_str().map(str::to_string));
        // "replies" is "" when empty, a Listing otherwise
        if data["replies"].is_object() {
            collect_replies(&data["replies"], bodies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing() {
        let json = json!({
            "kind": "Listing",
            "data": {
                "after": "t3_abc",
                "children": [
                    {"kind": "t3", "data": {"id": "p1", "title": "NVDA calls", "selftext": "", "created_utc": 1714650000.0}},
                    {"kind": "t3", "data": {"id": "p2", "title": "GME", "selftext": null, "created_utc": 1714650100.0}},
                    {"kind": "t3", "data": {"id": "broken"}}
                ]
            }
        });

        let page = parse_listing(&json).unwrap();

        assert_eq!(page.after.as_deref(), Some("t3_abc"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "p1");
        assert_eq!(page.items[0].title.as_deref(), Some("NVDA calls"));
        assert_eq!(page.items[1].body, None);
        assert_eq!(page.items[0].created_utc.timestamp(), 1714650000);
    }

    #[test]
    fn test_parse_listing_end() {
        let json = json!({"kind": "Listing", "data": {"after": null, "children": []}});
        let page = parse_listing(&json).unwrap();
        assert!(page.items.is_empty());
        assert!(page.after.is_none());
    }

    #[test]
    fn test_parse_listing_malformed() {
        assert!(parse_listing(&json!({"error": 429})).is_err());
    }

    #[test]
    fn test_flatten_replies_drops_more_stubs() {
        let listing = json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t1", "data": {"body": "TSLA puts", "replies": {
                    "kind": "Listing",
                    "data": {"children": [
                        {"kind": "t1", "data": {"body": "$IT", "replies": ""}},
                        {"kind": "more", "data": {"count": 40, "children": ["x", "y"]}}
                    ]}
                }}},
                {"kind": "t1", "data": {"body": null, "replies": ""}},
                {"kind": "more", "data": {"count": 3}}
            ]}
        });

        let bodies = flatten_replies(&listing);
        assert_eq!(
            bodies,
            vec![Some("TSLA puts".to_string()), Some("$IT".to_string()), None]
        );
    }

    #[test]
    fn test_feed_batch_results_end_with_error() {
        let batch = FeedBatch {
            items: vec![TextItem::new("a", Utc::now())],
            error: Some(AppError::Network("reset".to_string())),
        };

        let results: Vec<_> = batch.into_results().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
