use std::{collections::HashMap, time::Duration};

use futures::future::join_all;
use log::info;

use crate::helpers::fetch::UpstreamClient;
use crate::mintgarden::dto::{CollectionResponse, CollectionSummary};

pub const MAX_BATCH_IDS: usize = 60;
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);
pub const ENRICH_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Clone, Debug)]
pub struct MintGarden {
    client: UpstreamClient,
    base_url: String,
}

impl MintGarden {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn collection(&self, collection_id: &str, timeout: Duration) -> Option<CollectionResponse> {
        let url = format!(
            "{}/collections/{}",
            self.base_url,
            urlencoding::encode(collection_id)
        );
        self.client.try_get_json::<CollectionResponse>(&url, timeout).await
    }

    /// Looks up at most `MAX_BATCH_IDS` collections in parallel. Misses are
    /// left out of the map.
    pub async fn lookup_many(&self, collection_ids: &[String]) -> HashMap<String, CollectionSummary> {
        let ids = &collection_ids[..collection_ids.len().min(MAX_BATCH_IDS)];
        let lookups = ids.iter().map(|id| self.collection(id, LOOKUP_TIMEOUT));

        let found: HashMap<String, CollectionSummary> = join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .filter_map(CollectionSummary::from_response)
            .map(|summary| (summary.id.clone(), summary))
            .collect();

        info!("[MINTGARDEN] {} of {} collections resolved", found.len(), ids.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_lookup_many_skips_misses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/col1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "col1", "name": "Chia Friends", "thumbnail_uri": "https://img/1.png",
                "floor_price": "1.5", "nft_count": 10000
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/collections/nameless"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "nameless"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/collections/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mintgarden = MintGarden::new(UpstreamClient::new().unwrap(), &server.uri());
        let ids = vec!["col1".to_string(), "nameless".to_string(), "missing".to_string()];
        let found = mintgarden.lookup_many(&ids).await;

        assert_eq!(found.len(), 1);
        let col = &found["col1"];
        assert_eq!(col.name, "Chia Friends");
        assert_eq!(col.thumbnail, "https://img/1.png");
        assert_eq!(col.floor_xch, 1.5);
        assert_eq!(col.nft_count, 10000);
    }

    #[tokio::test]
    async fn test_lookup_many_caps_batch_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/collections/.+$"))
            .respond_with(ResponseTemplate::new(404))
            .expect(MAX_BATCH_IDS as u64)
            .mount(&server)
            .await;

        let mintgarden = MintGarden::new(UpstreamClient::new().unwrap(), &server.uri());
        let ids: Vec<String> = (0..75).map(|i| format!("col{}", i)).collect();

        assert!(mintgarden.lookup_many(&ids).await.is_empty());
    }
}
