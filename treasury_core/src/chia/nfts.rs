use std::{collections::HashMap, sync::LazyLock};

use futures::future::join_all;
use log::info;
use regex::Regex;

use crate::helpers::{
    dto::{NftCollection, NftSample},
    rate_limit::Lane,
};
use crate::mintgarden::handler::ENRICH_TIMEOUT;
use crate::providers::Providers;
use crate::spacescan::dto::RawNft;

pub const UNCATEGORIZED: &str = "uncategorized";
pub const UNKNOWN_COLLECTION: &str = "Unknown Collection";
pub const ENRICH_BATCH: usize = 8;

static EDITION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*#\d+\s*$").expect("Invalid edition regex"));

/// Groups raw NFTs by collection id. The first item of a collection names it
/// (edition suffix removed) and becomes its sample. Collections come back
/// largest first.
pub fn tally(raw: &[RawNft]) -> Vec<NftCollection> {
    let mut collections: Vec<NftCollection> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for nft in raw {
        let id = if nft.collection_id.is_empty() {
            UNCATEGORIZED
        } else {
            nft.collection_id.as_str()
        };

        let slot = match index.get(id) {
            Some(slot) => *slot,
            None => {
                let base = EDITION_SUFFIX.replace(&nft.name, "").trim().to_string();
                collections.push(NftCollection {
                    id: id.to_string(),
                    name: if base.is_empty() { UNKNOWN_COLLECTION.to_string() } else { base },
                    count: 0,
                    image: nft.preview_url.clone(),
                    nfts: Vec::new(),
                });
                index.insert(id.to_string(), collections.len() - 1);
                collections.len() - 1
            }
        };

        let collection = &mut collections[slot];
        collection.count += 1;
        if collection.nfts.is_empty() {
            collection.nfts.push(NftSample {
                id: nft.nft_id.clone(),
                name: nft.name.clone(),
                image: nft.preview_url.clone(),
            });
        }
    }

    collections.sort_by(|a, b| b.count.cmp(&a.count));
    collections
}

/// Overlays display name and thumbnail from MintGarden, eight collections at a
/// time. Missing data keeps what the tally derived; the uncategorized bucket
/// is never looked up.
pub async fn enrich(providers: &Providers, collections: &mut [NftCollection]) {
    let ids: Vec<String> = collections
        .iter()
        .filter(|c| c.id != UNCATEGORIZED)
        .map(|c| c.id.clone())
        .collect();
    info!("[CHIA-NFTS] enriching {} collections", ids.len());

    let mut found = HashMap::new();
    for batch in ids.chunks(ENRICH_BATCH) {
        providers.limiter.acquire(Lane::MintGarden).await;
        let lookups = batch
            .iter()
            .map(|id| providers.mintgarden.collection(id, ENRICH_TIMEOUT));
        for (id, meta) in batch.iter().zip(join_all(lookups).await) {
            if let Some(meta) = meta {
                found.insert(id.clone(), meta);
            }
        }
    }

    for collection in collections.iter_mut() {
        if let Some(meta) = found.get(&collection.id) {
            if !meta.name.is_empty() {
                collection.name = meta.name.clone();
            }
            if !meta.thumbnail_uri.is_empty() {
                collection.image = meta.thumbnail_uri.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::providers;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn nft(id: &str, name: &str, collection: &str) -> RawNft {
        RawNft {
            nft_id: id.to_string(),
            name: name.to_string(),
            collection_id: collection.to_string(),
            preview_url: format!("https://preview/{}.png", id),
        }
    }

    #[test]
    fn test_tally_groups_and_names_collections() {
        let raw = vec![nft("n1", "Foo #1", "X"), nft("n2", "Foo #2", "X"), nft("n3", "Bar", "")];
        let collections = tally(&raw);

        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].id, "X");
        assert_eq!(collections[0].count, 2);
        assert_eq!(collections[0].name, "Foo");
        assert_eq!(collections[0].nfts.len(), 1);
        assert_eq!(collections[0].nfts[0].id, "n1");
        assert_eq!(collections[1].id, UNCATEGORIZED);
        assert_eq!(collections[1].count, 1);
        assert_eq!(collections[1].name, "Bar");
    }

    #[test]
    fn test_tally_unknown_name_and_order() {
        let raw = vec![
            nft("a", "#12", "A"),
            nft("b1", "B #1", "B"),
            nft("b2", "B #2", "B"),
            nft("b3", "B #3", "B"),
        ];
        let collections = tally(&raw);

        assert_eq!(collections[0].id, "B");
        assert_eq!(collections[1].name, UNKNOWN_COLLECTION);
        assert_eq!(collections[1].image, "https://preview/a.png");
    }

    #[test]
    fn test_edition_suffix_pattern() {
        assert!(EDITION_SUFFIX.is_match("Foo #12"));
        assert!(EDITION_SUFFIX.is_match("Foo #3 "));
        assert!(!EDITION_SUFFIX.is_match("#1 Foo"));
        assert_eq!(EDITION_SUFFIX.replace("Chia Friends #0042", ""), "Chia Friends");
    }

    #[tokio::test]
    async fn test_enrich_overlays_and_skips_uncategorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "X", "name": "Foo Collection", "thumbnail_uri": "https://mg/x.png"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/collections/Y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "Y", "name": null})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/collections/uncategorized$"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let raw = vec![nft("n1", "Foo #1", "X"), nft("n2", "Yak #9", "Y"), nft("n3", "Bar", "")];
        let mut collections = tally(&raw);
        enrich(&providers(&server.uri()), &mut collections).await;

        let by_id: HashMap<&str, &NftCollection> = collections.iter().map(|c| (c.id.as_str(), c)).collect();
        assert_eq!(by_id["X"].name, "Foo Collection");
        assert_eq!(by_id["X"].image, "https://mg/x.png");
        assert_eq!(by_id["Y"].name, "Yak");
        assert_eq!(by_id["Y"].image, "https://preview/n2.png");
        assert_eq!(by_id[UNCATEGORIZED].name, "Bar");
    }
}
