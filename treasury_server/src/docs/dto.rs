use crate::{address_proxy, collections, info, market, merkl, save, spacescan_proxy, treasury};
use treasury_core::{
    merkl::dto::{MerklPool, MerklProxyPool, MerklProxyResponse},
    mintgarden::dto::CollectionSummary,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        info::handler::info,
        save::handler::load_save,
        save::handler::store_save,
        address_proxy::handler::address_proxy_get,
        address_proxy::handler::address_proxy_post,
        spacescan_proxy::handler::spacescan_proxy,
        market::handler::market_prices,
        collections::handler::collections,
        treasury::handler::treasury,
        merkl::handler::merkl_pools,
        merkl::handler::merkl_proxy,
    ),
    components(schemas(
        info::dto::Info,
        save::dto::StoreSaveRequest,
        address_proxy::dto::AddressProxyRequest,
        collections::dto::CollectionsRequest,
        collections::dto::CollectionsResponse,
        CollectionSummary,
        MerklPool,
        MerklProxyPool,
        MerklProxyResponse,
    ))
)]
pub struct ApiDoc;
