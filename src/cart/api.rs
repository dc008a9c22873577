use tracing::debug;

use super::{AddToCart, Cart, CartItem, CartQuery, ChangeQuantity};
use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;
use crate::optimistic::{optimistic_update, QueryCache};
use crate::transport::ApiRequest;

/// Cart endpoints with a local cache of fetched cart pages.
///
/// Quantity changes are applied to the cached first page immediately and
/// reverted if the server rejects them. Any successful mutation drops the
/// cached pages so the next [`get_cart`](Self::get_cart) refetches.
#[derive(Debug, Clone)]
pub struct CartApi {
    gateway: Gateway,
    cache: QueryCache<CartQuery, Cart>,
}

impl CartApi {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            cache: QueryCache::new(),
        }
    }

    pub fn cache(&self) -> &QueryCache<CartQuery, Cart> {
        &self.cache
    }

    /// Cached result for `query`, if one was fetched and not invalidated since.
    pub fn cached(&self, query: &CartQuery) -> Option<Cart> {
        self.cache.get(query)
    }

    pub async fn get_cart(&self, query: &CartQuery) -> Result<Cart> {
        let request = ApiRequest::get("/cart/")
            .with_query("search", &query.search)
            .with_query("page", query.page);
        let cart: Cart = self.gateway.send_json(request).await?;
        self.cache.insert(query.clone(), cart.clone());
        Ok(cart)
    }

    pub async fn add_to_cart(&self, item: &AddToCart) -> Result<CartItem> {
        let added: CartItem = self.gateway.post_json("/cart/add", item).await?;
        self.cache.invalidate_all();
        Ok(added)
    }

    pub async fn remove_from_cart(&self, cart_id: &str) -> Result<CartItem> {
        let path = format!("/cart/{}", checked_id(cart_id)?);
        let removed: CartItem = self.gateway.delete(&path).await?;
        self.cache.invalidate_all();
        Ok(removed)
    }

    /// Change an item's quantity by `change.quantity`, optimistically.
    pub async fn change_quantity(&self, cart_id: &str, change: &ChangeQuantity) -> Result<CartItem> {
        let path = format!("/cart/{}/change-quantity", checked_id(cart_id)?);
        let request = ApiRequest::put(path).with_json(change)?;
        let delta = change.quantity;

        let updated: CartItem = optimistic_update(
            &self.cache,
            &CartQuery::default(),
            |cart| {
                if !cart.apply_quantity_delta(cart_id, delta) {
                    debug!(cart_id, "item not in cached cart; no optimistic edit");
                }
            },
            self.gateway.send_json(request),
        )
        .await?;

        self.cache.invalidate_all();
        Ok(updated)
    }
}

fn checked_id(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(GatewayError::InvalidArgument(format!("invalid cart id: {id:?}")));
    }
    Ok(id)
}
