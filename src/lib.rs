//! authgate: authenticated request gateway for the shoe store clients.
//!
//! Wraps every API call of the storefront and admin console with bearer-token
//! attachment and a transparent, one-shot access-token refresh. Also carries
//! the session endpoints, an optimistic-update cache and the cart client
//! built on top of it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use authgate::prelude::*;
//!
//! # async fn example() -> authgate::error::Result<()> {
//! let config = GatewayConfig::storefront("http://localhost:8000");
//! let transport = Arc::new(HttpTransport::new(&config.base_url)?);
//! let store = Arc::new(MemoryCredentialStore::new());
//! let gateway = Gateway::new(config, transport, store);
//!
//! let session = SessionClient::new(gateway.clone());
//! session.login("jane", "secret").await?;
//!
//! let cart = CartApi::new(gateway).get_cart(&CartQuery::default()).await?;
//! println!("{} items", cart.total_count);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod optimistic;
pub mod prelude;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
