//! Feed layer: live weather and market-price lookups.
//!
//! Every lookup degrades to a defined fallback instead of surfacing an error
//! to the caller.

mod error;
pub mod market;
pub mod weather;

pub use error::FeedError;
pub use market::{MarketClient, MarketConfig};
pub use weather::{WeatherClient, WeatherConfig};

/// Local HTTP stand-ins for the remote feeds.
#[cfg(any(test, feature = "test-util"))]
pub mod stub {
    use axum::Router;

    /// Serve `app` on an ephemeral localhost port, returning its base URL.
    pub async fn serve(app: Router) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "stub server stopped");
            }
        });
        Ok(format!("http://{addr}"))
    }
}
