//! Web server for s3nav.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::WebConfig;
use crate::{NavError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::create_app;

/// HTTP server for the API and the progress streams.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
}

impl WebServer {
    /// Create a web server bound to `config.host:config.port`.
    pub fn new(config: &WebConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                NavError::Config(format!(
                    "invalid web address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            rate_limit: Arc::new(RateLimitState::new(config.login_rate_limit)),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn bind(self) -> Result<(TcpListener, axum::Router)> {
        Arc::clone(&self.rate_limit).start_cleanup_task();
        let router = create_app(self.app_state, self.rate_limit);
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
