//! # Headless Provider Hosts
//!
//! A terminal has no browser window to run the identity service flow in and
//! no wallet extension injected into it. These hosts report that as
//! `ProviderError::Unavailable`, so login fails cleanly while persisted
//! sessions can still be restored.

use async_trait::async_trait;
use cv_02_identity_providers::{
    AuthorizeRequest, AuthorizeResponse, ExtensionHost, IdentityServiceClient, PlugBridge,
    ProviderError,
};
use std::sync::Arc;
use tracing::warn;

/// Identity service client that cannot open the interactive flow.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessIdentityService;

#[async_trait]
impl IdentityServiceClient for HeadlessIdentityService {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<AuthorizeResponse, ProviderError> {
        warn!(
            identity_provider = %request.identity_provider,
            "[runtime] Interactive sign-in requested without a browser"
        );
        Err(ProviderError::Unavailable(format!(
            "sign in at {} from the web client first",
            request.identity_provider
        )))
    }
}

/// Host with no wallet extension injected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtensionHost;

impl ExtensionHost for NoExtensionHost {
    fn injected(&self) -> Option<Arc<dyn PlugBridge>> {
        None
    }
}
