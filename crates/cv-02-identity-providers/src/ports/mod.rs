//! # Ports Layer
//!
//! - **Inbound**: [`ProviderAdapter`], the capability set every provider offers
//! - **Outbound**: the identity service and the injected browser extension

pub mod inbound;
pub mod outbound;

pub use inbound::ProviderAdapter;
pub use outbound::{
    AuthorizeRequest, AuthorizeResponse, ExtensionHost, IdentityServiceClient, MockAuthBehavior,
    MockExtensionHost, MockIdentityService, MockPlugBridge, PlugBridge,
};
