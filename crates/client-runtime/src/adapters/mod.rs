//! Host implementations of provider ports for a terminal client.

pub mod headless;

pub use headless::{HeadlessIdentityService, NoExtensionHost};
