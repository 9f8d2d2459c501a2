//! Cross-crate integration flows.

#[cfg(test)]
mod fixtures;

mod civic_flows;
mod gateway_flows;
mod session_flows;
mod transport_flows;
