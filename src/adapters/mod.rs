// Adapters layer: concrete implementations of the ports for external
// systems. The browsing driver has no adapter here; deployments wire in
// their own `Browser` implementation.

pub mod http;
pub mod storage;
