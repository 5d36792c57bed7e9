pub mod cache;
pub mod engine;
pub mod inference_client;
pub mod interface;
#[cfg(test)]
pub mod mock;
pub mod preset;
