// Data source adapters

pub mod birdeye;
pub mod failover;
pub mod jupiter;
pub mod rpc_provider;
