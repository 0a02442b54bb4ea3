//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the Accelerate program service.
//! Every method name carries a version suffix (`venture.get.v1`).

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
