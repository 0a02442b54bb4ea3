//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP on localhost.

use crate::handler::RpcHandler;
use accelerate_core::application::{MaintenanceScheduler, Ports};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Register one method: parse the params object, hand it to `call`.
fn register<P, R, F, Fut>(
    module: &mut RpcModule<RpcHandler>,
    name: &'static str,
    call: F,
) -> Result<(), String>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    module
        .register_async_method(name, move |params, handler, _| {
            let call = call.clone();
            async move {
                let req: P = params.parse()?;
                call(handler, req).await
            }
        })
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Build the module with every versioned method
pub fn build_module(handler: RpcHandler) -> Result<RpcModule<RpcHandler>, String> {
    let mut module = RpcModule::new(handler);
    let m = &mut module;

    // Auth
    register(m, "auth.signup.v1", |h, req| async move { h.sign_up(req).await })?;
    register(m, "auth.signin.v1", |h, req| async move { h.sign_in(req).await })?;
    register(m, "auth.signout.v1", |h, req| async move { h.sign_out(req).await })?;
    register(m, "auth.session.v1", |h, req| async move { h.current_session(req).await })?;

    // Application wizard
    register(m, "application.save_step.v1", |h, req| async move { h.save_step(req).await })?;
    register(m, "application.draft.v1", |h, req| async move { h.draft(req).await })?;
    register(m, "application.submit.v1", |h, req| async move { h.submit(req).await })?;

    // Ventures
    register(m, "venture.list.v1", |h, req| async move { h.list_ventures(req).await })?;
    register(m, "venture.get.v1", |h, req| async move { h.get_venture(req).await })?;
    register(m, "venture.mine.v1", |h, req| async move { h.my_venture(req).await })?;
    register(m, "venture.complete.v1", |h, req| async move { h.complete_venture(req).await })?;

    // Review & approvals
    register(m, "review.triage.v1", |h, req| async move { h.triage(req).await })?;
    register(m, "review.get.v1", |h, req| async move { h.review(req).await })?;
    register(m, "approval.chain.v1", |h, req| async move { h.chain(req).await })?;
    register(m, "approval.decide.v1", |h, req| async move { h.decide(req).await })?;
    register(m, "approval.pending.v1", |h, req| async move { h.pending_approvals(req).await })?;

    // Agreements
    register(m, "agreement.get.v1", |h, req| async move { h.agreement(req).await })?;
    register(m, "agreement.respond.v1", |h, req| async move { h.respond_agreement(req).await })?;

    // Streams
    register(m, "stream.list.v1", |h, req| async move { h.list_streams(req).await })?;
    register(m, "stream.update.v1", |h, req| async move { h.update_stream(req).await })?;
    register(m, "deliverable.update.v1", |h, req| async move { h.update_deliverable(req).await })?;

    // Engagement
    register(m, "session.record.v1", |h, req| async move { h.record_session(req).await })?;
    register(m, "session.list.v1", |h, req| async move { h.list_sessions(req).await })?;
    register(m, "mentor.request.v1", |h, req| async move { h.request_mentor(req).await })?;
    register(m, "mentor.list.v1", |h, req| async move { h.list_mentor_requests(req).await })?;
    register(m, "mentor.respond.v1", |h, req| async move {
        h.respond_mentor_request(req).await
    })?;
    register(m, "engagement.log.v1", |h, req| async move { h.log_engagement(req).await })?;
    register(m, "engagement.list.v1", |h, req| async move { h.list_engagement(req).await })?;
    register(m, "engagement.hours.v1", |h, req| async move { h.hours(req).await })?;

    // Views
    register(m, "dashboard.get.v1", |h, req| async move { h.dashboard(req).await })?;
    register(m, "nav.routes.v1", |h, req| async move { h.nav_routes(req).await })?;

    // Admin
    register(m, "admin.profiles.v1", |h, req| async move { h.profiles(req).await })?;
    register(m, "admin.maintenance.v1", |h, req| async move { h.maintenance(req).await })?;

    Ok(module)
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: RpcHandler,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, ports: Ports, scheduler: MaintenanceScheduler) -> Self {
        Self {
            config,
            handler: RpcHandler::new(ports, scheduler),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the stop handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler)?;
        let methods = module.method_names().count();

        info!(addr = %local_addr, methods, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
