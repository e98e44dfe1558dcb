//! gRPC server implementation.

use std::net::SocketAddr;
use tonic::transport::Server;
use tracing::{error, info};

use super::proto::donation_guard_server::DonationGuardServer;
use super::service::DonationGuardService;
use crate::error::{GuardError, Result};

/// gRPC server for the donation guard service.
pub struct GrpcServer {
    /// Address to bind to
    addr: SocketAddr,
    service: DonationGuardService,
}

impl GrpcServer {
    pub fn new(addr: SocketAddr, service: DonationGuardService) -> Self {
        Self { addr, service }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the gRPC server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        info!(
            addr = %self.addr,
            "Starting gRPC server for DonationGuard"
        );

        Server::builder()
            .add_service(DonationGuardServer::new(self.service))
            .serve_with_shutdown(self.addr, signal)
            .await
            .map_err(|e| {
                error!(error = %e, "gRPC server failed");
                GuardError::Grpc(e)
            })
    }
}
