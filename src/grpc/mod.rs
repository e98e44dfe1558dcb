//! gRPC surface of the donation guard.

pub mod messages;
mod server;
mod service;

pub use server::GrpcServer;
pub use service::DonationGuardService;

// Service glue generated by build.rs
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/donationguard.v1.DonationGuard.rs"));
}

// Re-export commonly used types
pub use proto::donation_guard_server::{DonationGuard, DonationGuardServer};
