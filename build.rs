use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::grpc::messages::{}", input))
        .output_type(format!("crate::grpc::messages::{}", output))
        .codec_path(CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Message types are hand-written prost structs in src/grpc/messages.rs,
    // so only the service glue is generated here and protoc is not needed.
    let service = Service::builder()
        .name("DonationGuard")
        .package("donationguard.v1")
        .method(method(
            "check_rate_limit",
            "CheckRateLimit",
            "CheckRateLimitRequest",
            "CheckRateLimitResponse",
        ))
        .method(method(
            "submit_donation",
            "SubmitDonation",
            "SubmitDonationRequest",
            "SubmitDonationResponse",
        ))
        .method(method(
            "find_suspicious_donations",
            "FindSuspiciousDonations",
            "FindSuspiciousRequest",
            "FindSuspiciousResponse",
        ))
        .build();

    Builder::new()
        .build_server(true)
        .build_client(false)
        .compile(&[service]);
}
