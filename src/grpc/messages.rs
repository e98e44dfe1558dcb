//! Wire messages of the `donationguard.v1.DonationGuard` service.

/// Check one identifier against the limiter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckRateLimitRequest {
    #[prost(string, tag = "1")]
    pub identifier: String,
    /// 0 means the configured default
    #[prost(uint32, tag = "2")]
    pub limit: u32,
    /// 0 means the configured default
    #[prost(uint64, tag = "3")]
    pub window_ms: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckRateLimitResponse {
    #[prost(bool, tag = "1")]
    pub allowed: bool,
    #[prost(uint64, optional, tag = "2")]
    pub remaining: Option<u64>,
    #[prost(int64, optional, tag = "3")]
    pub reset_at: Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub error: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitDonationRequest {
    #[prost(string, tag = "1")]
    pub org_id: String,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, tag = "3")]
    pub phone_number: String,
    #[prost(uint64, tag = "4")]
    pub amount: u64,
    #[prost(string, optional, tag = "5")]
    pub ip: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub user_agent: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub origin: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub referer: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitDonationResponse {
    #[prost(string, tag = "1")]
    pub donation_id: String,
    /// RFC 3339
    #[prost(string, tag = "2")]
    pub created_at: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindSuspiciousRequest {
    #[prost(string, tag = "1")]
    pub org_id: String,
    #[prost(uint64, optional, tag = "2")]
    pub time_window_ms: Option<u64>,
    #[prost(uint32, optional, tag = "3")]
    pub max_per_ip: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub max_per_phone: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuspiciousGroup {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(uint32, tag = "2")]
    pub count: u32,
    #[prost(string, repeated, tag = "3")]
    pub donation_ids: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindSuspiciousResponse {
    #[prost(message, repeated, tag = "1")]
    pub by_ip: Vec<SuspiciousGroup>,
    #[prost(message, repeated, tag = "2")]
    pub by_phone: Vec<SuspiciousGroup>,
}
