//! Subset of the Widevine license protocol messages.
//!
//! Only the fields needed to build a license request and read content keys
//! are declared; prost skips everything else when decoding.

/// Envelope for requests and responses.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignedMessage {
    #[prost(enumeration = "MessageType", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub msg: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub signature: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub session_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub oemcrypto_core_message: Option<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    LicenseRequest = 1,
    License = 2,
    ErrorResponse = 3,
    ServiceCertificateRequest = 4,
    ServiceCertificate = 5,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LicenseRequest {
    /// Serialized `ClientIdentification`, embedded verbatim.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub client_id: Option<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub content_id: Option<ContentIdentification>,
    #[prost(enumeration = "RequestType", optional, tag = "3")]
    pub r#type: Option<i32>,
    #[prost(int64, optional, tag = "4")]
    pub request_time: Option<i64>,
    #[prost(enumeration = "ProtocolVersion", optional, tag = "6")]
    pub protocol_version: Option<i32>,
    #[prost(uint32, optional, tag = "7")]
    pub key_control_nonce: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContentIdentification {
    #[prost(message, optional, tag = "1")]
    pub widevine_pssh_data: Option<WidevinePsshData>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WidevinePsshData {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub pssh_data: Vec<Vec<u8>>,
    #[prost(enumeration = "LicenseType", optional, tag = "2")]
    pub license_type: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub request_id: Option<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum RequestType {
    New = 1,
    Renewal = 2,
    Release = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LicenseType {
    Streaming = 1,
    Offline = 2,
    Automatic = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtocolVersion {
    Version20 = 20,
    Version21 = 21,
    Version22 = 22,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct License {
    #[prost(message, repeated, tag = "3")]
    pub key: Vec<KeyContainer>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct KeyContainer {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub id: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub iv: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: Option<Vec<u8>>,
    #[prost(enumeration = "KeyType", optional, tag = "4")]
    pub r#type: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum KeyType {
    Signing = 1,
    Content = 2,
    KeyControl = 3,
    OperatorSession = 4,
    Entitlement = 5,
    OemContent = 6,
}
