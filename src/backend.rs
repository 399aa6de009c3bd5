//! Server interface: load-time configuration, gate status, and the spin
//! request itself. Responses are decoded into validated structs before the
//! session sees them; anything malformed is a network-class failure.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::wheel::Sector;
use crate::{Result, SpinError};

/// Load-time configuration for one page/session.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelConfig {
    pub sectors: Vec<Sector>,
    pub version_id: String,
    pub test_mode: bool,
    pub ticket_mode: bool,
    pub tickets: Option<u64>,
}

/// Authoritative gate data, re-fetched after each spin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateStatus {
    pub time_to_spin: Option<String>,
    pub tickets: Option<u64>,
}

/// Raw spin response; range validation against the loaded wheel happens in
/// the session, which knows the sector count.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinOutcome {
    pub result: i64,
    pub wheel_version_id: String,
}

pub trait SpinBackend {
    fn fetch_config(&self) -> impl Future<Output = Result<WheelConfig>>;
    fn gate_status(&self) -> impl Future<Output = Result<GateStatus>>;
    fn request_spin(&self, version_id: &str) -> impl Future<Output = Result<SpinOutcome>>;
}

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| SpinError::Network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { base_url, http })
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Vec<u8>)> {
        let url = format!("{}/{path}/", self.base_url);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| SpinError::Network(format!("{path} request failed: {err}")))?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|err| SpinError::Network(format!("{path} body unreadable: {err}")))?;
        Ok((status, bytes.to_vec()))
    }
}

impl SpinBackend for HttpBackend {
    async fn fetch_config(&self) -> Result<WheelConfig> {
        let (status, body) = self.get("config").await?;
        decode_config(status, &body)
    }

    async fn gate_status(&self) -> Result<GateStatus> {
        let (status, body) = self.get("time_to_spin").await?;
        decode_gate_status(status, &body)
    }

    async fn request_spin(&self, version_id: &str) -> Result<SpinOutcome> {
        let url = format!("{}/spin/", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&serde_json::json!({ "wheel_version_id": version_id }))
            .send()
            .await
            .map_err(|err| SpinError::Network(format!("spin request failed: {err}")))?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|err| SpinError::Network(format!("spin body unreadable: {err}")))?;
        decode_spin_response(status, &bytes)
    }
}

#[derive(Deserialize)]
struct SpinResponseDto {
    result: i64,
    wheel_version_id: String,
}

#[derive(Deserialize)]
struct ConflictDto {
    expected_version: String,
}

#[derive(Deserialize)]
struct GateStatusDto {
    #[serde(rename = "timeToSpin")]
    time_to_spin: Option<String>,
    #[serde(default)]
    tickets: Option<u64>,
}

#[derive(Deserialize)]
struct WheelConfigDto {
    sectors: Vec<Sector>,
    wheel_version_id: String,
    #[serde(default)]
    test_mode: bool,
    #[serde(default)]
    ticket_mode: bool,
    #[serde(default)]
    tickets: Option<u64>,
}

fn non_success(what: &str, status: StatusCode, body: &[u8]) -> SpinError {
    let body = String::from_utf8_lossy(body);
    SpinError::Network(format!("{what} responded with {status}: {body}"))
}

pub(crate) fn decode_spin_response(status: StatusCode, body: &[u8]) -> Result<SpinOutcome> {
    if status == StatusCode::CONFLICT {
        let dto: ConflictDto = serde_json::from_slice(body)
            .map_err(|_| non_success("spin", status, body))?;
        return Err(SpinError::VersionConflict {
            expected: dto.expected_version,
        });
    }
    if status.is_server_error() {
        return Err(SpinError::ServerFault);
    }
    if !status.is_success() {
        return Err(non_success("spin", status, body));
    }
    let dto: SpinResponseDto = serde_json::from_slice(body)
        .map_err(|err| SpinError::Network(format!("invalid spin payload: {err}")))?;
    Ok(SpinOutcome {
        result: dto.result,
        wheel_version_id: dto.wheel_version_id,
    })
}

pub(crate) fn decode_gate_status(status: StatusCode, body: &[u8]) -> Result<GateStatus> {
    if !status.is_success() {
        return Err(non_success("time_to_spin", status, body));
    }
    let dto: GateStatusDto = serde_json::from_slice(body)
        .map_err(|err| SpinError::Network(format!("invalid time_to_spin payload: {err}")))?;
    Ok(GateStatus {
        time_to_spin: dto.time_to_spin,
        tickets: dto.tickets,
    })
}

pub(crate) fn decode_config(status: StatusCode, body: &[u8]) -> Result<WheelConfig> {
    if !status.is_success() {
        return Err(non_success("config", status, body));
    }
    let dto: WheelConfigDto = serde_json::from_slice(body)
        .map_err(|err| SpinError::Network(format!("invalid config payload: {err}")))?;
    Ok(WheelConfig {
        sectors: dto.sectors,
        version_id: dto.wheel_version_id,
        test_mode: dto.test_mode,
        ticket_mode: dto.ticket_mode,
        tickets: dto.tickets,
    })
}
