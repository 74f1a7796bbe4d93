//! HTTP client for the DDM server API.
//!
//! Every request carries a fixed Basic-Authentication header built from the
//! configured API user and key. HTTP statuses come back as values rather
//! than errors so callers can map the server's 204/304 idempotency contract
//! directly.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::DeserializeOwned;
use thiserror::Error;
use ureq::Agent;

use crate::config::Config;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused,
    /// timeout, interrupted body read).
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    /// The server answered with a status outside the expected range.
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

/// Result of a declaration upsert (create-if-absent, replace-if-present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Any 2xx response.
    Accepted { status: u16 },
    /// Anything else, with the response body as diagnostic detail.
    Rejected { status: u16, detail: String },
}

/// Result of an idempotent membership change (add or remove).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOutcome {
    /// 204: the change was applied.
    Applied,
    /// 304: the remote was already in the requested state.
    Unchanged,
    /// Anything else, with the response body as diagnostic detail.
    Rejected { status: u16, detail: String },
}

/// The remote operations the reconciliation engine consumes. The engine is
/// generic over this so tests can substitute a recording mock.
pub trait DdmApi {
    fn upsert_declaration(&self, payload: &[u8]) -> ApiResult<PushOutcome>;
    fn add_set_member(&self, set: &str, identifier: &str) -> ApiResult<MemberOutcome>;
}

impl<T: DdmApi + ?Sized> DdmApi for &T {
    fn upsert_declaration(&self, payload: &[u8]) -> ApiResult<PushOutcome> {
        (**self).upsert_declaration(payload)
    }

    fn add_set_member(&self, set: &str, identifier: &str) -> ApiResult<MemberOutcome> {
        (**self).add_set_member(set, identifier)
    }
}

pub struct DdmClient {
    agent: Agent,
    api_base: String,
    auth_header: String,
}

impl DdmClient {
    pub fn new(config: &Config) -> Self {
        // Surface 304/404/5xx as responses so the caller maps them; only
        // transport problems become errors.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let credentials = format!("{}:{}", config.api_user, config.api_key);
        Self {
            agent,
            api_base: config.api_url(),
            auth_header: format!("Basic {}", BASE64.encode(credentials)),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// List all declaration identifiers known to the server.
    pub fn list_declarations(&self) -> ApiResult<Vec<String>> {
        self.get_json(&self.endpoint(&["declarations"]), None)
    }

    /// Fetch the full JSON document for one declaration.
    pub fn get_declaration(&self, identifier: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["declarations", identifier]), None)
    }

    /// Delete a declaration, returning the server's response body.
    pub fn delete_declaration(&self, identifier: &str) -> ApiResult<String> {
        let url = self.endpoint(&["declarations", identifier]);
        let (status, body) = self.delete(&url, None)?;
        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(ApiError::Status { url, status, body })
        }
    }

    /// List the sets a declaration belongs to.
    pub fn declaration_sets(&self, identifier: &str) -> ApiResult<Vec<String>> {
        self.get_json(&self.endpoint(&["declaration-sets", identifier]), None)
    }

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    pub fn list_sets(&self) -> ApiResult<Vec<String>> {
        self.get_json(&self.endpoint(&["sets"]), None)
    }

    /// List the declaration identifiers in a set.
    pub fn set_declarations(&self, name: &str) -> ApiResult<Vec<String>> {
        self.get_json(&self.endpoint(&["set-declarations", name]), None)
    }

    pub fn remove_set_member(&self, set: &str, identifier: &str) -> ApiResult<MemberOutcome> {
        let url = self.endpoint(&["set-declarations", set]);
        let (status, body) = self.delete(&url, Some(("declaration", identifier)))?;
        Ok(Self::member_outcome(status, body))
    }

    // ------------------------------------------------------------------
    // Devices (enrollments)
    // ------------------------------------------------------------------

    /// List the sets applied to a device.
    pub fn device_sets(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["enrollment-sets", client_id]), None)
    }

    pub fn add_device_to_set(&self, client_id: &str, set: &str) -> ApiResult<MemberOutcome> {
        let url = self.endpoint(&["enrollment-sets", client_id]);
        let (status, body) = self.put_query(&url, ("set", set))?;
        Ok(Self::member_outcome(status, body))
    }

    pub fn remove_device_from_set(&self, client_id: &str, set: &str) -> ApiResult<MemberOutcome> {
        let url = self.endpoint(&["enrollment-sets", client_id]);
        let (status, body) = self.delete(&url, Some(("set", set)))?;
        Ok(Self::member_outcome(status, body))
    }

    /// Per-declaration status reported by a device.
    pub fn declaration_status(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["declaration-status", client_id]), None)
    }

    /// Status-channel errors reported by a device.
    pub fn status_errors(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["status-errors", client_id]), None)
    }

    /// Status values reported by a device.
    pub fn status_values(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["status-values", client_id]), None)
    }

    /// Sync tokens as the DDM endpoint would serve them to the device.
    pub fn sync_tokens(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["tokens"]), Some(client_id))
    }

    /// Declaration items as the DDM endpoint would serve them to the device.
    pub fn declaration_items(&self, client_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.endpoint(&["declaration-items"]), Some(client_id))
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.api_base.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    fn member_outcome(status: u16, body: String) -> MemberOutcome {
        match status {
            204 => MemberOutcome::Applied,
            304 => MemberOutcome::Unchanged,
            _ => MemberOutcome::Rejected {
                status,
                detail: body,
            },
        }
    }

    fn transport(url: &str, err: &ureq::Error) -> ApiError {
        ApiError::Transport {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }

    fn put_bytes(&self, url: &str, payload: &[u8]) -> ApiResult<(u16, String)> {
        let mut response = self
            .agent
            .put(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send(payload)
            .map_err(|err| Self::transport(url, &err))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| Self::transport(url, &err))?;
        Ok((status, body))
    }

    fn put_query(&self, url: &str, query: (&str, &str)) -> ApiResult<(u16, String)> {
        let mut response = self
            .agent
            .put(url)
            .header("Authorization", &self.auth_header)
            .query(query.0, query.1)
            .send_empty()
            .map_err(|err| Self::transport(url, &err))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| Self::transport(url, &err))?;
        Ok((status, body))
    }

    fn delete(&self, url: &str, query: Option<(&str, &str)>) -> ApiResult<(u16, String)> {
        let mut request = self
            .agent
            .delete(url)
            .header("Authorization", &self.auth_header);
        if let Some((key, value)) = query {
            request = request.query(key, value);
        }
        let mut response = request.call().map_err(|err| Self::transport(url, &err))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| Self::transport(url, &err))?;
        Ok((status, body))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        enrollment_id: Option<&str>,
    ) -> ApiResult<T> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header);
        if let Some(id) = enrollment_id {
            request = request.header("X-Enrollment-ID", id);
        }
        let mut response = request.call().map_err(|err| Self::transport(url, &err))?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|err| Self::transport(url, &err))?;
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        response
            .body_mut()
            .read_json()
            .map_err(|err| Self::transport(url, &err))
    }
}

impl DdmApi for DdmClient {
    fn upsert_declaration(&self, payload: &[u8]) -> ApiResult<PushOutcome> {
        let url = self.endpoint(&["declarations"]);
        let (status, body) = self.put_bytes(&url, payload)?;
        if (200..300).contains(&status) {
            Ok(PushOutcome::Accepted { status })
        } else {
            Ok(PushOutcome::Rejected {
                status,
                detail: body,
            })
        }
    }

    fn add_set_member(&self, set: &str, identifier: &str) -> ApiResult<MemberOutcome> {
        let url = self.endpoint(&["set-declarations", set]);
        let (status, body) = self.put_query(&url, ("declaration", identifier))?;
        Ok(Self::member_outcome(status, body))
    }
}
