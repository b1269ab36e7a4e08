//! JSON-RPC framing for the session channel.
//!
//! Requests are `{id, jsonrpc, method, params}`; responses are
//! `{id, jsonrpc, result}` or `{id, jsonrpc, error}`. The `result` of a
//! successful response is an [`AuthnResponse`].

use serde::{Deserialize, Serialize};

use super::response::AuthnResponse;
use super::service::Service;
use crate::config::JSON_RPC_VERSION;
use crate::error::{FclError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub id: String,
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: String,
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

fn default_jsonrpc() -> String {
    JSON_RPC_VERSION.to_string()
}

impl RpcResponse {
    pub fn result(id: impl Into<String>, response: &AuthnResponse) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            jsonrpc: default_jsonrpc(),
            result: Some(serde_json::to_value(response)?),
            error: None,
        })
    }

    pub fn error(id: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            jsonrpc: default_jsonrpc(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// The wallet's reply. An RPC-level error is a refusal and maps to
    /// `Declined`; a response with neither member is malformed.
    pub fn into_authn_response(self) -> Result<AuthnResponse> {
        if let Some(err) = self.error {
            return Err(FclError::Declined(format!("{} ({})", err.message, err.code)));
        }
        let result = self
            .result
            .ok_or_else(|| FclError::DecodeFailure(format!("response {} has no result", self.id)))?;
        Ok(serde_json::from_value(result)?)
    }
}

pub fn encode_request(id: &str, method: &str, params: Vec<serde_json::Value>) -> Result<Vec<u8>> {
    let request = RpcRequest {
        id: id.to_string(),
        jsonrpc: JSON_RPC_VERSION.to_string(),
        method: method.to_string(),
        params,
    };
    Ok(serde_json::to_vec(&request)?)
}

pub fn decode_request(bytes: &[u8]) -> Result<RpcRequest> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn encode_response(response: &RpcResponse) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

pub fn decode_response(bytes: &[u8]) -> Result<RpcResponse> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn encode_service(service: &Service) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(service)?)
}

pub fn decode_service(bytes: &[u8]) -> Result<Service> {
    Ok(serde_json::from_slice(bytes)?)
}
