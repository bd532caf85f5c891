// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Top-level error type for the gateway, mapped to HTTP status codes at the
//! edge. Per-module errors (`lifecycle::LifecycleError`, `accounting::
//! pricing::PricingError`, ...) convert into this via `#[from]`.

use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("mode mismatch: {0}")]
    ModeMismatch(String),

    #[error("no usable device for model {0}")]
    NoUsableDevice(String),

    #[error("insufficient memory to start model {0}")]
    InsufficientMemory(String),

    #[error("start timeout for model {0}")]
    StartTimeout(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("backend error: {0}")]
    BackendError(String),

    #[error("tier conflict: {0}")]
    TierConflict(String),

    #[error("cannot delete last remaining tier")]
    LastTierDeletion,

    #[error("invalid pricing configuration: {0}")]
    PricingInvalid(String),

    #[error("model {0} is still catalogued, refusing to drop accounting data")]
    OrphanProtected(String),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: String,
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::ModelNotFound(_) => "model_not_found",
            GatewayError::ModeMismatch(_) => "mode_mismatch",
            GatewayError::NoUsableDevice(_) => "no_usable_device",
            GatewayError::InsufficientMemory(_) => "insufficient_memory",
            GatewayError::StartTimeout(_) => "start_timeout",
            GatewayError::BackendUnavailable(_) => "backend_unavailable",
            GatewayError::BackendError(_) => "backend_error",
            GatewayError::TierConflict(_) => "tier_conflict",
            GatewayError::LastTierDeletion => "last_tier_deletion",
            GatewayError::PricingInvalid(_) => "pricing_invalid",
            GatewayError::OrphanProtected(_) => "orphan_protected",
            GatewayError::BadRequest(_) => "bad_request",
            GatewayError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ModeMismatch(_)
            | GatewayError::TierConflict(_)
            | GatewayError::LastTierDeletion
            | GatewayError::PricingInvalid(_)
            | GatewayError::OrphanProtected(_)
            | GatewayError::BadRequest(_)
            | GatewayError::NoUsableDevice(_) => StatusCode::BAD_REQUEST,
            GatewayError::InsufficientMemory(_)
            | GatewayError::StartTimeout(_)
            | GatewayError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BackendError(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: self.kind().to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
