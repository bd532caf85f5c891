// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::devices::DeviceSnapshot;
use crate::http::state::AppState;

#[derive(Serialize)]
pub struct DeviceInfo {
    online: bool,
    snapshot: DeviceSnapshot,
}

pub async fn info(State(state): State<AppState>) -> Json<HashMap<String, DeviceInfo>> {
    let statuses = state.devices.all_status().await;
    let out = statuses
        .into_iter()
        .map(|(id, (online, snapshot))| (id, DeviceInfo { online, snapshot }))
        .collect();
    Json(out)
}
