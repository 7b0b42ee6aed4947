// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod rate_limiter;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{client_key, HealthResponse, SearchForm, SuggestParams};
pub use http_server::{create_router, start_server, AppState};
pub use rate_limiter::ClientRateLimiter;
