//! # Spotify Integration Module
//!
//! This module contains the two upstream surfaces the relay talks to:
//!
//! - [`auth`] - the accounts service token endpoint. Implements the
//!   authorization-code and refresh-token grants, authenticated with HTTP
//!   Basic credentials built from the client id and secret.
//! - [`player`] - the Web API player endpoints. Implements the relayed
//!   playback commands (seek, play, pause, next, previous, current state)
//!   and the relay orchestration itself: obtain a token from the lifecycle
//!   manager, issue one call, and on 401 force one refresh before one
//!   resend.
//!
//! Both surfaces sit behind traits ([`auth::TokenExchange`],
//! [`player::PlayerApi`]) so the lifecycle and relay logic can be tested
//! against fakes; the production implementations are thin `reqwest`
//! clients.
//!
//! ## Error Mapping
//!
//! Token endpoint rejections become `ExchangeRejected` (code grant, never
//! retried; codes are single-use) or `RefreshDenied` (refresh grant,
//! retried within bounds by the lifecycle manager). Player endpoint
//! rejections other than 401 are passed through verbatim as
//! `UpstreamRejected`; a 204 is success, except for the current-playback
//! query where it means "no active device" and is reported as an
//! informational result rather than a failure.

pub mod auth;
pub mod player;
