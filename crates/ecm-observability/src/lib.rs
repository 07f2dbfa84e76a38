// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm-observability
//!
//! Tracing subscriber setup for the extracellular matrix substrate. A
//! deliberately narrower cut of the teacher's `feagi-observability`: this
//! is an embeddable library, not a deployed service, so there is no
//! per-crate file rotation, no metrics exporter, no OpenTelemetry — just a
//! `tracing_subscriber::fmt` layer on stdout, filtered by `RUST_LOG` with a
//! sane fallback. Callers embedding `ecm` in a larger process are free to
//! install their own subscriber instead; `ecm` itself never reaches for
//! `println!`/`eprintln!`.

use tracing_subscriber::{fmt, EnvFilter};

use ecm_config::MatrixConfig;

/// Default filter directive used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "ecm=info";

/// Handle returned by [`init_tracing`]. Dropping it has no effect beyond
/// the ordinary `Drop` of its fields; it exists so call sites have
/// something to hold (mirroring the teacher's `LoggingGuard`, minus the
/// file-appender worker guards this crate has no use for).
pub struct LoggingGuard {
    _private: (),
}

/// Installs a process-global `tracing` subscriber appropriate for
/// embedding the substrate: human-readable output on stdout, filtered by
/// `RUST_LOG` if set, otherwise `ecm=info`.
///
/// Idempotent: a second call (e.g. from multiple `Matrix::new` instances
/// in one process, or repeated test setup) is a harmless no-op rather
/// than a panic — `tracing`'s global subscriber can only be set once per
/// process, and callers that already installed their own subscriber
/// should not have it clobbered.
pub fn init_tracing(_config: &MatrixConfig) -> LoggingGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    LoggingGuard { _private: () }
}
