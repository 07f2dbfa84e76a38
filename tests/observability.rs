// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ecm::{init_tracing, MatrixConfig};

#[test]
fn init_tracing_does_not_panic() {
    let _guard = init_tracing(&MatrixConfig::default());
}
