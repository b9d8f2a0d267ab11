// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use textrec::{resolve, HashMapRecordRegistry, TypeExpr};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(expr) = TypeExpr::parse(text) {
        // Display output parses back to the same tree
        assert_eq!(TypeExpr::parse(&expr.to_string()).ok().as_ref(), Some(&expr));
        let _ = resolve(&expr, &HashMapRecordRegistry::new());
    }
});
