// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use textrec::{FieldType, RecordCodec};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let codec = RecordCodec::default();

    // Undeclared decode always yields a value
    assert!(codec.parse_value(text, None).is_ok());

    // Declared decode may fail but must not panic
    let types = [
        FieldType::Int,
        FieldType::Float,
        FieldType::optional(FieldType::Bool),
        FieldType::list(FieldType::set(FieldType::Int)),
        FieldType::tuple(vec![FieldType::Str, FieldType::Float]),
        FieldType::dict(FieldType::Str, FieldType::list(FieldType::Str)),
    ];
    for ty in &types {
        if let Ok(value) = codec.parse_value(text, Some(ty)) {
            let _ = codec.format_value(&value, Some(ty));
        }
    }
});
