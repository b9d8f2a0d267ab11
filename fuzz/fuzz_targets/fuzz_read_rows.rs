// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use textrec::{read_rows, Dialect, FieldType, RecordCodec, RecordDefinitionBuilder, RowType};

fuzz_target!(|data: &[u8]| {
    let codec = RecordCodec::default();
    let row_types = [RowType::new(Arc::new(
        RecordDefinitionBuilder::new("Row")
            .field("id", FieldType::Int)
            .set_field("tags", FieldType::Str)
            .dict_field("limits", FieldType::Str, FieldType::Float)
            .build(),
    ))
    .with_prefix("R")];

    let _ = read_rows(data, &row_types, &codec, &Dialect::for_codec(&codec), |_, _| Ok(()));
});
