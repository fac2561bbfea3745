//! Fuzz target for the JSON filter and sort mode parsers.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use rolodex_query::{FilterNode, SortMode};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(Some(filter)) = FilterNode::from_optional_json(&json) {
        // A parsed filter survives its own serialization
        let reparsed = FilterNode::from_json(&filter.to_json()).expect("round trip");
        assert_eq!(filter, reparsed);
        let _ = filter.attribute_names();
    }

    let _ = SortMode::from_json(&json);
});
