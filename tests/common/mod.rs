#![allow(dead_code, unused_imports)]

pub use folderwatch_test_utils::builders;
pub use folderwatch_test_utils::fake_sink;
pub use folderwatch_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use folderwatch::FileMatcher;
use folderwatch::matcher::FileMatcherBuilder;

/// Build a shared matcher, panicking on invalid rules.
pub fn matcher(builder: FileMatcherBuilder) -> Arc<FileMatcher> {
    Arc::new(builder.build().expect("valid matcher"))
}
