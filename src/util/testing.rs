//! Test support: one-time logging setup and recruiting-tree builders.

use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::RecruitNode;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["reqwest", "hyper", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pyramid=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Member `id` with the given direct recruits.
pub fn node(id: &str, children: Vec<RecruitNode>) -> RecruitNode {
    RecruitNode::new(id).with_children(children)
}

/// `count` recruits without recruits of their own, ids `{prefix}-0`, `{prefix}-1`, ...
pub fn leaves(prefix: &str, count: usize) -> Vec<RecruitNode> {
    (0..count)
        .map(|i| RecruitNode::new(format!("{prefix}-{i}")))
        .collect()
}

/// Direct recruits of a member whose pyramid is full for `depth` levels.
pub fn ternary(prefix: &str, depth: u32) -> Vec<RecruitNode> {
    if depth == 0 {
        return Vec::new();
    }
    (0..3)
        .map(|i| {
            let id = format!("{prefix}.{i}");
            let children = ternary(&id, depth - 1);
            node(&id, children)
        })
        .collect()
}

/// A single line of `length` members, each recruiting the next.
pub fn chain(prefix: &str, length: usize) -> RecruitNode {
    let mut current = RecruitNode::new(format!("{prefix}-{}", length.saturating_sub(1)));
    for i in (0..length.saturating_sub(1)).rev() {
        current = node(&format!("{prefix}-{i}"), vec![current]);
    }
    current
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_depth_when_building_ternary_then_each_level_is_full() {
        let children = ternary("n", 3);
        let members: usize = children.iter().map(|c| 1 + c.descendant_count()).sum();
        assert_eq!(children.len(), 3);
        assert_eq!(members, 3 + 9 + 27);
    }

    #[test]
    fn given_length_when_building_chain_then_links_in_order() {
        let head = chain("x", 3);
        assert_eq!(head.id, "x-0");
        assert_eq!(head.children[0].id, "x-1");
        assert_eq!(head.children[0].children[0].id, "x-2");
        assert_eq!(head.descendant_count(), 2);
    }
}
