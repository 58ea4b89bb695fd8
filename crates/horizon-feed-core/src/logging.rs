//! Logging and debugging facilities for Horizon Feed.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output by subsystem
//! - A perf-span guard for timing operations
//! - An outline formatter for dumping section/item trees in debug logs
//!
//! # Tracing Integration
//!
//! Horizon Feed uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_feed=debug")
//!     .init();
//! ```
//!
//! # Outlines
//!
//! ```
//! use horizon_feed_core::logging::{Outline, OutlineFormatOptions};
//!
//! let mut outline = Outline::new("Snapshot");
//! outline.push_group("main", ["red", "green", "blue"]);
//! let text = outline.format(&OutlineFormatOptions::truncated(2));
//! assert!(text.contains("main (3)"));
//! assert!(text.contains("... 1 more"));
//! ```

use std::fmt::{self, Write as FmtWrite};

/// Span names used throughout Horizon Feed for tracing.
pub mod span_names {
    /// Diff computation span.
    pub const DIFF: &str = "horizon_feed::diff";
    /// Visible range update span.
    pub const LAYOUT: &str = "horizon_feed::layout";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_feed_core::signal";
    /// Performance spans.
    pub const PERF: &str = "horizon_feed::perf";
    /// Snapshot synchronizer target.
    pub const SYNCHRONIZER: &str = "horizon_feed::synchronizer";
    /// Diffable data source target (cell provisioning, prefetch hooks).
    pub const DATA_SOURCE: &str = "horizon_feed::data_source";
    /// Reuse pool target.
    pub const REUSE: &str = "horizon_feed::reuse";
    /// Prefetch scheduler target.
    pub const PREFETCH: &str = "horizon_feed::prefetch";
    /// Feed controller target.
    pub const FEED: &str = "horizon_feed::feed";
}

/// Style options for outline visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// One line per group, children comma-separated.
    Compact,
}

/// Configuration for outline output.
#[derive(Debug, Clone)]
pub struct OutlineFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to print each group's child count after its label.
    pub show_counts: bool,
    /// Maximum children listed per group; the rest are summarized.
    pub max_children: Option<usize>,
}

impl Default for OutlineFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_counts: true,
            max_children: None,
        }
    }
}

impl OutlineFormatOptions {
    /// Options that list at most `max` children per group.
    pub fn truncated(max: usize) -> Self {
        Self {
            max_children: Some(max),
            ..Default::default()
        }
    }
}

/// A two-level tree of labels (groups and their children) for debug output.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    title: String,
    groups: Vec<(String, Vec<String>)>,
}

impl Outline {
    /// Create an empty outline with a title line.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            groups: Vec::new(),
        }
    }

    /// Add a group with its children.
    pub fn push_group<L, C>(&mut self, label: impl Into<String>, children: C)
    where
        L: Into<String>,
        C: IntoIterator<Item = L>,
    {
        self.groups
            .push((label.into(), children.into_iter().map(Into::into).collect()));
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Render the outline.
    pub fn format(&self, options: &OutlineFormatOptions) -> String {
        let mut output = String::new();
        let total: usize = self.groups.iter().map(|(_, c)| c.len()).sum();
        let _ = writeln!(output, "{} ({} groups, {} items):", self.title, self.groups.len(), total);

        if self.groups.is_empty() {
            let _ = writeln!(output, "  (empty)");
            return output;
        }

        let (tee, corner, pipe) = match options.style {
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
            TreeStyle::Compact => ("- ", "- ", "  "),
        };

        for (group_index, (label, children)) in self.groups.iter().enumerate() {
            let last_group = group_index + 1 == self.groups.len();
            output.push_str(if last_group { corner } else { tee });
            output.push_str(label);
            if options.show_counts {
                let _ = write!(output, " ({})", children.len());
            }

            let shown = options.max_children.unwrap_or(children.len()).min(children.len());
            if options.style == TreeStyle::Compact {
                let _ = write!(output, ": {}", children[..shown].join(", "));
                if shown < children.len() {
                    let _ = write!(output, ", ... {} more", children.len() - shown);
                }
                output.push('\n');
                continue;
            }
            output.push('\n');

            let indent = if last_group { "    " } else { pipe };
            for (child_index, child) in children.iter().take(shown).enumerate() {
                let last_child = child_index + 1 == children.len();
                output.push_str(indent);
                output.push_str(if last_child { corner } else { tee });
                output.push_str(child);
                output.push('\n');
            }
            if shown < children.len() {
                let _ = writeln!(output, "{indent}{corner}... {} more", children.len() - shown);
            }
        }

        output
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&OutlineFormatOptions::default()))
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Outline {
        let mut outline = Outline::new("Snapshot");
        outline.push_group("top", ["a", "b", "c"]);
        outline.push_group("bottom", ["d"]);
        outline
    }

    #[test]
    fn test_outline_empty() {
        let output = Outline::new("Snapshot").format(&OutlineFormatOptions::default());
        assert!(output.starts_with("Snapshot (0 groups, 0 items):"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_outline_unicode() {
        let output = sample().to_string();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Snapshot (2 groups, 4 items):");
        assert_eq!(lines[1], "\u{251c}\u{2500}\u{2500} top (3)");
        assert_eq!(lines[2], "\u{2502}   \u{251c}\u{2500}\u{2500} a");
        assert_eq!(lines[4], "\u{2502}   \u{2514}\u{2500}\u{2500} c");
        assert_eq!(lines[5], "\u{2514}\u{2500}\u{2500} bottom (1)");
        assert_eq!(lines[6], "    \u{2514}\u{2500}\u{2500} d");
    }

    #[test]
    fn test_outline_truncated() {
        let output = sample().format(&OutlineFormatOptions::truncated(1));
        assert!(output.contains("... 2 more"));
        assert!(!output.contains("b\n"));
    }

    #[test]
    fn test_outline_compact() {
        let options = OutlineFormatOptions {
            style: TreeStyle::Compact,
            show_counts: false,
            max_children: None,
        };
        let output = sample().format(&options);
        assert!(output.contains("- top: a, b, c"));
        assert!(output.contains("- bottom: d"));

        let truncated = OutlineFormatOptions {
            style: TreeStyle::Compact,
            ..OutlineFormatOptions::truncated(2)
        };
        assert!(sample().format(&truncated).contains("- top (3): a, b, ... 1 more"));
    }

    #[test]
    fn test_perf_span_under_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(format!("{}=info", targets::PERF))
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new("subscribed");
            tracing::info!(target: targets::PERF, groups = sample().group_count(), "outline built");
        });
    }
}
