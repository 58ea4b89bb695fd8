//! Headless colour feed walkthrough.
//!
//! Loads 201 random colours, pages through a few of them, then shuffles and
//! refreshes the feed, printing what a renderer would have drawn.
//!
//! Run with `RUST_LOG=horizon_feed=debug` to see cell configuration and
//! prefetch announcements. An optional TOML config path may be passed as the
//! first argument.

use horizon_feed::{FeedConfig, FeedController, OutlineFormatOptions, Size};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("horizon_feed=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };

    let mut feed = FeedController::new(config);
    feed.set_viewport(Size::new(390.0, 844.0))?;
    feed.load()?;
    println!("loaded {} pages", feed.page_count());
    let outline = feed.data_source().snapshot().outline();
    println!("{}", outline.format(&OutlineFormatOptions::truncated(5)));

    for page in [1, 2, 3, 2] {
        feed.scroll_to_page(page)?;
        let cell = &feed.visible_cells()[0];
        println!(
            "page {page}: {} (prefetch {:?}, cancel {:?})",
            cell.item,
            feed.last_prefetch().prefetch,
            feed.last_prefetch().cancel
        );
    }

    let diff = feed.shuffle(true)?;
    println!(
        "shuffle: {} moved, {} to animate",
        diff.moved.len(),
        diff.minimal_moves().len()
    );

    feed.refresh(true)?;
    for pass in feed.render_passes() {
        println!("{pass:?}");
    }

    Ok(())
}
