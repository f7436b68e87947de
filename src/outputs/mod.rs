//! Output of scraped box scores.
//!
//! # Submodules
//!
//! - [`json`]: per-day JSON cache files, one per source directory
//!
//! # Output Structure
//!
//! ```text
//! cbs_stats/
//! ├── a20230717.json
//! └── a20230718.json
//!
//! br_stats/
//! └── a20230426.json
//! ```
//!
//! Each file maps game id to that game's box score.

pub mod json;
