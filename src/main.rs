//! # media-foldering CLI
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! media-foldering organize --input ~/Inbox --output ~/Pictures
//! media-foldering organize --config settings.json --dry-run --format json
//! media-foldering resolve ~/Inbox/clip.mov
//! ```

mod cli;

use media_foldering::Result;

fn main() -> Result<()> {
    cli::run()
}
