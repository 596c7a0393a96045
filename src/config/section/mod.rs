//! Configuration section definitions.
//!
//! Each module corresponds to a section in `syncpad.toml`:
//!
//! | Module     | TOML Section   | Purpose                               |
//! |------------|----------------|---------------------------------------|
//! | `document` | `[document]`   | Backing file location                 |
//! | `serve`    | `[serve]`      | HTTP + live-update listener settings  |
//! | `watch`    | `[watch]`      | Change detection and persist timing   |

mod document;
mod serve;
mod watch;

pub use document::DocumentConfig;
pub use serve::ServeConfig;
pub use watch::WatchConfig;
