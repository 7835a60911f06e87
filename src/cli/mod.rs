//! # CLI Module
//!
//! User-facing commands of the `collageify` binary.
//!
//! - [`serve`] - runs the web app, optionally opening it in a browser
//! - [`collage`] - fetches top tracks through a running server's
//!   `/api/getTopTracks` proxy and writes the collage as a PNG
//!
//! Both commands report through the colored `info!`/`success!`/`warning!`/
//! `error!` macros. Diagnostics below the user level go to `tracing`.
//!
//! ```bash
//! collageify serve --open
//! collageify collage --token "$CI_ACCESS_TOKEN" --size 5 --sort-by release_date --list
//! ```

mod collage;
mod serve;

pub use collage::{CollageOptions, collage};
pub use serve::serve;
