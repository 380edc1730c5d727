//! Text passes that rewrite the page's HTML in place or into derived copies.

pub mod deploy_paths;
pub mod inline;
pub mod lazy;
pub mod references;
pub mod substitute;
