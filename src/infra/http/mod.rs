mod middleware;
mod public;
mod revalidate;

pub use public::{HttpState, build_router};
