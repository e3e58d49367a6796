//! Configuration sections of `snapsite.toml`.

mod assets;
mod live;
mod output;
mod preview;
mod providers;
mod routes;

pub use assets::AssetMount;
pub use live::{LiveConfig, TransportPolicy};
pub use output::OutputConfig;
pub use preview::PreviewConfig;
pub use providers::ProviderConfig;
pub use routes::RoutesConfig;
