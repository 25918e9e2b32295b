pub use huddle_core::model::PeerId;

pub mod model {
    pub use huddle_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use huddle_client::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use huddle_server::*;
}
