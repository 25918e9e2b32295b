mod hub;
mod ws_handler;

pub use hub::Hub;
pub use ws_handler::ws_handler;
