pub mod asset_service;
pub mod auth_service;
pub mod input;

pub use asset_service::AssetService;
pub use auth_service::AuthService;
pub use input::AssetInput;
