pub mod config_service;
pub mod entitlement;
pub mod http_backend;
pub mod paths;
pub mod settings_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::entitlement::WatchEntitlementProvider;
pub use crate::http_backend::HttpGenerationBackend;
pub use crate::paths::TunesmithPaths;
pub use crate::settings_repository::TomlSettingsRepository;
