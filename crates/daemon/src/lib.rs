// Service modules (HTTP front + process lifecycle)
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

// Settings file
pub mod settings;

// Re-exports for consumers
pub use process::{spawn_service, start_service, ServiceError, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::{State as ServiceState, StateSetupError};
pub use settings::{Settings, SettingsError};
