pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod panel;
pub mod registry;
pub mod schema;
pub mod viewport;
pub mod wire;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Selection};
pub use error::{ConfigError, FetchError, PanelError, SubmitError, ValidationError};
pub use panel::{Disposition, ForecastPanel, ForecastStatus, ForecastTicket, PanelId};
pub use registry::{Topic, TopicId};
pub use viewport::{ViewportController, ViewportEffect};
