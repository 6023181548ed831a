//! Infrastructure layer: configuration, storage and external services.

pub mod config;
pub mod db;
pub mod error;
pub mod geocoder;
pub mod mailer;
pub mod repositories;
pub mod uploads;

pub use config::{AppConfig, AppEnv, ConfigError};
pub use error::StoreError;
pub use geocoder::{GeocodeError, Geocoder, MapQuestGeocoder, StaticGeocoder};
pub use mailer::{EmailMessage, LogMailer, MailError, Mailer, RecordingMailer, SmtpMailer};
pub use repositories::{
    BootcampRepository, InMemoryBootcampRepository, InMemoryUserRepository,
    PostgresBootcampRepository, PostgresUserRepository, UserRepository,
};
pub use uploads::PhotoStore;
