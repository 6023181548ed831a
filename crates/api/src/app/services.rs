use std::sync::Arc;

use anyhow::Context;

use devcamp_auth::Hs256Jwt;
use devcamp_infra::config::AppConfig;
use devcamp_infra::{
    BootcampRepository, Geocoder, InMemoryBootcampRepository, InMemoryUserRepository, LogMailer,
    Mailer, MapQuestGeocoder, PhotoStore, PostgresBootcampRepository, PostgresUserRepository,
    SmtpMailer, StaticGeocoder, UserRepository, db,
};

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppServices {
    pub bootcamps: Arc<dyn BootcampRepository>,
    pub users: Arc<dyn UserRepository>,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
    pub photos: PhotoStore,
    pub jwt: Arc<Hs256Jwt>,
    pub settings: Settings,
}

/// Request-shaping knobs taken from the configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cookie_days: u32,
    pub secure_cookies: bool,
    pub max_upload_bytes: u64,
}

impl AppServices {
    /// In-memory repositories, a static geocoder and a logging mailer.
    pub fn in_memory(jwt_secret: &str, settings: Settings, photos: PhotoStore) -> Self {
        Self {
            bootcamps: Arc::new(InMemoryBootcampRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            geocoder: Arc::new(StaticGeocoder::new()),
            mailer: Arc::new(LogMailer),
            photos,
            jwt: Arc::new(Hs256Jwt::new(
                jwt_secret.as_bytes(),
                chrono::Duration::days(30),
            )),
            settings,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_jwt(mut self, jwt: Hs256Jwt) -> Self {
        self.jwt = Arc::new(jwt);
        self
    }

    /// Wire production services from configuration.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let (bootcamps, users): (Arc<dyn BootcampRepository>, Arc<dyn UserRepository>) =
            match &cfg.database_url {
                Some(url) => {
                    let pool = db::connect(url).await.context("connecting to postgres")?;
                    db::ensure_schema(&pool)
                        .await
                        .context("bootstrapping schema")?;
                    (
                        Arc::new(PostgresBootcampRepository::new(pool.clone())),
                        Arc::new(PostgresUserRepository::new(pool)),
                    )
                }
                None => {
                    tracing::warn!("no database configured; using in-memory store");
                    (
                        Arc::new(InMemoryBootcampRepository::new()),
                        Arc::new(InMemoryUserRepository::new()),
                    )
                }
            };

        let geocoder: Arc<dyn Geocoder> = match &cfg.geocoder.api_key {
            Some(key) => Arc::new(MapQuestGeocoder::new(key.clone()).context("building geocoder")?),
            None => {
                tracing::warn!("GEOCODER_API_KEY not set; addresses will not be geocoded");
                Arc::new(StaticGeocoder::new())
            }
        };

        let mailer: Arc<dyn Mailer> = match &cfg.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp, &cfg.mail_from).context("building mailer")?),
            None => Arc::new(LogMailer),
        };

        let photos = PhotoStore::new(&cfg.uploads.path);
        photos
            .ensure_dir()
            .await
            .with_context(|| format!("creating {}", cfg.uploads.path.display()))?;

        let ttl = chrono::Duration::from_std(cfg.jwt.expire).context("JWT_EXPIRE out of range")?;

        Ok(Self {
            bootcamps,
            users,
            geocoder,
            mailer,
            photos,
            jwt: Arc::new(Hs256Jwt::new(cfg.jwt.secret.as_bytes(), ttl)),
            settings: Settings {
                cookie_days: cfg.jwt.cookie_expire_days,
                secure_cookies: cfg.env.is_production(),
                max_upload_bytes: cfg.uploads.max_bytes,
            },
        })
    }
}
