pub mod auth;
pub mod domain;
pub mod normalize;
pub mod storage;

pub mod config {
    const DEFAULT_DATABASE_URL: &str = "sqlite://reports.db";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Falls back to the local report database file when DATABASE_URL is unset.
        pub fn database_url(&self) -> &str {
            self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
        }
    }
}
