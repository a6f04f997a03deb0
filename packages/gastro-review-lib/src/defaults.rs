pub const LOG_LEVEL: &str = "info";
pub const VERBOSE_LOGGING: bool = false;

pub const DATABASE: &str = "postgres";
pub const POSTGRES_DATABASE: &str = "gastro_review";
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_HOST: &str = "localhost";
pub const POSTGRES_PORT: &str = "5432";
pub const POSTGRES_PASSWORD: &str = "";

pub const RUN_MIGRATIONS: bool = false;

/// Number of rows returned per page by every listing.
pub const PAGE_SIZE: usize = 5;

pub const MAX_DATABASE_CONNECTION_ATTEMPTS: usize = 5;
pub const INITIAL_RETRY_DELAY_SECS: u64 = 2;
pub const MAX_DATABASE_CONNECTIONS: u32 = 10;
