
#[cfg(feature = "postgres")]
mod entities_postgres;
