use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use std::{env, str::FromStr};

use super::config_model::{BackendServer, Credits, Database, DotEnvyConfig, Supabase};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?,
        body_limit: required("SERVER_BODY_LIMIT")?,
        timeout: required("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        pool_size: optional("DATABASE_POOL_SIZE", 10)?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let daily_login_credits: i64 = optional("DAILY_LOGIN_CREDITS", 10)?;
    let boost_cost_credits: i64 = optional("BOOST_COST_CREDITS", 50)?;
    if daily_login_credits <= 0 || boost_cost_credits <= 0 {
        bail!("DAILY_LOGIN_CREDITS and BOOST_COST_CREDITS must be positive");
    }

    let credits = Credits {
        daily_login_credits,
        boost_cost_credits,
        canonical_offset: canonical_offset(optional("CANONICAL_UTC_OFFSET_HOURS", 0)?)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        credits,
    })
}

pub fn canonical_offset(hours: i32) -> Result<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        bail!("CANONICAL_UTC_OFFSET_HOURS must be within -12..=14, got {hours}");
    }

    FixedOffset::east_opt(hours * 3600)
        .with_context(|| format!("CANONICAL_UTC_OFFSET_HOURS={hours} is not a valid offset"))
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).with_context(|| format!("{key} is not set"))?;
    raw.trim()
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_offset_accepts_real_world_range() {
        assert_eq!(canonical_offset(7).unwrap().local_minus_utc(), 7 * 3600);
        assert_eq!(canonical_offset(-12).unwrap().local_minus_utc(), -12 * 3600);
        assert!(canonical_offset(15).is_err());
        assert!(canonical_offset(-13).is_err());
    }
}
