use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

// decides how much failure detail reaches API callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DeploymentProfile {
    #[default]
    Development,
    Production,
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "site-api")]
#[command(about = "API server for the marketing site and customer profile area")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "SITE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    // Port to run the server on
    #[arg(short, long, env = "SITE_PORT", default_value_t = 8080)]
    pub port: u16,

    // production hides internal failure messages from callers
    #[arg(long, env = "SITE_PROFILE", value_enum, default_value_t = DeploymentProfile::Development)]
    pub profile: DeploymentProfile,

    // TOML file with [[users]] entries (id, email, name, password_hash)
    #[arg(short, long, env = "SITE_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    // Rate limiter sweep interval in seconds
    #[arg(long, default_value_t = 300)]
    pub cleanup_interval: u64,

    // Session lifetime in seconds
    #[arg(long, env = "SITE_SESSION_TTL", default_value_t = 86_400)]
    pub session_ttl: u64,

    // Take client addresses from x-real-ip / x-forwarded-for
    #[arg(long, env = "SITE_TRUST_FORWARDED")]
    pub trust_forwarded: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            profile: DeploymentProfile::Development,
            users_file: None,
            cleanup_interval: 300,
            session_ttl: 86_400,
            trust_forwarded: false,
        }
    }
}

impl Args {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cleanup_every(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_production_profile() {
        let args = Args::try_parse_from(["site-api", "--profile", "production", "-p", "9000"]).unwrap();
        assert_eq!(args.profile, DeploymentProfile::Production);
        assert_eq!(args.bind_addr().port(), 9000);
    }

    #[test]
    fn cleanup_interval_never_zero() {
        let args = Args {
            cleanup_interval: 0,
            ..Args::default()
        };
        assert_eq!(args.cleanup_every(), Duration::from_secs(1));
    }
}
