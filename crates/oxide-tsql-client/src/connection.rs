//! Connection establishment and capability introspection.

use oxide_tsql_core::Capabilities;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::error::Result;

/// A connected SQL Server client over a plain TCP transport.
pub type MssqlClient = tiberius::Client<Compat<TcpStream>>;

/// Connection parameters for a SQL Server instance.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Server host name or address.
    pub host: String,
    /// TCP port (1433 by default).
    pub port: u16,
    /// Initial database; empty selects the login default.
    pub database: String,
    /// SQL Server login name.
    pub username: String,
    /// SQL Server login password.
    pub password: String,
    /// Accept the server certificate without validation.
    pub trust_cert: bool,
}

impl ConnectOptions {
    /// Creates options for `host:1433` with empty credentials.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 1433,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            trust_cert: false,
        }
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the initial database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

/// Opens a TCP connection and performs the TDS handshake.
pub async fn connect(options: &ConnectOptions) -> Result<MssqlClient> {
    let mut config = tiberius::Config::new();
    config.host(&options.host);
    config.port(options.port);
    config.authentication(tiberius::AuthMethod::sql_server(
        &options.username,
        &options.password,
    ));
    if options.trust_cert {
        config.trust_cert();
    }
    if !options.database.is_empty() {
        config.database(&options.database);
    }

    let tcp = TcpStream::connect((options.host.as_str(), options.port)).await?;
    tcp.set_nodelay(true)?;

    debug!(host = %options.host, port = options.port, "connecting to SQL Server");
    let client = tiberius::Client::connect(config, tcp.compat_write()).await?;
    Ok(client)
}

/// Queries the server version and builds the capability record the
/// compilers consume. Called once per connection.
pub async fn introspect(client: &mut MssqlClient) -> Result<Capabilities> {
    let stream = client
        .simple_query("SELECT CAST(SERVERPROPERTY('ProductMajorVersion') AS int)")
        .await?;
    let row = stream.into_row().await?;
    let major = row.and_then(|r| r.get::<i32, _>(0)).unwrap_or(0);
    let tier = version_tier(major);
    debug!(major, tier, "introspected engine version");
    Ok(Capabilities::for_version(tier))
}

/// Maps a product major version to the year tier the capability record is
/// keyed by.
fn version_tier(major: i32) -> u16 {
    match major {
        i32::MIN..=8 => 2000,
        9 => 2005,
        10 => 2008,
        11 => 2012,
        12 => 2014,
        13 => 2016,
        14 => 2017,
        15 => 2019,
        _ => 2022,
    }
}
