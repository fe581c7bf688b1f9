use crate::sql::base::{error::ConnectorError, settings::ConnectionSettings};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode};
use tracing::{error, warn};

pub(crate) fn client_config(settings: &ConnectionSettings) -> Result<Config, ConnectorError> {
    let mut config = settings
        .driver_url()
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    if let Some(user) = settings.user() {
        config.user(user);
    }
    if let Some(password) = settings.password() {
        config.password(password);
    }
    Ok(config)
}

pub(crate) async fn connect_client(config: Config) -> Result<Client, ConnectorError> {
    match config.get_ssl_mode() {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Require => connect_with_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

pub(crate) async fn connect_with_tls(config: Config) -> Result<Client, ConnectorError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

pub(crate) async fn connect_without_tls(config: Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_credentials_override_url() {
        let settings = ConnectionSettings::new("postgres://alice@localhost:5432/app")
            .with_property("user", "bob")
            .with_property("password", "secret");
        let config = client_config(&settings).unwrap();
        assert_eq!(config.get_user(), Some("bob"));
        assert_eq!(config.get_password(), Some("secret".as_bytes()));
        assert_eq!(config.get_dbname(), Some("app"));
    }

    #[test]
    fn rejects_malformed_url() {
        let settings = ConnectionSettings::new("postgres://host:notaport/db");
        assert!(matches!(
            client_config(&settings),
            Err(ConnectorError::InvalidUrl(_))
        ));
    }
}
