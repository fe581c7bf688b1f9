use crate::error::PollError;
use connectors::{
    error::AdapterError,
    sql::base::error::{ConnectorError, DbError},
};
use engine_core::{
    error::{CheckpointError, SinkError},
    retry::RetryDisposition,
};
use mysql_async::Error as MySqlError;
use tokio_postgres::{Error as PgError, error::SqlState};

pub fn classify_poll_error(err: &PollError) -> RetryDisposition {
    match err {
        PollError::Query { source, .. } => classify_db_error(source),
        PollError::Deliver { source, .. } => classify_sink_error(source),
        PollError::Commit { source, .. } | PollError::Restore(source) => {
            classify_checkpoint_error(source)
        }
        PollError::Build(_) | PollError::Cursor(_) | PollError::Serialize(_) => {
            RetryDisposition::Stop
        }
        PollError::Stopped => RetryDisposition::Stop,
    }
}

pub fn classify_adapter_error(err: &AdapterError) -> RetryDisposition {
    match err {
        AdapterError::Database(db_err) => classify_db_error(db_err),
        AdapterError::Connector(conn_err) => classify_connector_error(conn_err),
        AdapterError::UnsupportedDriver(_) => RetryDisposition::Stop,
    }
}

pub fn classify_db_error(err: &DbError) -> RetryDisposition {
    match err {
        DbError::Io(_) => RetryDisposition::Retry,
        DbError::MySqlError(mysql_err) => classify_mysql_error(mysql_err),
        DbError::PgError(pg_err) => classify_pg_error(pg_err),
        DbError::Utf8(_) => RetryDisposition::Stop,
        DbError::Closed => RetryDisposition::Stop,
        DbError::Unknown(_) => RetryDisposition::Stop,
    }
}

pub fn classify_sink_error(err: &SinkError) -> RetryDisposition {
    match err {
        SinkError::Io(_) | SinkError::Rejected(_) => RetryDisposition::Retry,
        // nobody is listening anymore
        SinkError::Closed => RetryDisposition::Stop,
    }
}

pub fn classify_checkpoint_error(err: &CheckpointError) -> RetryDisposition {
    match err {
        CheckpointError::Read { .. }
        | CheckpointError::Write { .. }
        | CheckpointError::CreateDirectory { .. } => RetryDisposition::Retry,
        CheckpointError::MissingDirectory(_)
        | CheckpointError::Corrupt { .. }
        | CheckpointError::Serialize(_)
        | CheckpointError::TaskJoin(_)
        | CheckpointError::IdentityMismatch { .. } => RetryDisposition::Stop,
    }
}

fn classify_connector_error(err: &ConnectorError) -> RetryDisposition {
    match err {
        ConnectorError::MySql(mysql_err) => classify_mysql_error(mysql_err),
        ConnectorError::Connection(pg_err) => classify_pg_error(pg_err),
        ConnectorError::InvalidUrl(_) => RetryDisposition::Stop,
        ConnectorError::TlsConfig(_) => RetryDisposition::Stop,
    }
}

fn classify_pg_error(err: &PgError) -> RetryDisposition {
    if err.is_closed() {
        return RetryDisposition::Retry;
    }

    match err.code() {
        Some(code) if is_retryable_pg_code(code) => RetryDisposition::Retry,
        Some(_) => RetryDisposition::Stop,
        // no SQLSTATE: connect/io level failure
        None => RetryDisposition::Retry,
    }
}

fn is_retryable_pg_code(code: &SqlState) -> bool {
    matches!(
        *code,
        SqlState::T_R_SERIALIZATION_FAILURE
            | SqlState::T_R_DEADLOCK_DETECTED
            | SqlState::LOCK_NOT_AVAILABLE
            | SqlState::TOO_MANY_CONNECTIONS
            | SqlState::ADMIN_SHUTDOWN
            | SqlState::CRASH_SHUTDOWN
            | SqlState::CANNOT_CONNECT_NOW
            | SqlState::CONNECTION_FAILURE
            | SqlState::CONNECTION_DOES_NOT_EXIST
            | SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION
            | SqlState::CONNECTION_EXCEPTION
            | SqlState::QUERY_CANCELED
    )
}

fn classify_mysql_error(err: &MySqlError) -> RetryDisposition {
    match err {
        MySqlError::Io(_) | MySqlError::Driver(_) => RetryDisposition::Retry,
        MySqlError::Server(server_err) => {
            if is_retryable_mysql_server_error(server_err.code, server_err.state.as_str()) {
                RetryDisposition::Retry
            } else {
                RetryDisposition::Stop
            }
        }
        _ => RetryDisposition::Stop,
    }
}

/// Lock waits, deadlocks, lost connections and connection limits.
fn is_retryable_mysql_server_error(code: u16, state: &str) -> bool {
    const RETRYABLE_CODES: [u16; 8] = [1205, 1213, 2002, 2003, 2006, 2013, 1040, 1042];
    RETRYABLE_CODES.contains(&code) || matches!(state, "40001" | "HYT00" | "08S01")
}
