use std::sync::Arc;

use paneql_core::config::DatabaseConfig;
use paneql_core::connection::{establish, ConnectionProvider, ConnectionState, ConnectionTarget};
use paneql_core::query_executor::{QueryBackend, QueryExecutor, RequestId};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::app::{Command, Msg};

#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseSelection {
    Configured(DatabaseConfig),
    Unavailable(String),
}

#[derive(Debug)]
pub enum Inbound<H> {
    App(Msg),
    Connected(ConnectionState<H>),
}

pub struct Session<P: ConnectionProvider> {
    runtime: Handle,
    provider: Arc<P>,
    connection: ConnectionState<P::Handle>,
    tx: UnboundedSender<Inbound<P::Handle>>,
}

impl<P> Session<P>
where
    P: ConnectionProvider + 'static,
{
    pub fn new(runtime: Handle, provider: P) -> (Self, UnboundedReceiver<Inbound<P::Handle>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            runtime,
            provider: Arc::new(provider),
            connection: ConnectionState::Failed {
                target: None,
                reason: "Not connected".to_string(),
            },
            tx,
        };
        (session, rx)
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionState<P::Handle> {
        &self.connection
    }

    pub fn connect(&mut self, selection: DatabaseSelection) -> Msg {
        match selection {
            DatabaseSelection::Configured(config) => {
                let target = ConnectionTarget::from(&config);
                info!(name = %target.name, address = %target.address, "connecting");
                self.connection = ConnectionState::Pending { target };

                let provider = Arc::clone(&self.provider);
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let state = establish(provider.as_ref(), &config).await;
                    deliver(&tx, Inbound::Connected(state));
                });
            }
            DatabaseSelection::Unavailable(reason) => {
                warn!(%reason, "no database to connect to");
                self.connection = ConnectionState::Failed {
                    target: None,
                    reason,
                };
            }
        }
        Msg::Connection(self.connection.summary())
    }

    pub fn receive(&mut self, inbound: Inbound<P::Handle>) -> Msg {
        match inbound {
            Inbound::App(msg) => msg,
            Inbound::Connected(state) => {
                let summary = state.summary();
                self.connection = state;
                Msg::Connection(summary)
            }
        }
    }

    pub async fn close(&self) {
        match &self.connection {
            ConnectionState::Connected { target, handle } => match handle.close().await {
                Ok(()) => info!(name = %target.name, "connection closed"),
                Err(error) => warn!(name = %target.name, %error, "failed to close connection"),
            },
            ConnectionState::Pending { .. } | ConnectionState::Failed { .. } => {}
        }
    }

    pub fn execute(&self, command: Command) {
        match command {
            Command::Post(msg) => deliver(&self.tx, Inbound::App(msg)),
            Command::ExecuteQuery { request_id, sql } => self.spawn_query(request_id, sql),
            Command::LoadTables => self.spawn_table_load(),
        }
    }

    fn executor(&self) -> Result<QueryExecutor<P::Handle>, String> {
        match &self.connection {
            ConnectionState::Connected { handle, .. } => Ok(QueryExecutor::new(handle.clone())),
            ConnectionState::Pending { .. } => Err("Still connecting to the database".to_string()),
            ConnectionState::Failed { reason, .. } => Err(format!("Not connected: {reason}")),
        }
    }

    fn spawn_query(&self, request_id: RequestId, sql: String) {
        let executor = match self.executor() {
            Ok(executor) => executor,
            Err(error) => {
                deliver(&self.tx, Inbound::App(Msg::QueryFailed { request_id, error }));
                return;
            }
        };

        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let msg = match executor.execute(&sql).await {
                Ok(result) => Msg::QueryFinished { request_id, result },
                Err(error) => Msg::QueryFailed {
                    request_id,
                    error: error.to_string(),
                },
            };
            deliver(&tx, Inbound::App(msg));
        });
    }

    fn spawn_table_load(&self) {
        let Ok(executor) = self.executor() else {
            debug!("skipping table refresh without a connection");
            return;
        };

        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let tables = executor
                .list_tables()
                .await
                .map_err(|error| error.to_string());
            deliver(&tx, Inbound::App(Msg::TablesLoaded(tables)));
        });
    }
}

fn deliver<H>(tx: &UnboundedSender<Inbound<H>>, inbound: Inbound<H>) {
    if tx.send(inbound).is_err() {
        debug!("event loop closed; dropping message");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use paneql_core::config::DatabaseConfig;
    use paneql_core::connection::{
        BackendError, ConnectionPhase, ConnectionProvider, ConnectionState,
    };
    use paneql_core::query_executor::{
        QueryBackend, QueryBackendError, RequestSequencer, TabularRows,
    };
    use paneql_core::result_set::CellValue;
    use tokio::runtime::Runtime;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::{DatabaseSelection, Inbound, Session};
    use crate::app::{App, Command, Msg};
    use crate::keys::Key;

    #[derive(Debug, Clone, Default)]
    struct ScriptedBackend {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryBackend for ScriptedBackend {
        async fn run(&self, sql: &str) -> Result<TabularRows, QueryBackendError> {
            if sql == "SHOW TABLES" {
                return Ok(TabularRows {
                    columns: vec!["Tables_in_blog".to_string()],
                    rows: vec![
                        vec![CellValue::from("authors")],
                        vec![CellValue::from("posts")],
                    ],
                });
            }
            if sql.contains("nope") {
                return Err(QueryBackendError::new("Table 'blog.nope' doesn't exist"));
            }
            if sql.contains("slow") {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(TabularRows {
                columns: vec!["sql".to_string()],
                rows: vec![vec![CellValue::from(sql)]],
            })
        }

        async fn close(&self) -> Result<(), QueryBackendError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        refuse: bool,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ConnectionProvider for ScriptedProvider {
        type Handle = ScriptedBackend;

        async fn connect(&self, _config: &DatabaseConfig) -> Result<ScriptedBackend, BackendError> {
            if self.refuse {
                Err(BackendError::new("Connection refused"))
            } else {
                Ok(ScriptedBackend {
                    closed: Arc::clone(&self.closed),
                })
            }
        }
    }

    fn local_config() -> DatabaseConfig {
        DatabaseConfig::new("local", "127.0.0.1", "root")
    }

    fn next_msg(
        session: &mut Session<ScriptedProvider>,
        inbox: &mut UnboundedReceiver<Inbound<ScriptedBackend>>,
    ) -> Msg {
        let inbound = inbox.blocking_recv().expect("channel should stay open");
        session.receive(inbound)
    }

    fn connected_session(
        runtime: &Runtime,
    ) -> (
        Session<ScriptedProvider>,
        UnboundedReceiver<Inbound<ScriptedBackend>>,
    ) {
        let (mut session, mut inbox) =
            Session::new(runtime.handle().clone(), ScriptedProvider::default());
        session.connect(DatabaseSelection::Configured(local_config()));
        match next_msg(&mut session, &mut inbox) {
            Msg::Connection(summary) => assert_eq!(summary.phase, ConnectionPhase::Connected),
            other => panic!("unexpected message {other:?}"),
        }
        (session, inbox)
    }

    #[test]
    fn connect_reports_pending_then_connected() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) =
            Session::new(runtime.handle().clone(), ScriptedProvider::default());

        match session.connect(DatabaseSelection::Configured(local_config())) {
            Msg::Connection(summary) => {
                assert_eq!(summary.phase, ConnectionPhase::Pending);
                assert_eq!(summary.status, "Connecting...");
            }
            other => panic!("unexpected message {other:?}"),
        }
        match next_msg(&mut session, &mut inbox) {
            Msg::Connection(summary) => assert!(summary.is_connected()),
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(
            session.connection(),
            ConnectionState::Connected { .. }
        ));
    }

    #[test]
    fn refused_connection_is_reported_as_failed() {
        let runtime = Runtime::new().expect("runtime");
        let provider = ScriptedProvider {
            refuse: true,
            ..ScriptedProvider::default()
        };
        let (mut session, mut inbox) = Session::new(runtime.handle().clone(), provider);
        session.connect(DatabaseSelection::Configured(local_config()));

        match next_msg(&mut session, &mut inbox) {
            Msg::Connection(summary) => {
                assert_eq!(summary.phase, ConnectionPhase::Failed);
                assert_eq!(summary.status, "Connection refused");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn unavailable_selection_fails_without_spawning() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) =
            Session::new(runtime.handle().clone(), ScriptedProvider::default());

        match session.connect(DatabaseSelection::Unavailable("no databases configured".into())) {
            Msg::Connection(summary) => {
                assert_eq!(summary.phase, ConnectionPhase::Failed);
                assert_eq!(summary.target, None);
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(inbox.try_recv().is_err());
    }

    #[test]
    fn queries_without_a_connection_fail_immediately() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) =
            Session::new(runtime.handle().clone(), ScriptedProvider::default());

        let request_id = RequestSequencer::new().next_id();
        session.execute(Command::ExecuteQuery {
            request_id,
            sql: "SELECT 1".to_string(),
        });

        match next_msg(&mut session, &mut inbox) {
            Msg::QueryFailed { error, .. } => assert!(error.starts_with("Not connected")),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn close_releases_only_a_live_connection() {
        let runtime = Runtime::new().expect("runtime");
        let closed = Arc::new(AtomicUsize::new(0));
        let provider = ScriptedProvider {
            refuse: false,
            closed: Arc::clone(&closed),
        };
        let (mut session, mut inbox) = Session::new(runtime.handle().clone(), provider);

        runtime.block_on(session.close());
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        session.connect(DatabaseSelection::Configured(local_config()));
        next_msg(&mut session, &mut inbox);
        runtime.block_on(session.close());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn table_load_posts_show_tables_output() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) = connected_session(&runtime);

        session.execute(Command::LoadTables);

        assert_eq!(
            next_msg(&mut session, &mut inbox),
            Msg::TablesLoaded(Ok(vec!["authors".to_string(), "posts".to_string()]))
        );
    }

    #[test]
    fn posted_messages_come_back_through_the_channel() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) = connected_session(&runtime);

        session.execute(Command::Post(Msg::FocusQuery));

        assert_eq!(next_msg(&mut session, &mut inbox), Msg::FocusQuery);
    }

    fn preview_selected_table(app: &mut App, session: &Session<ScriptedProvider>) {
        for command in app.update(Msg::Key(Key::Enter)) {
            session.execute(command);
        }
    }

    #[test]
    fn slow_earlier_query_never_overwrites_a_newer_result() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) = connected_session(&runtime);
        let mut app = App::default();
        app.update(Msg::TablesLoaded(Ok(vec![
            "slow".to_string(),
            "posts".to_string(),
        ])));

        preview_selected_table(&mut app, &session);
        app.update(Msg::Key(Key::Down));
        preview_selected_table(&mut app, &session);

        for _ in 0..2 {
            let msg = next_msg(&mut session, &mut inbox);
            for command in app.update(msg) {
                assert_eq!(command, Command::LoadTables);
            }
        }

        let result = app.grid().result().expect("newest result should be shown");
        assert_eq!(result.query, "SELECT * FROM `posts` LIMIT 200");
        assert_eq!(app.in_flight(), None);
    }

    #[test]
    fn failed_query_surfaces_the_backend_message() {
        let runtime = Runtime::new().expect("runtime");
        let (mut session, mut inbox) = connected_session(&runtime);
        let mut app = App::default();
        app.update(Msg::TablesLoaded(Ok(vec!["nope".to_string()])));

        preview_selected_table(&mut app, &session);
        let msg = next_msg(&mut session, &mut inbox);
        app.update(msg);

        assert_eq!(
            app.error(),
            Some("query failed: Table 'blog.nope' doesn't exist")
        );
        assert!(app.grid().result().is_none());
    }
}
