//! InMemory SessionRegistry 実装
//!
//! ドメイン層が定義する SessionRegistry trait の具体的な実装。
//! token → Session のマップと使用中のユーザー名を 1 つの Mutex で保護します。
//!
//! ロックを保持している間は I/O を行わない。ファンアウトは `snapshot` で
//! ハンドルを複製してから、ロックの外で行う。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use chitchat_shared::{
    clock::{LogicalClock, Timestamp},
    time::WallClock,
};
use tokio::sync::Mutex;

use crate::domain::{
    AuthenticatedSession, Registration, RegistryError, Session, SessionHandle, SessionRegistry,
    SessionSummary, SessionToken, Username,
};

#[derive(Debug, Default)]
struct RegistryState {
    sessions: HashMap<SessionToken, Session>,
    usernames: HashSet<Username>,
}

/// インメモリ SessionRegistry 実装
pub struct InMemorySessionRegistry {
    state: Mutex<RegistryState>,
    /// プロセス全体で共有する論理時計
    clock: Arc<dyn LogicalClock>,
    /// 接続時刻の記録用
    wall_clock: Arc<dyn WallClock>,
    /// 各セッションの送信キューの容量
    queue_capacity: usize,
}

impl InMemorySessionRegistry {
    /// 新しい InMemorySessionRegistry を作成
    pub fn new(
        clock: Arc<dyn LogicalClock>,
        wall_clock: Arc<dyn WallClock>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            clock,
            wall_clock,
            queue_capacity,
        }
    }

    /// 接続中のセッション数
    pub async fn len(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(
        &self,
        username: Username,
        timestamp: Option<Timestamp>,
    ) -> Result<Registration, RegistryError> {
        let mut state = self.state.lock().await;

        if state.usernames.contains(&username) {
            tracing::debug!(username = %username, "username already in use");
            return Err(RegistryError::UsernameTaken(username.into_string()));
        }

        let mut token = SessionToken::generate();
        while state.sessions.contains_key(&token) {
            token = SessionToken::generate();
        }

        let synced = match &timestamp {
            Some(remote) => self.clock.sync(remote),
            None => self.clock.tick(),
        };

        let session = Session::open(
            token.clone(),
            username.clone(),
            self.wall_clock.now_millis(),
            self.queue_capacity,
        );
        state.usernames.insert(username.clone());
        state.sessions.insert(token.clone(), session);

        tracing::debug!(
            username = %username,
            timestamp = %synced,
            sessions = state.sessions.len(),
            "session registered"
        );

        Ok(Registration {
            token,
            username,
            timestamp: synced,
        })
    }

    async fn authenticate(
        &self,
        token: &SessionToken,
    ) -> Result<AuthenticatedSession, RegistryError> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(token)
            .ok_or(RegistryError::Unauthenticated)?;

        // Only one stream per session
        let queue = session
            .take_queue()
            .ok_or(RegistryError::Unauthenticated)?;

        Ok(AuthenticatedSession {
            handle: session.handle().clone(),
            queue,
        })
    }

    async fn remove(&self, token: &SessionToken) -> Option<SessionHandle> {
        let mut state = self.state.lock().await;
        let session = state.sessions.remove(token)?;
        state.usernames.remove(session.username());

        tracing::debug!(
            username = %session.username(),
            sessions = state.sessions.len(),
            "session removed"
        );

        Some(session.into_handle())
    }

    async fn remove_pending(&self, token: &SessionToken) -> Option<SessionHandle> {
        let mut state = self.state.lock().await;
        if !state.sessions.get(token)?.is_pending() {
            return None;
        }
        let session = state.sessions.remove(token)?;
        state.usernames.remove(session.username());

        tracing::debug!(
            username = %session.username(),
            sessions = state.sessions.len(),
            "pending session removed"
        );

        Some(session.into_handle())
    }

    async fn snapshot(&self) -> Vec<SessionHandle> {
        let state = self.state.lock().await;
        state
            .sessions
            .values()
            .map(|session| session.handle().clone())
            .collect()
    }

    async fn list(&self) -> Vec<SessionSummary> {
        let state = self.state.lock().await;
        let mut summaries: Vec<_> = state.sessions.values().map(Session::summary).collect();
        summaries.sort_by(|a, b| a.username.cmp(&b.username));
        summaries
    }
}
