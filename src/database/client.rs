use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Session;
use crate::database::manager::DatabaseError;
use crate::database::models::{AnalysisProgress, ArtistAnalysis, MetricRecord, Profile, SocialLink};
use crate::database::store::Store;
use crate::types::MetricKind;

/// Who a client acts for. Decides which rows it may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Anonymous,
    User(Uuid),
    /// Service-role access, bypasses row ownership
    Service,
}

/// Hands out database clients over the one long-lived store created at startup
#[derive(Clone)]
pub struct ClientFactory {
    store: Arc<dyn Store>,
    service_role: bool,
}

impl ClientFactory {
    pub fn new(store: Arc<dyn Store>, service_role: bool) -> Self {
        Self { store, service_role }
    }

    /// Request-scoped client bound to the session's principal
    pub fn server(&self, session: &Session) -> DbClient {
        let scope = match session.principal() {
            Some(principal) => Scope::User(principal.id),
            None => Scope::Anonymous,
        };
        DbClient {
            store: self.store.clone(),
            scope,
        }
    }

    /// Like [`ClientFactory::server`], logging whether a session was found.
    /// An anonymous client is still returned; ownership checks reject it later.
    pub fn authenticated(&self, session: &Session) -> DbClient {
        match session.principal() {
            Some(principal) => debug!("Active session found for user {}", principal.id),
            None => info!("No active session found, continuing with anonymous client"),
        }
        self.server(session)
    }

    /// Elevated client for operator, analysis and auth-callback paths
    pub fn service(&self) -> Result<DbClient, DatabaseError> {
        if !self.service_role {
            return Err(DatabaseError::ServiceRoleUnavailable);
        }
        Ok(DbClient {
            store: self.store.clone(),
            scope: Scope::Service,
        })
    }

    pub fn has_service_role(&self) -> bool {
        self.service_role
    }
}

/// Database client enforcing that a principal only reaches rows it owns
#[derive(Clone)]
pub struct DbClient {
    store: Arc<dyn Store>,
    scope: Scope,
}

impl DbClient {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn authorize(&self, owner: Uuid) -> Result<(), DatabaseError> {
        match self.scope {
            Scope::Service => Ok(()),
            Scope::User(id) if id == owner => Ok(()),
            Scope::User(id) => Err(DatabaseError::PermissionDenied(format!(
                "user {} may not access rows owned by {}",
                id, owner
            ))),
            Scope::Anonymous => Err(DatabaseError::PermissionDenied(format!(
                "anonymous client may not access rows owned by {}",
                owner
            ))),
        }
    }

    fn require_service(&self, operation: &str) -> Result<(), DatabaseError> {
        match self.scope {
            Scope::Service => Ok(()),
            _ => Err(DatabaseError::PermissionDenied(format!(
                "{} requires service role access",
                operation
            ))),
        }
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.store.ping().await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        self.authorize(user_id)?;
        self.store.profile(user_id).await
    }

    pub async fn artist_profile(&self, user_id: Uuid) -> Result<Option<Map<String, Value>>, DatabaseError> {
        self.authorize(user_id)?;
        self.store.artist_profile(user_id).await
    }

    /// Social links of the user's artist profile; empty without one
    pub async fn social_links(&self, user_id: Uuid) -> Result<Vec<SocialLink>, DatabaseError> {
        let artist_id = self
            .artist_profile(user_id)
            .await?
            .and_then(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
            .and_then(|id| Uuid::parse_str(&id).ok());

        match artist_id {
            Some(artist_id) => self.store.social_links(artist_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn metrics(&self, user_id: Uuid, kind: MetricKind) -> Result<Vec<MetricRecord>, DatabaseError> {
        self.authorize(user_id)?;
        self.store.metrics(user_id, kind).await
    }

    pub async fn insert_metric(&self, user_id: Uuid, record: &MetricRecord) -> Result<(), DatabaseError> {
        self.authorize(user_id)?;
        self.store.insert_metric(user_id, record).await
    }

    /// Progress records are keyed by an opaque id and readable by anyone holding it
    pub async fn load_progress(&self, id: &str) -> Result<Option<AnalysisProgress>, DatabaseError> {
        self.store.load_progress(id).await
    }

    pub async fn save_progress(&self, record: &AnalysisProgress) -> Result<(), DatabaseError> {
        self.require_service("writing analysis progress")?;
        self.store.save_progress(record).await
    }

    pub async fn purge_progress(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        self.require_service("purging analysis progress")?;
        self.store.purge_progress(cutoff).await
    }

    pub async fn save_analysis(&self, analysis: &ArtistAnalysis) -> Result<(), DatabaseError> {
        self.require_service("saving analyses")?;
        self.store.save_analysis(analysis).await
    }

    pub async fn claim_analysis(&self, id: &str, user_id: Uuid) -> Result<bool, DatabaseError> {
        self.require_service("claiming analyses")?;
        self.store.claim_analysis(id, user_id).await
    }

    pub async fn ensure_progress_table(&self) -> Result<(), DatabaseError> {
        self.require_service("creating the progress table")?;
        self.store.ensure_progress_table().await
    }

    pub async fn apply_schema(&self) -> Result<(), DatabaseError> {
        self.require_service("applying the schema")?;
        self.store.apply_schema().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use crate::database::memory::MemoryStore;

    fn factory(service_role: bool) -> ClientFactory {
        ClientFactory::new(Arc::new(MemoryStore::new()), service_role)
    }

    fn session_for(id: Uuid) -> Session {
        Session::authenticated(Principal {
            id,
            email: None,
            role: "authenticated".into(),
        })
    }

    #[tokio::test]
    async fn user_clients_only_reach_their_own_rows() {
        let me = Uuid::new_v4();
        let client = factory(false).server(&session_for(me));

        assert!(client.metrics(me, MetricKind::Production).await.is_ok());
        let err = client
            .metrics(Uuid::new_v4(), MetricKind::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn anonymous_clients_are_usable_but_rejected_on_owned_rows() {
        let client = factory(false).authenticated(&Session::anonymous());
        assert_eq!(client.scope(), Scope::Anonymous);
        assert!(client.ping().await.is_ok());
        assert!(client.profile(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn service_clients_need_the_credential() {
        assert!(matches!(
            factory(false).service(),
            Err(DatabaseError::ServiceRoleUnavailable)
        ));

        let service = factory(true).service().unwrap();
        assert!(service.profile(Uuid::new_v4()).await.unwrap().is_none());
        assert!(service.ensure_progress_table().await.is_ok());
    }

    #[tokio::test]
    async fn progress_writes_are_service_only() {
        let me = Uuid::new_v4();
        let client = factory(true).server(&session_for(me));
        let record = AnalysisProgress::started("x", None, 120_000);
        assert!(client.save_progress(&record).await.is_err());
    }
}
