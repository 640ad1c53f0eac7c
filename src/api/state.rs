//! Shared application state
//!
//! The router only sees the service traits, so the same routes run over
//! PostgreSQL in production and over the in-memory backend in tests.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService};
use crate::handlers::{AuthService, Authenticator, PaymentEngine, Payments, ReportAssembler, Reports};
use crate::store::{MemoryStore, PgAccountStore, PgCatalogStore, PgLedgerStore, PgTransactor};

/// Services available to request handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn Authenticator>,
    pub payments: Arc<dyn Payments>,
    pub reports: Arc<dyn Reports>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn Authenticator>,
        payments: Arc<dyn Payments>,
        reports: Arc<dyn Reports>,
    ) -> Self {
        Self {
            auth,
            payments,
            reports,
        }
    }

    /// Services backed by PostgreSQL
    pub fn postgres(pool: PgPool, hasher: PasswordHasher, tokens: TokenService) -> Self {
        let accounts = PgAccountStore::new(pool.clone());
        let catalog = PgCatalogStore::new(pool.clone());

        let payments = PaymentEngine::new(
            PgTransactor::new(pool.clone()),
            accounts.clone(),
            catalog.clone(),
            PgLedgerStore,
        );
        let reports = ReportAssembler::new(
            PgTransactor::read_only_snapshot(pool),
            accounts.clone(),
            catalog,
            PgLedgerStore,
        );
        let auth = AuthService::new(accounts, hasher, tokens);

        Self::new(Arc::new(auth), Arc::new(payments), Arc::new(reports))
    }

    /// Services backed by the in-memory store
    pub fn in_memory(store: MemoryStore, hasher: PasswordHasher, tokens: TokenService) -> Self {
        let payments = PaymentEngine::new(store.clone(), store.clone(), store.clone(), store.clone());
        let reports = ReportAssembler::new(store.clone(), store.clone(), store.clone(), store.clone());
        let auth = AuthService::new(store, hasher, tokens);

        Self::new(Arc::new(auth), Arc::new(payments), Arc::new(reports))
    }
}
