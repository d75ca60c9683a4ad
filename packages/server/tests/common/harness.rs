//! Test harnesses.
//!
//! `TestHarness` wires the directory over in-memory stores and a scripted
//! geocoder; it needs nothing external. `PostgresHarness` runs the same
//! code against a real Postgres started once through testcontainers, giving
//! each test its own freshly migrated database.

#![allow(dead_code)]

use anyhow::{Context, Result};
use directory_core::domains::locations::LocationTree;
use directory_core::domains::resources::ResourceFilter;
use directory_core::kernel::{DirectoryDeps, MockGeocoder, TestDependencies};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::us_geography;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// In-memory harness
// =============================================================================

pub struct TestHarness {
    pub deps: DirectoryDeps,
    pub geocoder: Arc<MockGeocoder>,
}

impl TestHarness {
    /// Directory over empty in-memory stores, geocoding from `us_geography()`
    pub fn new() -> Self {
        Self::with_geocoder(us_geography())
    }

    pub fn with_geocoder(geocoder: MockGeocoder) -> Self {
        init_tracing();
        let test_deps = TestDependencies::new().with_geocoder(geocoder);
        let geocoder = test_deps.geocoder.clone();
        Self {
            deps: test_deps.into_deps(),
            geocoder,
        }
    }

    pub fn tree(&self) -> LocationTree {
        self.deps.location_tree()
    }

    pub fn filter(&self) -> ResourceFilter {
        self.deps.resource_filter()
    }
}

// =============================================================================
// Postgres harness
// =============================================================================

/// Container started once and shared by every Postgres test in the binary.
struct SharedTestInfra {
    admin_url: String,
    host: String,
    port: u16,
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;
        let admin_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        Ok(Self {
            admin_url,
            host,
            port,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

pub struct PostgresHarness {
    pub db_pool: PgPool,
    pub deps: DirectoryDeps,
    pub geocoder: Arc<MockGeocoder>,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl PostgresHarness {
    /// Fresh database (created and migrated) inside the shared container
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_name = format!("directory_test_{}", Uuid::new_v4().simple());
        let admin = PgPool::connect(&infra.admin_url)
            .await
            .context("Failed to connect to Postgres")?;
        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await;

        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/{}",
            infra.host, infra.port, db_name
        );
        let db_pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to test database")?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;

        let geocoder = Arc::new(us_geography());
        let deps = DirectoryDeps::postgres(db_pool.clone(), geocoder.clone());

        Ok(Self {
            db_pool,
            deps,
            geocoder,
        })
    }
}
