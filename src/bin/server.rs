//! `drivecored`: process entrypoint wiring the catalog, object store, job
//! cache, and upload/download engines together, then starting the download
//! worker pool. The RPC/HTTP gateway itself lives outside this crate; this
//! binary only brings the storage core up and keeps it running.

use std::sync::Arc;

use clap::Parser;
use drivecore::catalog::CatalogStore;
use drivecore::config::Settings;
use drivecore::download::{DownloadOrchestrator, DownloadWorkerPool};
use drivecore::job_cache::{JobCache, RedisJobCache};
use drivecore::object_store::{ObjectAdapter, S3ObjectAdapter};
use drivecore::upload::UploadCoordinator;
use tracing::info;

#[derive(Parser)]
#[command(name = "drivecored", about = "File-storage core daemon")]
struct Args {
    /// Path to a TOML settings file; equivalent to DRIVECORE_CONFIG.
    #[arg(long, env = "DRIVECORE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = args.config {
        std::env::set_var("DRIVECORE_CONFIG", path);
    }
    let settings = Settings::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("drivecore={}", settings.log_level)));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(database_url = %settings.database_url, "connecting to catalog");
    let catalog = Arc::new(CatalogStore::connect(&settings.database_url).await?);
    catalog.migrate().await?;

    info!(redis_url = %settings.redis_url, "connecting to job cache");
    let job_cache: Arc<dyn JobCache> = Arc::new(RedisJobCache::connect(&settings.redis_url).await?);

    info!(bucket = %settings.object_store_bucket, "connecting to object store");
    let objects: Arc<dyn ObjectAdapter> = if let Some(endpoint) = &settings.object_store_endpoint {
        let base = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let config = base.to_builder().endpoint_url(endpoint).build();
        Arc::new(S3ObjectAdapter::new(&config, &settings.object_store_bucket))
    } else {
        Arc::new(S3ObjectAdapter::from_env(&settings.object_store_bucket).await)
    };

    let _upload = UploadCoordinator::new(catalog.clone(), objects.clone(), job_cache.clone());
    let _download = DownloadOrchestrator::new(catalog.clone(), job_cache.clone());

    std::fs::create_dir_all(&settings.staging_root)?;
    let worker_pool = DownloadWorkerPool::new(
        job_cache.clone(),
        objects.clone(),
        settings.staging_root.clone(),
        settings.download_workers,
    );
    let handles = worker_pool.spawn();
    info!(workers = settings.download_workers, "download worker pool started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining download workers");
    worker_pool.shutdown();
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
