#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use pickup_planner::http_api;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let addr: SocketAddr = std::env::var("PICKUP_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let planner = load_planner()?;
    http_api::serve(addr, planner).await?;
    Ok(())
}

/// Seed from the sqlite database named by PICKUP_PLANNER_DB when the crate is
/// built with the `sqlite` feature; otherwise start empty.
#[cfg(all(feature = "http_api", feature = "sqlite"))]
fn load_planner() -> Result<pickup_planner::PickupPlanner, Box<dyn std::error::Error>> {
    use pickup_planner::{PickupPlanner, PlannerStore, SqlitePlannerStore};

    match std::env::var("PICKUP_PLANNER_DB") {
        Ok(path) => {
            let store = SqlitePlannerStore::new(&path)?;
            let planner = store.load_planner()?.unwrap_or_default();
            tracing::info!(path, students = planner.student_count(), "planner loaded");
            Ok(planner)
        }
        Err(_) => Ok(PickupPlanner::new()),
    }
}

#[cfg(all(feature = "http_api", not(feature = "sqlite")))]
fn load_planner() -> Result<pickup_planner::PickupPlanner, Box<dyn std::error::Error>> {
    Ok(pickup_planner::PickupPlanner::new())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
