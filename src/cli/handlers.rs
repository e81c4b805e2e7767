use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AlexandriaError, Result};
use crate::http::{router, AppState};
use crate::storage::{StorageRoot, TemplateStore};

fn make_root(storage_dir: Option<PathBuf>) -> Arc<StorageRoot> {
    match storage_dir {
        Some(dir) => Arc::new(StorageRoot::with_root(dir)),
        None => Arc::new(StorageRoot::new()),
    }
}

pub fn handle_serve(port: u16, storage_dir: Option<PathBuf>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alexandria=info".into()),
        )
        .init();

    let root = make_root(storage_dir);
    let state = AppState::new(root.clone());
    let app = router(state);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            storage_dir = %root.resolve().display(),
            "alexandria template API listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(AlexandriaError::Io)
    })
}

pub fn handle_list(storage_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let store = TemplateStore::new(make_root(storage_dir));
    let outcome = store.load_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.templates)?);
        return Ok(());
    }

    if outcome.templates.is_empty() {
        println!("No templates found in {}", store.root().resolve().display());
    } else {
        for template in &outcome.templates {
            println!(
                "{} ({} entries, updated {})",
                template.name,
                template.entries.len(),
                template.updated_at.as_deref().unwrap_or("unknown"),
            );
        }
    }
    if outcome.skipped > 0 {
        eprintln!("Warning: skipped {} unreadable file(s)", outcome.skipped);
    }

    Ok(())
}

pub fn handle_delete(name: String, storage_dir: Option<PathBuf>) -> Result<()> {
    let store = TemplateStore::new(make_root(storage_dir));
    if store.delete(&name)? {
        println!("Deleted template '{name}'");
        Ok(())
    } else {
        Err(AlexandriaError::NotFound(name))
    }
}
