//! Declaration verbs: list, create, get, delete, set membership.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::api::{DdmApi, DdmClient, PushOutcome};
use crate::ui;

pub fn list(client: &DdmClient) -> Result<()> {
    for identifier in client.list_declarations()? {
        println!("{identifier}");
    }
    Ok(())
}

/// Upsert a declaration from a JSON file on disk. The payload is relayed
/// byte-for-byte; the server is the only schema authority.
pub fn create(client: &DdmClient, path: &Path) -> Result<()> {
    let payload =
        fs::read(path).with_context(|| format!("could not read {}", path.display()))?;

    ui::info(&format!("Creating declaration from {}", path.display()));
    match client.upsert_declaration(&payload)? {
        PushOutcome::Accepted { status } => {
            ui::success(&format!("Declaration stored (HTTP {status})"));
            Ok(())
        }
        PushOutcome::Rejected { status, detail } => {
            bail!("server rejected {}: HTTP {status}: {detail}", path.display())
        }
    }
}

pub fn get(client: &DdmClient, identifier: &str) -> Result<()> {
    let declaration = client.get_declaration(identifier)?;
    println!("{}", ui::pretty_json(&declaration));
    Ok(())
}

pub fn delete(client: &DdmClient, identifier: &str) -> Result<()> {
    let body = client.delete_declaration(identifier)?;
    if body.trim().is_empty() {
        ui::success(&format!("Deleted declaration {identifier}"));
    } else {
        println!("{body}");
    }
    Ok(())
}

/// List the sets a declaration belongs to, after verifying the identifier
/// exists at all.
pub fn sets(client: &DdmClient, identifier: &str) -> Result<()> {
    let known = client.list_declarations()?;
    if !known.iter().any(|candidate| candidate == identifier) {
        bail!("{identifier} is not a valid declaration");
    }

    ui::info(&format!("Set membership for {identifier}"));
    let membership = client.declaration_sets(identifier)?;
    println!("{}", ui::pretty_json(&serde_json::json!(membership)));
    Ok(())
}
