//! Set verbs: list, get, add member, remove member.

use anyhow::{Result, bail};

use crate::api::{DdmApi, DdmClient, MemberOutcome};
use crate::ui;

pub fn list(client: &DdmClient) -> Result<()> {
    let sets = client.list_sets()?;
    println!("{}", ui::pretty_json(&serde_json::json!(sets)));
    Ok(())
}

pub fn get(client: &DdmClient, name: &str) -> Result<()> {
    let declarations = client.set_declarations(name)?;
    if declarations.is_empty() {
        println!("No declarations found");
        return Ok(());
    }
    println!("{}", ui::pretty_json(&serde_json::json!(declarations)));
    Ok(())
}

pub fn add(client: &DdmClient, name: &str, identifier: &str) -> Result<()> {
    match client.add_set_member(name, identifier)? {
        MemberOutcome::Applied => {
            ui::success(&format!("{identifier} has been added to set {name}"));
            Ok(())
        }
        MemberOutcome::Unchanged => {
            ui::info(&format!("{identifier} is already in {name}"));
            Ok(())
        }
        MemberOutcome::Rejected { status, detail } => {
            bail!("could not add {identifier} to {name}: HTTP {status}: {detail}")
        }
    }
}

pub fn remove(client: &DdmClient, name: &str, identifier: &str) -> Result<()> {
    match client.remove_set_member(name, identifier)? {
        MemberOutcome::Applied => {
            ui::success(&format!("{identifier} has been removed from set {name}"));
            Ok(())
        }
        MemberOutcome::Unchanged => {
            ui::info(&format!("{identifier} is not in {name}"));
            Ok(())
        }
        MemberOutcome::Rejected { status, detail } => {
            bail!("could not remove {identifier} from {name}: HTTP {status}: {detail}")
        }
    }
}
