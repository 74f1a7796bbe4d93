//! Device verbs, all addressed by the configured enrollment ID.

use anyhow::{Result, bail};

use crate::api::{DdmClient, MemberOutcome};
use crate::cli::DeviceCommand;
use crate::config::Config;
use crate::ui;

pub fn run(client: &DdmClient, config: &Config, cmd: DeviceCommand) -> Result<()> {
    let client_id = config.require_client_id()?;

    match cmd {
        DeviceCommand::Sets => {
            let sets = client.device_sets(client_id)?;
            println!("{}", ui::pretty_json(&sets));
            Ok(())
        }
        DeviceCommand::Add { set } => match client.add_device_to_set(client_id, &set)? {
            MemberOutcome::Applied => {
                ui::success(&format!("{client_id} has been added to {set}"));
                Ok(())
            }
            MemberOutcome::Unchanged => {
                ui::info(&format!("{client_id} is already in {set}"));
                Ok(())
            }
            MemberOutcome::Rejected { status, detail } => {
                bail!("could not add {client_id} to {set}: HTTP {status}: {detail}")
            }
        },
        DeviceCommand::Remove { set } => match client.remove_device_from_set(client_id, &set)? {
            MemberOutcome::Applied => {
                ui::success(&format!("{client_id} has been removed from {set}"));
                Ok(())
            }
            MemberOutcome::Unchanged => {
                ui::info(&format!("{client_id} is not in set {set}"));
                Ok(())
            }
            MemberOutcome::Rejected { status, detail } => {
                bail!("could not remove {client_id} from {set}: HTTP {status}: {detail}")
            }
        },
        DeviceCommand::Declarations => {
            let status = client.declaration_status(client_id)?;
            println!("{}", ui::pretty_json(&status));
            Ok(())
        }
        DeviceCommand::Errors => {
            let errors = client.status_errors(client_id)?;
            println!("{}", ui::pretty_json(&errors));
            Ok(())
        }
        DeviceCommand::Values => {
            let values = client.status_values(client_id)?;
            println!("{}", ui::pretty_json(&values));
            Ok(())
        }
        DeviceCommand::Tokens => {
            let tokens = client.sync_tokens(client_id)?;
            println!("{}", ui::pretty_json(&tokens));
            Ok(())
        }
        DeviceCommand::DeclarationItems => {
            let items = client.declaration_items(client_id)?;
            println!("{}", ui::pretty_json(&items));
            Ok(())
        }
    }
}
