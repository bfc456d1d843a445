use std::io::IsTerminal;

use dialoguer::Confirm;

use crate::app::AppContext;
use crate::cli::ResetArgs;
use crate::errors::CliError;

pub fn handle_reset(ctx: &AppContext, args: &ResetArgs) -> anyhow::Result<()> {
    if !args.yes {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::invalid_input(
                "Refusing to reset without confirmation; pass --yes",
            )
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt("Delete all notes and the encryption key?")
            .default(false)
            .interact()?;
        if !confirmed {
            if !ctx.quiet() {
                println!("status=cancelled");
            }
            return Ok(());
        }
    }

    let service = ctx.open_service()?;
    let before = service.repository().count()?;
    service.reset_vault()?;
    service.close()?;

    if !ctx.quiet() {
        println!("status=ok");
        println!("deleted={}", before);
    }
    Ok(())
}
