//! `td toggle` — flip an item between active and completed.

use super::{Context, Session, render_applied};
use clap::Args;
use todo_core::Intent;

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Item ID (a unique prefix is enough).
    pub id: String,
}

pub fn run_toggle(args: &ToggleArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx)?;
    let id = session.resolve_id(&args.id, ctx.output)?;
    let applied = session.apply(Intent::Toggle(id.clone()), ctx.output)?;
    render_applied(ctx, &applied, &format!("No matching item: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_args_parses_id() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ToggleArgs,
        }
        let w = Wrapper::parse_from(["test", "td-abc123"]);
        assert_eq!(w.args.id, "td-abc123");
    }
}
