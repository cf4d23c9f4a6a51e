//! `td delete` — remove an item.

use super::{Context, Session, render_applied};
use clap::Args;
use todo_core::Intent;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Item ID to delete (supports partial IDs).
    pub id: String,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx)?;
    let id = session.resolve_id(&args.id, ctx.output)?;
    let applied = session.apply(Intent::Delete(id.clone()), ctx.output)?;
    render_applied(ctx, &applied, &format!("No matching item: {id}"))
}
