//! `td clear-completed` — drop every completed item.

use super::{Context, Session, render_applied};
use todo_core::Intent;

pub fn run_clear_completed(ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx)?;
    let applied = session.apply(Intent::ClearCompleted, ctx.output)?;
    render_applied(ctx, &applied, "Nothing to clear.")
}
