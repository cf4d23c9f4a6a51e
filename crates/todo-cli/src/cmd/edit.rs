//! `td edit` — replace an item's text. Blank text deletes the item.

use super::{Context, Session, join_words, render_applied};
use clap::Args;
use todo_core::Intent;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Item ID (a unique prefix is enough).
    pub id: String,

    /// New text. Pass "" to delete the item.
    #[arg(required = true, num_args = 1.., value_name = "TEXT", allow_hyphen_values = true)]
    pub text: Vec<String>,
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx)?;
    let id = session.resolve_id(&args.id, ctx.output)?;
    let applied = session.apply(
        Intent::Edit {
            id: id.clone(),
            text: join_words(&args.text),
        },
        ctx.output,
    )?;
    render_applied(ctx, &applied, &format!("No matching item: {id}"))
}
