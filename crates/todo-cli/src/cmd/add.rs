//! `td add` — prepend a new item.

use super::{Context, Session, join_words, render_applied};
use clap::Args;
use todo_core::Intent;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Item text. Multiple words are joined with single spaces.
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true, value_name = "TEXT")]
    pub text: Vec<String>,
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx)?;
    let applied = session.apply(Intent::Add(join_words(&args.text)), ctx.output)?;
    render_applied(ctx, &applied, "Nothing added: text was empty.")
}
