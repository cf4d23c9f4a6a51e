//! `td count` — how many items are still active.

use super::{Context, Session, items_left};
use crate::output::{pretty_kv, render_mode};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CountReport {
    remaining: usize,
    completed: usize,
    total: usize,
}

pub fn run_count(ctx: &Context) -> anyhow::Result<()> {
    let session = Session::open(ctx)?;
    let remaining = session.store.remaining_count();
    let total = session.store.len();
    let report = CountReport {
        remaining,
        completed: total - remaining,
        total,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}", r.remaining),
        |r, w| {
            writeln!(w, "{}", items_left(r.remaining))?;
            pretty_kv(w, "completed", r.completed.to_string())?;
            pretty_kv(w, "total", r.total.to_string())
        },
    )
}
