//! `td list` — show items under a filter.

use super::{Context, Session, items_left};
use crate::output::{CliError, OutputMode, pretty_rule, render_error, render_mode, write_rows};
use clap::Args;
use std::io::{self, Write};
use todo_core::error::ErrorCode;
use todo_core::{Filter, Intent, View};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which items to show: all, active, completed.
    #[arg(short, long)]
    pub filter: Option<String>,
}

fn parse_filter(raw: Option<&str>, output: OutputMode) -> anyhow::Result<Filter> {
    let Some(raw) = raw else {
        return Ok(Filter::All);
    };
    match raw.parse::<Filter>() {
        Ok(filter) => Ok(filter),
        Err(e) => {
            render_error(output, &CliError::from_code(e.to_string(), ErrorCode::InvalidFilter))?;
            Err(e.into())
        }
    }
}

fn write_text(view: &View<'_>, w: &mut dyn Write) -> io::Result<()> {
    write_rows(w, &view.items, OutputMode::Text)?;
    writeln!(w, "{}", items_left(view.remaining))
}

fn write_pretty(view: &View<'_>, w: &mut dyn Write) -> io::Result<()> {
    if view.items.is_empty() {
        let what = match view.filter {
            Filter::All => "Nothing to do.",
            Filter::Active => "No active items.",
            Filter::Completed => "No completed items.",
        };
        writeln!(w, "{what}")?;
    } else {
        write_rows(w, &view.items, OutputMode::Pretty)?;
    }
    pretty_rule(w)?;
    writeln!(
        w,
        "{}  ·  showing {}  ·  {} total",
        items_left(view.remaining),
        view.filter,
        view.total
    )
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let filter = parse_filter(args.filter.as_deref(), ctx.output)?;
    let mut session = Session::open(ctx)?;
    session.apply(Intent::SetFilter(filter), ctx.output)?;
    let view = session.store.view();
    render_mode(ctx.output, &view, write_text, write_pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::{MemoryStore, TodoStore};

    fn render_to_string(
        f: impl FnOnce(&View<'_>, &mut dyn Write) -> io::Result<()>,
        view: &View<'_>,
    ) -> String {
        let mut buf = Vec::new();
        f(view, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn list_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.filter.is_none());
        let w = Wrapper::parse_from(["test", "-f", "done"]);
        assert_eq!(w.args.filter.as_deref(), Some("done"));
    }

    #[test]
    fn parse_filter_defaults_to_all() {
        assert_eq!(parse_filter(None, OutputMode::Json).unwrap(), Filter::All);
        assert_eq!(
            parse_filter(Some("active"), OutputMode::Json).unwrap(),
            Filter::Active
        );
        assert!(parse_filter(Some("later"), OutputMode::Json).is_err());
    }

    #[test]
    fn text_view_lists_rows_and_footer() {
        let mut store = TodoStore::open(MemoryStore::new()).unwrap();
        store.add("buy milk").unwrap();
        let out = render_to_string(write_text, &store.view());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  STATUS  TEXT");
        assert!(lines[1].ends_with("active  buy milk"));
        assert_eq!(lines[2], "1 item left");
    }

    #[test]
    fn pretty_view_reports_empty_filter() {
        let mut store = TodoStore::open(MemoryStore::new()).unwrap();
        store.add("buy milk").unwrap();
        store.set_filter(Filter::Completed);
        let out = render_to_string(write_pretty, &store.view());
        assert!(out.starts_with("No completed items.\n"));
        assert!(out.contains("1 item left  ·  showing completed  ·  1 total"));
    }
}
