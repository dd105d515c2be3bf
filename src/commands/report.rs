use crate::args::ReportArgs;
use crate::commands::Out;
use crate::render::render;
use crate::session::Session;
use crate::{utils, Config, Result};
use anyhow::Context;
use tracing::debug;

/// Builds the dashboard for a transactions file and renders it.
///
/// Without a file the session stays idle and the output asks for one.
///
/// # Errors
/// - Returns an error if the file cannot be opened or fails to load. Nothing is rendered then.
pub fn report(config: &Config, args: &ReportArgs) -> Result<Out<()>> {
    let mut session = Session::from_config(config);
    if let Some(budget) = args.budget() {
        session.set_budget(budget);
    }

    if let Some(path) = args.file() {
        let input = utils::open_input(path)?;
        session
            .upload(input, &config.ingest_options())
            .with_context(|| format!("Unable to load transactions from {}", path.display()))?;
        if !args.categories().is_empty() {
            session.set_selection(args.categories().iter().cloned());
        }
        session.deselect(args.exclude());
    }

    debug!(
        "Rendering {} as {} with a budget of {}",
        args.section(),
        args.format(),
        session.budget()
    );
    let text = render(&session.view(), args.format(), args.section())?;
    Ok(text.into())
}
