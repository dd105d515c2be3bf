use crate::args::CategoriesArgs;
use crate::commands::Out;
use crate::session::Session;
use crate::{utils, Config, Result};
use anyhow::Context;

/// Lists the categories in a transactions file, in order of first appearance.
///
/// # Errors
/// - Returns an error if the file cannot be opened or is not a valid transactions table.
pub fn categories(config: &Config, args: &CategoriesArgs) -> Result<Out<Vec<String>>> {
    let path = args.file();
    let input = utils::open_input(path)?;
    let mut session = Session::from_config(config);
    session
        .upload(input, &config.ingest_options())
        .with_context(|| format!("Unable to load transactions from {}", path.display()))?;

    let categories: Vec<String> = session
        .categories()
        .into_iter()
        .map(String::from)
        .collect();
    Ok(Out::new(categories.join("\n"), categories))
}
