//! Eval command - evaluates free text in the scope of a DataSet.

use datasets::DataSource;

use crate::cli::EvalArgs;
use crate::output::OutputFormat;
use crate::store::open_resolver;

/// Run the eval command
pub fn run(args: &EvalArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = open_resolver(&args.store_config)?;
    let source = resolver.source();

    let list = source
        .find_data_set_list(&args.dsl)?
        .ok_or_else(|| format!("DataSetList '{}' not found", args.dsl))?;
    let data_set = source
        .find_data_set(&list.id, &args.dataset)?
        .ok_or_else(|| format!("DataSet '{}' not found in {}", args.dataset, list.name))?;

    let value = resolver.evaluate_text(&data_set.id, &args.text);
    match format {
        OutputFormat::Human => println!("{value}"),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "data_set_list": list.id,
                "data_set": data_set.id,
                "value": value,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
