//! Resolve command - resolves one dotted reference.

use crate::cli::ResolveArgs;
use crate::output::OutputFormat;
use crate::store::open_resolver;

/// Run the resolve command
pub fn run(args: &ResolveArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = open_resolver(&args.store_config)?;
    let value = resolver.resolve_reference(&args.reference);

    match format {
        OutputFormat::Human => println!("{value}"),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "reference": args.reference,
                "value": value,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
