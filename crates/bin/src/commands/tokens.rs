//! Tokens command - shows how the tokenizer splits a text.

use datasets::{MacroRegistry, macros::tokenize};

use crate::cli::TokensArgs;
use crate::output::{OutputFormat, print_table};

/// Run the tokens command
pub fn run(args: &TokensArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let registry = MacroRegistry::builtin();
    let tokens = tokenize(&args.text, &registry);

    match format {
        OutputFormat::Human => {
            if tokens.is_empty() {
                println!("No tokens.");
                return Ok(());
            }
            let rows: Vec<_> = tokens
                .iter()
                .map(|token| vec![format!("{:?}", token.kind), format!("{:?}", token.text)])
                .collect();
            print_table(&["KIND", "TEXT"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = tokens
                .iter()
                .map(|token| {
                    serde_json::json!({
                        "kind": format!("{:?}", token.kind),
                        "text": token.text,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
