//! Tree command - prints the resolved tree of a DataSetList.

use datasets::{
    DataSource,
    tree::{ResolvedAttribute, ResolvedTree},
};

use crate::cli::TreeArgs;
use crate::output::{OutputFormat, print_table};
use crate::store::open_resolver;

/// Run the tree command
pub fn run(args: &TreeArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = open_resolver(&args.store_config)?;
    let list = resolver
        .source()
        .find_data_set_list(&args.dsl)?
        .ok_or_else(|| format!("DataSetList '{}' not found", args.dsl))?;

    let tree = resolver.build_tree(&list.id)?;
    tracing::info!(
        "Resolved {} with {} columns",
        tree.name,
        tree.data_sets.len()
    );

    match format {
        OutputFormat::Human => print_tree(&tree),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
    }

    Ok(())
}

fn print_tree(tree: &ResolvedTree) {
    if tree.attributes.is_empty() {
        println!("{} has no attributes.", tree.name);
        return;
    }

    let mut headers = vec!["ATTRIBUTE", "TYPE"];
    headers.extend(tree.data_sets.iter().map(|header| header.name.as_str()));

    let mut rows = Vec::new();
    for attribute in &tree.attributes {
        collect_rows(tree, attribute, 0, &mut rows);
    }
    print_table(&headers, &rows);
}

/// One row per attribute, children indented under their group.
fn collect_rows(
    tree: &ResolvedTree,
    attribute: &ResolvedAttribute,
    depth: usize,
    rows: &mut Vec<Vec<String>>,
) {
    let mut row = vec![
        format!("{}{}", "  ".repeat(depth), attribute.name),
        attribute.kind.to_string(),
    ];
    for header in &tree.data_sets {
        let value = attribute
            .value_in(&header.id)
            .and_then(|value| {
                let text = value.value.clone()?;
                Some(if value.overlap { format!("{text} *") } else { text })
            })
            .unwrap_or_default();
        row.push(value);
    }
    rows.push(row);

    for child in &attribute.children {
        collect_rows(tree, child, depth + 1, rows);
    }
}
