//! Output formatting for assistantctl.

use crate::cli::OutputFormat;
use crate::error::CliError;
use colored::*;
use orchestrator_core::types::{AssistantResponse, ResponseType};
use tabled::{Table, Tabled};

/// Display the answer to one assistant query.
pub fn display_query_result(response: &AssistantResponse, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            match response.response_type {
                ResponseType::Error => {
                    println!("{}", "Error".red().bold());
                    if let Some(ref error_type) = response.error_type {
                        println!("{:<12} {}", "Type:".bold(), error_type);
                    }
                    println!("{}", response.text_response);
                    return Ok(());
                }
                ResponseType::ClarificationNeeded => {
                    println!("{}", "Clarification needed".yellow().bold());
                }
                ResponseType::OutOfScope => {
                    println!("{}", "Out of scope".yellow().bold());
                }
                ResponseType::Text | ResponseType::TextAndGraph => {}
            }

            println!("{}", response.text_response);

            if let Some(ref graph) = response.graph_data {
                if !graph.nodes.is_empty() {
                    println!();
                    println!("{}", "Nodes:".bold().blue());
                    let rows: Vec<NodeTableRow> = graph
                        .nodes
                        .iter()
                        .map(|n| NodeTableRow {
                            id: n.id.to_string(),
                            name: n.name.clone(),
                            node_type: n.node_type.clone(),
                            description: n.description.clone(),
                        })
                        .collect();
                    println!("{}", Table::new(rows));
                }

                if !graph.edges.is_empty() {
                    println!();
                    println!("{}", "Edges:".bold().blue());
                    let rows: Vec<EdgeTableRow> = graph
                        .edges
                        .iter()
                        .map(|e| EdgeTableRow {
                            source: e.source.to_string(),
                            label: e.label.clone(),
                            target: e.target.to_string(),
                        })
                        .collect();
                    println!("{}", Table::new(rows));
                }
            }

            if !response.sources.is_empty() {
                println!();
                println!("{}", "Sources:".bold().blue());
                for source in &response.sources {
                    println!("  - {} ({})", source.note_title, source.note_id);
                }
            }

            if !response.executed_actions.is_empty() {
                println!();
                println!("{}", format!("Actions: {}", response.executed_actions.join(" -> ")).dimmed());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(response)
                .map_err(|e| CliError::Request(format!("failed to serialize response: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct NodeTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct EdgeTableRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Target")]
    target: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestrator_core::types::AssistantResponse;

    #[test]
    fn table_format_does_not_error_on_a_plain_text_response() {
        let response = AssistantResponse {
            response_type: ResponseType::Text,
            error_type: None,
            text_response: "A goblin warband raided the outpost.".to_string(),
            graph_data: None,
            sources: vec![],
            executed_actions: vec!["search_notes".to_string()],
            debug_info: None,
        };
        assert!(display_query_result(&response, &OutputFormat::Table).is_ok());
    }
}
