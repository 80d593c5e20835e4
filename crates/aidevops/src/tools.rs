use serde_json::json;

use crate::models::tool::Tool;

/// A tool whose input is a single required string
fn string_tool(name: &str, description: &str, param: &str, param_description: &str) -> Tool {
    Tool::new(
        name,
        description,
        json!({
            "type": "object",
            "properties": {
                param: {
                    "type": "string",
                    "description": param_description
                }
            },
            "required": [param]
        }),
    )
}

/// The pipeline tools offered to the model on every request, in a fixed order
pub fn pipeline_tools() -> Vec<Tool> {
    vec![
        string_tool(
            "generate_pipeline",
            "Generates a CI/CD pipeline.",
            "pipeline_config",
            "The YAML configuration of the generated pipeline.",
        ),
        string_tool(
            "update_pipeline",
            "Updates a CI/CD pipeline",
            "updated_pipeline_config",
            "The updated YAML configuration of the pipeline.",
        ),
        string_tool(
            "fix_failed_pipeline",
            "Fix a failed pipeline.",
            "suggested_fix",
            "The suggested code fix based on the logs.",
        ),
    ]
}
