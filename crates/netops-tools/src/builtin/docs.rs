//! Documentation lookup tool

use async_trait::async_trait;
use netops_rag::KnowledgeBase;
use std::sync::Arc;

use crate::error::ToolError;
use crate::schema::{ArgSchema, ArgType, ToolArgs};
use crate::tool::Tool;

pub struct LookupDocsTool {
    knowledge: Arc<KnowledgeBase>,
    top_k: usize,
    schema: ArgSchema,
}

impl LookupDocsTool {
    pub fn new(knowledge: Arc<KnowledgeBase>, top_k: usize) -> Self {
        Self {
            knowledge,
            top_k: top_k.max(1),
            schema: ArgSchema::new().required(
                "query",
                ArgType::String,
                "IP, hostname, or keyword. For example, \"BI\" or \"asw1\"",
            ),
        }
    }
}

#[async_trait]
impl Tool for LookupDocsTool {
    fn name(&self) -> &str {
        "lookup_docs"
    }

    fn description(&self) -> &str {
        "Searches for information in internal documentation: \
         IP addresses, hostnames, descriptions, etc."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn category(&self) -> &str {
        "knowledge"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let query = args.get_str("query")?;
        let passages = self.knowledge.search(query, self.top_k).await?;
        Ok(passages
            .iter()
            .map(|p| format!("[{}]\n{}", p.source, p.text))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
