//! Web research command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Research a product with the web-search agent and print the report.
pub async fn search(state: &AppState, query: &str, json: bool) -> Result<()> {
    if !json {
        println!();
        println!("  {} 正在搜尋：{}", style("🔍").bold(), style(query).cyan());
        println!(
            "  {}",
            style("正在搜尋和分析網路資訊，這可能需要一些時間...").dim()
        );
    }

    let report = state.search_agent.research(query).await?;

    if json {
        let out = serde_json::json!({
            "query": query,
            "report": report.text,
            "tool_invocations": report.tool_invocations,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("═".repeat(60)).dim());
    println!("  「{query}」產品資訊報告");
    println!("  {}", style("═".repeat(60)).dim());
    println!();
    println!("{}", report.text);
    println!();
    println!(
        "  {}",
        style(format!("({} 次工具呼叫)", report.tool_invocations)).dim()
    );

    Ok(())
}
