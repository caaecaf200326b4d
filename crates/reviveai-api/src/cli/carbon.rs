//! Carbon estimation command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Estimate and print the carbon savings for a product description.
pub async fn carbon(state: &AppState, query: &str, json: bool) -> Result<()> {
    let result = state.carbon.calculate(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let product = &result.selected_product;
    let benefits = &result.environmental_benefits;

    println!();
    println!("  {} 碳足跡計算結果", style("🌱").bold());
    println!();
    println!("  選定的產品: {}", style(&product.product_name).cyan());
    println!("  公司: {}", product.company);
    println!("  相似度分數: {:.2}", product.similarity_score);
    println!(
        "  原始碳足跡: {} kg CO2e",
        style(format!("{:.2}", product.carbon_footprint)).bold()
    );
    println!(
        "  節省的碳排放: {} kg CO2e",
        style(format!("{:.2}", result.saved_carbon)).green().bold()
    );
    println!();
    println!("  {}", style("── 環境效益 ──").dim());
    println!("  • 相當於 {} 棵樹一年的吸碳量", benefits.trees);
    println!("  • 相當於減少開車 {} 公里的碳排放", benefits.car_km);
    println!("  • 相當於減少吹冷氣 {} 小時的碳排放", benefits.ac_hours);
    println!("  • 相當於減少手機充電 {} 次的碳排放", benefits.phone_charges);
    println!();
    println!("  選擇原因: {}", style(&result.selection_reason).dim());
    println!();

    Ok(())
}
